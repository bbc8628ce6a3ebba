// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel composition.
//!
//! - [`ControlPanel`] - Synchronous core owning registry and connection
//! - [`PanelHandle`] - Tokio task driving a `ControlPanel`

mod control_panel;
mod handle;

pub use control_panel::ControlPanel;
pub use handle::PanelHandle;
