// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state changes and reconciliation.
//!
//! - [`StateChange`] - One discrete update to a device record
//! - [`StateReconciler`] - Last-writer-wins merge of inbound status

mod reconciler;
mod state_change;

pub use reconciler::{Reconciled, StateReconciler};
pub use state_change::{ChangeOrigin, StateChange};
