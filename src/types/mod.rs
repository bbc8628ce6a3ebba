// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared across the panel core.
//!
//! - [`PowerState`] - On/Off belief with command and status encodings
//! - [`DeviceCategory`] - Presentation tag (light, tv, fan)

mod category;
mod power;

pub use category::DeviceCategory;
pub use power::PowerState;
