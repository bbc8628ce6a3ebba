// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker connection lifecycle.
//!
//! - [`ConnectionStatus`] - `connecting`, `connected`, `disconnected`, `error`
//! - [`LifecycleEvent`] - What the session reports
//! - [`ConnectionManager`] - Owner of the session and the status machine
//! - [`ReconnectionPolicy`] - Delay between reconnect attempts

mod connection_manager;
mod reconnection;
mod status;

pub use connection_manager::{ConnectionManager, StatusTransition};
pub use reconnection::{DEFAULT_RECONNECT_PERIOD, ReconnectionPolicy};
pub use status::{ConnectionStatus, LifecycleEvent};
