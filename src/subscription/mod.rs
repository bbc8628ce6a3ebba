// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback subscriptions for connection status changes.
//!
//! For most consumers the broadcast [`PanelEvent`](crate::event::PanelEvent)
//! stream or the status watch channel is the better fit. Callbacks exist for
//! code that must react synchronously, inside the panel task, to every
//! transition.

mod callback;

pub use callback::{StatusListeners, SubscriptionId};
