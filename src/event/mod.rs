// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for the presentation layer.
//!
//! - [`DeviceId`] - Stable identifier of a device
//! - [`PanelEvent`] - Status transitions, device changes and failures
//! - [`EventBus`] - Broadcast channel distributing events to subscribers
//!
//! # Examples
//!
//! ```
//! use smarthome_panel::connection::ConnectionStatus;
//! use smarthome_panel::event::{EventBus, PanelEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(PanelEvent::status_changed(
//!     ConnectionStatus::Connecting,
//!     ConnectionStatus::Connected,
//! ));
//!
//! assert!(rx.try_recv().unwrap().is_connection());
//! ```

mod device_id;
mod event_bus;
mod panel_event;

pub use device_id::DeviceId;
pub use event_bus::EventBus;
pub use panel_event::PanelEvent;
