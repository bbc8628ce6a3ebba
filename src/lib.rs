// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `smarthome_panel` - State core of an MQTT smart-home control panel.
//!
//! The panel mirrors and commands the on/off state of a fixed set of
//! appliances through an MQTT broker. Each appliance listens for `"1"` or
//! `"0"` on its command-topic and reports its state on a status-topic.
//!
//! # What the core guarantees
//!
//! - **Local belief**: every device has a power state the UI can render at
//!   any time, even while offline
//! - **Last-writer-wins**: inbound status messages overwrite the belief in
//!   arrival order, including optimistic writes still awaiting an echo
//! - **Optimistic commands**: a toggle publishes and updates the belief at
//!   once; while not connected it is rejected instead of queued
//! - **Status gating**: `connecting`, `connected`, `disconnected` and
//!   `error`, with automatic reconnect and re-subscription
//!
//! # Quick Start
//!
//! ```no_run
//! use smarthome_panel::config::PanelConfig;
//! use smarthome_panel::event::DeviceId;
//! use smarthome_panel::panel::PanelHandle;
//!
//! #[tokio::main]
//! async fn main() -> smarthome_panel::Result<()> {
//!     let panel = PanelHandle::spawn(PanelConfig::with_default_devices())?;
//!
//!     let mut events = panel.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{event:?}");
//!         }
//!     });
//!
//!     panel.watch_status().wait_for(|s| s.is_connected()).await.ok();
//!     panel.toggle(DeviceId::new(3), true).await?;
//!
//!     for device in panel.devices().await? {
//!         println!("{} {}: {}", device.id(), device.name(), device.power());
//!     }
//!
//!     panel.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Driving the core yourself
//!
//! [`ControlPanel`] is synchronous: feed it [`TransportEvent`]s from any
//! [`Transport`](protocol::Transport) and call its methods from a single
//! thread.
//!
//! ```
//! use smarthome_panel::event::DeviceId;
//! use smarthome_panel::panel::ControlPanel;
//! use smarthome_panel::protocol::TransportEvent;
//! use smarthome_panel::registry::DeviceConfig;
//!
//! let mut panel = ControlPanel::new(vec![
//!     DeviceConfig::for_appliance(1, "Lamp", "home/office/lamp"),
//! ])?;
//!
//! panel.handle_event(TransportEvent::message("home/office/lamp/status", "ON"));
//! assert!(panel.device(DeviceId::new(1)).unwrap().is_on());
//! # Ok::<(), smarthome_panel::Error>(())
//! ```

pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod panel;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod subscription;
pub mod types;

pub use command::{CommandDispatcher, PowerCommand};
pub use config::{BrokerConfig, BrokerConfigBuilder, PanelConfig};
pub use connection::{ConnectionManager, ConnectionStatus, LifecycleEvent, ReconnectionPolicy};
pub use error::{
    ConfigError, Error, ProtocolError, Result, SubscriptionError, ValidationError,
};
pub use event::{DeviceId, EventBus, PanelEvent};
pub use panel::{ControlPanel, PanelHandle};
pub use protocol::{MqttSession, Transport, TransportEvent};
pub use registry::{Device, DeviceConfig, DeviceRegistry};
pub use state::{ChangeOrigin, StateChange};
pub use subscription::SubscriptionId;
pub use types::{DeviceCategory, PowerState};
