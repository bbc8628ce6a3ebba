// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device catalog and registry.
//!
//! The [`DeviceRegistry`] is built once from a list of [`DeviceConfig`]
//! entries and holds the panel's belief about every device for the whole
//! session. Membership never changes after construction.
//!
//! # Examples
//!
//! ```
//! use smarthome_panel::registry::{DeviceConfig, DeviceRegistry};
//! use smarthome_panel::event::DeviceId;
//!
//! let registry = DeviceRegistry::new([
//!     DeviceConfig::for_appliance(1, "LED Quarto", "casa/quarto/rele"),
//!     DeviceConfig::for_appliance(2, "Luz Sala", "casa/sala/rele"),
//! ])?;
//!
//! let device = registry.find_by_status_topic("casa/sala/rele/status").unwrap();
//! assert_eq!(device.id(), DeviceId::new(2));
//! # Ok::<(), smarthome_panel::error::ConfigError>(())
//! ```

mod device;
mod device_config;
mod device_registry;

pub use device::Device;
pub use device_config::{DeviceConfig, default_devices, load_devices_json};
pub use device_registry::DeviceRegistry;
