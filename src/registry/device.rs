// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single controllable device.

use crate::event::DeviceId;
use crate::types::{DeviceCategory, PowerState};

use super::DeviceConfig;

/// A device record held by the registry.
///
/// Identity and topics are fixed at construction. Only the name and the
/// power-state belief change afterwards, and only through the registry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Device {
    id: DeviceId,
    name: String,
    power: PowerState,
    category: DeviceCategory,
    command_topic: String,
    status_topic: String,
    revision: u64,
}

impl Device {
    /// Creates a device from its catalog entry. The belief starts as off.
    pub(crate) fn from_config(config: DeviceConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.trim().to_string(),
            power: PowerState::Off,
            category: config.category,
            command_topic: config.command_topic,
            status_topic: config.status_topic,
            revision: 0,
        }
    }

    /// Returns the device identifier.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current power-state belief.
    #[must_use]
    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Returns `true` if the device is believed to be on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.power.is_on()
    }

    /// Returns the presentation category.
    #[must_use]
    pub fn category(&self) -> DeviceCategory {
        self.category
    }

    /// Returns the topic commands are published to.
    #[must_use]
    pub fn command_topic(&self) -> &str {
        &self.command_topic
    }

    /// Returns the topic the device reports its state on.
    #[must_use]
    pub fn status_topic(&self) -> &str {
        &self.status_topic
    }

    /// Number of power writes applied to this device so far.
    ///
    /// Informational: a write is never rejected because of its revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Overwrites the belief and returns the previous one.
    pub(crate) fn write_power(&mut self, state: PowerState) -> PowerState {
        self.revision += 1;
        std::mem::replace(&mut self.power, state)
    }

    pub(crate) fn write_name(&mut self, name: String) {
        self.name = name;
    }
}
