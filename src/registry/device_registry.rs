// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered device catalog with topic index.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::{ConfigError, Error, ValidationError};
use crate::event::DeviceId;
use crate::types::PowerState;

use super::{Device, DeviceConfig};

/// The fixed set of devices for a panel session.
///
/// Devices keep the order of the catalog they were built from. Two indices
/// are built once at construction: by identifier and by status-topic. The
/// status-topic index is what makes inbound routing O(1) and unambiguous;
/// duplicate status-topics are rejected up front.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    by_id: HashMap<DeviceId, usize>,
    by_status_topic: HashMap<String, usize>,
}

impl DeviceRegistry {
    /// Builds a registry from a device catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the catalog is empty, or if any device has
    /// an empty name or topic, or if ids, command-topics or status-topics are
    /// not unique.
    pub fn new(configs: impl IntoIterator<Item = DeviceConfig>) -> Result<Self, ConfigError> {
        let mut devices = Vec::new();
        let mut by_id = HashMap::new();
        let mut by_status_topic = HashMap::new();
        let mut command_topics = HashMap::new();

        for config in configs {
            let id = config.id;
            if config.name.trim().is_empty() {
                return Err(ConfigError::EmptyName(id));
            }
            if config.command_topic.trim().is_empty() || config.status_topic.trim().is_empty() {
                return Err(ConfigError::EmptyTopic(id));
            }

            let slot = devices.len();
            if by_id.insert(id, slot).is_some() {
                return Err(ConfigError::DuplicateId(id));
            }
            match by_status_topic.entry(config.status_topic.clone()) {
                Entry::Occupied(entry) => {
                    return Err(ConfigError::DuplicateStatusTopic(entry.key().clone()));
                }
                Entry::Vacant(entry) => {
                    entry.insert(slot);
                }
            }
            if command_topics.insert(config.command_topic.clone(), id).is_some() {
                return Err(ConfigError::DuplicateCommandTopic(config.command_topic));
            }

            devices.push(Device::from_config(config));
        }

        if devices.is_empty() {
            return Err(ConfigError::Empty);
        }

        tracing::debug!(devices = devices.len(), "Device registry built");

        Ok(Self {
            devices,
            by_id,
            by_status_topic,
        })
    }

    /// Returns the device with the given identifier.
    #[must_use]
    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.by_id.get(&id).map(|&slot| &self.devices[slot])
    }

    fn get_mut(&mut self, id: DeviceId) -> Result<&mut Device, Error> {
        let slot = *self.by_id.get(&id).ok_or(Error::DeviceNotFound(id))?;
        Ok(&mut self.devices[slot])
    }

    /// Resolves the device owning a status-topic.
    #[must_use]
    pub fn find_by_status_topic(&self, topic: &str) -> Option<&Device> {
        self.by_status_topic
            .get(topic)
            .map(|&slot| &self.devices[slot])
    }

    /// Overwrites the power-state belief of a device.
    ///
    /// Returns the previous belief.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if no such device exists.
    pub fn set_power_state(&mut self, id: DeviceId, state: PowerState) -> Result<PowerState, Error> {
        Ok(self.get_mut(id)?.write_power(state))
    }

    /// Renames a device, storing the trimmed name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if the name is blank (the
    /// current name is kept), or [`Error::DeviceNotFound`].
    pub fn set_name(&mut self, id: DeviceId, name: &str) -> Result<(), Error> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.get_mut(id)?.write_name(trimmed.to_string());
        Ok(())
    }

    /// Iterates over devices in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// Returns every status-topic in catalog order.
    pub fn status_topics(&self) -> impl Iterator<Item = &str> {
        self.devices.iter().map(Device::status_topic)
    }

    /// Returns a copy of every device in catalog order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Device> {
        self.devices.clone()
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if the registry holds no devices.
    ///
    /// Always `false` for a registry built through [`DeviceRegistry::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
