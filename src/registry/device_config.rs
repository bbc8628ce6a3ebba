// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static device catalog entries.

use crate::error::ConfigError;
use crate::event::DeviceId;
use crate::types::DeviceCategory;

/// Configuration for one device in the catalog.
///
/// # Examples
///
/// ```
/// use smarthome_panel::event::DeviceId;
/// use smarthome_panel::registry::DeviceConfig;
/// use smarthome_panel::types::DeviceCategory;
///
/// // Topics derived from the "<area>/<room>/<appliance>" convention
/// let config = DeviceConfig::for_appliance(1, "LED Quarto", "casa/quarto/rele");
/// assert_eq!(config.command_topic, "casa/quarto/rele");
/// assert_eq!(config.status_topic, "casa/quarto/rele/status");
///
/// // Explicit topics
/// let config = DeviceConfig::new(2, "TV Sala", "casa/sala/tv", "casa/sala/tv/state")
///     .with_category(DeviceCategory::Tv);
/// assert_eq!(config.id, DeviceId::new(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier.
    pub id: DeviceId,
    /// Initial display name.
    pub name: String,
    /// Presentation category.
    #[serde(default)]
    pub category: DeviceCategory,
    /// Topic the panel publishes commands to.
    pub command_topic: String,
    /// Topic the device publishes its state on.
    pub status_topic: String,
}

impl DeviceConfig {
    /// Creates a configuration with explicit topics.
    #[must_use]
    pub fn new(
        id: impl Into<DeviceId>,
        name: impl Into<String>,
        command_topic: impl Into<String>,
        status_topic: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: DeviceCategory::default(),
            command_topic: command_topic.into(),
            status_topic: status_topic.into(),
        }
    }

    /// Creates a configuration whose status-topic is `<command_topic>/status`.
    #[must_use]
    pub fn for_appliance(
        id: impl Into<DeviceId>,
        name: impl Into<String>,
        command_topic: impl Into<String>,
    ) -> Self {
        let command_topic = command_topic.into();
        let status_topic = format!("{command_topic}/status");
        Self::new(id, name, command_topic, status_topic)
    }

    /// Sets the presentation category.
    #[must_use]
    pub fn with_category(mut self, category: DeviceCategory) -> Self {
        self.category = category;
        self
    }
}

/// Parses a device catalog from a JSON array of [`DeviceConfig`] objects.
///
/// Only the syntax is checked here; uniqueness of ids and topics is enforced
/// when the registry is built.
///
/// # Errors
///
/// Returns [`ConfigError::Json`] if the document is not a valid catalog.
pub fn load_devices_json(json: &str) -> Result<Vec<DeviceConfig>, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// Returns the built-in twelve-device catalog.
#[must_use]
pub fn default_devices() -> Vec<DeviceConfig> {
    use DeviceCategory::{Fan, Light, Tv};

    [
        (1, "LED Quarto", Light, "casa/quarto/rele"),
        (2, "Luz Sala", Light, "casa/sala/rele"),
        (3, "TV Sala", Tv, "casa/sala/tv"),
        (4, "Ventilador", Fan, "casa/quarto/ventilador"),
        (5, "Luz Cozinha", Light, "casa/cozinha/rele"),
        (6, "Luz Banheiro", Light, "casa/banheiro/rele"),
        (7, "TV Quarto", Tv, "casa/quarto/tv"),
        (8, "Ar Condicionado", Fan, "casa/quarto/ar"),
        (9, "Luz Garagem", Light, "casa/garagem/rele"),
        (10, "Luz Jardim", Light, "casa/jardim/rele"),
        (11, "Luz Varanda", Light, "casa/varanda/rele"),
        (12, "Ventilador Sala", Fan, "casa/sala/ventilador"),
    ]
    .into_iter()
    .map(|(id, name, category, topic)| {
        DeviceConfig::for_appliance(id, name, topic).with_category(category)
    })
    .collect()
}
