// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker and panel configuration.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use smarthome_panel::config::{BrokerConfig, PanelConfig};
//! use smarthome_panel::connection::ReconnectionPolicy;
//!
//! let broker = BrokerConfig::builder()
//!     .url("mqtt://192.168.1.50:1883")
//!     .keep_alive(Duration::from_secs(30))
//!     .reconnection(ReconnectionPolicy::fixed(Duration::from_secs(2)))
//!     .build();
//!
//! let config = PanelConfig::with_default_devices().with_broker(broker);
//! assert_eq!(config.devices.len(), 12);
//! ```

use std::time::Duration;

use uuid::Uuid;

use crate::connection::ReconnectionPolicy;
use crate::error::ConfigError;
use crate::registry::{DeviceConfig, default_devices, load_devices_json};

/// Public broker the panel talks to unless configured otherwise.
pub const DEFAULT_BROKER_URL: &str = "wss://broker.hivemq.com:8884/mqtt";

/// Prefix of the generated MQTT client identifier.
pub const DEFAULT_CLIENT_ID_PREFIX: &str = "smarthome_";

/// Configuration for the broker session.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    url: String,
    client_id_prefix: String,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    reconnection: ReconnectionPolicy,
    request_capacity: usize,
    event_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BROKER_URL.to_string(),
            client_id_prefix: DEFAULT_CLIENT_ID_PREFIX.to_string(),
            credentials: None,
            keep_alive: Duration::from_secs(60),
            reconnection: ReconnectionPolicy::default(),
            request_capacity: 64,
            event_capacity: 256,
        }
    }
}

impl BrokerConfig {
    /// Creates a new builder starting from the defaults.
    #[must_use]
    pub fn builder() -> BrokerConfigBuilder {
        BrokerConfigBuilder::default()
    }

    /// Returns the broker URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the client identifier prefix.
    #[must_use]
    pub fn client_id_prefix(&self) -> &str {
        &self.client_id_prefix
    }

    /// Returns the credentials if configured.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Returns the keep-alive interval.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// Returns the reconnection policy.
    #[must_use]
    pub fn reconnection(&self) -> ReconnectionPolicy {
        self.reconnection
    }

    /// Capacity of the MQTT client request queue.
    #[must_use]
    pub fn request_capacity(&self) -> usize {
        self.request_capacity
    }

    /// Capacity of the inbound transport event channel.
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    /// Generates a fresh client identifier: the prefix followed by eight
    /// random lowercase hex characters.
    #[must_use]
    pub fn generate_client_id(&self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}{}", self.client_id_prefix, &suffix[..8])
    }
}

/// Builder for [`BrokerConfig`].
#[derive(Debug, Default)]
pub struct BrokerConfigBuilder {
    config: BrokerConfig,
}

impl BrokerConfigBuilder {
    /// Sets the broker URL (`wss://`, `ws://`, `mqtts://`, `mqtt://` or `tcp://`).
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Sets the client identifier prefix (default: `smarthome_`).
    #[must_use]
    pub fn client_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.client_id_prefix = prefix.into();
        self
    }

    /// Sets broker authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 60 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the reconnection policy (default: fixed 5 seconds).
    #[must_use]
    pub fn reconnection(mut self, policy: ReconnectionPolicy) -> Self {
        self.config.reconnection = policy;
        self
    }

    /// Sets the MQTT client request queue capacity (default: 64).
    #[must_use]
    pub fn request_capacity(mut self, capacity: usize) -> Self {
        self.config.request_capacity = capacity.max(1);
        self
    }

    /// Sets the inbound event channel capacity (default: 256).
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity.max(1);
        self
    }

    /// Finishes the configuration.
    #[must_use]
    pub fn build(self) -> BrokerConfig {
        self.config
    }
}

/// Everything needed to start a panel.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Broker session settings.
    pub broker: BrokerConfig,
    /// Device catalog, in display order.
    pub devices: Vec<DeviceConfig>,
}

impl PanelConfig {
    /// Creates a configuration for the given catalog and the default broker.
    #[must_use]
    pub fn new(devices: Vec<DeviceConfig>) -> Self {
        Self {
            broker: BrokerConfig::default(),
            devices,
        }
    }

    /// Creates a configuration with the built-in device catalog.
    #[must_use]
    pub fn with_default_devices() -> Self {
        Self::new(default_devices())
    }

    /// Creates a configuration from a JSON device catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the catalog cannot be parsed.
    pub fn from_devices_json(json: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(load_devices_json(json)?))
    }

    /// Replaces the broker settings.
    #[must_use]
    pub fn with_broker(mut self, broker: BrokerConfig) -> Self {
        self.broker = broker;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_default_values() {
        let config = BrokerConfig::builder().build();
        assert_eq!(config.url(), "wss://broker.hivemq.com:8884/mqtt");
        assert_eq!(config.client_id_prefix(), "smarthome_");
        assert!(config.credentials().is_none());
        assert_eq!(config.keep_alive(), Duration::from_secs(60));
        assert_eq!(config.reconnection().period(), Duration::from_secs(5));
    }

    #[test]
    fn builder_chain() {
        let config = BrokerConfig::builder()
            .url("mqtt://localhost:1883")
            .client_id_prefix("panel_")
            .credentials("user", "pass")
            .keep_alive(Duration::from_secs(15))
            .request_capacity(0)
            .build();

        assert_eq!(config.url(), "mqtt://localhost:1883");
        assert_eq!(config.client_id_prefix(), "panel_");
        assert_eq!(config.credentials(), Some(("user", "pass")));
        assert_eq!(config.keep_alive(), Duration::from_secs(15));
        assert_eq!(config.request_capacity(), 1);
    }

    #[test]
    fn client_id_has_prefix_and_eight_hex_chars() {
        let config = BrokerConfig::default();
        let id = config.generate_client_id();

        let suffix = id.strip_prefix("smarthome_").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn client_ids_are_unique() {
        let config = BrokerConfig::default();
        assert_ne!(config.generate_client_id(), config.generate_client_id());
    }

    #[test]
    fn panel_config_from_json() {
        let json = r#"[{"id": 1, "name": "Lamp",
            "command_topic": "a/b/lamp", "status_topic": "a/b/lamp/status"}]"#;
        let config = PanelConfig::from_devices_json(json).unwrap();
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.broker.url(), DEFAULT_BROKER_URL);
    }
}
