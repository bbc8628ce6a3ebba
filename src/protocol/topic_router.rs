// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound message routing.
//!
//! ```text
//! MQTT Message: casa/sala/tv/status → ON
//!                     ↓
//!             MessageRouter::route()
//!                     ↓
//!     registry.find_by_status_topic("casa/sala/tv/status")
//!                     ↓
//!          decode payload → PowerState::On
//!                     ↓
//!        RoutedStatus { device_id: #3, state: On }
//! ```

use crate::event::DeviceId;
use crate::registry::DeviceRegistry;
use crate::types::PowerState;

/// A status message resolved to its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutedStatus {
    /// The device owning the status-topic.
    pub device_id: DeviceId,
    /// The decoded state.
    pub state: PowerState,
}

/// Routes inbound messages to devices by status-topic.
///
/// Messages on topics no device owns are dropped silently: on a shared public
/// broker, unrelated traffic is expected.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageRouter;

impl MessageRouter {
    /// Creates a new router.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves and decodes an inbound message.
    ///
    /// Returns `None` if no device owns `topic`.
    #[must_use]
    pub fn route(&self, registry: &DeviceRegistry, topic: &str, payload: &[u8]) -> Option<RoutedStatus> {
        let Some(device) = registry.find_by_status_topic(topic) else {
            tracing::trace!(topic = %topic, "Ignoring message on unrecognized topic");
            return None;
        };

        let state = PowerState::from_status_payload(payload);
        tracing::debug!(
            device = %device.id(),
            topic = %topic,
            payload = %String::from_utf8_lossy(payload),
            %state,
            "Routing status message"
        );

        Some(RoutedStatus {
            device_id: device.id(),
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DeviceConfig;

    fn registry() -> DeviceRegistry {
        DeviceRegistry::new([
            DeviceConfig::for_appliance(1, "LED Quarto", "casa/quarto/rele"),
            DeviceConfig::for_appliance(3, "TV Sala", "casa/sala/tv"),
        ])
        .unwrap()
    }

    #[test]
    fn routes_status_topic_to_device() {
        let routed = MessageRouter::new()
            .route(&registry(), "casa/sala/tv/status", b"ON")
            .unwrap();

        assert_eq!(routed.device_id, DeviceId::new(3));
        assert_eq!(routed.state, PowerState::On);
    }

    #[test]
    fn decodes_off_payloads() {
        let registry = registry();
        let router = MessageRouter::new();

        for payload in [&b"OFF"[..], b"0", b"", b"garbage"] {
            let routed = router
                .route(&registry, "casa/quarto/rele/status", payload)
                .unwrap();
            assert_eq!(routed.state, PowerState::Off);
        }
    }

    #[test]
    fn unknown_topic_is_dropped() {
        assert!(
            MessageRouter::new()
                .route(&registry(), "someone/else/status", b"1")
                .is_none()
        );
    }

    #[test]
    fn command_topic_is_not_a_status_topic() {
        // The panel's own command echo must not be mistaken for status
        assert!(
            MessageRouter::new()
                .route(&registry(), "casa/sala/tv", b"1")
                .is_none()
        );
    }
}
