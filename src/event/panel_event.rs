// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Panel event types.

use crate::connection::ConnectionStatus;
use crate::error::SubscriptionError;
use crate::state::StateChange;

use super::DeviceId;

/// Events emitted by the panel for the presentation layer.
///
/// # Examples
///
/// ```
/// use smarthome_panel::connection::ConnectionStatus;
/// use smarthome_panel::event::{DeviceId, PanelEvent};
/// use smarthome_panel::state::StateChange;
/// use smarthome_panel::types::PowerState;
///
/// let event = PanelEvent::device_changed(DeviceId::new(1), StateChange::remote_power(PowerState::On));
/// assert_eq!(event.device_id(), Some(DeviceId::new(1)));
///
/// let event = PanelEvent::status_changed(ConnectionStatus::Connecting, ConnectionStatus::Connected);
/// assert!(event.is_connection());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    /// The connection status moved.
    StatusChanged {
        /// Status before the transition.
        previous: ConnectionStatus,
        /// Status after the transition.
        current: ConnectionStatus,
    },

    /// A device record changed.
    DeviceChanged {
        /// The ID of the device.
        device_id: DeviceId,
        /// What changed.
        change: StateChange,
    },

    /// A status-topic could not be subscribed after (re)connecting.
    SubscriptionFailed(SubscriptionError),

    /// A command was dropped because the panel was not connected.
    CommandRejected {
        /// The ID of the targeted device.
        device_id: DeviceId,
        /// Connection status at the time of the attempt.
        status: ConnectionStatus,
    },
}

impl PanelEvent {
    /// Returns the device ID associated with this event, if any.
    #[must_use]
    pub fn device_id(&self) -> Option<DeviceId> {
        match self {
            Self::DeviceChanged { device_id, .. } | Self::CommandRejected { device_id, .. } => {
                Some(*device_id)
            }
            Self::StatusChanged { .. } | Self::SubscriptionFailed(_) => None,
        }
    }

    /// Returns `true` if this is a connection event.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::StatusChanged { .. })
    }

    /// Returns `true` if this is a device change event.
    #[must_use]
    pub fn is_device_change(&self) -> bool {
        matches!(self, Self::DeviceChanged { .. })
    }

    /// Creates a status changed event.
    #[must_use]
    pub fn status_changed(previous: ConnectionStatus, current: ConnectionStatus) -> Self {
        Self::StatusChanged { previous, current }
    }

    /// Creates a device changed event.
    #[must_use]
    pub fn device_changed(device_id: DeviceId, change: StateChange) -> Self {
        Self::DeviceChanged { device_id, change }
    }
}
