// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! A [`StateChange`] describes one discrete update to a device record, either
//! an inbound status observation, an optimistic write made on user intent, or
//! a rename.
//!
//! # Examples
//!
//! ```
//! use smarthome_panel::state::{ChangeOrigin, StateChange};
//! use smarthome_panel::types::PowerState;
//!
//! let remote = StateChange::remote_power(PowerState::On);
//! assert_eq!(remote.power_state(), Some(PowerState::On));
//! assert_eq!(remote.origin(), Some(ChangeOrigin::Remote));
//!
//! let renamed = StateChange::renamed("Lamp");
//! assert!(renamed.power_state().is_none());
//! ```

use crate::types::PowerState;

/// Where a power write came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ChangeOrigin {
    /// Authoritative status message from the device.
    Remote,
    /// Local write applied on user intent before any confirmation.
    Optimistic,
}

/// Represents a change in a device record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StateChange {
    /// The power-state belief changed.
    Power {
        /// The new belief.
        state: PowerState,
        /// Who wrote it.
        origin: ChangeOrigin,
    },

    /// The display name changed.
    Renamed {
        /// The new (trimmed) name.
        name: String,
    },
}

impl StateChange {
    /// Creates a power change reported by the device.
    #[must_use]
    pub const fn remote_power(state: PowerState) -> Self {
        Self::Power {
            state,
            origin: ChangeOrigin::Remote,
        }
    }

    /// Creates an optimistic power change.
    #[must_use]
    pub const fn optimistic_power(state: PowerState) -> Self {
        Self::Power {
            state,
            origin: ChangeOrigin::Optimistic,
        }
    }

    /// Creates a rename change.
    #[must_use]
    pub fn renamed(name: impl Into<String>) -> Self {
        Self::Renamed { name: name.into() }
    }

    /// Returns the power state carried by this change, if any.
    #[must_use]
    pub const fn power_state(&self) -> Option<PowerState> {
        match self {
            Self::Power { state, .. } => Some(*state),
            Self::Renamed { .. } => None,
        }
    }

    /// Returns the origin of a power change.
    #[must_use]
    pub const fn origin(&self) -> Option<ChangeOrigin> {
        match self {
            Self::Power { origin, .. } => Some(*origin),
            Self::Renamed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimistic_power_carries_origin() {
        let change = StateChange::optimistic_power(PowerState::Off);
        assert_eq!(change.origin(), Some(ChangeOrigin::Optimistic));
        assert_eq!(change.power_state(), Some(PowerState::Off));
    }

    #[test]
    fn rename_has_no_power_state() {
        let change = StateChange::renamed("TV Sala");
        assert!(change.power_state().is_none());
        assert!(change.origin().is_none());
        assert_eq!(
            change,
            StateChange::Renamed {
                name: "TV Sala".to_string()
            }
        );
    }
}
