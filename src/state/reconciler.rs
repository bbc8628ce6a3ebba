// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Merging of inbound status with the local belief.

use crate::event::DeviceId;
use crate::registry::DeviceRegistry;
use crate::types::PowerState;

use super::StateChange;

/// Outcome of a power write on one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    /// The device that was written.
    pub device_id: DeviceId,
    /// Belief before the write.
    pub previous: PowerState,
    /// Belief after the write.
    pub current: PowerState,
    /// Device revision after the write.
    pub revision: u64,
}

impl Reconciled {
    /// Returns `true` if the write moved the belief.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Applies authoritative observations to the registry.
///
/// Policy is last-writer-wins on arrival order: every inbound status
/// overwrites the belief, even when an optimistic write from a command is
/// still waiting for its echo. There is no sequence or timestamp comparison;
/// a late status message can undo a fresher optimistic write until the next
/// status message arrives.
#[derive(Debug, Default, Clone, Copy)]
pub struct StateReconciler;

impl StateReconciler {
    /// Creates a reconciler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Overwrites the belief of `device_id` with an inbound observation.
    ///
    /// Returns `None` if the device is not in the registry.
    pub fn apply(
        &self,
        registry: &mut DeviceRegistry,
        device_id: DeviceId,
        state: PowerState,
    ) -> Option<Reconciled> {
        let previous = registry.set_power_state(device_id, state).ok()?;
        let revision = registry.get(device_id).map_or(0, |d| d.revision());

        if previous == state {
            tracing::trace!(device = %device_id, %state, "Status confirms belief");
        } else {
            tracing::debug!(
                device = %device_id,
                %previous,
                current = %state,
                "Status overwrote belief"
            );
        }

        Some(Reconciled {
            device_id,
            previous,
            current: state,
            revision,
        })
    }

    /// Returns the change to broadcast for a remote write, if it moved the belief.
    #[must_use]
    pub fn remote_change(reconciled: &Reconciled) -> Option<StateChange> {
        reconciled
            .changed()
            .then(|| StateChange::remote_power(reconciled.current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DeviceConfig;

    fn registry() -> DeviceRegistry {
        DeviceRegistry::new([
            DeviceConfig::for_appliance(1, "Lamp", "home/office/lamp"),
            DeviceConfig::for_appliance(2, "Fan", "home/office/fan"),
        ])
        .unwrap()
    }

    #[test]
    fn inbound_status_overwrites_belief() {
        let mut registry = registry();
        let id = DeviceId::new(1);

        let outcome = StateReconciler::new()
            .apply(&mut registry, id, PowerState::On)
            .unwrap();

        assert!(outcome.changed());
        assert_eq!(outcome.previous, PowerState::Off);
        assert!(registry.get(id).unwrap().is_on());
    }

    #[test]
    fn inbound_status_overrides_optimistic_write() {
        let mut registry = registry();
        let id = DeviceId::new(2);

        // Optimistic write from a command
        registry.set_power_state(id, PowerState::On).unwrap();

        // Stale status arrives afterwards and wins
        let outcome = StateReconciler::new()
            .apply(&mut registry, id, PowerState::Off)
            .unwrap();

        assert_eq!(outcome.previous, PowerState::On);
        assert_eq!(outcome.current, PowerState::Off);
        assert_eq!(outcome.revision, 2);
        assert!(!registry.get(id).unwrap().is_on());
    }

    #[test]
    fn confirming_status_is_not_a_change() {
        let mut registry = registry();
        let outcome = StateReconciler::new()
            .apply(&mut registry, DeviceId::new(1), PowerState::Off)
            .unwrap();

        assert!(!outcome.changed());
        assert!(StateReconciler::remote_change(&outcome).is_none());
        // The write is still counted
        assert_eq!(outcome.revision, 1);
    }

    #[test]
    fn unknown_device_is_ignored() {
        let mut registry = registry();
        assert!(
            StateReconciler::new()
                .apply(&mut registry, DeviceId::new(42), PowerState::On)
                .is_none()
        );
    }
}
