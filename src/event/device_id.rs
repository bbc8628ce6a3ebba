// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device identifier type.

use std::fmt;

/// Stable identifier of a device in the registry.
///
/// Identifiers come from the static device catalog and never change for
/// the lifetime of the panel.
///
/// # Examples
///
/// ```
/// use smarthome_panel::event::DeviceId;
///
/// let id = DeviceId::new(3);
/// assert_eq!(id.value(), 3);
/// assert_eq!(id.to_string(), "#3");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct DeviceId(u32);

impl DeviceId {
    /// Creates a device identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for DeviceId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<DeviceId> for u32 {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality() {
        assert_eq!(DeviceId::new(7), DeviceId::from(7));
        assert_ne!(DeviceId::new(7), DeviceId::new(8));
    }

    #[test]
    fn ordering_follows_value() {
        assert!(DeviceId::new(1) < DeviceId::new(2));
    }

    #[test]
    fn deserializes_from_plain_number() {
        let id: DeviceId = serde_json::from_str("12").unwrap();
        assert_eq!(id.value(), 12);
    }

    #[test]
    fn hashable() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(DeviceId::new(1));
        assert!(set.contains(&DeviceId::new(1)));
    }
}
