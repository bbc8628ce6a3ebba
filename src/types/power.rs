// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state of a device and its wire encodings.

use std::fmt;

/// Represents the believed power state of a device.
///
/// Commands and status notifications use different encodings: the panel
/// publishes `"1"`/`"0"`, while devices report either `"ON"` or `"1"` for
/// on. Anything a device reports that is not an on-indicator means off.
///
/// # Examples
///
/// ```
/// use smarthome_panel::types::PowerState;
///
/// assert_eq!(PowerState::On.command_payload(), "1");
/// assert_eq!(PowerState::Off.command_payload(), "0");
///
/// assert_eq!(PowerState::from_status_payload(b"on"), PowerState::On);
/// assert_eq!(PowerState::from_status_payload(b"1"), PowerState::On);
/// assert_eq!(PowerState::from_status_payload(b"standby"), PowerState::Off);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum PowerState {
    /// Power is off.
    #[default]
    Off,
    /// Power is on.
    On,
}

impl PowerState {
    /// Returns the display string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns the payload published on a command-topic.
    #[must_use]
    pub const fn command_payload(&self) -> &'static str {
        match self {
            Self::Off => "0",
            Self::On => "1",
        }
    }

    /// Returns `true` if the state is [`PowerState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }

    /// Decodes a status-topic payload.
    ///
    /// The payload is case-normalized but otherwise compared verbatim: `ON`
    /// and `1` decode to on, every other value (surrounding whitespace,
    /// empty, unknown words, invalid UTF-8) decodes to off.
    #[must_use]
    pub fn from_status_payload(payload: &[u8]) -> Self {
        let Ok(text) = std::str::from_utf8(payload) else {
            return Self::Off;
        };
        if text.eq_ignore_ascii_case("ON") || text == "1" {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl From<PowerState> for bool {
    fn from(value: PowerState) -> Self {
        value.is_on()
    }
}
