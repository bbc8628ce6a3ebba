// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power command for a single appliance.

use std::fmt;

use crate::registry::Device;
use crate::types::PowerState;

/// A request to switch one appliance on or off.
///
/// # Examples
///
/// ```
/// use smarthome_panel::command::PowerCommand;
/// use smarthome_panel::types::PowerState;
///
/// let cmd = PowerCommand::new("casa/sala/tv", PowerState::On);
/// assert_eq!(cmd.topic(), "casa/sala/tv");
/// assert_eq!(cmd.payload(), "1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerCommand {
    topic: String,
    state: PowerState,
}

impl PowerCommand {
    /// Creates a command for a command-topic.
    #[must_use]
    pub fn new(topic: impl Into<String>, state: PowerState) -> Self {
        Self {
            topic: topic.into(),
            state,
        }
    }

    /// Creates a command addressed to a device.
    #[must_use]
    pub fn for_device(device: &Device, state: PowerState) -> Self {
        Self::new(device.command_topic(), state)
    }

    /// Returns the command-topic.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Returns the desired power state.
    #[must_use]
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Returns the wire payload.
    #[must_use]
    pub fn payload(&self) -> &'static str {
        self.state.command_payload()
    }
}

impl fmt::Display for PowerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <- {}", self.topic, self.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_payload() {
        let cmd = PowerCommand::new("casa/quarto/ar", PowerState::Off);
        assert_eq!(cmd.payload(), "0");
        assert_eq!(cmd.state(), PowerState::Off);
    }

    #[test]
    fn display() {
        let cmd = PowerCommand::new("casa/quarto/ar", PowerState::On);
        assert_eq!(cmd.to_string(), "casa/quarto/ar <- 1");
    }
}
