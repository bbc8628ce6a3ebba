// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection status and its lifecycle transitions.

use std::fmt;

/// Status of the broker session.
///
/// There is no terminal state: `Error` and `Disconnected` both lead back to
/// `Connecting` once the reconnect period elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Session establishment in progress.
    #[default]
    Connecting,
    /// Session established; commands may be published.
    Connected,
    /// Session closed, waiting for the next reconnect attempt.
    Disconnected,
    /// Handshake or transport failure, waiting for the next reconnect attempt.
    Error,
}

impl ConnectionStatus {
    /// Returns the lowercase name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
        }
    }

    /// Returns `true` if commands may be published.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Computes the status that follows `event`.
    ///
    /// Returns `None` when the event does not move the state machine.
    #[must_use]
    pub fn transition(self, event: &LifecycleEvent) -> Option<Self> {
        use ConnectionStatus::{Connected, Connecting, Disconnected, Error};

        match (self, event) {
            (Connected, LifecycleEvent::Connected)
            | (Disconnected | Error, LifecycleEvent::Closed)
            | (Connecting | Connected, LifecycleEvent::Reconnecting)
            | (Error, LifecycleEvent::Failed(_)) => None,

            (_, LifecycleEvent::Connected) => Some(Connected),
            (_, LifecycleEvent::Closed) => Some(Disconnected),
            (_, LifecycleEvent::Reconnecting) => Some(Connecting),
            (_, LifecycleEvent::Failed(_)) => Some(Error),
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle notification from the transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The broker acknowledged the session.
    Connected,
    /// The session was closed after being established (network loss, broker
    /// disconnect) or before the handshake completed.
    Closed,
    /// The reconnect period elapsed and a new attempt is starting.
    Reconnecting,
    /// Handshake or transport fault.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use ConnectionStatus::{Connected, Connecting, Disconnected, Error};

    fn failed() -> LifecycleEvent {
        LifecycleEvent::Failed("connection refused".to_string())
    }

    #[test]
    fn initial_status_is_connecting() {
        assert_eq!(ConnectionStatus::default(), Connecting);
    }

    #[test]
    fn handshake_success_and_failure() {
        assert_eq!(Connecting.transition(&LifecycleEvent::Connected), Some(Connected));
        assert_eq!(Connecting.transition(&failed()), Some(Error));
    }

    #[test]
    fn connection_loss_then_retry() {
        assert_eq!(Connected.transition(&LifecycleEvent::Closed), Some(Disconnected));
        assert_eq!(
            Disconnected.transition(&LifecycleEvent::Reconnecting),
            Some(Connecting)
        );
    }

    #[test]
    fn error_is_not_terminal() {
        assert_eq!(Error.transition(&LifecycleEvent::Reconnecting), Some(Connecting));
        assert_eq!(Error.transition(&LifecycleEvent::Connected), Some(Connected));
    }

    #[test]
    fn any_state_can_fault() {
        assert_eq!(Connected.transition(&failed()), Some(Error));
        assert_eq!(Disconnected.transition(&failed()), Some(Error));
        assert_eq!(Error.transition(&failed()), None);
    }

    #[test]
    fn redundant_events_do_not_move() {
        assert_eq!(Connected.transition(&LifecycleEvent::Connected), None);
        assert_eq!(Disconnected.transition(&LifecycleEvent::Closed), None);
        assert_eq!(Error.transition(&LifecycleEvent::Closed), None);
        assert_eq!(Connecting.transition(&LifecycleEvent::Reconnecting), None);
        assert_eq!(Connected.transition(&LifecycleEvent::Reconnecting), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(Connecting.to_string(), "connecting");
        assert_eq!(Error.to_string(), "error");
        assert!(Connected.is_connected());
        assert!(!Disconnected.is_connected());
    }
}
