// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the control panel core.
//!
//! Connection failures never reach callers as fatal errors: they are
//! recovered by the reconnect loop and surface only as a change of
//! [`ConnectionStatus`]. The errors below are the ones a caller can act on:
//! a command rejected while offline, an invalid rename, or a malformed
//! device catalog at startup.

use thiserror::Error;

use crate::connection::ConnectionStatus;
use crate::event::DeviceId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred while talking to the broker.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A user-supplied value was rejected before touching any state.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The static device catalog is malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command was attempted while the session was not connected.
    ///
    /// The intent is dropped; nothing is queued for later delivery.
    #[error("command rejected: connection is {status}")]
    CommandRejected {
        /// Connection status at the time of the attempt.
        status: ConnectionStatus,
    },

    /// No device with this identifier exists in the registry.
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),
}

/// Errors related to the MQTT session.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The MQTT client refused the request (request channel full or closed).
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Handshake or transport failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid broker URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// No session is attached to the connection manager.
    #[error("no transport session attached")]
    NotAttached,
}

/// A single status-topic could not be subscribed.
///
/// Reported per topic; the remaining topics are still subscribed and the
/// affected device simply receives no live updates until the next reconnect.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to subscribe to {topic}: {reason}")]
pub struct SubscriptionError {
    /// The status-topic that failed.
    pub topic: String,
    /// Description of the failure.
    pub reason: String,
}

/// Errors raised by local validation of user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A device name was empty after trimming whitespace.
    #[error("device name must not be empty")]
    EmptyName,
}

/// Errors in the static device catalog, detected at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The catalog contains no devices.
    #[error("device catalog is empty")]
    Empty,

    /// Two devices share an identifier.
    #[error("duplicate device id {0}")]
    DuplicateId(DeviceId),

    /// Two devices share a status-topic, which would make routing ambiguous.
    #[error("duplicate status topic: {0}")]
    DuplicateStatusTopic(String),

    /// Two devices share a command-topic.
    #[error("duplicate command topic: {0}")]
    DuplicateCommandTopic(String),

    /// A device has an empty command or status topic.
    #[error("device {0} has an empty topic")]
    EmptyTopic(DeviceId),

    /// A device has an empty name.
    #[error("device {0} has an empty name")]
    EmptyName(DeviceId),

    /// The catalog could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
