// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport plumbing between the broker and the panel core.
//!
//! - [`Transport`] - The publish/subscribe capability of a session
//! - [`MqttSession`] - rumqttc-backed session over WebSocket or TCP
//! - [`TransportEvent`] - What a session reports back to the panel
//! - [`MessageRouter`] - Resolves inbound status messages to devices
//!
//! Sessions never call into the panel directly. Everything they observe is
//! sent as a [`TransportEvent`] over an mpsc channel and consumed by the
//! single task that owns the device registry.

mod endpoint;
mod session;
mod topic_router;

pub use endpoint::BrokerEndpoint;
pub use session::MqttSession;
pub use topic_router::{MessageRouter, RoutedStatus};

use crate::connection::LifecycleEvent;
use crate::error::ProtocolError;

/// An event observed by a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Session lifecycle notification.
    Lifecycle(LifecycleEvent),
    /// An application message arrived.
    Message {
        /// Topic the message was published on.
        topic: String,
        /// Raw payload.
        payload: Vec<u8>,
    },
}

impl TransportEvent {
    /// Creates a message event.
    #[must_use]
    pub fn message(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self::Message {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

impl From<LifecycleEvent> for TransportEvent {
    fn from(event: LifecycleEvent) -> Self {
        Self::Lifecycle(event)
    }
}

/// The publish/subscribe capability of a broker session.
///
/// All methods enqueue work and return immediately; completion is never
/// awaited. Implementations report lifecycle and inbound messages through
/// their own [`TransportEvent`] channel.
pub trait Transport: Send {
    /// Requests a subscription to `topic`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request cannot be enqueued.
    fn subscribe(&self, topic: &str) -> Result<(), ProtocolError>;

    /// Publishes `payload` to `topic` (at most once, not retained).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request cannot be enqueued.
    fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError>;

    /// Ends the session and releases the underlying connection.
    ///
    /// Must be idempotent. Implementations should also release the
    /// connection when dropped without an explicit close.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the disconnect request cannot be enqueued;
    /// the session is torn down regardless.
    fn close(&mut self) -> Result<(), ProtocolError>;
}
