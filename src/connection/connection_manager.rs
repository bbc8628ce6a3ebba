// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ownership of the broker session and its status.

use tokio::sync::{mpsc, watch};

use crate::config::BrokerConfig;
use crate::error::{Error, ProtocolError, SubscriptionError};
use crate::protocol::{MqttSession, Transport, TransportEvent};
use crate::subscription::{StatusListeners, SubscriptionId};

use super::{ConnectionStatus, LifecycleEvent};

/// A status transition applied by [`ConnectionManager::handle_lifecycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    /// Status before the event.
    pub previous: ConnectionStatus,
    /// Status after the event.
    pub current: ConnectionStatus,
    /// Status-topics that could not be re-subscribed on entering `Connected`.
    pub subscription_failures: Vec<SubscriptionError>,
}

/// Owns the single broker session of a panel.
///
/// The manager is the only holder of the session handle. The command path and
/// the status path borrow it; nothing else publishes or subscribes.
///
/// # Examples
///
/// ```
/// use smarthome_panel::connection::{ConnectionManager, ConnectionStatus};
///
/// let manager = ConnectionManager::new(["casa/sala/tv/status"]);
/// assert_eq!(manager.status(), ConnectionStatus::Connecting);
/// assert!(manager.publish("casa/sala/tv", "1").is_err());
/// ```
pub struct ConnectionManager {
    session: Option<Box<dyn Transport>>,
    status: watch::Sender<ConnectionStatus>,
    listeners: StatusListeners,
    status_topics: Vec<String>,
    client_id: Option<String>,
}

impl ConnectionManager {
    /// Creates a manager that will subscribe `status_topics` on every
    /// connection.
    ///
    /// The status starts as `Connecting`. Until a session is attached,
    /// lifecycle events are ignored and publishes are rejected.
    #[must_use]
    pub fn new<I, S>(status_topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (status, _) = watch::channel(ConnectionStatus::default());
        Self {
            session: None,
            status,
            listeners: StatusListeners::new(),
            status_topics: status_topics.into_iter().map(Into::into).collect(),
            client_id: None,
        }
    }

    /// Opens an MQTT session and attaches it.
    ///
    /// The client identifier is generated on the first call and reused for
    /// every later session of this manager. Every session reports on its own
    /// channel; the returned receiver carries the lifecycle and message events
    /// of this session only. Receivers of earlier sessions end once those
    /// sessions are torn down.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the broker URL is invalid.
    pub fn connect(
        &mut self,
        config: &BrokerConfig,
    ) -> Result<(mpsc::Receiver<TransportEvent>, Option<StatusTransition>), ProtocolError> {
        let client_id = self
            .client_id
            .get_or_insert_with(|| config.generate_client_id())
            .clone();
        let (events_tx, events_rx) = mpsc::channel(config.event_capacity());
        let session = MqttSession::open(config, client_id, events_tx)?;
        Ok((events_rx, self.attach(Box::new(session))))
    }

    /// Attaches a transport session, closing any previous one.
    ///
    /// The status moves to `Connecting` until the session reports
    /// [`LifecycleEvent::Connected`]. Lifecycle events are not tagged with
    /// their session, so `session` must report on a channel no earlier
    /// session wrote to. [`connect`](Self::connect) always does.
    pub fn attach(&mut self, session: Box<dyn Transport>) -> Option<StatusTransition> {
        self.close_session();
        self.session = Some(session);
        self.move_to(ConnectionStatus::Connecting)
    }

    /// Returns the MQTT client identifier, once a session has been opened.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Returns `true` if a session is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the current connection status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Returns a receiver that observes every status change.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Registers a callback invoked with `(previous, current)` on every
    /// transition.
    pub fn on_status_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus, ConnectionStatus) + Send + Sync + 'static,
    {
        self.listeners.register(callback)
    }

    /// Removes a status callback. Returns `true` if it was registered.
    pub fn remove_listener(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Feeds a session lifecycle event into the status state machine.
    ///
    /// On entering `Connected` every status-topic is subscribed again, once.
    /// Returns `None` when the event does not move the status, or when no
    /// session is attached (late events of a closed session).
    pub fn handle_lifecycle(&mut self, event: &LifecycleEvent) -> Option<StatusTransition> {
        if self.session.is_none() {
            tracing::trace!(?event, "Lifecycle event without session ignored");
            return None;
        }

        let previous = self.status();
        let Some(current) = previous.transition(event) else {
            tracing::trace!(?event, status = %previous, "Lifecycle event ignored");
            return None;
        };

        if let LifecycleEvent::Failed(reason) = event {
            tracing::warn!(%reason, "Broker connection error");
        }

        let subscription_failures = if current.is_connected() {
            self.subscribe_all()
        } else {
            Vec::new()
        };

        self.set_status(current);
        Some(StatusTransition {
            previous,
            current,
            subscription_failures,
        })
    }

    /// Subscribes every status-topic individually.
    ///
    /// A failing topic is reported and does not prevent the remaining
    /// subscriptions.
    pub fn subscribe_all(&self) -> Vec<SubscriptionError> {
        let Some(session) = self.session.as_deref() else {
            return self
                .status_topics
                .iter()
                .map(|topic| SubscriptionError {
                    topic: topic.clone(),
                    reason: ProtocolError::NotAttached.to_string(),
                })
                .collect();
        };

        let mut failures = Vec::new();
        for topic in &self.status_topics {
            match session.subscribe(topic) {
                Ok(()) => tracing::debug!(%topic, "Subscribed to status topic"),
                Err(e) => {
                    tracing::warn!(%topic, error = %e, "Failed to subscribe to status topic");
                    failures.push(SubscriptionError {
                        topic: topic.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            topics = self.status_topics.len(),
            failed = failures.len(),
            "Status topics subscribed"
        );
        failures
    }

    /// Publishes `payload` to `topic` if the session is connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandRejected`] when the status is not `Connected`,
    /// or a protocol error if the client refuses the request.
    pub fn publish(&self, topic: &str, payload: &str) -> Result<(), Error> {
        let status = self.status();
        if !status.is_connected() {
            return Err(Error::CommandRejected { status });
        }

        let session = self.session.as_deref().ok_or(ProtocolError::NotAttached)?;
        session.publish(topic, payload)?;
        tracing::debug!(%topic, %payload, "Command published");
        Ok(())
    }

    /// Closes the session and moves to `Disconnected`.
    ///
    /// Returns the transition, if the status moved.
    pub fn disconnect(&mut self) -> Option<StatusTransition> {
        self.close_session();
        self.move_to(ConnectionStatus::Disconnected)
    }

    fn move_to(&self, current: ConnectionStatus) -> Option<StatusTransition> {
        let previous = self.status();
        self.set_status(current).then(|| StatusTransition {
            previous,
            current,
            subscription_failures: Vec::new(),
        })
    }

    fn close_session(&mut self) {
        if let Some(mut session) = self.session.take()
            && let Err(e) = session.close()
        {
            tracing::debug!(error = %e, "Session close request not delivered");
        }
    }

    /// Stores a new status and notifies listeners. Returns `true` if it moved.
    fn set_status(&self, current: ConnectionStatus) -> bool {
        let previous = self.status.send_replace(current);
        if previous == current {
            return false;
        }

        tracing::info!(%previous, %current, "Connection status changed");
        self.listeners.dispatch(previous, current);
        true
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close_session();
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("status", &self.status())
            .field("attached", &self.is_attached())
            .field("client_id", &self.client_id)
            .field("status_topics", &self.status_topics.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Log {
        subscribed: Vec<String>,
        published: Vec<(String, String)>,
        closed: u32,
    }

    struct FakeTransport {
        log: Arc<Mutex<Log>>,
        refuse_topic: Option<String>,
    }

    impl Transport for FakeTransport {
        fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
            if self.refuse_topic.as_deref() == Some(topic) {
                return Err(ProtocolError::ChannelClosed("refused".to_string()));
            }
            self.log.lock().subscribed.push(topic.to_string());
            Ok(())
        }

        fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
            self.log
                .lock()
                .published
                .push((topic.to_string(), payload.to_string()));
            Ok(())
        }

        fn close(&mut self) -> Result<(), ProtocolError> {
            self.log.lock().closed += 1;
            Ok(())
        }
    }

    fn attached(refuse_topic: Option<&str>) -> (ConnectionManager, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut manager = ConnectionManager::new(["a/lamp/status", "a/fan/status"]);
        let transition = manager.attach(Box::new(FakeTransport {
            log: Arc::clone(&log),
            refuse_topic: refuse_topic.map(str::to_string),
        }));
        // The first session attaches while already connecting.
        assert!(transition.is_none());
        (manager, log)
    }

    #[test]
    fn attach_moves_to_connecting() {
        let (manager, _) = attached(None);
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
        assert!(manager.is_attached());
    }

    #[test]
    fn connected_subscribes_every_topic_once() {
        let (mut manager, log) = attached(None);

        let transition = manager.handle_lifecycle(&LifecycleEvent::Connected).unwrap();
        assert_eq!(transition.previous, ConnectionStatus::Connecting);
        assert_eq!(transition.current, ConnectionStatus::Connected);
        assert!(transition.subscription_failures.is_empty());

        // A duplicate ConnAck does not subscribe again.
        assert!(manager.handle_lifecycle(&LifecycleEvent::Connected).is_none());
        assert_eq!(log.lock().subscribed, ["a/lamp/status", "a/fan/status"]);
    }

    #[test]
    fn reconnect_subscribes_again() {
        let (mut manager, log) = attached(None);

        manager.handle_lifecycle(&LifecycleEvent::Connected);
        manager.handle_lifecycle(&LifecycleEvent::Closed);
        manager.handle_lifecycle(&LifecycleEvent::Reconnecting);
        manager.handle_lifecycle(&LifecycleEvent::Connected);

        assert_eq!(log.lock().subscribed.len(), 4);
    }

    #[test]
    fn failing_topic_does_not_stop_others() {
        let (mut manager, log) = attached(Some("a/lamp/status"));

        let transition = manager.handle_lifecycle(&LifecycleEvent::Connected).unwrap();
        assert_eq!(transition.subscription_failures.len(), 1);
        assert_eq!(transition.subscription_failures[0].topic, "a/lamp/status");
        assert_eq!(log.lock().subscribed, ["a/fan/status"]);
    }

    #[test]
    fn publish_is_gated_on_connected() {
        let (mut manager, log) = attached(None);

        let err = manager.publish("a/lamp", "1").unwrap_err();
        assert!(matches!(
            err,
            Error::CommandRejected {
                status: ConnectionStatus::Connecting
            }
        ));

        manager.handle_lifecycle(&LifecycleEvent::Connected);
        manager.publish("a/lamp", "1").unwrap();
        assert_eq!(
            log.lock().published,
            [("a/lamp".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn listeners_see_every_transition() {
        let (mut manager, _) = attached(None);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let id = manager.on_status_change(move |from, to| seen_clone.lock().push((from, to)));

        manager.handle_lifecycle(&LifecycleEvent::Failed("refused".to_string()));
        manager.handle_lifecycle(&LifecycleEvent::Reconnecting);

        assert_eq!(
            *seen.lock(),
            [
                (ConnectionStatus::Connecting, ConnectionStatus::Error),
                (ConnectionStatus::Error, ConnectionStatus::Connecting),
            ]
        );
        assert!(manager.remove_listener(id));
    }

    #[test]
    fn watch_observes_status() {
        let (mut manager, _) = attached(None);
        let rx = manager.watch_status();

        manager.handle_lifecycle(&LifecycleEvent::Connected);
        assert_eq!(*rx.borrow(), ConnectionStatus::Connected);
    }

    #[test]
    fn disconnect_closes_session() {
        let (mut manager, log) = attached(None);
        manager.handle_lifecycle(&LifecycleEvent::Connected);

        let transition = manager.disconnect().unwrap();
        assert_eq!(transition.current, ConnectionStatus::Disconnected);
        assert_eq!(log.lock().closed, 1);
        assert!(!manager.is_attached());

        // Already disconnected, and late events of the old session are ignored.
        assert!(manager.disconnect().is_none());
        assert!(manager.handle_lifecycle(&LifecycleEvent::Connected).is_none());
        assert_eq!(log.lock().closed, 1);
    }

    #[test]
    fn attach_replaces_previous_session() {
        let (mut manager, first) = attached(None);
        let second = Arc::new(Mutex::new(Log::default()));

        // Still connecting: re-attaching does not move the status.
        let transition = manager.attach(Box::new(FakeTransport {
            log: Arc::clone(&second),
            refuse_topic: None,
        }));
        assert!(transition.is_none());

        assert_eq!(first.lock().closed, 1);
        assert_eq!(second.lock().closed, 0);
    }

    #[test]
    fn initial_status_is_connecting() {
        let manager = ConnectionManager::new(["a/lamp/status"]);
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
        assert!(!manager.is_attached());
    }

    #[test]
    fn attach_after_disconnect_moves_back_to_connecting() {
        let (mut manager, _) = attached(None);
        manager.disconnect();

        let transition = manager.attach(Box::new(FakeTransport {
            log: Arc::default(),
            refuse_topic: None,
        }));
        let transition = transition.unwrap();
        assert_eq!(transition.previous, ConnectionStatus::Disconnected);
        assert_eq!(transition.current, ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn each_connect_reports_on_its_own_stream() {
        let config = BrokerConfig::builder().url("mqtt://127.0.0.1:1").build();
        let mut manager = ConnectionManager::new(["a/lamp/status"]);

        let (mut first, _) = manager.connect(&config).unwrap();
        let (mut second, transition) = manager.connect(&config).unwrap();
        assert!(transition.is_none());

        // The replaced session may still report its failure, then its stream ends.
        while let Some(event) = first.recv().await {
            assert!(matches!(
                event,
                TransportEvent::Lifecycle(LifecycleEvent::Failed(_))
            ));
        }

        let event = second.recv().await.unwrap();
        assert!(matches!(
            event,
            TransportEvent::Lifecycle(LifecycleEvent::Failed(_))
        ));
        assert_eq!(manager.status(), ConnectionStatus::Connecting);
    }

    #[test]
    fn drop_closes_session() {
        let (manager, log) = attached(None);
        drop(manager);
        assert_eq!(log.lock().closed, 1);
    }

    #[test]
    fn subscribe_without_session_reports_every_topic() {
        let manager = ConnectionManager::new(["a/lamp/status"]);
        let failures = manager.subscribe_all();
        assert_eq!(failures.len(), 1);
    }
}
