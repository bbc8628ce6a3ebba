// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT session backed by rumqttc.
//!
//! An [`MqttSession`] owns the rumqttc client handle and a background task
//! that drives the event loop. The task translates broker traffic into
//! [`TransportEvent`]s and implements the reconnect schedule: after any poll
//! error it reports the loss, waits the configured period, reports that a new
//! attempt is starting and polls again (rumqttc reconnects on the next poll).

use std::time::Duration;

use rumqttc::{
    AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, SubscribeReasonCode,
    Transport as MqttTransport,
};
use tokio::sync::{mpsc, oneshot};

use crate::config::BrokerConfig;
use crate::connection::{LifecycleEvent, ReconnectionPolicy};
use crate::error::ProtocolError;

use super::{BrokerEndpoint, Transport, TransportEvent};

/// Upper bound on how long the pump keeps polling to flush a DISCONNECT.
const DISCONNECT_GRACE: Duration = Duration::from_millis(500);

/// A live broker session.
///
/// Dropping the session has the same effect as [`Transport::close`]: a
/// DISCONNECT is requested and the event-loop task stops, releasing the
/// socket. Nothing outlives the session.
pub struct MqttSession {
    client: AsyncClient,
    client_id: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MqttSession {
    /// Opens a session and starts driving it in a background task.
    ///
    /// Returns immediately; the handshake result arrives later as a
    /// [`LifecycleEvent`] on `events`. Must be called from within a tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the broker URL is invalid.
    pub fn open(
        config: &BrokerConfig,
        client_id: impl Into<String>,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, ProtocolError> {
        let client_id = client_id.into();
        let mut mqtt_options = match BrokerEndpoint::parse(config.url())? {
            BrokerEndpoint::Tcp { host, port } => MqttOptions::new(&client_id, host, port),
            BrokerEndpoint::Tls { host, port } => {
                let mut options = MqttOptions::new(&client_id, host, port);
                options.set_transport(MqttTransport::tls_with_default_config());
                options
            }
            BrokerEndpoint::WebSocket { url, port, secure } => {
                let mut options = MqttOptions::new(&client_id, url, port);
                options.set_transport(if secure {
                    MqttTransport::wss_with_default_config()
                } else {
                    MqttTransport::Ws
                });
                options
            }
        };
        mqtt_options.set_keep_alive(config.keep_alive());
        mqtt_options.set_clean_session(true);

        if let Some((username, password)) = config.credentials() {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, config.request_capacity());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tracing::info!(
            url = %config.url(),
            client_id = %client_id,
            "Opening MQTT session"
        );

        let policy = config.reconnection();
        tokio::spawn(async move {
            drive_session(event_loop, events, policy, shutdown_rx).await;
        });

        Ok(Self {
            client,
            client_id,
            shutdown: Some(shutdown_tx),
        })
    }

    /// Returns the MQTT client identifier of this session.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns `true` once the session has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_none()
    }
}

impl Transport for MqttSession {
    fn subscribe(&self, topic: &str) -> Result<(), ProtocolError> {
        self.client
            .try_subscribe(topic, QoS::AtMostOnce)
            .map_err(ProtocolError::Mqtt)
    }

    fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .map_err(ProtocolError::Mqtt)
    }

    fn close(&mut self) -> Result<(), ProtocolError> {
        let Some(shutdown) = self.shutdown.take() else {
            return Ok(());
        };

        tracing::info!(client_id = %self.client_id, "Closing MQTT session");
        let result = self.client.try_disconnect().map_err(ProtocolError::Mqtt);
        // The pump may already be gone; nothing else to release then.
        let _ = shutdown.send(());
        result
    }
}

impl Drop for MqttSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::debug!(error = %e, "Disconnect request not delivered on drop");
        }
    }
}

impl std::fmt::Debug for MqttSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttSession")
            .field("client_id", &self.client_id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Drives the rumqttc event loop until shutdown or until the panel stops
/// listening.
async fn drive_session(
    mut event_loop: EventLoop,
    events: mpsc::Sender<TransportEvent>,
    policy: ReconnectionPolicy,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut connected = false;
    let mut failures: u32 = 0;

    loop {
        let polled = tokio::select! {
            _ = &mut shutdown => None,
            polled = event_loop.poll() => Some(polled),
        };
        let Some(polled) = polled else {
            flush_disconnect(&mut event_loop).await;
            break;
        };

        let event = match polled {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT session established");
                connected = true;
                failures = 0;
                Some(TransportEvent::Lifecycle(LifecycleEvent::Connected))
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::trace!(
                    topic = %publish.topic,
                    bytes = publish.payload.len(),
                    "MQTT message received"
                );
                Some(TransportEvent::Message {
                    topic: publish.topic,
                    payload: publish.payload.to_vec(),
                })
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                if suback
                    .return_codes
                    .iter()
                    .any(|code| matches!(code, SubscribeReasonCode::Failure))
                {
                    tracing::warn!(pkid = suback.pkid, "Broker refused a subscription");
                } else {
                    tracing::trace!(pkid = suback.pkid, "Subscription acknowledged");
                }
                None
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("Broker sent DISCONNECT");
                None
            }
            Ok(_) => None,
            Err(e) => {
                let lifecycle = if std::mem::take(&mut connected) {
                    tracing::warn!(error = %e, "MQTT session lost");
                    LifecycleEvent::Closed
                } else {
                    tracing::error!(error = %e, "MQTT connection failed");
                    LifecycleEvent::Failed(e.to_string())
                };
                if events.send(lifecycle.into()).await.is_err() {
                    break;
                }

                let delay = policy.period();
                failures = failures.saturating_add(1);
                tracing::debug!(?delay, failures, "Waiting before reconnect");

                let stopped = tokio::select! {
                    _ = &mut shutdown => true,
                    () = tokio::time::sleep(delay) => false,
                };
                if stopped {
                    break;
                }
                Some(TransportEvent::Lifecycle(LifecycleEvent::Reconnecting))
            }
        };

        if let Some(event) = event
            && events.send(event).await.is_err()
        {
            tracing::debug!("Transport event receiver dropped, stopping session");
            break;
        }
    }

    tracing::debug!("MQTT event loop stopped");
}

/// Polls until the queued DISCONNECT has been written, bounded by a grace
/// period.
async fn flush_disconnect(event_loop: &mut EventLoop) {
    let flush = async {
        loop {
            match event_loop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    };
    if tokio::time::timeout(DISCONNECT_GRACE, flush).await.is_err() {
        tracing::debug!("DISCONNECT not flushed within grace period");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_rejects_invalid_url() {
        let config = BrokerConfig::builder().url("mqtt://:1883").build();
        let (tx, _rx) = mpsc::channel(8);

        let result = MqttSession::open(&config, "smarthome_test", tx);
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let config = BrokerConfig::builder().url("mqtt://127.0.0.1:1").build();
        let (tx, _rx) = mpsc::channel(8);

        let mut session = MqttSession::open(&config, "smarthome_test", tx).unwrap();
        assert_eq!(session.client_id(), "smarthome_test");
        assert!(!session.is_closed());

        let _ = session.close();
        assert!(session.is_closed());
        assert!(session.close().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_broker_reports_failure_then_retry() {
        let config = BrokerConfig::builder()
            .url("mqtt://127.0.0.1:1")
            .reconnection(ReconnectionPolicy::fixed(Duration::from_secs(5)))
            .build();
        let (tx, mut rx) = mpsc::channel(8);

        let _session = MqttSession::open(&config, "smarthome_test", tx).unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first,
            TransportEvent::Lifecycle(LifecycleEvent::Failed(_))
        ));

        let second = rx.recv().await.unwrap();
        assert_eq!(
            second,
            TransportEvent::Lifecycle(LifecycleEvent::Reconnecting)
        );
    }
}
