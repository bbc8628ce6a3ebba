// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Async driver running a [`ControlPanel`] on a tokio task.

use std::ops::ControlFlow;

use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::config::PanelConfig;
use crate::connection::ConnectionStatus;
use crate::error::{Error, ProtocolError};
use crate::event::{DeviceId, EventBus, PanelEvent};
use crate::protocol::{Transport, TransportEvent};
use crate::registry::{Device, DeviceConfig};
use crate::state::Reconciled;

use super::ControlPanel;

/// Capacity of the request channel between handles and the panel task.
const REQUEST_CAPACITY: usize = 32;

/// Capacity of the transport event channel for caller-supplied sessions.
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A user intent sent to the panel task.
enum PanelRequest {
    Toggle {
        id: DeviceId,
        on: bool,
        reply: oneshot::Sender<Result<Reconciled, Error>>,
    },
    Rename {
        id: DeviceId,
        name: String,
        reply: oneshot::Sender<Result<(), Error>>,
    },
    Devices {
        reply: oneshot::Sender<Vec<Device>>,
    },
    Device {
        id: DeviceId,
        reply: oneshot::Sender<Option<Device>>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a panel running on its own task.
///
/// The task owns the [`ControlPanel`] and consumes transport events and user
/// requests one at a time, so registry writes never race. Pending transport
/// events are processed before the next request.
///
/// Handles are cheap to clone. The task stops, closing the broker session,
/// on [`shutdown`](Self::shutdown) or when the last handle is dropped.
///
/// # Examples
///
/// ```no_run
/// use smarthome_panel::config::PanelConfig;
/// use smarthome_panel::event::DeviceId;
/// use smarthome_panel::panel::PanelHandle;
///
/// #[tokio::main]
/// async fn main() -> smarthome_panel::Result<()> {
///     let panel = PanelHandle::spawn(PanelConfig::with_default_devices())?;
///
///     let mut status = panel.watch_status();
///     status.wait_for(|s| s.is_connected()).await.ok();
///
///     panel.toggle(DeviceId::new(1), true).await?;
///     panel.shutdown().await;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PanelHandle {
    requests: mpsc::Sender<PanelRequest>,
    status: watch::Receiver<ConnectionStatus>,
    events: EventBus,
}

impl PanelHandle {
    /// Builds a panel, opens the MQTT session and starts the panel task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid catalog or a protocol error
    /// for an invalid broker URL.
    pub fn spawn(config: PanelConfig) -> Result<Self, Error> {
        let mut panel = ControlPanel::new(config.devices)?;
        let events = panel.connect(&config.broker)?;
        Ok(Self::start(panel, events))
    }

    /// Starts the panel task on a caller-supplied transport.
    ///
    /// The transport reports its lifecycle and messages through the returned
    /// sender.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid catalog.
    pub fn with_session(
        devices: impl IntoIterator<Item = DeviceConfig>,
        session: Box<dyn Transport>,
    ) -> Result<(Self, mpsc::Sender<TransportEvent>), Error> {
        let mut panel = ControlPanel::new(devices)?;
        let (events_tx, events_rx) = mpsc::channel(DEFAULT_EVENT_CAPACITY);
        panel.attach_session(session);
        Ok((Self::start(panel, events_rx), events_tx))
    }

    fn start(panel: ControlPanel, events: mpsc::Receiver<TransportEvent>) -> Self {
        let (requests_tx, requests_rx) = mpsc::channel(REQUEST_CAPACITY);
        let handle = Self {
            requests: requests_tx,
            status: panel.watch_status(),
            events: panel.event_bus().clone(),
        };

        tokio::spawn(run_panel(panel, events, requests_rx));
        handle
    }

    /// Switches a device on or off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandRejected`] while not connected,
    /// [`Error::DeviceNotFound`], or a protocol error.
    pub async fn toggle(&self, id: DeviceId, on: bool) -> Result<Reconciled, Error> {
        self.request(|reply| PanelRequest::Toggle { id, on, reply })
            .await?
    }

    /// Renames a device.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, or
    /// [`Error::DeviceNotFound`].
    pub async fn rename(&self, id: DeviceId, name: impl Into<String>) -> Result<(), Error> {
        let name = name.into();
        self.request(|reply| PanelRequest::Rename { id, name, reply })
            .await?
    }

    /// Returns a copy of every device in display order.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the panel task has stopped.
    pub async fn devices(&self) -> Result<Vec<Device>, Error> {
        self.request(|reply| PanelRequest::Devices { reply }).await
    }

    /// Returns a copy of one device.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the panel task has stopped.
    pub async fn device(&self, id: DeviceId) -> Result<Option<Device>, Error> {
        self.request(|reply| PanelRequest::Device { id, reply })
            .await
    }

    /// Returns the current connection status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    /// Returns a receiver that observes every status change.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Subscribes to panel events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    /// Closes the session and stops the panel task.
    ///
    /// Returns once the session is closed. Later requests fail.
    pub async fn shutdown(&self) {
        if self
            .request(|reply| PanelRequest::Shutdown { reply })
            .await
            .is_err()
        {
            tracing::debug!("Panel task already stopped");
        }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> PanelRequest,
    ) -> Result<T, Error> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .send(make(reply_tx))
            .await
            .map_err(|_| ProtocolError::ChannelClosed("panel task stopped".to_string()))?;
        reply_rx
            .await
            .map_err(|_| ProtocolError::ChannelClosed("panel task dropped the request".to_string()).into())
    }
}

/// What woke the panel task.
enum Wakeup {
    Transport(Option<TransportEvent>),
    Request(Option<PanelRequest>),
}

async fn run_panel(
    mut panel: ControlPanel,
    mut events: mpsc::Receiver<TransportEvent>,
    mut requests: mpsc::Receiver<PanelRequest>,
) {
    let mut events_open = true;
    tracing::debug!(devices = panel.registry().len(), "Panel task started");

    loop {
        let wakeup = tokio::select! {
            biased;
            event = events.recv(), if events_open => Wakeup::Transport(event),
            request = requests.recv() => Wakeup::Request(request),
        };

        match wakeup {
            Wakeup::Transport(Some(event)) => panel.handle_event(event),
            Wakeup::Transport(None) => {
                tracing::debug!("Transport event channel closed");
                events_open = false;
            }
            Wakeup::Request(Some(request)) => {
                if serve(&mut panel, request).is_break() {
                    break;
                }
            }
            Wakeup::Request(None) => {
                tracing::debug!("All panel handles dropped");
                panel.disconnect();
                break;
            }
        }
    }

    tracing::debug!("Panel task stopped");
}

/// Answers one request. Breaks once the panel has been shut down.
fn serve(panel: &mut ControlPanel, request: PanelRequest) -> ControlFlow<()> {
    // A dropped reply receiver means the caller gave up; the work stands.
    match request {
        PanelRequest::Toggle { id, on, reply } => {
            let _ = reply.send(panel.toggle(id, on));
        }
        PanelRequest::Rename { id, name, reply } => {
            let _ = reply.send(panel.rename(id, &name));
        }
        PanelRequest::Devices { reply } => {
            let _ = reply.send(panel.registry().snapshot());
        }
        PanelRequest::Device { id, reply } => {
            let _ = reply.send(panel.device(id).cloned());
        }
        PanelRequest::Shutdown { reply } => {
            panel.disconnect();
            let _ = reply.send(());
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}
