// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronous composition of registry, connection and event bus.

use tokio::sync::{broadcast, mpsc, watch};

use crate::config::BrokerConfig;
use crate::connection::{ConnectionManager, ConnectionStatus, StatusTransition};
use crate::command::CommandDispatcher;
use crate::error::{ConfigError, Error};
use crate::event::{DeviceId, EventBus, PanelEvent};
use crate::protocol::{MessageRouter, Transport, TransportEvent};
use crate::registry::{Device, DeviceConfig, DeviceRegistry};
use crate::state::{Reconciled, StateChange, StateReconciler};
use crate::subscription::SubscriptionId;

/// The state reconciliation core of a control panel.
///
/// Every method takes `&self` or `&mut self` and returns without awaiting,
/// so the panel can be driven by any single-threaded loop. [`PanelHandle`]
/// is the tokio driver.
///
/// # Examples
///
/// ```
/// use smarthome_panel::connection::ConnectionStatus;
/// use smarthome_panel::event::DeviceId;
/// use smarthome_panel::panel::ControlPanel;
/// use smarthome_panel::registry::DeviceConfig;
///
/// let mut panel = ControlPanel::new(vec![
///     DeviceConfig::for_appliance(1, "Lamp", "home/office/lamp"),
/// ])?;
///
/// // Not connected yet: the command is rejected and nothing changes.
/// assert_eq!(panel.status(), ConnectionStatus::Connecting);
/// assert!(panel.toggle(DeviceId::new(1), true).is_err());
///
/// panel.rename(DeviceId::new(1), "  Desk lamp ")?;
/// assert_eq!(panel.device(DeviceId::new(1)).unwrap().name(), "Desk lamp");
/// # Ok::<(), smarthome_panel::Error>(())
/// ```
///
/// [`PanelHandle`]: super::PanelHandle
#[derive(Debug)]
pub struct ControlPanel {
    registry: DeviceRegistry,
    connection: ConnectionManager,
    router: MessageRouter,
    reconciler: StateReconciler,
    events: EventBus,
}

impl ControlPanel {
    /// Creates a panel for a device catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the catalog is invalid.
    pub fn new(configs: impl IntoIterator<Item = DeviceConfig>) -> Result<Self, ConfigError> {
        Ok(Self::from_registry(DeviceRegistry::new(configs)?))
    }

    /// Creates a panel around an existing registry.
    #[must_use]
    pub fn from_registry(registry: DeviceRegistry) -> Self {
        let connection = ConnectionManager::new(registry.status_topics());
        Self {
            registry,
            connection,
            router: MessageRouter::new(),
            reconciler: StateReconciler::new(),
            events: EventBus::new(),
        }
    }

    /// Replaces the event bus, e.g. to change its capacity.
    #[must_use]
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Returns the device registry.
    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Iterates over devices in display order.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.registry.iter()
    }

    /// Returns a device by ID.
    #[must_use]
    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.registry.get(id)
    }

    /// Returns the current connection status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    /// Returns a receiver that observes every status change.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.connection.watch_status()
    }

    /// Registers a callback invoked with `(previous, current)` on every
    /// status transition.
    pub fn on_status_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus, ConnectionStatus) + Send + Sync + 'static,
    {
        self.connection.on_status_change(callback)
    }

    /// Removes a status callback. Returns `true` if it was registered.
    pub fn remove_status_listener(&self, id: SubscriptionId) -> bool {
        self.connection.remove_listener(id)
    }

    /// Subscribes to panel events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    /// Returns the event bus of this panel.
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    /// Returns the MQTT client identifier, once a session has been opened.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.connection.client_id()
    }

    /// Switches a device on or off.
    ///
    /// Publishes the command and writes the desired state immediately. A
    /// command attempted while not connected is dropped and reported as
    /// [`PanelEvent::CommandRejected`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandRejected`], [`Error::DeviceNotFound`] or a
    /// protocol error; the registry is unchanged in every case.
    pub fn toggle(&mut self, id: DeviceId, on: bool) -> Result<Reconciled, Error> {
        let outcome = CommandDispatcher::new(&self.connection, &mut self.registry).toggle(id, on);

        match &outcome {
            Ok(reconciled) if reconciled.changed() => {
                self.events.publish(PanelEvent::device_changed(
                    id,
                    StateChange::optimistic_power(reconciled.current),
                ));
            }
            Err(Error::CommandRejected { status }) => {
                self.events.publish(PanelEvent::CommandRejected {
                    device_id: id,
                    status: *status,
                });
            }
            _ => {}
        }

        outcome
    }

    /// Renames a device. Surrounding whitespace is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`](crate::error::ValidationError)
    /// for a blank name, or [`Error::DeviceNotFound`].
    pub fn rename(&mut self, id: DeviceId, name: &str) -> Result<(), Error> {
        self.registry.set_name(id, name)?;

        let stored = self.registry.get(id).map(|d| d.name().to_string());
        if let Some(name) = stored {
            tracing::info!(device = %id, %name, "Device renamed");
            self.events
                .publish(PanelEvent::device_changed(id, StateChange::renamed(name)));
        }
        Ok(())
    }

    /// Processes one event reported by the transport.
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Lifecycle(lifecycle) => {
                let transition = self.connection.handle_lifecycle(&lifecycle);
                self.publish_transition(transition);
            }
            TransportEvent::Message { topic, payload } => {
                self.handle_message(&topic, &payload);
            }
        }
    }

    /// Applies an inbound status message.
    ///
    /// Returns `None` for topics no device owns.
    pub fn handle_message(&mut self, topic: &str, payload: &[u8]) -> Option<Reconciled> {
        let routed = self.router.route(&self.registry, topic, payload)?;
        let reconciled = self
            .reconciler
            .apply(&mut self.registry, routed.device_id, routed.state)?;

        if let Some(change) = StateReconciler::remote_change(&reconciled) {
            self.events
                .publish(PanelEvent::device_changed(reconciled.device_id, change));
        }
        Some(reconciled)
    }

    /// Attaches a caller-supplied transport session.
    ///
    /// The session must report on a fresh event channel.
    pub fn attach_session(&mut self, session: Box<dyn Transport>) {
        let transition = self.connection.attach(session);
        self.publish_transition(transition);
    }

    /// Opens an MQTT session to the configured broker.
    ///
    /// Returns the event stream of the new session. Feed it to
    /// [`handle_event`](Self::handle_event) and drop the stream of any
    /// previous session.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the broker URL is invalid.
    pub fn connect(
        &mut self,
        config: &BrokerConfig,
    ) -> Result<mpsc::Receiver<TransportEvent>, Error> {
        let (events, transition) = self.connection.connect(config)?;
        self.publish_transition(transition);
        Ok(events)
    }

    /// Closes the session.
    pub fn disconnect(&mut self) {
        let transition = self.connection.disconnect();
        self.publish_transition(transition);
    }

    fn publish_transition(&self, transition: Option<StatusTransition>) {
        let Some(transition) = transition else {
            return;
        };

        self.events.publish(PanelEvent::status_changed(
            transition.previous,
            transition.current,
        ));
        for failure in transition.subscription_failures {
            self.events.publish(PanelEvent::SubscriptionFailed(failure));
        }
    }
}
