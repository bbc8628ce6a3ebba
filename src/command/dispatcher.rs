// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turning user intent into publishes and optimistic writes.

use crate::connection::ConnectionManager;
use crate::error::Error;
use crate::event::DeviceId;
use crate::registry::DeviceRegistry;
use crate::state::Reconciled;
use crate::types::PowerState;

use super::PowerCommand;

/// Issues power commands on behalf of the user.
///
/// The dispatcher borrows the connection and the registry for the duration
/// of one command. Commands are only published while the session is
/// connected; there is no queue for later delivery.
#[derive(Debug)]
pub struct CommandDispatcher<'a> {
    connection: &'a ConnectionManager,
    registry: &'a mut DeviceRegistry,
}

impl<'a> CommandDispatcher<'a> {
    /// Creates a dispatcher over a connection and a registry.
    #[must_use]
    pub fn new(connection: &'a ConnectionManager, registry: &'a mut DeviceRegistry) -> Self {
        Self {
            connection,
            registry,
        }
    }

    /// Publishes the desired state and writes it into the registry without
    /// waiting for the device to confirm.
    ///
    /// The optimistic belief stands until the next status message for the
    /// device, which overwrites it whatever its value.
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceNotFound`] if `id` is unknown
    /// - [`Error::CommandRejected`] if the session is not connected
    /// - [`Error::Protocol`] if the client refused the publish
    ///
    /// The registry is untouched in every error case.
    pub fn toggle(&mut self, id: DeviceId, desired: bool) -> Result<Reconciled, Error> {
        let device = self.registry.get(id).ok_or(Error::DeviceNotFound(id))?;
        let command = PowerCommand::for_device(device, PowerState::from(desired));

        if let Err(e) = self.connection.publish(command.topic(), command.payload()) {
            tracing::warn!(device = %id, error = %e, "Command not sent");
            return Err(e);
        }

        let previous = self.registry.set_power_state(id, command.state())?;
        let revision = self.registry.get(id).map_or(0, |d| d.revision());
        tracing::debug!(device = %id, %command, "Optimistic power write");

        Ok(Reconciled {
            device_id: id,
            previous,
            current: command.state(),
            revision,
        })
    }
}
