// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Headless control panel.
//!
//! ```text
//! smarthome-panel [devices.json]
//! ```
//!
//! Connects to the broker (`SMARTHOME_BROKER_URL`, default: the public
//! HiveMQ WebSocket endpoint), mirrors the device catalog and logs every
//! panel event until Ctrl-C. Log verbosity follows `RUST_LOG`.

use std::error::Error;

use smarthome_panel::config::{BrokerConfig, DEFAULT_BROKER_URL, PanelConfig};
use smarthome_panel::event::PanelEvent;
use smarthome_panel::panel::PanelHandle;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    info!(
        broker = %config.broker.url(),
        devices = config.devices.len(),
        "Starting panel"
    );

    let panel = PanelHandle::spawn(config)?;
    let mut events = panel.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            event = events.recv() => match event {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event log fell behind"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    for device in panel.devices().await? {
        info!(device = %device.id(), name = device.name(), power = %device.power(), "Final state");
    }
    panel.shutdown().await;
    Ok(())
}

fn load_config() -> Result<PanelConfig, Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => PanelConfig::from_devices_json(&std::fs::read_to_string(path)?)?,
        None => PanelConfig::with_default_devices(),
    };

    let url = std::env::var("SMARTHOME_BROKER_URL").unwrap_or_else(|_| DEFAULT_BROKER_URL.to_string());
    Ok(config.with_broker(BrokerConfig::builder().url(url).build()))
}

fn log_event(event: &PanelEvent) {
    match event {
        PanelEvent::StatusChanged { previous, current } => {
            info!(%previous, %current, "Connection status");
        }
        PanelEvent::DeviceChanged { device_id, change } => {
            info!(device = %device_id, ?change, "Device changed");
        }
        PanelEvent::SubscriptionFailed(error) => warn!(%error, "Subscription failed"),
        PanelEvent::CommandRejected { device_id, status } => {
            warn!(device = %device_id, %status, "Command rejected");
        }
    }
}
