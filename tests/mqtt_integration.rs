// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT session using mockforge-mqtt.

use std::time::Duration;

use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use smarthome_panel::config::{BrokerConfig, PanelConfig};
use smarthome_panel::connection::{ConnectionStatus, ReconnectionPolicy};
use smarthome_panel::event::DeviceId;
use smarthome_panel::panel::PanelHandle;
use smarthome_panel::registry::DeviceConfig;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to start, bind to port, and be ready to accept connections
    sleep(Duration::from_millis(500)).await;
}

fn panel_config(broker_url: String) -> PanelConfig {
    PanelConfig::new(vec![
        DeviceConfig::for_appliance(1, "LED Quarto", "casa/quarto/rele"),
        DeviceConfig::for_appliance(2, "TV Sala", "casa/sala/tv"),
    ])
    .with_broker(
        BrokerConfig::builder()
            .url(broker_url)
            .reconnection(ReconnectionPolicy::fixed(Duration::from_millis(200)))
            .build(),
    )
}

async fn wait_for_status(
    status: &mut watch::Receiver<ConnectionStatus>,
    expected: ConnectionStatus,
) -> bool {
    timeout(Duration::from_secs(5), status.wait_for(|s| *s == expected))
        .await
        .is_ok_and(|r| r.is_ok())
}

// ============================================================================
// Session Establishment
// ============================================================================

mod session_establishment {
    use super::*;

    async fn connects(broker_url: String) {
        let panel = PanelHandle::spawn(panel_config(broker_url)).unwrap();
        let mut status = panel.watch_status();

        assert!(
            wait_for_status(&mut status, ConnectionStatus::Connected).await,
            "status stayed {}",
            panel.status()
        );
        panel.shutdown().await;
    }

    #[tokio::test]
    async fn connect_with_mqtt_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;
        connects(format!("mqtt://127.0.0.1:{port}")).await;
    }

    #[tokio::test]
    async fn connect_with_tcp_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;
        connects(format!("tcp://127.0.0.1:{port}")).await;
    }

    #[tokio::test]
    async fn connect_without_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;
        connects(format!("127.0.0.1:{port}")).await;
    }

    #[tokio::test]
    async fn invalid_url_fails_at_spawn() {
        let result = PanelHandle::spawn(panel_config("mqtt://:1883".to_string()));
        assert!(result.is_err());
    }
}

// ============================================================================
// Commands over a live session
// ============================================================================

mod commands {
    use super::*;

    #[tokio::test]
    async fn toggle_while_connected_updates_belief() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let panel = PanelHandle::spawn(panel_config(format!("mqtt://127.0.0.1:{port}"))).unwrap();
        let mut status = panel.watch_status();
        assert!(wait_for_status(&mut status, ConnectionStatus::Connected).await);

        let outcome = panel.toggle(DeviceId::new(2), true).await.unwrap();
        assert!(outcome.changed());

        let device = panel.device(DeviceId::new(2)).await.unwrap().unwrap();
        assert!(device.is_on());

        panel.shutdown().await;
        assert_eq!(panel.status(), ConnectionStatus::Disconnected);
    }
}

// ============================================================================
// Unreachable broker
// ============================================================================

mod unreachable_broker {
    use super::*;

    #[tokio::test]
    async fn refused_connection_reports_error_and_rejects_commands() {
        // Nothing listens on this port.
        let port = get_test_port();
        let panel = PanelHandle::spawn(panel_config(format!("mqtt://127.0.0.1:{port}"))).unwrap();
        let mut status = panel.watch_status();

        assert!(wait_for_status(&mut status, ConnectionStatus::Error).await);

        let result = panel.toggle(DeviceId::new(1), true).await;
        assert!(result.is_err());
        let device = panel.device(DeviceId::new(1)).await.unwrap().unwrap();
        assert!(!device.is_on());

        panel.shutdown().await;
    }
}

// NOTE: The mockforge-mqtt broker used for testing doesn't fully support
// pub/sub message forwarding between clients. Inbound status handling is
// covered with a recording transport in tests/panel_scenarios.rs.
