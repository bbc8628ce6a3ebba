// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker URL parsing.

use crate::error::ProtocolError;

/// A broker address together with the transport it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEndpoint {
    /// Plain MQTT over TCP (`mqtt://`, `tcp://` or no scheme).
    Tcp {
        /// Host name or address.
        host: String,
        /// Port (default 1883).
        port: u16,
    },
    /// MQTT over TLS (`mqtts://`, `ssl://`).
    Tls {
        /// Host name or address.
        host: String,
        /// Port (default 8883).
        port: u16,
    },
    /// MQTT over WebSocket (`ws://` or `wss://`).
    WebSocket {
        /// Full URL, including scheme and path.
        url: String,
        /// Port taken from the URL (default 80 or 443).
        port: u16,
        /// Whether the socket is TLS-secured.
        secure: bool,
    },
}

impl BrokerEndpoint {
    /// Parses a broker URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use smarthome_panel::protocol::BrokerEndpoint;
    ///
    /// let endpoint = BrokerEndpoint::parse("wss://broker.hivemq.com:8884/mqtt").unwrap();
    /// assert_eq!(
    ///     endpoint,
    ///     BrokerEndpoint::WebSocket {
    ///         url: "wss://broker.hivemq.com:8884/mqtt".to_string(),
    ///         port: 8884,
    ///         secure: true,
    ///     }
    /// );
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAddress`] if the host is missing or
    /// the port is not a number.
    pub fn parse(url: &str) -> Result<Self, ProtocolError> {
        let url = url.trim();

        if let Some(rest) = url.strip_prefix("wss://") {
            let port = authority_port(rest, 443)?;
            return Ok(Self::WebSocket {
                url: url.to_string(),
                port,
                secure: true,
            });
        }
        if let Some(rest) = url.strip_prefix("ws://") {
            let port = authority_port(rest, 80)?;
            return Ok(Self::WebSocket {
                url: url.to_string(),
                port,
                secure: false,
            });
        }
        if let Some(rest) = url
            .strip_prefix("mqtts://")
            .or_else(|| url.strip_prefix("ssl://"))
        {
            let (host, port) = host_port(rest, 8883)?;
            return Ok(Self::Tls { host, port });
        }

        let rest = url
            .strip_prefix("mqtt://")
            .or_else(|| url.strip_prefix("tcp://"))
            .unwrap_or(url);
        let (host, port) = host_port(rest, 1883)?;
        Ok(Self::Tcp { host, port })
    }
}

/// Splits `host[:port][/path]` into host and port.
fn host_port(rest: &str, default_port: u16) -> Result<(String, u16), ProtocolError> {
    let authority = rest.split('/').next().unwrap_or_default();
    let (host, port) = match authority.rsplit_once(':') {
        Some((h, p)) => {
            let port = p
                .parse()
                .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
            (h, port)
        }
        None => (authority, default_port),
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress(
            "MQTT broker host is required".to_string(),
        ));
    }
    Ok((host.to_string(), port))
}

fn authority_port(rest: &str, default_port: u16) -> Result<u16, ProtocolError> {
    host_port(rest, default_port).map(|(_, port)| port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_secure_websocket() {
        let endpoint = BrokerEndpoint::parse("wss://broker.hivemq.com:8884/mqtt").unwrap();
        assert!(matches!(
            endpoint,
            BrokerEndpoint::WebSocket { port: 8884, secure: true, .. }
        ));
    }

    #[test]
    fn parse_websocket_default_port() {
        let endpoint = BrokerEndpoint::parse("ws://localhost/mqtt").unwrap();
        assert!(matches!(
            endpoint,
            BrokerEndpoint::WebSocket { port: 80, secure: false, .. }
        ));
    }

    #[test]
    fn parse_tcp_variants() {
        let expected = BrokerEndpoint::Tcp {
            host: "192.168.1.50".to_string(),
            port: 1883,
        };
        assert_eq!(BrokerEndpoint::parse("mqtt://192.168.1.50:1883").unwrap(), expected);
        assert_eq!(BrokerEndpoint::parse("tcp://192.168.1.50").unwrap(), expected);
        assert_eq!(BrokerEndpoint::parse("192.168.1.50:1883").unwrap(), expected);
    }

    #[test]
    fn parse_tls() {
        assert_eq!(
            BrokerEndpoint::parse("mqtts://broker.local").unwrap(),
            BrokerEndpoint::Tls {
                host: "broker.local".to_string(),
                port: 8883
            }
        );
    }

    #[test]
    fn parse_invalid_port() {
        let result = BrokerEndpoint::parse("mqtt://broker:notaport");
        assert!(matches!(result, Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn parse_missing_host() {
        assert!(BrokerEndpoint::parse("mqtt://:1883").is_err());
        assert!(BrokerEndpoint::parse("").is_err());
    }
}
