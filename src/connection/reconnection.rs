// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconnection schedule.

use std::time::Duration;

/// Default delay between reconnect attempts.
pub const DEFAULT_RECONNECT_PERIOD: Duration = Duration::from_secs(5);

/// Configuration for automatic reconnection.
///
/// The panel never gives up: attempts are unbounded and spaced by a fixed
/// period, with no exponential growth and no jitter.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use smarthome_panel::connection::ReconnectionPolicy;
///
/// let policy = ReconnectionPolicy::default();
/// assert_eq!(policy.period(), Duration::from_secs(5));
///
/// let fast = ReconnectionPolicy::fixed(Duration::from_millis(250));
/// assert_eq!(fast.period(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectionPolicy {
    period: Duration,
}

impl ReconnectionPolicy {
    /// Creates a policy with a fixed period between attempts.
    #[must_use]
    pub const fn fixed(period: Duration) -> Self {
        Self { period }
    }

    /// Returns the period between attempts.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl Default for ReconnectionPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RECONNECT_PERIOD)
    }
}
