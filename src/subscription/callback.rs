// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for connection status subscriptions.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::connection::ConnectionStatus;

/// Unique identifier for a subscription.
///
/// Returned when registering a listener and used to remove it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Callback invoked with `(previous, current)` on each status transition.
type StatusCallback = Arc<dyn Fn(ConnectionStatus, ConnectionStatus) + Send + Sync>;

/// Registry of connection status listeners.
///
/// Listeners are invoked in registration order. Dispatch clones the callback
/// list before calling out, so a listener may register or remove listeners
/// without deadlocking.
pub struct StatusListeners {
    next_id: AtomicU64,
    callbacks: RwLock<BTreeMap<SubscriptionId, StatusCallback>>,
}

impl StatusListeners {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers a listener.
    pub fn register<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(ConnectionStatus, ConnectionStatus) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.write().insert(id, Arc::new(callback));
        id
    }

    /// Removes a listener. Returns `true` if it was registered.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        self.callbacks.write().remove(&id).is_some()
    }

    /// Returns the number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns `true` if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }

    /// Invokes every listener with a transition.
    pub fn dispatch(&self, previous: ConnectionStatus, current: ConnectionStatus) {
        let callbacks: Vec<StatusCallback> = self.callbacks.read().values().cloned().collect();
        for callback in callbacks {
            callback(previous, current);
        }
    }
}

impl Default for StatusListeners {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StatusListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusListeners")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn dispatch_reaches_every_listener() {
        let listeners = StatusListeners::new();
        let counter = Arc::new(AtomicU32::new(0));

        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            listeners.register(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        listeners.dispatch(ConnectionStatus::Connecting, ConnectionStatus::Connected);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn listener_receives_transition() {
        let listeners = StatusListeners::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        listeners.register(move |from, to| seen_clone.lock().push((from, to)));

        listeners.dispatch(ConnectionStatus::Connected, ConnectionStatus::Disconnected);
        assert_eq!(
            *seen.lock(),
            [(ConnectionStatus::Connected, ConnectionStatus::Disconnected)]
        );
    }

    #[test]
    fn removed_listener_is_not_called() {
        let listeners = StatusListeners::new();
        let counter = Arc::new(AtomicU32::new(0));

        let counter_clone = Arc::clone(&counter);
        let id = listeners.register(move |_, _| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert!(listeners.is_empty());

        listeners.dispatch(ConnectionStatus::Connecting, ConnectionStatus::Error);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn ids_are_unique() {
        let listeners = StatusListeners::new();
        let a = listeners.register(|_, _| {});
        let b = listeners.register(|_, _| {});
        assert_ne!(a, b);
        assert_eq!(a.to_string(), format!("Sub({})", a.value()));
    }
}
