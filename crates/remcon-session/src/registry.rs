//! The session registry: tracks every connected console session.
//!
//! This is the one structure shared by all connection tasks, so every
//! operation takes the internal lock for as short a span as possible and
//! never runs caller code while holding it. Broadcast iteration works on
//! a snapshot of the handles, which keeps concurrent connects and
//! disconnects from interfering with an in-flight broadcast.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex};

use crate::RemoteClient;

/// A concurrency-safe map from session key to session handle.
///
/// Keys are `"<address>:<port>"` strings ([`RemoteClient::key`]); at most
/// one handle is registered per key at any time.
///
/// ## Lifecycle
///
/// ```text
/// get_or_insert() ──→ [registered] ──→ remove() / remove_client()
///        │                                     │
///        └── duplicate key: existing handle    └── absent key: no-op
///            wins, the new one is discarded
/// ```
#[derive(Default)]
pub struct SessionRegistry {
    clients: Mutex<HashMap<String, Arc<dyn RemoteClient>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the handle registered under `key`, if any.
    pub fn try_get(&self, key: &str) -> Option<Arc<dyn RemoteClient>> {
        self.clients.lock().expect("registry lock poisoned").get(key).cloned()
    }

    /// Registers `client` under its own key, unless that key is already
    /// taken. On a duplicate the existing handle is kept and the new one
    /// silently discarded, so two racing resolutions of the same
    /// connection both end up observing one handle.
    ///
    /// Returns the handle that is registered after the call — either
    /// `client` itself or the incumbent.
    pub fn add(&self, client: Arc<dyn RemoteClient>) -> Arc<dyn RemoteClient> {
        self.get_or_insert(client.key(), move || client)
    }

    /// Atomic lookup-or-register: returns the handle under `key`, creating
    /// it with `make` only when the key is vacant.
    ///
    /// This is a single critical section, not a lookup followed by an
    /// insert, which closes the race where two connection events for the
    /// same peer each try to register a fresh handle.
    pub fn get_or_insert(
        &self,
        key: String,
        make: impl FnOnce() -> Arc<dyn RemoteClient>,
    ) -> Arc<dyn RemoteClient> {
        let mut clients = self.clients.lock().expect("registry lock poisoned");
        match clients.entry(key) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                let client = make();
                tracing::debug!(key = %entry.key(), "session registered");
                Arc::clone(entry.insert(client))
            }
        }
    }

    /// Removes the session registered under `key`.
    ///
    /// Idempotent: removing an absent key is a no-op.
    pub fn remove(&self, key: &str) {
        if self
            .clients
            .lock()
            .expect("registry lock poisoned")
            .remove(key)
            .is_some()
        {
            tracing::debug!(%key, "session removed");
        }
    }

    /// Removes the session registered under `client`'s key. Idempotent.
    pub fn remove_client(&self, client: &dyn RemoteClient) {
        self.remove(&client.key());
    }

    /// Runs `action` for every registered session.
    ///
    /// Iterates a snapshot taken under the lock, so `action` runs without
    /// the lock held and concurrent add/remove cannot disturb an ongoing
    /// enumeration.
    pub fn for_each(&self, mut action: impl FnMut(&Arc<dyn RemoteClient>)) {
        let snapshot: Vec<Arc<dyn RemoteClient>> = self
            .clients
            .lock()
            .expect("registry lock poisoned")
            .values()
            .cloned()
            .collect();

        for client in &snapshot {
            action(client);
        }
    }

    /// Removes every session.
    pub fn clear(&self) {
        self.clients.lock().expect("registry lock poisoned").clear();
    }

    /// Returns the number of registered sessions.
    pub fn len(&self) -> usize {
        self.clients.lock().expect("registry lock poisoned").len()
    }

    /// Returns `true` if no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =========================================================================
// Tests
// =========================================================================
