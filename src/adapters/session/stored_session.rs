use std::sync::Arc;

use crate::core::errors::Result;
use crate::core::traits::kv_store::KeyValueStore;
use crate::core::traits::session::SessionProvider;

/// Store key holding the bearer credential.
pub const TOKEN_KEY: &str = "token";

/// Session provider backed by the durable key-value store.
///
/// Reads go to the store every time, so a login or logout performed by
/// another process is picked up by the next request.
pub struct StoredSession {
    store: Arc<dyn KeyValueStore>,
}

impl StoredSession {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl SessionProvider for StoredSession {
    fn credential(&self) -> Option<String> {
        // An unreadable token is treated like a missing one; the backend
        // will answer 401 if the call needed it.
        self.store
            .get(TOKEN_KEY)
            .ok()
            .flatten()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    fn store(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }
}
