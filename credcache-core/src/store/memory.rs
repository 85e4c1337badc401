//! In-memory secret storage implementation.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Secret, SecretStore, StoreError};

/// In-memory secret store for testing and development.
///
/// This store is not persistent; data is lost when the process exits.
///
/// Clones share the same underlying map, so a test can keep one handle
/// and give another to a [`Cache`](crate::Cache) to inspect what the cache
/// wrote.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<(String, String), Secret>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Accounts stored under the given service, sorted.
    pub fn accounts(&self, service: &str) -> Vec<String> {
        let data = self.data.lock();
        let mut accounts: Vec<String> = data
            .keys()
            .filter(|(s, _)| s == service)
            .map(|(_, a)| a.clone())
            .collect();
        accounts.sort();
        accounts
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.len())
            .finish()
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, service: &str, account: &str) -> Result<Option<Secret>, StoreError> {
        let data = self.data.lock();
        Ok(data
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn set(&self, service: &str, account: &str, secret: &Secret) -> Result<(), StoreError> {
        let mut data = self.data.lock();
        data.insert((service.to_string(), account.to_string()), secret.clone());
        Ok(())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), StoreError> {
        let mut data = self.data.lock();
        data.remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get() {
        let store = MemoryStore::new();
        store.set("svc", "alice", &Secret::new("pw")).unwrap();

        let retrieved = store.get("svc", "alice").unwrap();
        assert_eq!(retrieved.unwrap().expose(), "pw");
    }

    #[test]
    fn test_memory_store_get_nonexistent() {
        let store = MemoryStore::new();
        assert!(store.get("svc", "nobody").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_account_is_part_of_address() {
        let store = MemoryStore::new();
        store.set("svc", "alice", &Secret::new("pw")).unwrap();

        assert!(store.get("svc", "bob").unwrap().is_none());
        assert!(store.get("other", "alice").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("svc", "alice", &Secret::new("pw")).unwrap();

        store.delete("svc", "alice").unwrap();
        store.delete("svc", "alice").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_clones_share_data() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set("svc", "alice", &Secret::new("pw")).unwrap();
        store.set("svc", "bob", &Secret::new("pw")).unwrap();

        assert_eq!(handle.len(), 2);
        assert_eq!(handle.accounts("svc"), vec!["alice", "bob"]);
    }
}
