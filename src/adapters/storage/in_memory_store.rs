//! In-memory key-value store, for tests and ephemeral sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::file_store::validate_key;
use crate::ports::{KeyValueStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored values (useful for tests)
    pub async fn clear(&self) {
        self.values.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryKeyValueStore::new();
        let other = store.clone();
        store.put("k", "v").await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(other.len().await, 1);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryKeyValueStore::new();
        store.put("a", "1").await.unwrap();
        store.put("b", "2").await.unwrap();
        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn rejects_invalid_keys() {
        let store = InMemoryKeyValueStore::new();
        assert!(store.put("a/b", "1").await.is_err());
    }
}
