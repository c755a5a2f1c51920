//! Local key-value storage.
//!
//! Values are strings; callers JSON-encode whole collections under a single
//! key and rewrite them on every change. [`load_list`] and [`persist_list`]
//! implement the degrade-don't-fail policy shared by the repository and the
//! notification center: unreadable data is logged and treated as empty,
//! failed writes are logged and reported as `false`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{DbPool, StoreError};

/// Well-known storage keys.
pub mod keys {
    /// JSON array of saved cases.
    pub const SAVED_CASES: &str = "saved_cases";

    /// JSON array of notifications.
    pub const NOTIFICATIONS: &str = "notifications";

    /// `"true"` while a user is logged in.
    pub const IS_LOGGED_IN: &str = "isLoggedIn";
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// String key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// JSON list helpers
// ---------------------------------------------------------------------------

/// Read a JSON array stored under `key`.
///
/// Missing, unreadable and corrupt data all yield an empty list.
pub async fn load_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::error!(key, error = %e, "Failed to read stored list");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::error!(key, error = %e, "Stored list is corrupt, treating as empty");
            Vec::new()
        }
    }
}

/// Rewrite the whole JSON array under `key`. Returns `false` on failure.
pub async fn persist_list<T: Serialize>(store: &dyn KeyValueStore, key: &str, items: &[T]) -> bool {
    let result = match serde_json::to_string(items) {
        Ok(json) => store.set(key, &json).await,
        Err(e) => Err(StoreError::from(e)),
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(key, count = items.len(), error = %e, "Failed to persist list");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Process-local store.
///
/// An optional byte quota mimics browser storage limits: a write that would
/// push the total size of keys and values over the quota is rejected with
/// [`StoreError::QuotaExceeded`] and leaves the previous value in place.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(StoreError::QuotaExceeded { key: key.to_string() });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Store backed by the `kv_store` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Wrap a pool whose migrations have already been applied.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
