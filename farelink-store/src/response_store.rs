use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Raw-response store keyed by shopping session id.
///
/// Opaque to the scoping core: it only ever receives already-fetched
/// documents. Production deployments back this with Redis; the in-memory
/// implementation below serves tests and single-process setups.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn put(
        &self,
        session_id: &str,
        response: Value,
        ttl_seconds: i64,
    ) -> Result<(), StoreError>;

    async fn get(&self, session_id: &str) -> Result<Option<Value>, StoreError>;

    /// Remove one stored response; returns whether anything was removed.
    async fn invalidate(&self, session_id: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("response store unavailable: {0}")]
    Unavailable(String),

    #[error("stored payload is not readable: {0}")]
    Corrupt(String),
}

struct StoredResponse {
    payload: Value,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryResponseStore {
    entries: RwLock<HashMap<String, StoredResponse>>,
}

impl InMemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseStore for InMemoryResponseStore {
    async fn put(
        &self,
        session_id: &str,
        response: Value,
        ttl_seconds: i64,
    ) -> Result<(), StoreError> {
        let entry = StoredResponse {
            payload: response,
            expires_at: Utc::now() + Duration::seconds(ttl_seconds),
        };
        self.entries
            .write()
            .await
            .insert(session_id.to_string(), entry);
        debug!(session_id, ttl_seconds, "stored shopping response");
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<Value>, StoreError> {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            match entries.get(session_id) {
                Some(entry) if entry.expires_at > now => {
                    return Ok(Some(entry.payload.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: drop it under the write lock
        self.entries.write().await.remove(session_id);
        Ok(None)
    }

    async fn invalidate(&self, session_id: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(session_id).is_some())
    }
}
