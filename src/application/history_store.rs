// Store trait for best-effort history persistence
use crate::domain::history::HistorySample;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Fixed cache key the history is kept under.
pub const HISTORY_KEY: &str = "metricHistory";

#[derive(Debug, thiserror::Error)]
pub enum HistoryStoreError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache contents are not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// History as written to the cache, tagged with the machine it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedHistory {
    pub machine_id: String,
    pub samples: Vec<HistorySample>,
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Saved history, or `None` when nothing has been saved yet
    async fn load(&self) -> Result<Option<PersistedHistory>, HistoryStoreError>;

    /// Replaces the saved history
    async fn save(&self, history: &PersistedHistory) -> Result<(), HistoryStoreError>;
}
