// Key-value cache file backing the history store
use crate::application::history_store::{
    HistoryStore, HistoryStoreError, PersistedHistory, HISTORY_KEY,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::PathBuf;

/// A JSON object on disk used as a flat key-value cache. History lives under
/// [`HISTORY_KEY`]; other keys are preserved on write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_entries(&self) -> Result<Map<String, Value>, HistoryStoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[async_trait]
impl HistoryStore for JsonFileStore {
    async fn load(&self) -> Result<Option<PersistedHistory>, HistoryStoreError> {
        let mut entries = self.read_entries().await?;
        match entries.remove(HISTORY_KEY) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, history: &PersistedHistory) -> Result<(), HistoryStoreError> {
        // A corrupt cache is overwritten rather than blocking every later save.
        let mut entries = self.read_entries().await.unwrap_or_default();
        entries.insert(HISTORY_KEY.to_string(), serde_json::to_value(history)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec(&entries)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::HistorySample;
    use chrono::{TimeZone, Utc};

    fn history(machine_id: &str, count: usize) -> PersistedHistory {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        PersistedHistory {
            machine_id: machine_id.to_string(),
            samples: (0..count)
                .map(|i| HistorySample {
                    timestamp: base + chrono::Duration::seconds(3 * i as i64),
                    temperature: 78.0,
                    rpm: 1200.0,
                    efficiency: 92.0,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("cache.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("cache.json"));
        let saved = history("mix-001", 4);

        store.save(&saved).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_other_keys_survive_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, r#"{"theme":"dark"}"#).unwrap();

        let store = JsonFileStore::new(&path);
        store.save(&history("cool-003", 1)).await.unwrap();

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[HISTORY_KEY]["machineId"], "cool-003");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load().await, Err(HistoryStoreError::Malformed(_))));

        store.save(&history("mix-001", 2)).await.unwrap();
        assert_eq!(store.load().await.unwrap().map(|h| h.samples.len()), Some(2));
    }
}
