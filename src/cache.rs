use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("failed to encode cache: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write cache to {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

/// Finalized daily reports keyed by `YYYY-MM-DD`.
///
/// Entries are append-only: once a date has a report, `put` leaves it alone.
#[async_trait]
pub trait DailyCache: Send + Sync {
    async fn get(&self, date_key: &str) -> Option<String>;

    async fn put(&self, date_key: &str, report: &str) -> Result<(), CacheError>;
}

/// A single pretty-printed JSON object on disk, read whole and rewritten whole.
pub struct JsonFileCache {
    path: PathBuf,
    // held across load and store so writers for different dates never race
    write: Mutex<()>,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> BTreeMap<String, String> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("cache {} does not exist yet", self.path.display());
                return BTreeMap::new();
            }
            Err(err) => {
                log::warn!(
                    "cache {} unreadable, treating as empty: {}",
                    self.path.display(),
                    err
                );
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|err| {
            log::warn!(
                "cache {} is corrupt, treating as empty: {}",
                self.path.display(),
                err
            );
            BTreeMap::new()
        })
    }

    async fn store(&self, entries: &BTreeMap<String, String>) -> Result<(), CacheError> {
        let content = serde_json::to_string_pretty(entries)?;
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|err| CacheError::Write(dir.to_path_buf(), err))?;
        }
        // write next to the target and swap, so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|err| CacheError::Write(tmp.clone(), err))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|err| CacheError::Write(self.path.clone(), err))
    }
}

#[async_trait]
impl DailyCache for JsonFileCache {
    async fn get(&self, date_key: &str) -> Option<String> {
        let report = self.load().await.remove(date_key);
        if report.is_none() {
            log::debug!("cache miss for {}", date_key);
        }
        report
    }

    async fn put(&self, date_key: &str, report: &str) -> Result<(), CacheError> {
        let _write = self.write.lock().await;
        let mut entries = self.load().await;
        if entries.contains_key(date_key) {
            log::warn!("report for {} already cached, keeping it", date_key);
            return Ok(());
        }
        entries.insert(date_key.to_string(), report.to_string());
        self.store(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(dir: &tempfile::TempDir) -> JsonFileCache {
        JsonFileCache::new(dir.path().join("data").join("top_day_cache.json"))
    }

    #[tokio::test]
    async fn missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cache(&dir).get("2024-06-02").await, None);
    }

    #[tokio::test]
    async fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        cache.put("2024-06-02", "🏆 Top Day Results:").await.unwrap();
        cache.put("2024-06-03", "another day").await.unwrap();
        assert_eq!(
            cache.get("2024-06-02").await.as_deref(),
            Some("🏆 Top Day Results:")
        );

        // human-auditable utf-8 on disk
        let content = std::fs::read_to_string(cache.path()).unwrap();
        assert!(content.contains("🏆"));
        assert!(content.contains("\"2024-06-03\": \"another day\""));
    }

    #[tokio::test]
    async fn existing_entries_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        cache.put("2024-06-02", "first").await.unwrap();
        cache.put("2024-06-02", "second").await.unwrap();
        assert_eq!(cache.get("2024-06-02").await.as_deref(), Some("first"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_for_different_dates_keep_both() {
        let dir = tempfile::tempdir().unwrap();
        let cache = std::sync::Arc::new(cache(&dir));
        for round in 0..20 {
            let first = format!("2024-05-{:02}", round + 1);
            let second = format!("2024-06-{:02}", round + 1);
            let a = tokio::spawn({
                let cache = cache.clone();
                let key = first.clone();
                async move { cache.put(&key, "first").await }
            });
            let b = tokio::spawn({
                let cache = cache.clone();
                let key = second.clone();
                async move { cache.put(&key, "second").await }
            });
            a.await.unwrap().unwrap();
            b.await.unwrap().unwrap();
            assert_eq!(cache.get(&first).await.as_deref(), Some("first"));
            assert_eq!(cache.get(&second).await.as_deref(), Some("second"));
        }
    }

    #[tokio::test]
    async fn corrupt_store_is_empty_and_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache(&dir);
        std::fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        std::fs::write(cache.path(), "{ not json").unwrap();

        assert_eq!(cache.get("2024-06-02").await, None);
        cache.put("2024-06-02", "fresh").await.unwrap();
        assert_eq!(cache.get("2024-06-02").await.as_deref(), Some("fresh"));
    }
}
