//! Content-addressed JSON-per-document cache of LLM outputs, partitioned by
//! collection key (spec §4.10 step 5a, §6.2).

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StageCacheMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrimaryConcept {
    pub name: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExtractedConcepts {
    pub primary_concepts: Vec<PrimaryConcept>,
    pub categories: Vec<String>,
    pub technical_terms: Vec<String>,
    pub related_concepts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageCacheEntry {
    pub hash: String,
    pub source: String,
    pub processed_at: String,
    pub concepts: ExtractedConcepts,
    pub content_overview: String,
    #[serde(default)]
    pub metadata: StageCacheMetadata,
}

/// Partitions stage-cache entries under `<root>/<collection_key>/<content_hash>.json`.
pub struct StageCache {
    root: PathBuf,
    collection_key: String,
    ttl: Duration,
}

impl StageCache {
    pub fn new(root: impl Into<PathBuf>, collection_key: impl Into<String>) -> Self {
        Self { root: root.into(), collection_key: collection_key.into(), ttl: DEFAULT_TTL }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn collection_dir(&self) -> PathBuf {
        self.root.join(&self.collection_key)
    }

    fn entry_path(&self, content_hash: &str) -> PathBuf {
        self.collection_dir().join(format!("{content_hash}.json"))
    }

    /// Return a cached entry if present and not expired (TTL from the
    /// entry's own `processed_at` timestamp, not file mtime).
    pub fn read(&self, content_hash: &str) -> Result<Option<StageCacheEntry>> {
        let path = self.entry_path(content_hash);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let entry: StageCacheEntry = serde_json::from_slice(&bytes)?;
        let processed_at = chrono::DateTime::parse_from_rfc3339(&entry.processed_at)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_else(|_| chrono::Utc::now());
        let age = chrono::Utc::now().signed_duration_since(processed_at);
        if age.to_std().unwrap_or(Duration::ZERO) > self.ttl {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    /// Atomic write-temp-then-rename into the collection's subdirectory.
    pub fn write(&self, content_hash: &str, entry: &StageCacheEntry) -> Result<()> {
        let dir = self.collection_dir();
        std::fs::create_dir_all(&dir)?;
        let final_path = self.entry_path(content_hash);
        let tmp_path = dir.join(format!("{content_hash}.json.tmp"));
        std::fs::write(&tmp_path, serde_json::to_vec_pretty(entry)?)?;
        std::fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    /// Delete the entire collection subdirectory (spec §4.10 step 7).
    pub fn cleanup(&self) -> Result<()> {
        let dir = self.collection_dir();
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_entry() -> StageCacheEntry {
        StageCacheEntry {
            hash: "abc".into(),
            source: "doc.pdf".into(),
            processed_at: chrono::Utc::now().to_rfc3339(),
            concepts: ExtractedConcepts {
                primary_concepts: vec![PrimaryConcept { name: "strategy".into(), summary: "a plan".into() }],
                categories: vec!["military".into()],
                technical_terms: vec![],
                related_concepts: vec![],
            },
            content_overview: "An overview".into(),
            metadata: StageCacheMetadata::default(),
        }
    }

    #[test]
    fn round_trips_an_entry() {
        let dir = tempdir().unwrap();
        let cache = StageCache::new(dir.path(), "collectionkey123456");
        cache.write("abc", &sample_entry()).unwrap();
        let read = cache.read("abc").unwrap().unwrap();
        assert_eq!(read.source, "doc.pdf");
    }

    #[test]
    fn missing_entry_reads_as_none() {
        let dir = tempdir().unwrap();
        let cache = StageCache::new(dir.path(), "collectionkey123456");
        assert!(cache.read("missing").unwrap().is_none());
    }

    #[test]
    fn expired_entry_is_treated_as_miss() {
        let dir = tempdir().unwrap();
        let cache = StageCache::new(dir.path(), "collectionkey123456").with_ttl(Duration::from_secs(0));
        let mut entry = sample_entry();
        entry.processed_at = (chrono::Utc::now() - chrono::Duration::days(8)).to_rfc3339();
        cache.write("abc", &entry).unwrap();
        assert!(cache.read("abc").unwrap().is_none());
    }

    #[test]
    fn cleanup_removes_collection_directory() {
        let dir = tempdir().unwrap();
        let cache = StageCache::new(dir.path(), "collectionkey123456");
        cache.write("abc", &sample_entry()).unwrap();
        assert!(cache.collection_dir().exists());
        cache.cleanup().unwrap();
        assert!(!cache.collection_dir().exists());
    }
}
