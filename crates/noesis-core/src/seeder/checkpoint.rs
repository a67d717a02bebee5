//! `.seeding-checkpoint.json` — tracks completed documents for `--resume`
//! (spec §4.10 step 3, §6.2).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const CHECKPOINT_FILENAME: &str = ".seeding-checkpoint.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    pub file_set_hash: String,
    pub completed: Vec<String>,
    pub updated_at: String,
}

impl Checkpoint {
    pub fn new(file_set_hash: String) -> Self {
        Self { file_set_hash, completed: Vec::new(), updated_at: now_iso8601() }
    }

    /// Load the checkpoint at `path`. If the stored `file_set_hash` does not
    /// match `collection_key`, the checkpoint is stale and discarded (`None`).
    pub fn load(path: &Path, collection_key: &str) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(path)?;
        let checkpoint: Checkpoint = serde_json::from_slice(&bytes)?;
        if checkpoint.file_set_hash != collection_key {
            return Ok(None);
        }
        Ok(Some(checkpoint))
    }

    pub fn is_completed(&self, source: &str) -> bool {
        self.completed.iter().any(|s| s == source)
    }

    pub fn mark_completed(&mut self, source: String) {
        if !self.is_completed(&source) {
            self.completed.push(source);
        }
        self.updated_at = now_iso8601();
    }

    /// Atomic write-temp-then-rename, serialized through whichever caller
    /// holds the single checkpoint-writer lock (spec §5).
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serde_json::to_vec_pretty(self)?)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

fn now_iso8601() -> String {
    chrono::Utc::now().to_rfc3339()
}
