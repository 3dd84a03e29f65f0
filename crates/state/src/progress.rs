//! Last listening position per book
//!
//! All books share one record: `{ "<book id>": { "position": s, "timestamp": ms } }`.

use crate::error::StorageResult;
use crate::kv::{read_json, read_json_for_update, write_json, KeyValueStore};
use audioreader_core::{BookId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PROGRESS_KEY: &str = "progress";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Global timeline position in seconds
    pub position: f64,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone)]
pub struct ProgressStore<K> {
    kv: K,
}

impl<K: KeyValueStore> ProgressStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Every stored entry; a corrupt record reads as empty
    pub fn entries(&self) -> BTreeMap<String, ProgressEntry> {
        match read_json(&self.kv, PROGRESS_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                log::warn!("{}; discarding saved positions", e);
                BTreeMap::new()
            }
        }
    }

    pub fn save(&self, book_id: &BookId, position: f64) -> StorageResult<()> {
        let mut entries: BTreeMap<String, ProgressEntry> =
            read_json_for_update(&self.kv, PROGRESS_KEY)?;
        entries.insert(
            book_id.as_str().to_string(),
            ProgressEntry {
                position: position.max(0.0),
                timestamp: Timestamp::now(),
            },
        );
        write_json(&self.kv, PROGRESS_KEY, &entries)?;
        log::debug!("Saved position {:.2}s for '{}'", position, book_id);
        Ok(())
    }

    /// Saved position for a book, 0 when there is none
    pub fn restore(&self, book_id: &BookId) -> f64 {
        self.entries()
            .get(book_id.as_str())
            .map(|entry| entry.position)
            .filter(|position| position.is_finite() && *position >= 0.0)
            .unwrap_or(0.0)
    }

    pub fn clear(&self, book_id: &BookId) -> StorageResult<()> {
        let mut entries: BTreeMap<String, ProgressEntry> =
            read_json_for_update(&self.kv, PROGRESS_KEY)?;
        if entries.remove(book_id.as_str()).is_some() {
            write_json(&self.kv, PROGRESS_KEY, &entries)?;
        }
        Ok(())
    }
}
