//! Bookmarks per book, stored as `{ "<book id>": [Bookmark, ...] }`

use crate::error::StorageResult;
use crate::kv::{read_json, read_json_for_update, write_json, KeyValueStore};
use audioreader_core::{BookId, Bookmark};
use std::collections::BTreeMap;

pub const BOOKMARKS_KEY: &str = "bookmarks";

#[derive(Debug, Clone)]
pub struct BookmarkStore<K> {
    kv: K,
}

impl<K: KeyValueStore> BookmarkStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    fn all(&self) -> BTreeMap<String, Vec<Bookmark>> {
        match read_json(&self.kv, BOOKMARKS_KEY) {
            Ok(all) => all.unwrap_or_default(),
            Err(e) => {
                log::warn!("{}; discarding saved bookmarks", e);
                BTreeMap::new()
            }
        }
    }

    /// Bookmarks saved for a book, empty when there are none
    pub fn load(&self, book_id: &BookId) -> Vec<Bookmark> {
        self.all().remove(book_id.as_str()).unwrap_or_default()
    }

    /// Replaces a book's bookmarks; an empty list removes the entry
    pub fn save(&self, book_id: &BookId, bookmarks: &[Bookmark]) -> StorageResult<()> {
        let mut all: BTreeMap<String, Vec<Bookmark>> =
            read_json_for_update(&self.kv, BOOKMARKS_KEY)?;
        if bookmarks.is_empty() {
            all.remove(book_id.as_str());
        } else {
            all.insert(book_id.as_str().to_string(), bookmarks.to_vec());
        }
        write_json(&self.kv, BOOKMARKS_KEY, &all)?;
        log::debug!("Saved {} bookmarks for '{}'", bookmarks.len(), book_id);
        Ok(())
    }
}
