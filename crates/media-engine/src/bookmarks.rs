// crates/media-engine/src/bookmarks.rs
//! Bookmarks of the open book, kept sorted by position

use audioreader_core::{Bookmark, BookmarkId};

#[derive(Debug, Clone, Default)]
pub struct BookmarkList {
    /// Sorted by position; equal positions keep insertion order
    bookmarks: Vec<Bookmark>,
}

impl BookmarkList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored bookmarks, sorting them by position
    pub fn from_vec(mut bookmarks: Vec<Bookmark>) -> Self {
        bookmarks.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { bookmarks }
    }

    /// Inserts a bookmark after any others at the same position
    pub fn insert(&mut self, bookmark: Bookmark) {
        let at = self
            .bookmarks
            .partition_point(|existing| existing.position <= bookmark.position);
        self.bookmarks.insert(at, bookmark);
    }

    /// Removes a bookmark by id
    pub fn remove(&mut self, id: &BookmarkId) -> Option<Bookmark> {
        let pos = self.bookmarks.iter().position(|b| &b.id == id)?;
        Some(self.bookmarks.remove(pos))
    }

    /// Renames a bookmark, returning false when it does not exist
    pub fn rename(&mut self, id: &BookmarkId, label: impl Into<String>) -> bool {
        match self.bookmarks.iter_mut().find(|b| &b.id == id) {
            Some(bookmark) => {
                bookmark.set_label(label);
                true
            }
            None => false,
        }
    }

    /// Get a bookmark by ID
    pub fn get(&self, id: &BookmarkId) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| &b.id == id)
    }

    /// Index of the last bookmark at or before `t`
    pub fn index_at(&self, t: f64) -> Option<usize> {
        self.bookmarks.iter().rposition(|b| b.position <= t)
    }

    /// Get the next bookmark after a position
    pub fn next_after(&self, t: f64) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.position > t)
    }

    /// Get the previous bookmark before a position
    pub fn previous_before(&self, t: f64) -> Option<&Bookmark> {
        self.bookmarks.iter().rev().find(|b| b.position < t)
    }

    pub fn as_slice(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn to_vec(&self) -> Vec<Bookmark> {
        self.bookmarks.clone()
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(list: &BookmarkList) -> Vec<f64> {
        list.as_slice().iter().map(|b| b.position).collect()
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut list = BookmarkList::new();
        for p in [50.0, 10.0, 30.0] {
            list.insert(Bookmark::new(p, format!("at {}", p)));
        }
        assert_eq!(positions(&list), vec![10.0, 30.0, 50.0]);
    }

    #[test]
    fn test_equal_positions_keep_insertion_order() {
        let mut list = BookmarkList::new();
        list.insert(Bookmark::new(20.0, "first"));
        list.insert(Bookmark::new(5.0, "early"));
        list.insert(Bookmark::new(20.0, "second"));

        let labels: Vec<_> = list.as_slice().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["early", "first", "second"]);
    }

    #[test]
    fn test_from_vec_sorts() {
        let list = BookmarkList::from_vec(vec![
            Bookmark::new(9.0, "c"),
            Bookmark::new(1.0, "a"),
            Bookmark::new(4.0, "b"),
        ]);
        assert_eq!(positions(&list), vec![1.0, 4.0, 9.0]);
    }

    #[test]
    fn test_remove_and_rename() {
        let mut list = BookmarkList::new();
        let bookmark = Bookmark::new(12.0, "old");
        let id = bookmark.id;
        list.insert(bookmark);

        assert!(list.rename(&id, "new"));
        assert_eq!(list.get(&id).map(|b| b.label.as_str()), Some("new"));

        assert!(list.remove(&id).is_some());
        assert!(list.is_empty());
        assert!(list.remove(&id).is_none());
        assert!(!list.rename(&id, "gone"));
    }

    #[test]
    fn test_index_and_navigation() {
        let list = BookmarkList::from_vec(vec![
            Bookmark::new(10.0, "a"),
            Bookmark::new(30.0, "b"),
            Bookmark::new(50.0, "c"),
        ]);

        assert_eq!(list.index_at(5.0), None);
        assert_eq!(list.index_at(30.0), Some(1));
        assert_eq!(list.index_at(99.0), Some(2));

        assert_eq!(list.next_after(30.0).map(|b| b.position), Some(50.0));
        assert_eq!(list.previous_before(30.0).map(|b| b.position), Some(10.0));
        assert!(list.next_after(50.0).is_none());
        assert!(list.previous_before(10.0).is_none());
    }
}
