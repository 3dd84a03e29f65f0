//! One open book

use crate::bookmarks::BookmarkList;
use crate::chapters::ChapterList;
use crate::error::{EngineError, EngineResult};
use crate::index::WordIndex;
use crate::media::MediaHandle;
use crate::timeline::SegmentTimeline;
use audioreader_core::{BookId, Bookmark};

/// Everything the controller holds for the open book
///
/// Created by a successful open and dropped (after its handles are released)
/// on close or when another book replaces it.
#[derive(Debug)]
pub struct BookSession<H> {
    pub(crate) book_id: BookId,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) timeline: SegmentTimeline,
    pub(crate) words: WordIndex,
    pub(crate) chapters: ChapterList,
    pub(crate) bookmarks: BookmarkList,
    /// One per segment, same order as the timeline
    pub(crate) handles: Vec<H>,
    /// Last word reported to listeners
    pub(crate) current_word: Option<usize>,
}

impl<H: MediaHandle> BookSession<H> {
    pub(crate) fn new(
        book_id: BookId,
        title: String,
        author: String,
        timeline: SegmentTimeline,
        words: WordIndex,
        chapters: ChapterList,
        handles: Vec<H>,
    ) -> Self {
        Self {
            book_id,
            title,
            author,
            timeline,
            words,
            chapters,
            bookmarks: BookmarkList::new(),
            handles,
            current_word: None,
        }
    }

    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn timeline(&self) -> &SegmentTimeline {
        &self.timeline
    }

    pub fn words(&self) -> &WordIndex {
        &self.words
    }

    pub fn chapters(&self) -> &ChapterList {
        &self.chapters
    }

    pub fn bookmarks(&self) -> &BookmarkList {
        &self.bookmarks
    }

    pub fn handles(&self) -> &[H] {
        &self.handles
    }

    pub(crate) fn handle_mut(&mut self, index: usize) -> EngineResult<&mut H> {
        let count = self.handles.len();
        self.handles.get_mut(index).ok_or_else(|| {
            EngineError::InvalidState(format!("segment {} of {} has no handle", index, count))
        })
    }

    /// Builds a bookmark carrying the word, context and chapter at `position`
    pub(crate) fn capture_bookmark(&self, position: f64, label: String) -> Bookmark {
        let bookmark = Bookmark::new(position, label);
        if self.words.is_empty() {
            return bookmark;
        }

        let index = self.words.find_word_at_time(position);
        let word = self
            .words
            .get(index)
            .map(|w| w.text.clone())
            .unwrap_or_default();
        let chapter_title = self
            .chapters
            .chapter_index_at(position)
            .and_then(|i| self.chapters.get_chapter(i))
            .map(|ch| ch.title.clone());

        bookmark.with_context(word, self.words.context_snippet(index), chapter_title)
    }

    /// Pauses and releases every handle
    pub(crate) fn release_all(&mut self) {
        for handle in &mut self.handles {
            handle.pause();
            handle.release();
        }
    }
}
