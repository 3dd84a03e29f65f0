//! Word lookup by time

use audioreader_core::Word;

/// Number of words shown before the current one in a context snippet
const CONTEXT_BEFORE: usize = 2;
/// Number of words shown after the current one in a context snippet
const CONTEXT_AFTER: usize = 4;

/// Sorted, immutable word list with logarithmic time lookup
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    words: Vec<Word>,
}

impl WordIndex {
    /// Words must be sorted by start time (checked at load time)
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Index of the word being spoken at `t`
    ///
    /// The highest `i` with `words[i].start <= t`, or 0 when there are no words
    /// or `t` precedes the first one. Non-decreasing in `t`.
    pub fn find_word_at_time(&self, t: f64) -> usize {
        self.words
            .partition_point(|word| word.start <= t)
            .saturating_sub(1)
    }

    pub fn get(&self, index: usize) -> Option<&Word> {
        self.words.get(index)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Words `index - 2 ..= index + 4` joined by spaces, clipped to the book
    pub fn context_snippet(&self, index: usize) -> String {
        if self.words.is_empty() {
            return String::new();
        }

        let last = self.words.len() - 1;
        let index = index.min(last);
        let start = index.saturating_sub(CONTEXT_BEFORE);
        let end = (index + CONTEXT_AFTER).min(last);

        self.words[start..=end]
            .iter()
            .map(|word| word.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
