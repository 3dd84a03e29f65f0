use serde::{Deserialize, Serialize};

/// A transcribed word and the span of audio it was spoken in
///
/// Serialized as the compact `[text, start, end]` triple used by the
/// alignment file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64, f64)", into = "(String, f64, f64)")]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

impl From<(String, f64, f64)> for Word {
    fn from((text, start, end): (String, f64, f64)) -> Self {
        Self { text, start, end }
    }
}

impl From<Word> for (String, f64, f64) {
    fn from(word: Word) -> Self {
        (word.text, word.start, word.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_from_compact_triple() {
        let word: Word = serde_json::from_str(r#"["the", 0.0, 0.3]"#).unwrap();
        assert_eq!(word, Word::new("the", 0.0, 0.3));
    }

    #[test]
    fn test_word_serializes_compact() {
        let json = serde_json::to_string(&Word::new("cat", 0.3, 0.6)).unwrap();
        assert_eq!(json, r#"["cat",0.3,0.6]"#);
    }
}
