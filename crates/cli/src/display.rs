// FILE: crates/cli/src/display.rs

//! RSVP word rendering helpers
//!
//! Each word is drawn so its focus letter (the optimal recognition point)
//! lands on a fixed column, keeping the eye still between words.

/// Column of the focus letter, as a percentage of the terminal width
pub const FOCUS_ANCHOR_PERCENT: usize = 42;

fn is_letter(c: char) -> bool {
    c.is_alphanumeric()
}

/// Which letter of a word with `letter_count` letters gets the focus
pub fn focus_letter_index(letter_count: usize) -> usize {
    match letter_count {
        0 | 1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => 4,
    }
}

/// Char index of the focus letter; punctuation is skipped when counting
pub fn focus_char_index(word: &str) -> usize {
    let total_chars = word.chars().count();
    let letter_chars = word.chars().filter(|c| is_letter(*c)).count();

    if total_chars == 0 {
        return 0;
    }
    if letter_chars == 0 {
        return total_chars.saturating_sub(1) / 2;
    }

    let target = focus_letter_index(letter_chars).min(letter_chars - 1);
    word.chars()
        .enumerate()
        .filter(|(_, c)| is_letter(*c))
        .nth(target)
        .map_or(0, |(i, _)| i)
}

/// A word split around its focus letter, with the left padding that puts the
/// focus letter on the anchor column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedWord {
    pub padding: usize,
    pub before: String,
    pub focus: String,
    pub after: String,
}

pub fn focus_word(word: &str, width: usize) -> FocusedWord {
    let anchor = width * FOCUS_ANCHOR_PERCENT / 100;
    let index = focus_char_index(word);

    let before: String = word.chars().take(index).collect();
    let focus: String = word.chars().skip(index).take(1).collect();
    let after: String = word.chars().skip(index + 1).collect();

    FocusedWord {
        padding: anchor.saturating_sub(before.chars().count()),
        before,
        focus,
        after,
    }
}

/// `[#####-----]` style bar for a 0 - 100 percentage
pub fn progress_bar(percent: f64, width: usize) -> String {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled.min(width)),
        "-".repeat(width.saturating_sub(filled))
    )
}

/// Parses `#rrggbb`
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
