//! Word and character counts for chapters and the whole project

use serde::{Deserialize, Serialize};

use crate::linker::text::utf16_len;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub words: usize,
    /// UTF-16 units, trailing whitespace excluded
    pub chars: usize,
}

impl std::ops::Add for TextStats {
    type Output = TextStats;

    fn add(self, other: TextStats) -> TextStats {
        TextStats {
            words: self.words + other.words,
            chars: self.chars + other.chars,
        }
    }
}

/// Count words (whitespace separated) and characters.
pub fn count_words_chars(text: &str) -> TextStats {
    let t = text.trim_end();
    TextStats {
        words: t.split_whitespace().count(),
        chars: utf16_len(t),
    }
}
