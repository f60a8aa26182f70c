//! Text Model Adapter: rich-text content -> plain-text projection
//!
//! The editor stores a chapter as an ordered list of insert operations
//! (`{"ops": [{"insert": "..."}, {"insert": {"image": ...}}]}`). Only
//! string inserts contribute to the projection; embeds are dropped.
//!
//! Every offset the crate exposes is a UTF-16 code unit index into this
//! projection, the same space the browser editor persists annotation
//! ranges in. Matching runs on UTF-8, so [`TextProjection`] converts.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// =============================================================================
// RichText
// =============================================================================

/// A chapter's editor content, kept as opaque JSON so attributes the
/// engine does not understand survive an import/export round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Value);

impl Default for RichText {
    fn default() -> Self {
        Self::empty_line()
    }
}

impl RichText {
    /// Content of a freshly created chapter: a single empty line
    pub fn empty_line() -> Self {
        Self::from_plain("\n")
    }

    /// Wrap plain text in a single insert operation
    pub fn from_plain(text: &str) -> Self {
        RichText(json!({ "ops": [{ "insert": text }] }))
    }

    /// Plain-text projection of this content
    pub fn plain_text(&self) -> String {
        extract_plain_text(&self.0)
    }
}

/// Concatenate the string inserts of `content`, in order.
///
/// Never fails: absent `ops`, non-array `ops`, and ops without a string
/// insert all contribute nothing.
pub fn extract_plain_text(content: &Value) -> String {
    let ops = match content.get("ops").and_then(Value::as_array) {
        Some(ops) => ops,
        None => return String::new(),
    };

    let mut out = String::new();
    for op in ops {
        if let Some(text) = op.get("insert").and_then(Value::as_str) {
            out.push_str(text);
        }
    }
    out
}

// =============================================================================
// UTF-16 projection
// =============================================================================

/// Length of `text` in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Plain text plus a byte -> UTF-16 offset table.
///
/// ASCII text needs no table; offsets are identical in both encodings.
#[derive(Debug, Clone)]
pub struct TextProjection {
    text: String,
    /// (byte offset, utf16 offset) for every char start, plus the end.
    /// Empty when the text is pure ASCII.
    table: Vec<(usize, usize)>,
    utf16_len: usize,
}

impl TextProjection {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_ascii() {
            let len = text.len();
            return Self {
                text,
                table: Vec::new(),
                utf16_len: len,
            };
        }

        let mut table = Vec::with_capacity(text.len() + 1);
        let mut units = 0;
        for (byte, c) in text.char_indices() {
            table.push((byte, units));
            units += c.len_utf16();
        }
        table.push((text.len(), units));

        Self {
            text,
            table,
            utf16_len: units,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        self.utf16_len
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Convert a byte offset (on a char boundary) to a UTF-16 offset.
    /// Offsets past the end clamp to the length.
    pub fn to_utf16(&self, byte: usize) -> usize {
        if self.table.is_empty() {
            return byte.min(self.utf16_len);
        }
        match self.table.binary_search_by_key(&byte, |&(b, _)| b) {
            Ok(i) => self.table[i].1,
            // Inside a multi-byte char: round down to its start
            Err(0) => 0,
            Err(i) => self.table[i - 1].1,
        }
    }

    /// Slice by UTF-16 range, or None when the range is out of bounds or
    /// splits a surrogate pair.
    pub fn slice_utf16(&self, start: usize, length: usize) -> Option<&str> {
        let end = start.checked_add(length)?;
        if end > self.utf16_len {
            return None;
        }
        if self.table.is_empty() {
            return self.text.get(start..end);
        }
        let byte_at = |units: usize| {
            self.table
                .binary_search_by_key(&units, |&(_, u)| u)
                .ok()
                .map(|i| self.table[i].0)
        };
        let (s, e) = (byte_at(start)?, byte_at(end)?);
        self.text.get(s..e)
    }
}
