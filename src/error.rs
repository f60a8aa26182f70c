//! Error types for LinkCore.
//!
//! Only a handful of these ever reach a caller. Relink passes recover
//! locally from range and pattern failures and report them as counts.

use std::fmt;

/// Result alias using [`LinkError`].
pub type Result<T> = std::result::Result<T, LinkError>;

/// Crate-wide error type
#[derive(Debug, Clone, PartialEq)]
pub enum LinkError {
    /// A span or annotation range does not fit the current document
    InvalidRange {
        start: usize,
        length: usize,
        doc_len: usize,
    },
    /// A card title could not be compiled into a literal pattern
    Pattern { card_id: String, message: String },
    UnknownChapter(String),
    UnknownCard(String),
    UnknownAnnotation(String),
    /// An operation needs an open chapter and none is active
    NoActiveChapter,
    /// Annotation comment is blank after trimming
    EmptyComment,
    /// Selected text is blank after trimming
    EmptySelection,
    /// Project file could not be imported
    Import(String),
    Serialization(String),
    /// Persistence write failed
    Store(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::InvalidRange {
                start,
                length,
                doc_len,
            } => write!(
                f,
                "Invalid range: {}+{} exceeds document length {}",
                start, length, doc_len
            ),
            LinkError::Pattern { card_id, message } => {
                write!(f, "Pattern error for card {}: {}", card_id, message)
            }
            LinkError::UnknownChapter(id) => write!(f, "Unknown chapter: {}", id),
            LinkError::UnknownCard(id) => write!(f, "Unknown card: {}", id),
            LinkError::UnknownAnnotation(id) => write!(f, "Unknown annotation: {}", id),
            LinkError::NoActiveChapter => write!(f, "No active chapter"),
            LinkError::EmptyComment => write!(f, "Annotation comment is empty"),
            LinkError::EmptySelection => write!(f, "Selection is empty"),
            LinkError::Import(msg) => write!(f, "Import failed: {}", msg),
            LinkError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            LinkError::Store(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<serde_json::Error> for LinkError {
    fn from(e: serde_json::Error) -> Self {
        LinkError::Serialization(e.to_string())
    }
}
