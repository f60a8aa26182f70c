use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now};
use crate::linker::text::RichText;

/// One chapter of the draft manuscript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub title: String,
    /// Persisted under `delta`, the editor's name for it
    #[serde(rename = "delta", alias = "content", default)]
    pub content: RichText,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "now")]
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    pub fn new(title: impl Into<String>) -> Self {
        let ts = now();
        Self {
            id: new_id("d"),
            title: title.into(),
            content: RichText::empty_line(),
            created_at: ts,
            updated_at: ts,
        }
    }

    /// Default chapter for position `n` (1-based)
    pub fn numbered(n: usize) -> Self {
        Self::new(format!("Chapter {}", n))
    }

    pub fn plain_text(&self) -> String {
        self.content.plain_text()
    }

    /// Rename; a blank title keeps the current one
    pub fn rename(&mut self, title: &str) {
        let title = title.trim();
        if !title.is_empty() {
            self.title = title.to_string();
        }
        self.updated_at = now();
    }
}
