use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now};

/// A comment bound to a range of a chapter's plain-text projection.
///
/// `index`/`length` are UTF-16 units captured at creation time and are
/// not rebased when the chapter is edited elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: String,
    pub index: usize,
    pub length: usize,
    pub text: String,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    pub fn new(index: usize, length: usize, text: impl Into<String>) -> Self {
        Self {
            id: new_id("c"),
            index,
            length,
            text: text.into(),
            created_at: now(),
        }
    }
}
