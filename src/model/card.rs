use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{new_id, now};

/// Longest title derived from a text selection, in UTF-16 units
pub const SELECTION_TITLE_MAX: usize = 80;

/// Key/value detail on a card. Keys need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardField {
    #[serde(rename = "k")]
    pub key: String,
    #[serde(rename = "v")]
    pub value: String,
}

impl CardField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A library card. `title` doubles as the literal link pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    /// Category label, referenced by value
    #[serde(default)]
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<CardField>,
    #[serde(default)]
    pub body: String,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "now")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardDraft {
    pub category: Option<String>,
    pub title: Option<String>,
    pub fields: Vec<CardField>,
    pub body: String,
}

impl CardDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Partial update from the card form. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardPatch {
    pub category: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Card {
    /// Build a card from a draft; missing category falls back to
    /// `default_category`, missing title to "New card".
    pub fn from_draft(draft: CardDraft, default_category: &str) -> Self {
        let ts = now();
        Self {
            id: new_id("card"),
            category: draft
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| default_category.to_string()),
            title: draft
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "New card".to_string()),
            fields: draft.fields,
            body: draft.body,
            created_at: ts,
            updated_at: ts,
        }
    }

    /// Apply a form save. A blank title keeps the previous one.
    pub fn apply(&mut self, patch: CardPatch) {
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(title) = patch.title {
            let title = title.trim();
            if !title.is_empty() {
                self.title = title.to_string();
            }
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        self.updated_at = now();
    }

    /// Append a field; both key and value must be non-blank
    pub fn add_field(&mut self, key: &str, value: &str) -> bool {
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return false;
        }
        self.fields.push(CardField::new(key, value));
        self.updated_at = now();
        true
    }

    pub fn remove_field(&mut self, index: usize) -> Option<CardField> {
        if index >= self.fields.len() {
            return None;
        }
        self.updated_at = now();
        Some(self.fields.remove(index))
    }
}

/// Card title for a selection: trimmed, at most 80 UTF-16 units. An
/// astral char that would straddle the limit is dropped whole.
pub fn title_from_selection(selection: &str) -> String {
    let mut units = 0;
    selection
        .trim()
        .chars()
        .take_while(|c| {
            units += c.len_utf16();
            units <= SELECTION_TITLE_MAX
        })
        .collect()
}
