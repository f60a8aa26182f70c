//! Project search: chapters and cards containing a query
//!
//! A plain case-insensitive substring test over a per-item haystack.
//! Chapters come first in chapter order, then cards in library order.

use serde::{Deserialize, Serialize};

use crate::model::{Card, Chapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchKind {
    Chapter,
    Card,
}

/// One search result, ready for a result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub kind: SearchKind,
    pub id: String,
    pub label: String,
}

fn chapter_haystack(chapter: &Chapter) -> String {
    format!("{} {}", chapter.title, chapter.plain_text()).to_lowercase()
}

fn card_haystack(card: &Card) -> String {
    let fields: Vec<String> = card
        .fields
        .iter()
        .map(|f| format!("{}:{}", f.key, f.value))
        .collect();
    format!(
        "{} {} {} {}",
        card.category,
        card.title,
        card.body,
        fields.join(" ")
    )
    .to_lowercase()
}

/// Search chapters then cards. A blank query finds nothing.
pub fn search(query: &str, chapters: &[Chapter], library: &[Card]) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let chapter_hits = chapters
        .iter()
        .filter(|c| chapter_haystack(c).contains(&needle))
        .map(|c| SearchHit {
            kind: SearchKind::Chapter,
            id: c.id.clone(),
            label: c.title.clone(),
        });

    let card_hits = library
        .iter()
        .filter(|c| card_haystack(c).contains(&needle))
        .map(|c| SearchHit {
            kind: SearchKind::Card,
            id: c.id.clone(),
            label: format!("{} - {}", c.category, c.title),
        });

    chapter_hits.chain(card_hits).collect()
}
