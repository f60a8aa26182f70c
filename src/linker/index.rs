//! Card Index: the lookup-ready projection of the library
//!
//! Rebuilt from scratch on every library mutation. Building is cheap and
//! keeps no incremental state. Each entry carries its compiled pattern:
//! the title escaped as a literal, case-insensitive. Word bounds are
//! checked by the matcher on the characters around each hit.

use regex::{Regex, RegexBuilder};

use crate::config::LinkerConfig;
use crate::error::LinkError;
use crate::linker::text::utf16_len;
use crate::model::Card;

// =============================================================================
// Types
// =============================================================================

/// One linkable card
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub id: String,
    /// Trimmed title, original casing
    pub title: String,
    /// Title length in UTF-16 units (the precedence key)
    pub title_len: usize,
    /// None when the title could not be compiled; skipped by every pass
    pattern: Option<Regex>,
    pattern_error: Option<LinkError>,
}

impl IndexEntry {
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn pattern_error(&self) -> Option<&LinkError> {
        self.pattern_error.as_ref()
    }
}

/// Card index ordered longest-title-first
#[derive(Debug, Clone, Default)]
pub struct CardIndex {
    entries: Vec<IndexEntry>,
}

// =============================================================================
// Building
// =============================================================================

/// Escaped-literal, case-insensitive pattern for a title.
/// Titles are never interpreted as regular expressions.
pub fn literal_pattern(title: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(title))
        .case_insensitive(true)
        .size_limit(size_limit)
        .build()
}

impl CardIndex {
    /// Build from the library in its current order.
    ///
    /// Titles are trimmed; titles shorter than `min_title_len` are dropped.
    /// The sort is stable, so cards with equal-length titles keep library
    /// order (the first one wins a tie in the matcher).
    pub fn build(cards: &[Card], config: &LinkerConfig) -> Self {
        let mut entries: Vec<IndexEntry> = cards
            .iter()
            .filter_map(|card| {
                let title = card.title.trim();
                let title_len = utf16_len(title);
                if title_len < config.min_title_len || title.is_empty() {
                    return None;
                }
                let (pattern, pattern_error) =
                    match literal_pattern(title, config.pattern_size_limit) {
                        Ok(re) => (Some(re), None),
                        Err(e) => {
                            let err = LinkError::Pattern {
                                card_id: card.id.clone(),
                                message: e.to_string(),
                            };
                            crate::console_warn!("[CardIndex] {}", err);
                            (None, Some(err))
                        }
                    };
                Some(IndexEntry {
                    id: card.id.clone(),
                    title: title.to_string(),
                    title_len,
                    pattern,
                    pattern_error,
                })
            })
            .collect();

        entries.sort_by(|a, b| b.title_len.cmp(&a.title_len));
        Self { entries }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Trimmed title of an indexed card
    pub fn title_of(&self, card_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == card_id)
            .map(|e| e.title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardDraft;

    fn card(id: &str, title: &str) -> Card {
        let mut c = Card::from_draft(CardDraft::titled(title), "Characters");
        c.id = id.to_string();
        c.title = title.to_string();
        c
    }

    // -------------------------------------------------------------------------
    // Requirement 1: minimum-length filter on the trimmed title
    // -------------------------------------------------------------------------
    #[test]
    fn test_short_titles_filtered() {
        let index = CardIndex::build(
            &[card("a", "A"), card("b", "  B  "), card("c", "Io"), card("d", "   ")],
            &LinkerConfig::default(),
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.entries()[0].id, "c");
    }

    // -------------------------------------------------------------------------
    // Requirement 2: longest first, stable among equals
    // -------------------------------------------------------------------------
    #[test]
    fn test_sorted_longest_first_stable() {
        let index = CardIndex::build(
            &[
                card("short", "Stone"),
                card("long", "Evelyn Stone"),
                card("twin1", "Ash"),
                card("twin2", "Oak"),
            ],
            &LinkerConfig::default(),
        );
        let ids: Vec<&str> = index.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["long", "short", "twin1", "twin2"]);
    }

    // -------------------------------------------------------------------------
    // Requirement 3: titles keep casing and inner whitespace
    // -------------------------------------------------------------------------
    #[test]
    fn test_title_preserved() {
        let index = CardIndex::build(&[card("x", "  Dr.  Mira ")], &LinkerConfig::default());
        assert_eq!(index.title_of("x"), Some("Dr.  Mira"));
        assert_eq!(index.entries()[0].title_len, 9);
    }

    // -------------------------------------------------------------------------
    // Requirement 4: regex metacharacters are literal
    // -------------------------------------------------------------------------
    #[test]
    fn test_pattern_is_literal() {
        let re = literal_pattern("a.c (x)", 1 << 20).unwrap();
        assert!(re.is_match("see a.c (x) here"));
        assert!(re.is_match("SEE A.C (X) HERE"));
        assert!(!re.is_match("see abc (x) here"));
        assert!(!re.is_match("see a.c x here"));
    }

    // -------------------------------------------------------------------------
    // Requirement 5: a pattern that fails to compile is kept but inert
    // -------------------------------------------------------------------------
    #[test]
    fn test_oversized_pattern_kept_without_regex() {
        let config = LinkerConfig {
            pattern_size_limit: 16,
            ..LinkerConfig::default()
        };
        let index = CardIndex::build(&[card("big", "A rather long card title")], &config);
        assert_eq!(index.len(), 1);
        assert!(index.entries()[0].pattern().is_none());
        assert!(matches!(
            index.entries()[0].pattern_error(),
            Some(LinkError::Pattern { card_id, .. }) if card_id == "big"
        ));
    }
}
