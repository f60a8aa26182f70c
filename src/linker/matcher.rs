//! LinkMatcher: card-title occurrences in plain text
//!
//! Titles are tried longest first. Each title is scanned over the full
//! text for case-insensitive literal matches. A match is accepted only
//! if the chars around it are not word chars and it overlaps nothing
//! accepted before it. So
//! "Dr. Evelyn Stone" is tagged whole and a shorter "Evelyn" card can
//! never fragment it.
//!
//! Spans are UTF-16 offsets over the plain-text projection and come back
//! ordered by `start`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::linker::index::CardIndex;
use crate::linker::text::TextProjection;

// =============================================================================
// Types
// =============================================================================

/// A tagged occurrence of a card title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSpan {
    pub start: usize,
    pub length: usize,
    pub card_id: String,
}

impl TagSpan {
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn overlaps(&self, other: &TagSpan) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    pub fn covers(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end()
    }
}

/// Spans plus the cards a pass had to skip
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub spans: Vec<TagSpan>,
    /// Cards whose pattern could not be compiled
    pub skipped_cards: Vec<String>,
}

// =============================================================================
// Accepted-span bookkeeping
// =============================================================================

/// Non-overlapping byte ranges keyed by start.
///
/// Because accepted ranges never overlap, the only one that can collide
/// with a candidate is the one with the greatest start below the
/// candidate's end.
#[derive(Debug, Default)]
struct Accepted {
    by_start: BTreeMap<usize, (usize, usize)>, // start -> (end, entry index)
}

impl Accepted {
    fn collides(&self, start: usize, end: usize) -> bool {
        self.by_start
            .range(..end)
            .next_back()
            .map_or(false, |(_, &(prev_end, _))| prev_end > start)
    }

    fn insert(&mut self, start: usize, end: usize, entry: usize) {
        self.by_start.insert(start, (end, entry));
    }
}

// =============================================================================
// Word bounds
// =============================================================================

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A hit is bounded when the chars on either side of it, where present,
/// are not word chars. Checked on the text, not the title, so titles
/// that start or end in punctuation ("Dr.", "C++") still link.
fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.map_or(false, is_word_char) && !after.map_or(false, is_word_char)
}

// =============================================================================
// Matching
// =============================================================================

/// Compute the tag spans for `text`.
pub fn compute_spans(text: &str, index: &CardIndex) -> Vec<TagSpan> {
    compute_spans_with_report(text, index).spans
}

/// Same as [`compute_spans`] but also reports skipped cards.
pub fn compute_spans_with_report(text: &str, index: &CardIndex) -> MatchOutcome {
    let projection = TextProjection::new(text);
    compute_spans_projected(&projection, index)
}

/// Match against an existing projection (saves rebuilding the offset
/// table when the caller already has one).
pub fn compute_spans_projected(projection: &TextProjection, index: &CardIndex) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let text = projection.text();
    if text.is_empty() || index.is_empty() {
        return outcome;
    }

    let mut accepted = Accepted::default();

    for (i, entry) in index.entries().iter().enumerate() {
        let pattern = match entry.pattern() {
            Some(p) => p,
            None => {
                outcome.skipped_cards.push(entry.id.clone());
                continue;
            }
        };

        // Advance one char past each candidate start, so a rejected hit
        // never hides a bounded one that begins inside it.
        let mut at = 0;
        while at <= text.len() {
            let m = match pattern.find_at(text, at) {
                Some(m) => m,
                None => break,
            };
            at = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);

            if m.start() == m.end() || !is_bounded(text, m.start(), m.end()) {
                continue;
            }
            if accepted.collides(m.start(), m.end()) {
                continue;
            }
            accepted.insert(m.start(), m.end(), i);
        }
    }

    let entries = index.entries();
    outcome.spans = accepted
        .by_start
        .into_iter()
        .map(|(start, (end, i))| {
            let start16 = projection.to_utf16(start);
            TagSpan {
                start: start16,
                length: projection.to_utf16(end) - start16,
                card_id: entries[i].id.clone(),
            }
        })
        .collect();

    outcome
}
