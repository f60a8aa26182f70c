//! Editor surface: formatting layers over the active chapter
//!
//! The view keeps two independent layers over the same UTF-16 text:
//! card tags (rewritten by every relink pass) and annotation highlights
//! (written when an annotation is created and replayed on load). A pass
//! only ever clears the tag layer.

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};
use crate::linker::matcher::TagSpan;

/// What a relink pass and the annotation store need from the view
pub trait TagSurface {
    /// Current document length in UTF-16 units
    fn doc_len(&self) -> usize;

    /// Remove every card tag. Highlights stay.
    fn clear_tags(&mut self);

    /// Tag a span. Out-of-range spans are rejected with `InvalidRange`.
    fn apply_tag(&mut self, span: &TagSpan) -> Result<()>;

    /// Highlight an annotation range. Out-of-range is rejected.
    fn apply_highlight(&mut self, index: usize, length: usize, annotation_id: &str) -> Result<()>;

    /// Remove every highlight. Tags stay.
    fn clear_highlights(&mut self);
}

/// A highlighted annotation range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub index: usize,
    pub length: usize,
    pub annotation_id: String,
}

impl Highlight {
    pub fn covers(&self, offset: usize) -> bool {
        offset >= self.index && offset - self.index < self.length
    }
}

fn check_range(start: usize, length: usize, doc_len: usize) -> Result<()> {
    match start.checked_add(length) {
        Some(end) if length > 0 && end <= doc_len => Ok(()),
        _ => Err(LinkError::InvalidRange {
            start,
            length,
            doc_len,
        }),
    }
}

// =============================================================================
// EditorSurface
// =============================================================================

/// In-memory formatting model for the open chapter. The host renders
/// `tags()` and `highlights()` after each change.
#[derive(Debug, Clone, Default)]
pub struct EditorSurface {
    doc_len: usize,
    tags: Vec<TagSpan>,
    highlights: Vec<Highlight>,
}

impl EditorSurface {
    pub fn new(doc_len: usize) -> Self {
        Self {
            doc_len,
            ..Self::default()
        }
    }

    /// Load a different document: both layers start empty
    pub fn reset(&mut self, doc_len: usize) {
        self.doc_len = doc_len;
        self.tags.clear();
        self.highlights.clear();
    }

    /// Text changed under the view. Existing formatting is left where it
    /// is until the next pass or replay.
    pub fn set_doc_len(&mut self, doc_len: usize) {
        self.doc_len = doc_len;
    }

    /// Tags ordered by start
    pub fn tags(&self) -> &[TagSpan] {
        &self.tags
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Click contract: the card tagged at `offset`, if any
    pub fn card_at(&self, offset: usize) -> Option<&str> {
        let i = self.tags.partition_point(|t| t.start <= offset);
        if i == 0 {
            return None;
        }
        let tag = &self.tags[i - 1];
        tag.covers(offset).then_some(tag.card_id.as_str())
    }

    /// Annotation ids highlighted at `offset`
    pub fn annotations_at(&self, offset: usize) -> Vec<&str> {
        self.highlights
            .iter()
            .filter(|h| h.covers(offset))
            .map(|h| h.annotation_id.as_str())
            .collect()
    }
}

impl TagSurface for EditorSurface {
    fn doc_len(&self) -> usize {
        self.doc_len
    }

    fn clear_tags(&mut self) {
        self.tags.clear();
    }

    fn apply_tag(&mut self, span: &TagSpan) -> Result<()> {
        check_range(span.start, span.length, self.doc_len)?;
        // Keep the layer sorted; a pass applies spans in order so this is
        // normally a push.
        let i = self.tags.partition_point(|t| t.start <= span.start);
        // Re-tagging the same range replaces, as an inline format would
        if i > 0 && self.tags[i - 1].start == span.start {
            self.tags[i - 1] = span.clone();
        } else {
            self.tags.insert(i, span.clone());
        }
        Ok(())
    }

    fn apply_highlight(&mut self, index: usize, length: usize, annotation_id: &str) -> Result<()> {
        check_range(index, length, self.doc_len)?;
        if !self.highlights.iter().any(|h| h.annotation_id == annotation_id) {
            self.highlights.push(Highlight {
                index,
                length,
                annotation_id: annotation_id.to_string(),
            });
        }
        Ok(())
    }

    fn clear_highlights(&mut self) {
        self.highlights.clear();
    }
}
