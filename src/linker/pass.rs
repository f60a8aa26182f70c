//! Relink pass: clear every tag, then apply a freshly computed span set
//!
//! A pass is total and idempotent, so whatever an earlier pass left on
//! the surface, the end state depends only on the current text and the
//! current index. Spans the surface rejects (text changed between
//! computing and applying) are counted and skipped.

use serde::{Deserialize, Serialize};

use crate::linker::index::CardIndex;
use crate::linker::matcher::compute_spans_projected;
use crate::linker::scheduler::Trigger;
use crate::linker::surface::TagSurface;
use crate::linker::text::TextProjection;

/// Outcome of one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelinkReport {
    /// Chapter the pass ran against; None when nothing is open
    pub chapter_id: Option<String>,
    pub trigger: Trigger,
    pub spans_applied: usize,
    /// Spans the surface rejected as out of range
    pub spans_skipped: usize,
    /// Cards whose pattern could not be compiled
    pub cards_skipped: Vec<String>,
    pub elapsed_us: u64,
}

impl RelinkReport {
    pub fn empty(trigger: Trigger) -> Self {
        Self {
            chapter_id: None,
            trigger,
            spans_applied: 0,
            spans_skipped: 0,
            cards_skipped: Vec::new(),
            elapsed_us: 0,
        }
    }
}

/// Run one pass of `text` against `index` onto `surface`.
pub fn relink_pass<S: TagSurface>(
    text: &str,
    index: &CardIndex,
    surface: &mut S,
    trigger: Trigger,
) -> RelinkReport {
    let start = instant::Instant::now();
    let mut report = RelinkReport::empty(trigger);

    surface.clear_tags();

    let projection = TextProjection::new(text);
    let outcome = compute_spans_projected(&projection, index);

    for span in &outcome.spans {
        match surface.apply_tag(span) {
            Ok(()) => report.spans_applied += 1,
            Err(e) => {
                report.spans_skipped += 1;
                crate::console_warn!("[RelinkPass] Skipping span for {}: {}", span.card_id, e);
            }
        }
    }

    report.cards_skipped = outcome.skipped_cards;
    report.elapsed_us = start.elapsed().as_micros() as u64;

    crate::console_log!(
        "[RelinkPass] {:?}: {} tags, {} skipped ({}us)",
        trigger,
        report.spans_applied,
        report.spans_skipped,
        report.elapsed_us
    );
    report
}
