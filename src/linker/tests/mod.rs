//! Workbench-level tests for the linker
//!
//! Shared helpers build a workbench over one open chapter.

mod scenario_tests;
mod workbench_tests;

use instant::Instant;

use crate::config::LinkerConfig;
use crate::linker::text::RichText;
use crate::linker::workbench::Workbench;

/// Workbench with one open chapter holding `text`, tags up to date
pub(crate) fn bench(text: &str) -> Workbench {
    let mut wb = Workbench::new("Test", LinkerConfig::default());
    wb.edit_active(RichText::from_plain(text), Instant::now())
        .unwrap();
    wb.relink_now();
    wb
}

/// (start, length, card id) triples of the current tag layer
pub(crate) fn tags(wb: &Workbench) -> Vec<(usize, usize, String)> {
    wb.surface()
        .tags()
        .iter()
        .map(|t| (t.start, t.length, t.card_id.clone()))
        .collect()
}
