//! Linker: conditional card links over the open chapter
//!
//! # Architecture
//!
//! ```text
//! Library ──► CardIndex ──┐
//!                         ├──► matcher::compute_spans ──► pass ──► EditorSurface (tags)
//! Chapter ──► text ───────┘                                 ▲
//!                                                           │
//! AnnotationStore ──────────────────────────► replay ───────┘ (highlights)
//!
//! RelinkScheduler: intent only, drained by Workbench::tick
//! ```

pub mod annotations;
pub mod index;
pub mod matcher;
pub mod pass;
pub mod scheduler;
pub mod search;
pub mod surface;
pub mod text;
pub mod workbench;

#[cfg(test)]
mod tests;

pub use annotations::AnnotationStore;
pub use index::{CardIndex, IndexEntry};
pub use matcher::{compute_spans, compute_spans_with_report, MatchOutcome, TagSpan};
pub use pass::{relink_pass, RelinkReport};
pub use scheduler::{Latency, RelinkScheduler, TaskKind, Trigger};
pub use search::{search, SearchHit, SearchKind};
pub use surface::{EditorSurface, Highlight, TagSurface};
pub use text::{extract_plain_text, utf16_len, RichText, TextProjection};
pub use workbench::{MemoryStore, ProjectStore, SaveStatus, TickReport, Workbench};
