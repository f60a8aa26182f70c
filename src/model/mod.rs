//! Workbench records: chapters, cards, annotations, project metadata and
//! the export/import envelope they are persisted in.

pub mod annotation;
pub mod card;
pub mod chapter;
pub mod envelope;
pub mod project;

pub use annotation::*;
pub use card::*;
pub use chapter::*;
pub use envelope::*;
pub use project::*;

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

static ID_SEQ: AtomicU64 = AtomicU64::new(1);

/// Opaque id in the editor's `<prefix>_<hex>_<millis>` shape.
/// Unique within a session; a timestamp suffix keeps ids from separate
/// sessions apart.
pub fn new_id(prefix: &str) -> String {
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}_{:x}_{}", prefix, seq, Utc::now().timestamp_millis())
}

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
