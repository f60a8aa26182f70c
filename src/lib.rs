//! LinkCore: conditional card links for a browser-local writing workbench
//!
//! A Rust/WASM engine that keeps a chapter's card references in sync with
//! the library. Every card title is a case-insensitive literal, matched
//! only where it stands as whole words; wherever a title occurs in the open chapter
//! the text is tagged with the card's id so the editor can render it as
//! a clickable reference.
//!
//! # Architecture
//!
//! ## Linker
//! - `linker/text.rs` - Plain-text projection of rich content, UTF-16 offsets
//! - `linker/index.rs` - CardIndex: compiled titles, longest first
//! - `linker/matcher.rs` - Non-overlapping span computation
//! - `linker/surface.rs` - EditorSurface: tag and highlight layers
//! - `linker/annotations.rs` - AnnotationStore: per-chapter comments
//! - `linker/scheduler.rs` - RelinkScheduler: debounced task coalescing
//! - `linker/pass.rs` - Clear-then-reapply relink pass
//! - `linker/search.rs` - Substring search over chapters and cards
//! - `linker/workbench.rs` - Workbench: the application state
//!
//! ## Project
//! - `model/` - Chapter, Card, Annotation, ProjectMeta, export envelope
//! - `stats.rs` - Word and character counts
//! - `config.rs` - LinkerConfig and defaults
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { LinkEngine } from 'linkcore';
//!
//! await init();
//!
//! const engine = new LinkEngine({ relinkDebounceMs: 250 });
//! engine.setSaveHandler((json) => localStorage.setItem('project', json));
//!
//! const id = engine.createCard({ title: 'Dr. Mira Elsk', category: 'Characters' });
//! engine.editActive({ ops: [{ insert: 'Dr. Mira Elsk arrived.\n' }] });
//!
//! // Drive the scheduler from a single timer
//! const ms = engine.nextDeadlineMs();
//! if (ms !== undefined) setTimeout(() => engine.tick(), ms);
//!
//! console.log(engine.tags());    // [{ start: 0, length: 13, cardId: id }]
//! console.log(engine.cardAt(4)); // id
//! ```

#[macro_use]
mod log;

pub mod config;
pub mod error;
pub mod linker;
pub mod model;
pub mod stats;
pub mod wasm;

pub use config::LinkerConfig;
pub use error::{LinkError, Result};
pub use linker::*;
pub use model::*;
pub use stats::{count_words_chars, TextStats};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("linkcore v{}", env!("CARGO_PKG_VERSION"))
}
