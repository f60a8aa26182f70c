//! Configuration types and defaults for LinkCore

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// Titles shorter than this (trimmed, UTF-16 units) never link.
pub const DEFAULT_MIN_TITLE_LEN: usize = 2;

/// Keystroke relink quiet period
pub const DEFAULT_RELINK_DEBOUNCE_MS: u64 = 250;

/// Persistence write coalescing window
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 400;

/// Compiled size limit for a single title pattern (bytes)
pub const DEFAULT_PATTERN_SIZE_LIMIT: usize = 1 << 20;

// =============================================================================
// LinkerConfig
// =============================================================================

/// Engine configuration. Every field has a default, so a partial JSON
/// object from the host is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkerConfig {
    /// Minimum trimmed title length for a card to participate. Default: 2
    pub min_title_len: usize,
    /// Debounce for keystroke-driven relink passes. Default: 250ms
    pub relink_debounce_ms: u64,
    /// Debounce for persistence writes. Default: 400ms
    pub save_debounce_ms: u64,
    /// Upper bound on a compiled title pattern. Default: 1 MiB
    pub pattern_size_limit: usize,
    /// Categories used when the project declares none
    pub default_categories: Vec<String>,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            min_title_len: DEFAULT_MIN_TITLE_LEN,
            relink_debounce_ms: DEFAULT_RELINK_DEBOUNCE_MS,
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            pattern_size_limit: DEFAULT_PATTERN_SIZE_LIMIT,
            default_categories: vec!["Characters".to_string(), "Places".to_string()],
        }
    }
}

impl LinkerConfig {
    /// Shorter quiet periods for small documents on fast machines
    pub fn responsive() -> Self {
        Self {
            relink_debounce_ms: 120,
            save_debounce_ms: 250,
            ..Self::default()
        }
    }

    /// Parse from a (possibly partial) JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn relink_debounce(&self) -> Duration {
        Duration::from_millis(self.relink_debounce_ms)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Categories to fall back on, never empty
    pub fn fallback_categories(&self) -> Vec<String> {
        if self.default_categories.is_empty() {
            vec!["Characters".to_string()]
        } else {
            self.default_categories.clone()
        }
    }
}
