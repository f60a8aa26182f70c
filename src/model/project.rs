use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::now;

pub const DEFAULT_PROJECT_NAME: &str = "My Novel";

/// Project-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    /// Ordered, unique by value
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "now")]
    pub updated_at: DateTime<Utc>,
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

impl ProjectMeta {
    pub fn new(name: &str, categories: Vec<String>) -> Self {
        let ts = now();
        let mut meta = Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            categories: Vec::new(),
            created_at: ts,
            updated_at: ts,
        };
        meta.rename(name);
        meta.categories = dedupe(categories);
        meta
    }

    /// Blank names fall back to "My Novel"
    pub fn rename(&mut self, name: &str) {
        let name = name.trim();
        self.project_name = if name.is_empty() {
            DEFAULT_PROJECT_NAME.to_string()
        } else {
            name.to_string()
        };
    }

    /// Replace categories from the settings field. An empty list falls
    /// back to `fallback`. Cards keep whatever category value they had.
    pub fn set_categories_csv(&mut self, csv: &str, fallback: &[String]) {
        let cats = split_comma(csv);
        self.categories = if cats.is_empty() {
            dedupe(fallback.to_vec())
        } else {
            dedupe(cats)
        };
    }

    /// Append a category if it is not already declared
    pub fn ensure_category(&mut self, category: &str) -> bool {
        if self.categories.iter().any(|c| c == category) {
            return false;
        }
        self.categories.push(category.to_string());
        true
    }

    /// First declared category, or the first fallback
    pub fn first_category(&self, fallback: &[String]) -> String {
        self.categories
            .first()
            .or_else(|| fallback.first())
            .cloned()
            .unwrap_or_else(|| "Characters".to_string())
    }

    pub fn touch(&mut self) {
        self.updated_at = now();
    }
}

/// Split on commas, trim, drop empties
pub fn split_comma(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_string)
        .collect()
}

fn dedupe(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
