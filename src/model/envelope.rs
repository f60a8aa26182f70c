//! Export/import envelope
//!
//! ```json
//! { "format": "bookstudio_project_v3", "exportedAt": "...",
//!   "data": { "meta": {...}, "draft": [...], "library": [...], "comments": {...} } }
//! ```
//!
//! Import also accepts a bare `data` object. Required record fields are
//! checked by serde here so the rest of the crate can rely on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{now, Annotation, Card, Chapter, ProjectMeta};
use crate::error::{LinkError, Result};

pub const PROJECT_FORMAT: &str = "bookstudio_project_v3";

/// Everything a project persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub meta: ProjectMeta,
    #[serde(default)]
    pub draft: Vec<Chapter>,
    #[serde(default)]
    pub library: Vec<Card>,
    /// Chapter id -> annotations, newest first
    #[serde(default)]
    pub comments: BTreeMap<String, Vec<Annotation>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEnvelope {
    pub format: String,
    pub exported_at: DateTime<Utc>,
    pub data: ProjectData,
}

impl ProjectEnvelope {
    pub fn new(data: ProjectData) -> Self {
        Self {
            format: PROJECT_FORMAT.to_string(),
            exported_at: now(),
            data,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a project file. Accepts the envelope or a bare data object.
    pub fn parse(json: &str) -> Result<ProjectData> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| LinkError::Import(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<ProjectData> {
        let data = match value {
            Value::Object(mut obj) => match obj.remove("data") {
                Some(data @ Value::Object(_)) => data,
                Some(_) => return Err(LinkError::Import("`data` is not an object".into())),
                None => Value::Object(obj),
            },
            _ => return Err(LinkError::Import("project file is not an object".into())),
        };

        let data = normalize_meta(data);
        let data: ProjectData =
            serde_json::from_value(data).map_err(|e| LinkError::Import(e.to_string()))?;
        validate(&data)?;
        Ok(data)
    }
}

/// A file without `meta` still imports, with default metadata
fn normalize_meta(mut data: Value) -> Value {
    if let Value::Object(obj) = &mut data {
        if !obj.get("meta").map(Value::is_object).unwrap_or(false) {
            obj.insert("meta".to_string(), Value::Object(Default::default()));
        }
    }
    data
}

fn validate(data: &ProjectData) -> Result<()> {
    if let Some(ch) = data.draft.iter().find(|c| c.id.trim().is_empty()) {
        return Err(LinkError::Import(format!("chapter `{}` has an empty id", ch.title)));
    }
    if let Some(card) = data.library.iter().find(|c| c.id.trim().is_empty()) {
        return Err(LinkError::Import(format!("card `{}` has an empty id", card.title)));
    }
    Ok(())
}

/// File-system friendly export name: lowercase, `[a-z0-9_-]` only
pub fn safe_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "export".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<safe name>.bookstudio.json`
pub fn export_filename(project_name: &str) -> String {
    format!("{}.bookstudio.json", safe_filename(project_name))
}
