//! JavaScript bindings
//!
//! `LinkEngine` wraps a [`Workbench`] for the editor page. The page calls
//! `tick()` from a timer armed with `nextDeadlineMs()`, renders `tags()`
//! and `highlights()` after every call that changes them, and receives
//! saves through the handler given to `setSaveHandler`.

use instant::Instant;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::LinkerConfig;
use crate::error::{LinkError, Result};
use crate::linker::index::CardIndex;
use crate::linker::matcher::compute_spans;
use crate::linker::text::{extract_plain_text, RichText};
use crate::linker::workbench::{ProjectStore, Workbench};
use crate::model::{export_filename, Card, CardDraft, CardPatch, ProjectEnvelope};

impl From<LinkError> for JsValue {
    fn from(e: LinkError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}

/// Plain objects rather than `Map`s, so content and comment maps read
/// like the JSON they came from
fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(
    value: JsValue,
    what: &str,
) -> std::result::Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

// =============================================================================
// Save handler
// =============================================================================

/// Hands the serialized envelope to a JS function. A throwing handler
/// is a failed save.
#[derive(Default)]
struct CallbackStore {
    handler: Option<js_sys::Function>,
}

impl ProjectStore for CallbackStore {
    fn save(&mut self, envelope: &ProjectEnvelope) -> Result<()> {
        let handler = match &self.handler {
            Some(handler) => handler,
            None => return Err(LinkError::Store("no save handler set".to_string())),
        };
        let json = envelope.to_json_pretty()?;
        handler
            .call1(&JsValue::NULL, &JsValue::from_str(&json))
            .map(|_| ())
            .map_err(|e| {
                LinkError::Store(e.as_string().unwrap_or_else(|| "save handler threw".to_string()))
            })
    }
}

// =============================================================================
// LinkEngine
// =============================================================================

#[wasm_bindgen]
pub struct LinkEngine {
    bench: Workbench,
    store: CallbackStore,
}

#[wasm_bindgen]
impl LinkEngine {
    /// New project. `config` is an optional partial `LinkerConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<LinkEngine, JsValue> {
        let config: LinkerConfig = if config.is_undefined() || config.is_null() {
            LinkerConfig::default()
        } else {
            from_js(config, "config")?
        };
        Ok(LinkEngine {
            bench: Workbench::new("", config),
            store: CallbackStore::default(),
        })
    }

    /// Replace the project with an imported file
    #[wasm_bindgen(js_name = importProject)]
    pub fn import_project(&mut self, json: &str) -> std::result::Result<(), JsValue> {
        self.bench = Workbench::import(json, self.bench.config().clone())?;
        Ok(())
    }

    #[wasm_bindgen(js_name = exportProject)]
    pub fn export_project(&self) -> std::result::Result<String, JsValue> {
        Ok(self.bench.export_envelope().to_json_pretty()?)
    }

    #[wasm_bindgen(js_name = exportFilename)]
    pub fn export_filename(&self) -> String {
        export_filename(&self.bench.meta().project_name)
    }

    // ========================================================================
    // Chapters
    // ========================================================================

    #[wasm_bindgen(js_name = openChapter)]
    pub fn open_chapter(&mut self, id: &str) -> std::result::Result<JsValue, JsValue> {
        let report = self.bench.open_chapter(id)?;
        to_js(&report)
    }

    #[wasm_bindgen(js_name = addChapter)]
    pub fn add_chapter(&mut self, title: Option<String>) -> String {
        self.bench.add_chapter(title.as_deref())
    }

    #[wasm_bindgen(js_name = renameChapter)]
    pub fn rename_chapter(&mut self, id: &str, title: &str) -> std::result::Result<(), JsValue> {
        Ok(self.bench.rename_chapter(id, title)?)
    }

    #[wasm_bindgen(js_name = deleteChapter)]
    pub fn delete_chapter(&mut self, id: &str) -> std::result::Result<JsValue, JsValue> {
        let report = self.bench.delete_chapter(id)?;
        to_js(&report)
    }

    /// Editor content changed (Delta-like `{ ops: [...] }`)
    #[wasm_bindgen(js_name = editActive)]
    pub fn edit_active(&mut self, content: JsValue) -> std::result::Result<(), JsValue> {
        let content: serde_json::Value = from_js(content, "content")?;
        Ok(self.bench.edit_active(RichText(content), Instant::now())?)
    }

    #[wasm_bindgen(js_name = activeChapterId)]
    pub fn active_chapter_id(&self) -> Option<String> {
        self.bench.active_id().map(str::to_string)
    }

    #[wasm_bindgen]
    pub fn chapters(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.bench.chapters())
    }

    // ========================================================================
    // Cards
    // ========================================================================

    #[wasm_bindgen(js_name = createCard)]
    pub fn create_card(&mut self, draft: JsValue) -> std::result::Result<String, JsValue> {
        let draft: CardDraft = from_js(draft, "card")?;
        Ok(self.bench.create_card(draft))
    }

    #[wasm_bindgen(js_name = updateCard)]
    pub fn update_card(&mut self, id: &str, patch: JsValue) -> std::result::Result<JsValue, JsValue> {
        let patch: CardPatch = from_js(patch, "card update")?;
        let report = self.bench.update_card(id, patch)?;
        to_js(&report)
    }

    #[wasm_bindgen(js_name = addCardField)]
    pub fn add_card_field(&mut self, id: &str, key: &str, value: &str) -> std::result::Result<bool, JsValue> {
        Ok(self.bench.add_card_field(id, key, value)?)
    }

    #[wasm_bindgen(js_name = removeCardField)]
    pub fn remove_card_field(&mut self, id: &str, index: usize) -> std::result::Result<bool, JsValue> {
        Ok(self.bench.remove_card_field(id, index)?.is_some())
    }

    #[wasm_bindgen(js_name = deleteCard)]
    pub fn delete_card(&mut self, id: &str) -> std::result::Result<(), JsValue> {
        self.bench.delete_card(id)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = cardFromSelection)]
    pub fn card_from_selection(
        &mut self,
        index: usize,
        length: usize,
        category: Option<String>,
    ) -> std::result::Result<String, JsValue> {
        Ok(self
            .bench
            .card_from_selection(index, length, category.as_deref())?)
    }

    #[wasm_bindgen]
    pub fn library(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.bench.library())
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    #[wasm_bindgen]
    pub fn annotate(&mut self, index: usize, length: usize, text: &str) -> std::result::Result<String, JsValue> {
        Ok(self.bench.annotate(index, length, text)?)
    }

    #[wasm_bindgen(js_name = deleteAnnotation)]
    pub fn delete_annotation(&mut self, id: &str) -> std::result::Result<(), JsValue> {
        self.bench.delete_annotation(id)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = clearAnnotations)]
    pub fn clear_annotations(&mut self) -> std::result::Result<(), JsValue> {
        Ok(self.bench.clear_annotations()?)
    }

    #[wasm_bindgen]
    pub fn annotations(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.bench.active_annotations())
    }

    // ========================================================================
    // Project
    // ========================================================================

    #[wasm_bindgen(js_name = renameProject)]
    pub fn rename_project(&mut self, name: &str) {
        self.bench.rename_project(name);
    }

    #[wasm_bindgen(js_name = setCategories)]
    pub fn set_categories(&mut self, csv: &str) {
        self.bench.set_categories_csv(csv);
    }

    #[wasm_bindgen]
    pub fn meta(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(self.bench.meta())
    }

    /// `[{ kind: "chapter" | "card", id, label }]`, chapters first
    #[wasm_bindgen]
    pub fn search(&self, query: &str) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.bench.search(query))
    }

    /// Project word and character totals: `{ words, chars }`
    #[wasm_bindgen]
    pub fn totals(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.bench.totals())
    }

    // ========================================================================
    // Run loop and view
    // ========================================================================

    /// Run due tasks. Returns `{ ran, relink, saveStatus }`.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> std::result::Result<JsValue, JsValue> {
        let report = self.bench.tick(Instant::now(), &mut self.store);
        to_js(&report)
    }

    /// Milliseconds until the next task is due, or undefined when idle
    #[wasm_bindgen(js_name = nextDeadlineMs)]
    pub fn next_deadline_ms(&self) -> Option<f64> {
        self.bench
            .time_until_next(Instant::now())
            .map(|d| d.as_secs_f64() * 1000.0)
    }

    #[wasm_bindgen(js_name = relinkNow)]
    pub fn relink_now(&mut self) -> std::result::Result<JsValue, JsValue> {
        let report = self.bench.relink_now();
        to_js(&report)
    }

    /// Current tag spans, ordered by start
    #[wasm_bindgen]
    pub fn tags(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.bench.surface().tags())
    }

    #[wasm_bindgen]
    pub fn highlights(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.bench.surface().highlights())
    }

    /// Card id for a click at `offset`
    #[wasm_bindgen(js_name = cardAt)]
    pub fn card_at(&self, offset: usize) -> Option<String> {
        self.bench.card_at(offset).map(str::to_string)
    }

    #[wasm_bindgen(js_name = saveStatus)]
    pub fn save_status(&self) -> String {
        self.bench.save_status().as_str().to_string()
    }

    /// `handler(json: string)` receives each debounced save
    #[wasm_bindgen(js_name = setSaveHandler)]
    pub fn set_save_handler(&mut self, handler: js_sys::Function) {
        self.store.handler = Some(handler);
    }
}

// =============================================================================
// Stateless helpers
// =============================================================================

/// Spans for `text` against `cards` (`[{ id, title }]`)
#[wasm_bindgen(js_name = computeSpans)]
pub fn compute_spans_js(text: &str, cards: JsValue) -> std::result::Result<JsValue, JsValue> {
    let cards: Vec<Card> = from_js(cards, "cards")?;
    let index = CardIndex::build(&cards, &LinkerConfig::default());
    to_js(&compute_spans(text, &index))
}

/// Plain-text projection of editor content. Malformed input yields "".
#[wasm_bindgen(js_name = extractPlainText)]
pub fn extract_plain_text_js(content: JsValue) -> String {
    serde_wasm_bindgen::from_value::<serde_json::Value>(content)
        .map(|v| extract_plain_text(&v))
        .unwrap_or_default()
}
