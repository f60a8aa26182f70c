//! Workbench: the explicit application state
//!
//! Owns the project (meta, chapters, library, annotations), the derived
//! card index, the editor surface for the open chapter, and the
//! scheduler. Every mutation goes through here so the index and the
//! surface can never disagree with the library.
//!
//! Card mutations, chapter deletion and document switches relink before
//! returning. Keystrokes only record intent; the host calls `tick` from
//! its timer and the due pass reads whatever the state is at that point.

use instant::Instant;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LinkerConfig;
use crate::error::{LinkError, Result};
use crate::linker::annotations::AnnotationStore;
use crate::linker::index::CardIndex;
use crate::linker::pass::{relink_pass, RelinkReport};
use crate::linker::scheduler::{Latency, RelinkScheduler, TaskKind, Trigger};
use crate::linker::search::{search, SearchHit};
use crate::linker::surface::{EditorSurface, TagSurface};
use crate::linker::text::{utf16_len, RichText, TextProjection};
use crate::model::{
    title_from_selection, Annotation, Card, CardDraft, CardField, CardPatch, Chapter,
    ProjectData, ProjectEnvelope, ProjectMeta,
};
use crate::stats::{count_words_chars, TextStats};
use chrono::{DateTime, Utc};

// =============================================================================
// Persistence boundary
// =============================================================================

/// Save indicator shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "idle",
            SaveStatus::Saving => "saving",
            SaveStatus::Saved => "saved",
            SaveStatus::Error => "error",
        }
    }
}

/// Where debounced saves go
pub trait ProjectStore {
    fn save(&mut self, envelope: &ProjectEnvelope) -> Result<()>;
}

/// Keeps every saved envelope. `fail_next` makes the next write fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub saved: Vec<ProjectEnvelope>,
    pub fail_next: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ProjectEnvelope> {
        self.saved.last()
    }
}

impl ProjectStore for MemoryStore {
    fn save(&mut self, envelope: &ProjectEnvelope) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(LinkError::Store("storage unavailable".to_string()));
        }
        self.saved.push(envelope.clone());
        Ok(())
    }
}

/// What one `tick` did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub ran: Vec<TaskKind>,
    pub relink: Option<RelinkReport>,
    pub save_status: SaveStatus,
}

// =============================================================================
// Workbench
// =============================================================================

#[derive(Debug)]
pub struct Workbench {
    config: LinkerConfig,
    meta: ProjectMeta,
    draft: Vec<Chapter>,
    library: Vec<Card>,
    annotations: AnnotationStore,
    index: CardIndex,
    active: Option<String>,
    surface: EditorSurface,
    scheduler: RelinkScheduler,
    save_status: SaveStatus,
    last_saved: Option<DateTime<Utc>>,
    last_report: Option<RelinkReport>,
}

impl Workbench {
    /// Fresh project with a single empty chapter
    pub fn new(project_name: &str, config: LinkerConfig) -> Self {
        let meta = ProjectMeta::new(project_name, config.fallback_categories());
        Self::from_data(
            ProjectData {
                meta,
                draft: vec![Chapter::numbered(1)],
                library: Vec::new(),
                comments: Default::default(),
            },
            config,
        )
    }

    /// Load persisted data. A project without chapters gets one; a
    /// project without categories gets the configured defaults. The
    /// first chapter is opened and linked.
    pub fn from_data(data: ProjectData, config: LinkerConfig) -> Self {
        let ProjectData {
            mut meta,
            mut draft,
            library,
            comments,
        } = data;

        if meta.categories.is_empty() {
            meta.categories = config.fallback_categories();
        }
        if draft.is_empty() {
            draft.push(Chapter::numbered(1));
        }

        let index = CardIndex::build(&library, &config);
        let scheduler = RelinkScheduler::new(&config);
        let first = draft.first().map(|c| c.id.clone());

        let mut wb = Self {
            config,
            meta,
            draft,
            library,
            annotations: AnnotationStore::from_map(comments),
            index,
            active: None,
            surface: EditorSurface::default(),
            scheduler,
            save_status: SaveStatus::Idle,
            last_saved: None,
            last_report: None,
        };
        if let Some(id) = first {
            wb.switch_to(&id, Trigger::ProjectImported);
        }
        wb
    }

    /// Import a project file (envelope or bare data object)
    pub fn import(json: &str, config: LinkerConfig) -> Result<Self> {
        let data = ProjectEnvelope::parse(json)?;
        let wb = Self::from_data(data, config);
        crate::console_log!(
            "[Workbench] Imported \"{}\": {} chapters, {} cards",
            wb.meta.project_name,
            wb.draft.len(),
            wb.library.len()
        );
        Ok(wb)
    }

    /// Snapshot of the whole project for export or saving
    pub fn export_envelope(&self) -> ProjectEnvelope {
        ProjectEnvelope::new(ProjectData {
            meta: self.meta.clone(),
            draft: self.draft.clone(),
            library: self.library.clone(),
            comments: self.annotations.to_map(),
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    pub fn meta(&self) -> &ProjectMeta {
        &self.meta
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.draft
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.draft.iter().find(|c| c.id == id)
    }

    pub fn library(&self) -> &[Card] {
        &self.library
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.library.iter().find(|c| c.id == id)
    }

    pub fn index(&self) -> &CardIndex {
        &self.index
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_chapter(&self) -> Option<&Chapter> {
        self.active.as_deref().and_then(|id| self.chapter(id))
    }

    pub fn surface(&self) -> &EditorSurface {
        &self.surface
    }

    pub fn scheduler(&self) -> &RelinkScheduler {
        &self.scheduler
    }

    /// Annotations on the open chapter, newest first
    pub fn active_annotations(&self) -> &[Annotation] {
        match self.active.as_deref() {
            Some(id) => self.annotations.list(id),
            None => &[],
        }
    }

    pub fn annotations(&self) -> &AnnotationStore {
        &self.annotations
    }

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn last_report(&self) -> Option<&RelinkReport> {
        self.last_report.as_ref()
    }

    /// Click contract: card tagged at `offset` in the open chapter
    pub fn card_at(&self, offset: usize) -> Option<&str> {
        self.surface.card_at(offset)
    }

    pub fn totals(&self) -> TextStats {
        self.draft
            .iter()
            .map(|c| count_words_chars(&c.plain_text()))
            .fold(TextStats::default(), |acc, s| acc + s)
    }

    /// Chapters then cards containing `query`, case-insensitively
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        search(query, &self.draft, &self.library)
    }

    pub fn chapter_stats(&self, id: &str) -> Result<TextStats> {
        self.chapter(id)
            .map(|c| count_words_chars(&c.plain_text()))
            .ok_or_else(|| LinkError::UnknownChapter(id.to_string()))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_next(now)
    }

    // -------------------------------------------------------------------------
    // Relinking
    // -------------------------------------------------------------------------

    /// Pass over the open chapter as it is right now
    fn run_pass(&mut self, trigger: Trigger) -> RelinkReport {
        let active = self
            .active
            .as_deref()
            .and_then(|id| self.draft.iter().find(|c| c.id == id));

        let report = match active {
            Some(chapter) => {
                let text = chapter.plain_text();
                let mut report = relink_pass(&text, &self.index, &mut self.surface, trigger);
                report.chapter_id = Some(chapter.id.clone());
                report
            }
            None => {
                self.surface.clear_tags();
                RelinkReport::empty(trigger)
            }
        };

        self.last_report = Some(report.clone());
        report
    }

    /// Honour a trigger at its latency. Immediate passes make any pending
    /// debounced pass redundant.
    fn request_relink(&mut self, trigger: Trigger, now: Instant) -> Option<RelinkReport> {
        match trigger.latency() {
            Latency::Immediate => {
                self.scheduler.cancel(TaskKind::Relink);
                Some(self.run_pass(trigger))
            }
            Latency::Debounced => {
                self.scheduler.schedule(TaskKind::Relink, now);
                None
            }
        }
    }

    /// Run an immediate pass over the open chapter
    pub fn relink_now(&mut self) -> RelinkReport {
        self.scheduler.cancel(TaskKind::Relink);
        self.run_pass(Trigger::Manual)
    }

    fn mark_dirty(&mut self) {
        self.meta.touch();
        self.scheduler.schedule(TaskKind::Save, Instant::now());
    }

    /// Library changed: rebuild the index and relink before returning
    fn library_changed(&mut self, trigger: Trigger) -> RelinkReport {
        self.index = CardIndex::build(&self.library, &self.config);
        let report = self
            .request_relink(trigger, Instant::now())
            .unwrap_or_else(|| RelinkReport::empty(trigger));
        self.mark_dirty();
        report
    }

    // -------------------------------------------------------------------------
    // Chapters
    // -------------------------------------------------------------------------

    /// Load a chapter into the surface: both layers start over, stored
    /// highlights are replayed, then tags are computed.
    fn switch_to(&mut self, id: &str, trigger: Trigger) -> Option<RelinkReport> {
        let doc_len = utf16_len(&self.chapter(id)?.plain_text());
        self.active = Some(id.to_string());
        self.surface.reset(doc_len);
        self.annotations.replay(id, &mut self.surface);
        self.request_relink(trigger, Instant::now())
    }

    pub fn open_chapter(&mut self, id: &str) -> Result<RelinkReport> {
        self.switch_to(id, Trigger::DocumentSwitched)
            .ok_or_else(|| LinkError::UnknownChapter(id.to_string()))
    }

    /// Append a chapter and open it. A blank title becomes "Chapter N".
    pub fn add_chapter(&mut self, title: Option<&str>) -> String {
        let mut chapter = Chapter::numbered(self.draft.len() + 1);
        if let Some(title) = title {
            chapter.rename(title);
        }
        let id = chapter.id.clone();
        self.draft.push(chapter);
        self.switch_to(&id, Trigger::DocumentSwitched);
        self.mark_dirty();
        id
    }

    pub fn rename_chapter(&mut self, id: &str, title: &str) -> Result<()> {
        let chapter = self
            .draft
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LinkError::UnknownChapter(id.to_string()))?;
        chapter.rename(title);
        self.mark_dirty();
        Ok(())
    }

    /// Keystroke path: replace the open chapter's content. Relink and
    /// save are both debounced from `now`.
    pub fn edit_active(&mut self, content: RichText, now: Instant) -> Result<()> {
        let id = self.active.clone().ok_or(LinkError::NoActiveChapter)?;
        let chapter = self
            .draft
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(LinkError::UnknownChapter(id))?;

        chapter.content = content;
        chapter.updated_at = Utc::now();
        let doc_len = utf16_len(&chapter.plain_text());
        self.surface.set_doc_len(doc_len);

        self.request_relink(Trigger::Keystroke, now);
        self.meta.touch();
        self.scheduler.schedule(TaskKind::Save, now);
        Ok(())
    }

    /// Delete a chapter and its annotations. If it was open, the first
    /// remaining chapter is opened; with none left nothing is active.
    pub fn delete_chapter(&mut self, id: &str) -> Result<RelinkReport> {
        let pos = self
            .draft
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LinkError::UnknownChapter(id.to_string()))?;
        self.draft.remove(pos);
        self.annotations.remove_chapter(id);
        self.mark_dirty();

        if self.active.as_deref() != Some(id) {
            self.scheduler.cancel(TaskKind::Relink);
            return Ok(self.run_pass(Trigger::ChapterDeleted));
        }

        match self.draft.first().map(|c| c.id.clone()) {
            Some(next) => Ok(self
                .switch_to(&next, Trigger::ChapterDeleted)
                .unwrap_or_else(|| RelinkReport::empty(Trigger::ChapterDeleted))),
            None => {
                self.active = None;
                self.surface.reset(0);
                self.scheduler.cancel(TaskKind::Relink);
                Ok(self.run_pass(Trigger::ChapterDeleted))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Cards
    // -------------------------------------------------------------------------

    fn card_mut(&mut self, id: &str) -> Result<&mut Card> {
        self.library
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| LinkError::UnknownCard(id.to_string()))
    }

    /// Add a card to the library. Its title starts linking immediately.
    pub fn create_card(&mut self, draft: CardDraft) -> String {
        let category = self.meta.first_category(&self.config.fallback_categories());
        let card = Card::from_draft(draft, &category);
        let id = card.id.clone();
        self.library.push(card);
        self.library_changed(Trigger::CardCreated);
        id
    }

    pub fn update_card(&mut self, id: &str, patch: CardPatch) -> Result<RelinkReport> {
        self.card_mut(id)?.apply(patch);
        Ok(self.library_changed(Trigger::CardUpdated))
    }

    /// Returns false when key or value is blank
    pub fn add_card_field(&mut self, id: &str, key: &str, value: &str) -> Result<bool> {
        let added = self.card_mut(id)?.add_field(key, value);
        if added {
            self.library_changed(Trigger::CardUpdated);
        }
        Ok(added)
    }

    pub fn remove_card_field(&mut self, id: &str, index: usize) -> Result<Option<CardField>> {
        let removed = self.card_mut(id)?.remove_field(index);
        if removed.is_some() {
            self.library_changed(Trigger::CardUpdated);
        }
        Ok(removed)
    }

    /// Remove a card. Its tags are gone when this returns.
    pub fn delete_card(&mut self, id: &str) -> Result<Card> {
        let pos = self
            .library
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LinkError::UnknownCard(id.to_string()))?;
        let card = self.library.remove(pos);
        self.library_changed(Trigger::CardDeleted);
        Ok(card)
    }

    /// Create a card titled after a selection of the open chapter.
    ///
    /// An unknown category is added to the project's list; no category
    /// means the first declared one.
    pub fn card_from_selection(
        &mut self,
        index: usize,
        length: usize,
        category: Option<&str>,
    ) -> Result<String> {
        let text = self
            .active_chapter()
            .ok_or(LinkError::NoActiveChapter)?
            .plain_text();
        let projection = TextProjection::new(text);
        let selected = projection
            .slice_utf16(index, length)
            .ok_or(LinkError::InvalidRange {
                start: index,
                length,
                doc_len: projection.len(),
            })?;

        let title = title_from_selection(selected);
        if title.is_empty() {
            return Err(LinkError::EmptySelection);
        }

        let category = match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => {
                self.meta.ensure_category(c);
                c.to_string()
            }
            None => self.meta.first_category(&self.config.fallback_categories()),
        };

        Ok(self.create_card(CardDraft {
            category: Some(category),
            title: Some(title),
            body: selected.trim().to_string(),
            ..CardDraft::default()
        }))
    }

    // -------------------------------------------------------------------------
    // Annotations
    // -------------------------------------------------------------------------

    /// Comment on `index..index + length` of the open chapter
    pub fn annotate(&mut self, index: usize, length: usize, text: &str) -> Result<String> {
        let chapter_id = self.active.clone().ok_or(LinkError::NoActiveChapter)?;
        let doc_len = self.surface.doc_len();
        match index.checked_add(length) {
            Some(end) if length > 0 && end <= doc_len => {}
            _ => {
                return Err(LinkError::InvalidRange {
                    start: index,
                    length,
                    doc_len,
                })
            }
        }
        let doc = self.active_chapter().map(Chapter::plain_text).unwrap_or_default();
        let projection = TextProjection::new(doc);
        let selected = projection
            .slice_utf16(index, length)
            .ok_or(LinkError::InvalidRange {
                start: index,
                length,
                doc_len: projection.len(),
            })?;
        if selected.trim().is_empty() {
            return Err(LinkError::EmptySelection);
        }

        let id = self.annotations.add(&chapter_id, index, length, text)?.id.clone();
        self.surface.apply_highlight(index, length, &id)?;
        self.mark_dirty();
        Ok(id)
    }

    pub fn delete_annotation(&mut self, annotation_id: &str) -> Result<Annotation> {
        let chapter_id = self.active.clone().ok_or(LinkError::NoActiveChapter)?;
        let removed = self.annotations.remove(&chapter_id, annotation_id)?;
        self.surface.clear_highlights();
        self.annotations.replay(&chapter_id, &mut self.surface);
        self.mark_dirty();
        Ok(removed)
    }

    pub fn clear_annotations(&mut self) -> Result<()> {
        let chapter_id = self.active.clone().ok_or(LinkError::NoActiveChapter)?;
        self.annotations.clear(&chapter_id);
        self.surface.clear_highlights();
        self.mark_dirty();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Project settings
    // -------------------------------------------------------------------------

    /// Blank names become "My Novel"
    pub fn rename_project(&mut self, name: &str) {
        self.meta.rename(name);
        self.mark_dirty();
    }

    pub fn set_categories_csv(&mut self, csv: &str) {
        let fallback = self.config.fallback_categories();
        self.meta.set_categories_csv(csv, &fallback);
        self.mark_dirty();
    }

    // -------------------------------------------------------------------------
    // Run loop
    // -------------------------------------------------------------------------

    /// Write the project now. On failure the status shows Error and the
    /// next scheduled save tries again.
    pub fn save_now(&mut self, store: &mut dyn ProjectStore) -> Result<()> {
        self.save_status = SaveStatus::Saving;
        let envelope = self.export_envelope();
        match store.save(&envelope) {
            Ok(()) => {
                self.save_status = SaveStatus::Saved;
                self.last_saved = Some(Utc::now());
                Ok(())
            }
            Err(e) => {
                self.save_status = SaveStatus::Error;
                crate::console_error!("[Workbench] Save failed: {}", e);
                Err(e)
            }
        }
    }

    /// Run every task that is due at `now`, relink before save.
    pub fn tick(&mut self, now: Instant, store: &mut dyn ProjectStore) -> TickReport {
        let ran = self.scheduler.drain_due(now);
        let mut relink = None;

        for kind in &ran {
            match kind {
                TaskKind::Relink => relink = Some(self.run_pass(Trigger::Keystroke)),
                // Failure is recorded in the status
                TaskKind::Save => {
                    let _ = self.save_now(store);
                }
            }
        }

        TickReport {
            ran,
            relink,
            save_status: self.save_status,
        }
    }
}
