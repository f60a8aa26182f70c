//! Annotation Store: per-chapter comment lists
//!
//! Lists are ordered newest first. Ranges share the tag-span coordinate
//! space (UTF-16 units of the plain-text projection) and are not rebased
//! when the chapter is edited: after an insertion before a range, the
//! highlight stays at its old offsets until the user re-annotates.

use std::collections::BTreeMap;

use crate::error::{LinkError, Result};
use crate::linker::surface::TagSurface;
use crate::model::Annotation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStore {
    by_chapter: BTreeMap<String, Vec<Annotation>>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load persisted lists as-is
    pub fn from_map(by_chapter: BTreeMap<String, Vec<Annotation>>) -> Self {
        Self { by_chapter }
    }

    pub fn to_map(&self) -> BTreeMap<String, Vec<Annotation>> {
        self.by_chapter.clone()
    }

    /// Annotations of a chapter, newest first
    pub fn list(&self, chapter_id: &str) -> &[Annotation] {
        self.by_chapter
            .get(chapter_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Add a comment over `index..index + length`.
    ///
    /// The comment must be non-blank and the range non-empty. The range
    /// is not checked against the text here; the caller validates it
    /// against the surface it came from.
    pub fn add(
        &mut self,
        chapter_id: &str,
        index: usize,
        length: usize,
        text: &str,
    ) -> Result<&Annotation> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LinkError::EmptyComment);
        }
        if length == 0 {
            return Err(LinkError::InvalidRange {
                start: index,
                length,
                doc_len: 0,
            });
        }

        let list = self.by_chapter.entry(chapter_id.to_string()).or_default();
        list.insert(0, Annotation::new(index, length, text));
        Ok(&list[0])
    }

    pub fn remove(&mut self, chapter_id: &str, annotation_id: &str) -> Result<Annotation> {
        let list = self
            .by_chapter
            .get_mut(chapter_id)
            .ok_or_else(|| LinkError::UnknownAnnotation(annotation_id.to_string()))?;
        let pos = list
            .iter()
            .position(|a| a.id == annotation_id)
            .ok_or_else(|| LinkError::UnknownAnnotation(annotation_id.to_string()))?;
        Ok(list.remove(pos))
    }

    /// Drop every annotation of a chapter, keeping the (empty) entry
    pub fn clear(&mut self, chapter_id: &str) {
        self.by_chapter.insert(chapter_id.to_string(), Vec::new());
    }

    /// Cascade for chapter deletion
    pub fn remove_chapter(&mut self, chapter_id: &str) -> Option<Vec<Annotation>> {
        self.by_chapter.remove(chapter_id)
    }

    /// Re-apply every highlight of a chapter to the surface. Ranges that
    /// no longer fit the text are skipped. Returns how many were applied.
    pub fn replay<S: TagSurface>(&self, chapter_id: &str, surface: &mut S) -> usize {
        let mut applied = 0;
        for a in self.list(chapter_id) {
            match surface.apply_highlight(a.index, a.length, &a.id) {
                Ok(()) => applied += 1,
                Err(e) => crate::console_warn!("[AnnotationStore] Skipping {}: {}", a.id, e),
            }
        }
        applied
    }
}
