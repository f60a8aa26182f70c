//! Tests for Workbench operations
//!
//! Scheduling, saves, selections, annotations, search and project settings.

use instant::Instant;
use std::time::Duration;

use super::{bench, tags};
use crate::config::LinkerConfig;
use crate::error::LinkError;
use crate::linker::scheduler::TaskKind;
use crate::linker::search::SearchKind;
use crate::linker::text::{utf16_len, RichText};
use crate::linker::workbench::{MemoryStore, SaveStatus, Workbench};
use crate::model::CardDraft;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// -----------------------------------------------------------------------------
// Debounced keystroke relinks
// -----------------------------------------------------------------------------

#[test]
fn test_keystroke_relink_waits_for_quiet_period() {
    let mut wb = bench("nothing yet");
    let mira = wb.create_card(CardDraft::titled("Mira"));
    let mut store = MemoryStore::new();

    let t0 = Instant::now();
    wb.edit_active(RichText::from_plain("Mira waits"), t0).unwrap();
    assert!(tags(&wb).is_empty());
    assert!(wb.scheduler().is_pending(TaskKind::Relink));

    let early = wb.tick(t0 + ms(100), &mut store);
    assert!(early.ran.is_empty());

    let due = wb.tick(t0 + ms(250), &mut store);
    assert_eq!(due.ran, vec![TaskKind::Relink]);
    assert_eq!(due.relink.map(|r| r.spans_applied), Some(1));
    assert_eq!(tags(&wb), vec![(0, 4, mira)]);

    // Save has its own, longer window
    let saved = wb.tick(t0 + ms(400), &mut store);
    assert_eq!(saved.ran, vec![TaskKind::Save]);
    assert_eq!(saved.save_status, SaveStatus::Saved);
    assert_eq!(store.saved.len(), 1);
}

#[test]
fn test_burst_coalesces_and_reads_latest_text() {
    let mut wb = bench("");
    let oskar = wb.create_card(CardDraft::titled("Oskar"));
    let mut store = MemoryStore::new();

    let t0 = Instant::now();
    wb.edit_active(RichText::from_plain("O"), t0).unwrap();
    wb.edit_active(RichText::from_plain("Osk"), t0 + ms(100)).unwrap();
    wb.edit_active(RichText::from_plain("Hi Oskar"), t0 + ms(200)).unwrap();

    assert!(wb.tick(t0 + ms(300), &mut store).ran.is_empty());
    let report = wb.tick(t0 + ms(450), &mut store);
    assert_eq!(report.ran, vec![TaskKind::Relink]);
    assert_eq!(tags(&wb), vec![(3, 5, oskar)]);
    assert!(wb.scheduler().coalesced_count() >= 2);

    // Exactly one pass for the burst
    assert!(!wb.tick(t0 + ms(550), &mut store).ran.contains(&TaskKind::Relink));
}

#[test]
fn test_card_mutation_preempts_pending_relink() {
    let mut wb = bench("");
    let t0 = Instant::now();
    wb.edit_active(RichText::from_plain("Port Varn at dusk"), t0).unwrap();
    assert!(wb.scheduler().is_pending(TaskKind::Relink));

    let id = wb.create_card(CardDraft::titled("Port Varn"));
    assert!(!wb.scheduler().is_pending(TaskKind::Relink));
    assert_eq!(tags(&wb), vec![(0, 9, id)]);
}

// -----------------------------------------------------------------------------
// Saving
// -----------------------------------------------------------------------------

#[test]
fn test_failed_save_reports_error_and_retries() {
    let mut wb = bench("Mira");
    let mut store = MemoryStore {
        fail_next: true,
        ..MemoryStore::default()
    };

    let later = Instant::now() + Duration::from_secs(5);
    let report = wb.tick(later, &mut store);
    assert_eq!(report.ran, vec![TaskKind::Save]);
    assert_eq!(wb.save_status(), SaveStatus::Error);
    assert!(store.saved.is_empty());
    assert!(wb.last_saved().is_none());

    // Editing goes on; the next scheduled save succeeds
    wb.edit_active(RichText::from_plain("Mira again"), later).unwrap();
    wb.tick(later + ms(1000), &mut store);
    assert_eq!(wb.save_status(), SaveStatus::Saved);
    assert_eq!(store.saved.len(), 1);
    assert!(wb.last_saved().is_some());
}

#[test]
fn test_save_writes_current_state() {
    let mut wb = bench("Mira");
    let mut store = MemoryStore::new();
    wb.rename_project("Salt Road");
    wb.save_now(&mut store).unwrap();

    let env = store.last().unwrap();
    assert_eq!(env.data.meta.project_name, "Salt Road");
    assert_eq!(env.data.draft[0].plain_text(), "Mira");
}

// -----------------------------------------------------------------------------
// Chapters
// -----------------------------------------------------------------------------

#[test]
fn test_open_chapter_replays_highlights() {
    let mut wb = bench("Mira by the water");
    let first = wb.active_id().unwrap().to_string();
    let note = wb.annotate(0, 4, "who is she?").unwrap();

    let second = wb.add_chapter(Some("Two"));
    assert_eq!(wb.active_id(), Some(second.as_str()));
    assert!(wb.surface().highlights().is_empty());

    wb.open_chapter(&first).unwrap();
    assert_eq!(wb.surface().annotations_at(2), vec![note.as_str()]);
    assert!(matches!(
        wb.open_chapter("missing"),
        Err(LinkError::UnknownChapter(_))
    ));
}

#[test]
fn test_add_chapter_default_title() {
    let mut wb = Workbench::new("Novel", LinkerConfig::default());
    let id = wb.add_chapter(None);
    assert_eq!(wb.chapter(&id).unwrap().title, "Chapter 2");
    let blank = wb.add_chapter(Some("   "));
    assert_eq!(wb.chapter(&blank).unwrap().title, "Chapter 3");

    wb.rename_chapter(&id, "Arrival").unwrap();
    wb.rename_chapter(&id, " ").unwrap();
    assert_eq!(wb.chapter(&id).unwrap().title, "Arrival");
}

#[test]
fn test_delete_active_chapter_cascades() {
    let mut wb = bench("Mira one");
    let first = wb.active_id().unwrap().to_string();
    let mira = wb.create_card(CardDraft::titled("Mira"));

    let second = wb.add_chapter(Some("Two"));
    wb.edit_active(RichText::from_plain("Two words"), Instant::now()).unwrap();
    wb.annotate(0, 3, "hm").unwrap();

    let report = wb.delete_chapter(&second).unwrap();
    assert!(wb.annotations().list(&second).is_empty());
    assert_eq!(wb.active_id(), Some(first.as_str()));
    assert_eq!(report.chapter_id.as_deref(), Some(first.as_str()));
    assert_eq!(tags(&wb), vec![(0, 4, mira)]);

    // Deleting the last chapter leaves nothing open
    wb.delete_chapter(&first).unwrap();
    assert!(wb.active_id().is_none());
    assert!(tags(&wb).is_empty());
    assert_eq!(
        wb.edit_active(RichText::from_plain("x"), Instant::now()),
        Err(LinkError::NoActiveChapter)
    );
}

// -----------------------------------------------------------------------------
// Cards from selections
// -----------------------------------------------------------------------------

#[test]
fn test_card_from_selection() {
    let mut wb = bench("Evelyn walked to Port Varn.");
    let id = wb.card_from_selection(17, 9, Some("Ships")).unwrap();

    let card = wb.card(&id).unwrap();
    assert_eq!(card.title, "Port Varn");
    assert_eq!(card.body, "Port Varn");
    assert_eq!(card.category, "Ships");
    assert!(wb.meta().categories.contains(&"Ships".to_string()));
    assert_eq!(tags(&wb), vec![(17, 9, id)]);

    let default = wb.card_from_selection(0, 6, None).unwrap();
    assert_eq!(wb.card(&default).unwrap().category, "Characters");

    assert_eq!(
        wb.card_from_selection(6, 1, None),
        Err(LinkError::EmptySelection)
    );
    assert!(matches!(
        wb.card_from_selection(20, 50, None),
        Err(LinkError::InvalidRange { .. })
    ));
}

#[test]
fn test_card_from_long_selection_keeps_full_body() {
    let text = format!("  {} tail", "x".repeat(120));
    let mut wb = bench(&text);
    let id = wb.card_from_selection(0, utf16_len(&text), None).unwrap();

    let card = wb.card(&id).unwrap();
    assert_eq!(card.body, text.trim());
    assert_eq!(card.title.chars().count(), 80);
    assert!(card.body.starts_with(&card.title));
}

// -----------------------------------------------------------------------------
// Annotations
// -----------------------------------------------------------------------------

#[test]
fn test_annotate_validates() {
    let mut wb = bench("short");
    assert!(matches!(
        wb.annotate(3, 10, "too far"),
        Err(LinkError::InvalidRange { doc_len: 5, .. })
    ));
    assert_eq!(wb.annotate(0, 5, "  "), Err(LinkError::EmptyComment));
    assert!(wb.active_annotations().is_empty());

    let a = wb.annotate(0, 5, "first").unwrap();
    let b = wb.annotate(1, 2, "second").unwrap();
    let ids: Vec<&str> = wb.active_annotations().iter().map(|x| x.id.as_str()).collect();
    assert_eq!(ids, vec![b.as_str(), a.as_str()]);

    wb.delete_annotation(&a).unwrap();
    assert_eq!(wb.surface().highlights().len(), 1);
    assert!(wb.delete_annotation(&a).is_err());

    wb.clear_annotations().unwrap();
    assert!(wb.surface().highlights().is_empty());
    assert!(wb.active_annotations().is_empty());
}

#[test]
fn test_annotate_rejects_blank_selection() {
    let mut wb = bench("a    b");
    assert_eq!(wb.annotate(1, 3, "note"), Err(LinkError::EmptySelection));
    assert!(wb.active_annotations().is_empty());
    assert!(wb.surface().highlights().is_empty());

    // A selection with any visible text is kept as given
    let id = wb.annotate(0, 3, "note").unwrap();
    assert_eq!(wb.active_annotations()[0].id, id);
    assert_eq!(wb.active_annotations()[0].length, 3);
}

// -----------------------------------------------------------------------------
// Search
// -----------------------------------------------------------------------------

#[test]
fn test_search_reads_current_state() {
    let mut wb = bench("The gate at Port Varn was shut.");
    let first = wb.active_id().unwrap().to_string();
    let card = wb.create_card(CardDraft {
        category: Some("Places".to_string()),
        title: Some("Port Varn".to_string()),
        ..CardDraft::default()
    });

    let hits = wb.search("port varn");
    assert_eq!(hits.len(), 2);
    assert_eq!((hits[0].kind, hits[0].id.as_str()), (SearchKind::Chapter, first.as_str()));
    assert_eq!(hits[0].label, "Chapter 1");
    assert_eq!((hits[1].kind, hits[1].id.as_str()), (SearchKind::Card, card.as_str()));
    assert_eq!(hits[1].label, "Places - Port Varn");

    // A keystroke edit is searchable before any relink runs
    wb.edit_active(RichText::from_plain("Fog."), Instant::now()).unwrap();
    assert_eq!(wb.search("varn").len(), 1);
    assert_eq!(wb.search("FOG")[0].id, first);
    assert!(wb.search(" ").is_empty());
}

// -----------------------------------------------------------------------------
// Project settings and statistics
// -----------------------------------------------------------------------------

#[test]
fn test_project_settings() {
    let mut wb = bench("");
    wb.rename_project("   ");
    assert_eq!(wb.meta().project_name, "My Novel");

    wb.set_categories_csv("Ships, Places ,Ships,,");
    assert_eq!(wb.meta().categories, vec!["Ships", "Places"]);
    wb.set_categories_csv(" , ");
    assert_eq!(wb.meta().categories, vec!["Characters", "Places"]);
}

#[test]
fn test_totals_sum_chapters() {
    let mut wb = bench("The river was cold.\n");
    let first = wb.active_id().unwrap().to_string();
    wb.add_chapter(None);
    wb.edit_active(RichText::from_plain("Mira waits.\n"), Instant::now())
        .unwrap();

    let totals = wb.totals();
    assert_eq!(totals.words, 6);
    assert_eq!(totals.chars, 19 + 11);
    assert_eq!(wb.chapter_stats(&first).unwrap().words, 4);
    assert!(wb.chapter_stats("missing").is_err());
}
