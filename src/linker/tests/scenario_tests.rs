//! Tests for end-to-end linking scenarios
//!
//! Card edits, deletions and chapter switches, checked on the tag layer.

use super::{bench, tags};
use crate::linker::surface::TagSurface;
use crate::model::{CardDraft, CardPatch};

#[test]
fn test_two_occurrences_of_full_name() {
    let mut wb = bench("Dr. Mira Elsk arrived. She spoke to Dr. Mira Elsk again.");
    let c1 = wb.create_card(CardDraft::titled("Dr. Mira Elsk"));

    assert_eq!(
        tags(&wb),
        vec![(0, 13, c1.clone()), (36, 13, c1.clone())]
    );
    // Tags are live as soon as create_card returns
    assert!(!wb.scheduler().is_pending(crate::linker::TaskKind::Relink));
    assert_eq!(wb.card_at(40), Some(c1.as_str()));
    assert_eq!(wb.card_at(20), None);
}

#[test]
fn test_deleting_card_removes_its_tags() {
    let mut wb = bench("Dr. Mira Elsk arrived. She spoke to Dr. Mira Elsk again.");
    let c1 = wb.create_card(CardDraft::titled("Dr. Mira Elsk"));
    assert_eq!(tags(&wb).len(), 2);

    let removed = wb.delete_card(&c1).unwrap();
    assert_eq!(removed.title, "Dr. Mira Elsk");
    assert!(tags(&wb).is_empty());
    assert_eq!(wb.card_at(0), None);
}

#[test]
fn test_longest_title_wins() {
    let mut wb = bench("Evelyn Stone said hello");
    let _stone = wb.create_card(CardDraft::titled("Stone"));
    let evelyn = wb.create_card(CardDraft::titled("Evelyn Stone"));

    assert_eq!(tags(&wb), vec![(0, 12, evelyn)]);
}

#[test]
fn test_word_boundary_and_case() {
    let mut wb = bench("Anna went home. the river was cold");
    wb.create_card(CardDraft::titled("Ann"));
    let river = wb.create_card(CardDraft::titled("River"));

    assert_eq!(tags(&wb), vec![(20, 5, river.clone())]);
    // Stored title keeps its casing
    assert_eq!(wb.card(&river).unwrap().title, "River");
}

#[test]
fn test_titles_ending_in_punctuation_link() {
    let mut wb = bench("Then Mr. T. left. The Order met. I like C++ a lot");
    let mr_t = wb.create_card(CardDraft::titled("Mr. T."));
    let cpp = wb.create_card(CardDraft::titled("C++"));

    assert_eq!(tags(&wb), vec![(5, 6, mr_t), (40, 3, cpp)]);
}

#[test]
fn test_single_letter_card_never_links() {
    let mut wb = bench("A boat. A river. A");
    wb.create_card(CardDraft::titled("A"));
    assert!(tags(&wb).is_empty());
    assert!(wb.index().is_empty());
}

#[test]
fn test_retitle_moves_tags_immediately() {
    let mut wb = bench("the river was cold");
    let id = wb.create_card(CardDraft::titled("River"));
    assert_eq!(tags(&wb), vec![(4, 5, id.clone())]);

    let report = wb
        .update_card(
            &id,
            CardPatch {
                title: Some("Cold".to_string()),
                ..CardPatch::default()
            },
        )
        .unwrap();
    assert_eq!(report.spans_applied, 1);
    assert_eq!(tags(&wb), vec![(14, 4, id)]);
}

#[test]
fn test_field_edits_relink() {
    let mut wb = bench("Mira waits");
    let id = wb.create_card(CardDraft::titled("Mira"));
    assert!(wb.add_card_field(&id, "age", "30").unwrap());
    assert!(!wb.add_card_field(&id, " ", "30").unwrap());
    assert_eq!(wb.card(&id).unwrap().fields.len(), 1);

    let removed = wb.remove_card_field(&id, 0).unwrap();
    assert_eq!(removed.map(|f| f.key), Some("age".to_string()));
    assert_eq!(wb.remove_card_field(&id, 0).unwrap(), None);
    assert_eq!(tags(&wb).len(), 1);
}

#[test]
fn test_duplicate_titles_tag_once() {
    let mut wb = bench("Oskar left.");
    let first = wb.create_card(CardDraft::titled("Oskar"));
    let _second = wb.create_card(CardDraft::titled("oskar"));
    assert_eq!(tags(&wb), vec![(0, 5, first)]);
}

#[test]
fn test_annotations_survive_relink() {
    let mut wb = bench("Dr. Mira Elsk arrived.");
    let c1 = wb.create_card(CardDraft::titled("Dr. Mira Elsk"));
    let note = wb.annotate(4, 9, "check spelling").unwrap();

    // Overlapping formatting: both layers observable
    assert_eq!(wb.card_at(5), Some(c1.as_str()));
    assert_eq!(wb.surface().annotations_at(5), vec![note.as_str()]);

    // Another card mutation clears and reapplies tags only
    wb.create_card(CardDraft::titled("arrived"));
    wb.relink_now();
    assert_eq!(tags(&wb).len(), 2);
    assert_eq!(wb.surface().highlights().len(), 1);
    assert_eq!(wb.surface().highlights()[0].annotation_id, note);

    // And removing tags does not touch highlights
    wb.delete_card(&c1).unwrap();
    assert_eq!(wb.card_at(5), None);
    assert_eq!(wb.surface().annotations_at(5), vec![note.as_str()]);
}

#[test]
fn test_non_ascii_offsets_are_utf16() {
    // "é" is one unit, "𝄞" is two
    let mut wb = bench("Café 𝄞 Mira");
    let id = wb.create_card(CardDraft::titled("Mira"));
    assert_eq!(tags(&wb), vec![(8, 4, id)]);
    assert_eq!(wb.surface().doc_len(), 12);
}
