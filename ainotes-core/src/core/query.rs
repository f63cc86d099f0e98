//! Derives the visible, ordered note list from a collection.

use crate::Note;
use std::cmp::Ordering;

/// Returns the notes matching `search_term`, pinned first, then most
/// recently updated first.
///
/// Matching is a case-insensitive substring test against the title and the
/// raw content (markup included). An empty term matches every note. The sort
/// is stable, so notes with equal `updated_at` keep their collection order.
/// The input slice is never modified.
#[must_use]
pub fn visible_notes(notes: &[Note], search_term: &str) -> Vec<Note> {
    let needle = search_term.to_lowercase();
    let mut visible: Vec<Note> = notes
        .iter()
        .filter(|note| matches_term(note, &needle))
        .cloned()
        .collect();
    visible.sort_by(display_order);
    visible
}

/// Returns the notes carrying `tag` (case-insensitive), in display order.
#[must_use]
pub fn notes_with_tag(notes: &[Note], tag: &str) -> Vec<Note> {
    let wanted = tag.trim().to_lowercase();
    let mut tagged: Vec<Note> = notes
        .iter()
        .filter(|note| note.tags.iter().any(|t| t.trim().to_lowercase() == wanted))
        .cloned()
        .collect();
    tagged.sort_by(display_order);
    tagged
}

fn matches_term(note: &Note, needle: &str) -> bool {
    needle.is_empty()
        || note.title.to_lowercase().contains(needle)
        || note.content.to_lowercase().contains(needle)
}

fn display_order(a: &Note, b: &Note) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn note(id: &str, title: &str, pinned: bool, offset_secs: i64) -> Note {
        Note {
            id: id.to_string(),
            title: title.to_string(),
            content: String::new(),
            created_at: base(),
            updated_at: base() + Duration::seconds(offset_secs),
            is_pinned: pinned,
            is_encrypted: false,
            password: None,
            tags: vec![],
        }
    }

    fn ids(notes: &[Note]) -> Vec<&str> {
        notes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_pinned_first_then_recent_first() {
        // A pinned at t1, B unpinned at t2 > t1, C pinned at t3 < t1
        let notes = vec![
            note("A", "a", true, 20),
            note("B", "b", false, 30),
            note("C", "c", true, 10),
        ];
        assert_eq!(ids(&visible_notes(&notes, "")), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_filter_title_case_insensitive() {
        let notes = vec![
            note("1", "Meeting Notes", false, 0),
            note("2", "Shopping List", false, 0),
        ];
        for term in ["meeting", "MEETING", "MeEtInG"] {
            assert_eq!(ids(&visible_notes(&notes, term)), vec!["1"]);
        }
    }

    #[test]
    fn test_filter_matches_raw_markup() {
        let mut n = note("1", "Plain", false, 0);
        n.content = "<strong>Bold</strong> words".to_string();
        let notes = vec![n];
        assert_eq!(visible_notes(&notes, "bold").len(), 1);
        // Substring match is literal, so tag names match too.
        assert_eq!(visible_notes(&notes, "<STRONG>").len(), 1);
        assert!(visible_notes(&notes, "bold words").is_empty());
    }

    #[test]
    fn test_empty_term_matches_everything() {
        let notes = vec![note("1", "x", false, 0), note("2", "y", false, 5)];
        assert_eq!(visible_notes(&notes, "").len(), 2);
    }

    #[test]
    fn test_equal_timestamps_keep_collection_order() {
        let notes = vec![
            note("first", "a", false, 0),
            note("second", "b", false, 0),
            note("third", "c", false, 0),
        ];
        assert_eq!(ids(&visible_notes(&notes, "")), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_pure_and_idempotent() {
        let notes = vec![
            note("1", "Alpha", false, 1),
            note("2", "Beta", true, 2),
            note("3", "Alphabet", false, 3),
        ];
        let snapshot = notes.clone();
        let first = visible_notes(&notes, "alpha");
        let second = visible_notes(&notes, "alpha");
        assert_eq!(first, second);
        assert_eq!(notes, snapshot);
        assert_eq!(ids(&first), vec!["3", "1"]);
    }

    #[test]
    fn test_notes_with_tag() {
        let mut tagged = note("1", "a", false, 0);
        tagged.tags = vec!["Rust".to_string()];
        let mut pinned = note("2", "b", true, 0);
        pinned.tags = vec!["rust".to_string(), "misc".to_string()];
        let untagged = note("3", "c", false, 9);
        let notes = vec![tagged, pinned, untagged];

        assert_eq!(ids(&notes_with_tag(&notes, "RUST")), vec!["2", "1"]);
        assert!(notes_with_tag(&notes, "unknown").is_empty());
    }
}
