//! The authoritative in-memory note collection and its mutation rules.

use crate::{Note, NotePatch, NoteStore};
use chrono::Utc;
use uuid::Uuid;

/// Owns the note collection for the lifetime of the application.
///
/// `NoteRepository` is the only writer of notes. Every mutating method runs
/// to completion, then saves the full collection through its [`NoteStore`].
/// Save failures are logged and swallowed: the in-memory collection stays
/// authoritative for the session even when the durable copy falls behind.
///
/// Operations on an id that is not present are silent no-ops. This lets a
/// late AI completion for a deleted note fall through harmlessly.
pub struct NoteRepository {
    store: NoteStore,
    notes: Vec<Note>,
    active_id: Option<String>,
}

impl NoteRepository {
    /// Builds the repository from whatever `store` currently holds.
    ///
    /// Stored data that needed repair (dangling lock fields, plaintext
    /// passwords, duplicate ids) is saved back in its repaired form.
    pub fn open(store: NoteStore) -> Self {
        let (notes, dirty) = repaired(store.load());
        let repo = Self {
            store,
            notes,
            active_id: None,
        };
        if dirty {
            repo.persist();
        }
        repo
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Returns the full collection in storage order, newest-created first.
    pub fn get_all(&self) -> &[Note] {
        &self.notes
    }

    /// Fetches a single note by ID.
    pub fn get(&self, note_id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == note_id)
    }

    /// Returns the note currently selected for editing, if any.
    pub fn active(&self) -> Option<&Note> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// Selects `note_id` for editing. Returns `false` (and keeps the current
    /// selection) if no such note exists.
    pub fn select(&mut self, note_id: &str) -> bool {
        if self.get(note_id).is_none() {
            return false;
        }
        self.active_id = Some(note_id.to_string());
        true
    }

    /// Creates a blank note at the front of the collection, saves, and
    /// selects it.
    pub fn create(&mut self) -> Note {
        let note = Note::blank(Uuid::new_v4().to_string(), Utc::now());
        self.notes.insert(0, note.clone());
        self.active_id = Some(note.id.clone());
        self.persist();
        note
    }

    /// Merges `patch` into the note with the same id.
    ///
    /// Only fields present in the patch change; `updated_at` is refreshed.
    /// The merged note becomes the active selection and is returned. Returns
    /// `None` without touching anything if the id is unknown.
    pub fn update(&mut self, patch: NotePatch) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == patch.id)?;
        let note = &mut self.notes[index];
        patch.apply_to(note);
        note.updated_at = Utc::now().max(note.created_at);
        let merged = note.clone();
        self.active_id = Some(merged.id.clone());
        self.persist();
        Some(merged)
    }

    /// Removes the note with `note_id`, clearing the selection if it pointed
    /// there. Returns whether anything was removed.
    pub fn delete(&mut self, note_id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != note_id);
        if self.notes.len() == before {
            return false;
        }
        if self.active_id.as_deref() == Some(note_id) {
            self.active_id = None;
        }
        self.persist();
        true
    }

    /// Flips the pinned flag of `note_id`. Returns the new state, or `None`
    /// if the note does not exist.
    pub fn toggle_pin(&mut self, note_id: &str) -> Option<bool> {
        let note = self.notes.iter_mut().find(|n| n.id == note_id)?;
        note.is_pinned = !note.is_pinned;
        let pinned = note.is_pinned;
        self.persist();
        Some(pinned)
    }

    /// Replaces the in-memory collection with what the store now holds.
    ///
    /// Used after a successful [`NoteStore::import`]. A selection that no
    /// longer resolves is cleared.
    pub fn reload(&mut self) {
        let (notes, dirty) = repaired(self.store.load());
        self.notes = notes;
        if self.active().is_none() {
            self.active_id = None;
        }
        if dirty {
            self.persist();
        }
    }

    /// Returns all distinct tags used across the collection, trimmed,
    /// lowercased and sorted alphabetically.
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .notes
            .iter()
            .flat_map(|n| n.tags.iter())
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.notes) {
            log::error!("Failed to save notes: {e}");
        }
    }
}

/// Normalizes every note and keeps the first occurrence of every id.
/// The flag reports whether the result differs from the input.
fn repaired(mut notes: Vec<Note>) -> (Vec<Note>, bool) {
    let mut changed = false;
    for note in &mut notes {
        changed |= note.normalize();
    }
    let mut seen = std::collections::HashSet::new();
    let before = notes.len();
    notes.retain(|n| {
        let fresh = seen.insert(n.id.clone());
        if !fresh {
            log::warn!("Dropping duplicate note id {}", n.id);
        }
        fresh
    });
    changed |= notes.len() != before;
    (notes, changed)
}
