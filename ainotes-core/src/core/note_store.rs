//! Persistence adapter: the whole note collection as one JSON record.

use crate::core::note::Note;
use crate::{Result, Storage};
use std::path::Path;

/// Fixed key under which the note collection is stored.
pub const STORAGE_KEY: &str = "ai_notes_data";

/// Saves and loads the complete note collection as a single record.
///
/// Every save overwrites the previous record in full. Reads never fail:
/// a missing or malformed record loads as an empty collection.
pub struct NoteStore {
    storage: Storage,
}

impl NoteStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Opens the store backed by the SQLite file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Storage::open(path)?))
    }

    /// Opens a store that lives only as long as the returned value.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Storage::open_in_memory()?))
    }

    /// Serializes `notes` (timestamps as RFC 3339) and overwrites the record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AiNotesError::Json`] if serialization fails or
    /// [`crate::AiNotesError::Database`] if the write fails.
    pub fn save(&self, notes: &[Note]) -> Result<()> {
        let json = serde_json::to_string(notes)?;
        self.storage.set(STORAGE_KEY, &json)
    }

    /// Reads the stored collection. Absent or unreadable data yields `vec![]`.
    pub fn load(&self) -> Vec<Note> {
        let data = match self.storage.get(STORAGE_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return vec![],
            Err(e) => {
                log::error!("Failed to load notes: {e}");
                return vec![];
            }
        };
        match serde_json::from_str::<Vec<Note>>(&data) {
            Ok(notes) => notes,
            Err(e) => {
                log::error!("Failed to load notes: {e}");
                vec![]
            }
        }
    }

    /// Deletes the stored record entirely.
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(STORAGE_KEY)
    }

    /// Returns the stored collection as pretty-printed JSON for backups.
    ///
    /// Notes are normalized first, so a backup never carries a raw password.
    pub fn export(&self) -> String {
        let mut notes = self.load();
        for note in &mut notes {
            note.normalize();
        }
        serde_json::to_string_pretty(&notes).unwrap_or_else(|e| {
            log::error!("Failed to export notes: {e}");
            "[]".to_string()
        })
    }

    /// Replaces the stored collection with the notes in `text`.
    ///
    /// Returns `false` and leaves the record untouched if `text` is not a
    /// JSON array of notes. Imported notes are normalized so the lock and
    /// timestamp invariants hold.
    pub fn import(&self, text: &str) -> bool {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to import notes: {e}");
                return false;
            }
        };
        if !value.is_array() {
            log::warn!("Import rejected: top-level value is not an array");
            return false;
        }
        let mut notes: Vec<Note> = match serde_json::from_value(value) {
            Ok(notes) => notes,
            Err(e) => {
                log::error!("Failed to import notes: {e}");
                return false;
            }
        };
        for note in &mut notes {
            note.normalize();
        }
        match self.save(&notes) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to import notes: {e}");
                false
            }
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}
