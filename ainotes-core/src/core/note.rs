//! The note entity and the partial-update type used to mutate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::lock::seal_plaintext_password;

/// Title given to every newly created note.
pub const DEFAULT_TITLE: &str = "Untitled Note";

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// A single user document.
///
/// Serialized with camelCase keys; timestamps travel as RFC 3339 text.
/// `password` is only present while `is_encrypted` is set and holds an Argon2
/// verifier string, not the password itself (see [`crate::lock_patch`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Note {
    /// Builds a note with every field at its default, stamped with `now`.
    pub(crate) fn blank(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: default_title(),
            content: String::new(),
            created_at: now,
            updated_at: now,
            is_pinned: false,
            is_encrypted: false,
            password: None,
            tags: vec![],
        }
    }

    /// True while the note is behind a password gate.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.is_encrypted
    }

    /// Restores the lock invariant on data that did not come through a patch.
    ///
    /// An unlocked note never keeps a verifier, and a locked note without one
    /// cannot be unlocked, so it is treated as unlocked. A raw password from
    /// older records is replaced by a verifier. `updated_at` is clamped so it
    /// never precedes `created_at`. Returns `true` if anything changed.
    pub(crate) fn normalize(&mut self) -> bool {
        let mut changed = false;
        if !self.is_encrypted || self.password.is_none() {
            changed |= self.is_encrypted || self.password.is_some();
            self.is_encrypted = false;
            self.password = None;
        } else {
            changed |= seal_plaintext_password(self);
        }
        if self.updated_at < self.created_at {
            self.updated_at = self.created_at;
            changed = true;
        }
        changed
    }
}

/// A change to the lock state. Locking and unlocking always move
/// `is_encrypted` and `password` together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockChange {
    /// Gate the note behind the given Argon2 verifier.
    Lock { verifier: String },
    /// Remove the gate and drop the verifier.
    Unlock,
}

/// A field-level update for one note.
///
/// Only the fields set to `Some` are written; everything else on the stored
/// note is preserved. Built with the chained setters:
///
/// ```rust
/// use ainotes_core::NotePatch;
///
/// let patch = NotePatch::new("note-1").tags(vec!["rust".into()]);
/// assert!(patch.content.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_pinned: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub lock: Option<LockChange>,
}

impl NotePatch {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn pinned(mut self, is_pinned: bool) -> Self {
        self.is_pinned = Some(is_pinned);
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn lock(mut self, change: LockChange) -> Self {
        self.lock = Some(change);
        self
    }

    /// Overlays the supplied fields onto `note`. Does not touch timestamps.
    pub(crate) fn apply_to(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(is_pinned) = self.is_pinned {
            note.is_pinned = is_pinned;
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
        match self.lock {
            Some(LockChange::Lock { verifier }) => {
                note.is_encrypted = true;
                note.password = Some(verifier);
            }
            Some(LockChange::Unlock) => {
                note.is_encrypted = false;
                note.password = None;
            }
            None => {}
        }
    }
}
