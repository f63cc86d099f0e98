//! Error types for the AI Notes core library.

use thiserror::Error;

/// All errors that can occur within the AI Notes core library.
///
/// Persistence and AI failures are normally absorbed at the component
/// boundary (see [`crate::NoteRepository`] and [`crate::InsightGateway`]);
/// the variants here surface from the lower-level building blocks and from
/// the lock gate, where the caller has to tell the user what went wrong.
#[derive(Debug, Error)]
pub enum AiNotesError {
    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored note data could not be serialized or deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP client for the AI provider could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A note ID was requested that does not exist in the repository.
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    /// The note is locked; its content may not be read or sent to the AI gateway.
    #[error("Note is locked: {0}")]
    NoteLocked(String),

    /// An unlock was requested for a note that is not locked.
    #[error("Note is not locked: {0}")]
    NotLocked(String),

    /// The supplied password does not match the note's verifier.
    #[error("Wrong password for this note")]
    WrongPassword,

    /// The new password is shorter than [`crate::MIN_PASSWORD_LEN`].
    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    /// The password and its confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The password verifier could not be produced.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// A language code outside the supported translation set.
    #[error("Unsupported language: {0}")]
    InvalidLanguage(String),
}

/// Convenience alias that pins the error type to [`AiNotesError`].
pub type Result<T> = std::result::Result<T, AiNotesError>;

impl AiNotesError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
            Self::Io(e) => format!("File error: {e}"),
            Self::Http(_) => "AI service is unavailable".to_string(),
            Self::NoteNotFound(_) => "Note no longer exists".to_string(),
            Self::NoteLocked(_) => "This note is locked. Unlock it first.".to_string(),
            Self::NotLocked(_) => "This note is not locked".to_string(),
            Self::WrongPassword => "Incorrect password!".to_string(),
            Self::PasswordTooShort(min) => {
                format!("Password must be at least {min} characters long!")
            }
            Self::PasswordMismatch => "Passwords do not match!".to_string(),
            Self::PasswordHash(_) => "Could not lock the note".to_string(),
            Self::InvalidLanguage(code) => format!("Unsupported language: {code}"),
        }
    }
}
