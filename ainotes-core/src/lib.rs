//! Core library for AI Notes — a local-first note-taking application.
//!
//! The primary entry point is [`NoteRepository`], which owns the in-memory note
//! collection loaded from a [`NoteStore`]. All note mutations go through
//! `NoteRepository` methods; [`visible_notes`] derives the ordered list shown
//! to the user.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    ai::{
        AiConfig, ChatInsightGateway, ChatMessage, ChatProvider, ChatRequest, ChatRole,
        GlossaryEntry, GrammarIssue, InsightBundle, InsightGateway, Language,
        OpenAiCompatibleClient,
    },
    assistant::{analyze_note, tags_patch, translate_note},
    error::{AiNotesError, Result},
    lock::{lock_patch, password_strength, unlock_patch, Strength, MIN_PASSWORD_LEN},
    markup::{first_sentence, plain_text},
    note::{LockChange, Note, NotePatch, DEFAULT_TITLE},
    note_store::{NoteStore, STORAGE_KEY},
    query::{notes_with_tag, visible_notes},
    repository::NoteRepository,
    storage::Storage,
};
