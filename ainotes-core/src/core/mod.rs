//! Internal domain modules for the AI Notes core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod ai;
pub mod assistant;
pub mod error;
pub mod lock;
pub mod markup;
pub mod note;
pub mod note_store;
pub mod query;
pub mod repository;
pub mod storage;

#[doc(inline)]
pub use error::{AiNotesError, Result};
#[doc(inline)]
pub use note::{LockChange, Note, NotePatch};
#[doc(inline)]
pub use note_store::NoteStore;
#[doc(inline)]
pub use repository::NoteRepository;
#[doc(inline)]
pub use storage::Storage;
