//! Password gate for individual notes.
//!
//! Locking a note hides it from the AI gateway and from the editor until the
//! password is supplied again. The gate controls access only: `content` is
//! stored as-is and is never rewritten by locking or unlocking. The note keeps
//! a salted Argon2 verifier in its `password` field, never the password
//! itself.

use crate::{AiNotesError, LockChange, Note, NotePatch, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand_core::OsRng;

/// Shortest password accepted by [`lock_patch`].
pub const MIN_PASSWORD_LEN: usize = 6;

/// Rough strength rating shown next to the password field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

/// Rates a password by length: under 6 characters is weak, under 10 medium.
pub fn password_strength(password: &str) -> Strength {
    match password.chars().count() {
        n if n < MIN_PASSWORD_LEN => Strength::Weak,
        n if n < 10 => Strength::Medium,
        _ => Strength::Strong,
    }
}

/// Builds the patch that locks `note` behind `password`.
///
/// # Errors
///
/// Returns [`AiNotesError::NoteLocked`] if the note is already locked,
/// [`AiNotesError::PasswordMismatch`] if `confirm` differs from `password`,
/// [`AiNotesError::PasswordTooShort`] for passwords under
/// [`MIN_PASSWORD_LEN`] characters, and [`AiNotesError::PasswordHash`] if
/// the verifier cannot be computed.
pub fn lock_patch(note: &Note, password: &str, confirm: &str) -> Result<NotePatch> {
    if note.is_locked() {
        return Err(AiNotesError::NoteLocked(note.id.clone()));
    }
    if password != confirm {
        return Err(AiNotesError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AiNotesError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    let verifier = hash_password(password)?;
    Ok(NotePatch::new(&note.id).lock(LockChange::Lock { verifier }))
}

/// Builds the patch that unlocks `note` if `password` matches.
///
/// # Errors
///
/// Returns [`AiNotesError::NotLocked`] if the note has no lock and
/// [`AiNotesError::WrongPassword`] if the password does not verify.
pub fn unlock_patch(note: &Note, password: &str) -> Result<NotePatch> {
    let stored = match (note.is_locked(), note.password.as_deref()) {
        (true, Some(stored)) => stored,
        _ => return Err(AiNotesError::NotLocked(note.id.clone())),
    };
    if !verify(stored, password) {
        return Err(AiNotesError::WrongPassword);
    }
    Ok(NotePatch::new(&note.id).lock(LockChange::Unlock))
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AiNotesError::PasswordHash(e.to_string()))?
        .to_string())
}

fn verify(stored: &str, candidate: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Replaces a raw password left by older records with an Argon2 verifier.
///
/// Returns `true` if `note` was rewritten. The same password still unlocks
/// the note afterwards.
pub(crate) fn seal_plaintext_password(note: &mut Note) -> bool {
    let Some(stored) = note.password.as_deref() else {
        return false;
    };
    if PasswordHash::new(stored).is_ok() {
        return false;
    }
    match hash_password(stored) {
        Ok(verifier) => {
            log::warn!("Note {} carried a plaintext password; replaced with a verifier", note.id);
            note.password = Some(verifier);
            true
        }
        Err(e) => {
            log::error!("Failed to seal password of note {}: {e}", note.id);
            false
        }
    }
}
