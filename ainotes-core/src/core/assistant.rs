//! Caller-side glue between notes and the [`InsightGateway`].
//!
//! These helpers enforce that locked notes never reach the gateway and turn
//! gateway results into [`NotePatch`]es that touch only the fields the
//! gateway computed. Applying the patch is left to the caller, via
//! [`crate::NoteRepository::update`], once the async call has finished.

use crate::core::markup::plain_text;
use crate::{AiNotesError, InsightBundle, InsightGateway, Language, Note, NotePatch, Result};

/// Analyzes the markup-stripped content of `note`.
///
/// # Errors
///
/// Returns [`AiNotesError::NoteLocked`] if the note is locked. Gateway
/// failures are not errors; they produce the fallback bundle.
pub async fn analyze_note<G>(gateway: &G, note: &Note) -> Result<InsightBundle>
where
    G: InsightGateway + ?Sized,
{
    ensure_unlocked(note)?;
    Ok(gateway.analyze(&plain_text(&note.content)).await)
}

/// Translates the markup-stripped content of `note` into `language`.
///
/// Returns a content-only patch when the translation differs from the
/// source text, or `None` when there is nothing to apply (empty note, or the
/// gateway fell back to the original).
///
/// # Errors
///
/// Returns [`AiNotesError::NoteLocked`] if the note is locked.
pub async fn translate_note<G>(
    gateway: &G,
    note: &Note,
    language: Language,
) -> Result<Option<NotePatch>>
where
    G: InsightGateway + ?Sized,
{
    ensure_unlocked(note)?;
    let plain = plain_text(&note.content);
    if plain.is_empty() {
        return Ok(None);
    }
    let translated = gateway.translate(&plain, language).await;
    if translated.is_empty() || translated == plain {
        return Ok(None);
    }
    Ok(Some(NotePatch::new(&note.id).content(translated)))
}

/// Patch that replaces the tags of `note_id` with the suggested ones.
pub fn tags_patch(note_id: &str, bundle: &InsightBundle) -> NotePatch {
    NotePatch::new(note_id).tags(bundle.tags.clone())
}

fn ensure_unlocked(note: &Note) -> Result<()> {
    if note.is_locked() {
        return Err(AiNotesError::NoteLocked(note.id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LockChange, NoteRepository, NoteStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes input back so tests can see exactly what reached the gateway.
    #[derive(Default)]
    struct EchoGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InsightGateway for EchoGateway {
        async fn analyze(&self, plain_text: &str) -> InsightBundle {
            self.calls.fetch_add(1, Ordering::SeqCst);
            InsightBundle {
                summary: plain_text.to_string(),
                tags: vec!["echo".to_string()],
                ..InsightBundle::default()
            }
        }

        async fn translate(&self, content: &str, target: Language) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            format!("[{}] {content}", target.code())
        }
    }

    /// Always degrades to returning the input unchanged.
    struct DownGateway;

    #[async_trait]
    impl InsightGateway for DownGateway {
        async fn analyze(&self, _plain_text: &str) -> InsightBundle {
            InsightBundle::default()
        }

        async fn translate(&self, content: &str, _target: Language) -> String {
            content.to_string()
        }
    }

    fn repo_with_note(content: &str) -> (NoteRepository, String) {
        let mut repo = NoteRepository::open(NoteStore::in_memory().unwrap());
        let id = repo.create().id;
        repo.update(NotePatch::new(&id).content(content));
        (repo, id)
    }

    #[tokio::test]
    async fn test_analyze_note_strips_markup() {
        let (repo, id) = repo_with_note("<p>Hello <b>world</b></p>");
        let gateway = EchoGateway::default();
        let bundle = analyze_note(&gateway, repo.get(&id).unwrap()).await.unwrap();
        assert_eq!(bundle.summary, "Hello world");
    }

    #[tokio::test]
    async fn test_locked_note_never_reaches_gateway() {
        let (mut repo, id) = repo_with_note("<p>secret plans</p>");
        repo.update(NotePatch::new(&id).lock(LockChange::Lock { verifier: "v".into() }));
        let gateway = EchoGateway::default();
        let note = repo.get(&id).unwrap();

        assert!(matches!(
            analyze_note(&gateway, note).await,
            Err(AiNotesError::NoteLocked(_))
        ));
        assert!(matches!(
            translate_note(&gateway, note, Language::Spanish).await,
            Err(AiNotesError::NoteLocked(_))
        ));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_translation_applied_as_content_only_patch() {
        let (mut repo, id) = repo_with_note("<p>Good morning</p>");
        repo.update(NotePatch::new(&id).title("Greeting").tags(vec!["hi".into()]));

        let gateway = EchoGateway::default();
        let patch = translate_note(&gateway, repo.get(&id).unwrap(), Language::Spanish)
            .await
            .unwrap()
            .unwrap();
        assert!(patch.title.is_none());
        assert!(patch.tags.is_none());

        let merged = repo.update(patch).unwrap();
        assert_eq!(merged.content, "[es] Good morning");
        assert_eq!(merged.title, "Greeting");
        assert_eq!(merged.tags, vec!["hi"]);
    }

    #[tokio::test]
    async fn test_unchanged_translation_yields_no_patch() {
        let (repo, id) = repo_with_note("<p>Bonjour</p>");
        let patch = translate_note(&DownGateway, repo.get(&id).unwrap(), Language::French)
            .await
            .unwrap();
        assert!(patch.is_none());
    }

    #[tokio::test]
    async fn test_empty_note_translation_skips_gateway() {
        let (repo, id) = repo_with_note("<p></p>");
        let gateway = EchoGateway::default();
        let patch = translate_note(&gateway, repo.get(&id).unwrap(), Language::German)
            .await
            .unwrap();
        assert!(patch.is_none());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_completion_for_deleted_note_is_inert() {
        let (mut repo, id) = repo_with_note("<p>Hello</p>");
        let gateway = EchoGateway::default();
        let note = repo.get(&id).unwrap().clone();

        let bundle = analyze_note(&gateway, &note).await.unwrap();
        repo.delete(&id);

        assert!(repo.update(tags_patch(&id, &bundle)).is_none());
        assert!(repo.get_all().is_empty());
    }

    #[tokio::test]
    async fn test_tags_patch_through_dyn_gateway() {
        let (mut repo, id) = repo_with_note("<p>Rust notes</p>");
        let gateway: Box<dyn InsightGateway> = Box::new(EchoGateway::default());
        let bundle = analyze_note(gateway.as_ref(), repo.get(&id).unwrap()).await.unwrap();

        let merged = repo.update(tags_patch(&id, &bundle)).unwrap();
        assert_eq!(merged.tags, vec!["echo"]);
        assert_eq!(merged.content, "<p>Rust notes</p>");
    }
}
