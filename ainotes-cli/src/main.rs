mod settings;

use std::path::PathBuf;

use ainotes_core::{
    analyze_note, lock_patch, notes_with_tag, password_strength, tags_patch, translate_note,
    unlock_patch, visible_notes, AiNotesError, ChatInsightGateway, Language, Note, NotePatch,
    NoteRepository, NoteStore, OpenAiCompatibleClient, Strength,
};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::settings::AppSettings;

/// ainotes - local notes with AI summaries, tags and translation
#[derive(Debug, Parser)]
#[command(name = "ainotes")]
#[command(about = "Local notes with AI summaries, tags and translation")]
#[command(after_help = "Note ids may be abbreviated to any unique prefix.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
enum Command {
    /// Create a note
    New {
        /// Title words; the default title is used when omitted
        title: Vec<String>,
    },
    /// List notes, pinned first, most recently updated next
    #[command(alias = "ls")]
    List {
        /// Only notes whose title or content contains these words
        search: Vec<String>,
    },
    /// List all tags
    Tags,
    /// List notes carrying a tag
    Tagged { tag: String },
    /// Print a note
    Show { id: String },
    /// Change title and/or content
    Edit {
        id: String,
        #[arg(long, required_unless_present = "content")]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Replace a note's tags
    Tag { id: String, tags: Vec<String> },
    /// Toggle pinned
    Pin { id: String },
    /// Delete a note
    #[command(alias = "rm")]
    Delete { id: String },
    /// Lock a note behind a password
    Lock {
        id: String,
        password: String,
        confirm: String,
    },
    /// Remove a note's lock
    Unlock { id: String, password: String },
    /// Write a JSON backup (stdout if no file is given)
    Export { file: Option<PathBuf> },
    /// Replace all notes from a JSON backup
    Import { file: PathBuf },
    /// Delete all stored notes
    Clear,
    /// AI summary, tags, glossary and grammar check
    Analyze {
        id: String,
        /// Replace the note's tags with the suggested ones
        #[arg(long)]
        apply_tags: bool,
    },
    /// AI translation into a language code (en, es, fr, de, ...)
    Translate {
        id: String,
        #[arg(value_parser = parse_language)]
        language: Language,
    },
    /// Check the AI connection
    Ping,
    /// Show settings
    Config {
        /// Write the default settings file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn parse_language(code: &str) -> Result<Language, AiNotesError> {
    code.parse()
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let settings = settings::load_settings().apply_env();
    match cli.command {
        Command::Config { init } => show_config(&settings, init),
        command => {
            let mut repo = open_repository(&settings)?;
            run(command, &mut repo, &settings).await
        }
    }
}

fn open_repository(settings: &AppSettings) -> Result<NoteRepository> {
    let path = PathBuf::from(&settings.database_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    debug!(path = %path.display(), "opening note database");
    let store = NoteStore::open(&path)
        .map_err(|e| anyhow!(e.user_message()))
        .with_context(|| format!("opening {}", path.display()))?;
    Ok(NoteRepository::open(store))
}

fn gateway(settings: &AppSettings) -> Result<ChatInsightGateway<OpenAiCompatibleClient>> {
    let client = OpenAiCompatibleClient::new(settings.ai.clone())?;
    Ok(ChatInsightGateway::new(client))
}

async fn run(command: Command, repo: &mut NoteRepository, settings: &AppSettings) -> Result<()> {
    match command {
        Command::New { title } => {
            let mut note = repo.create();
            if !title.is_empty() {
                if let Some(updated) = repo.update(NotePatch::new(&note.id).title(title.join(" "))) {
                    note = updated;
                }
            }
            println!("{}", note.id);
        }
        Command::List { search } => {
            for note in visible_notes(repo.get_all(), &search.join(" ")) {
                println!("{}", list_line(&note));
            }
        }
        Command::Tags => {
            for tag in repo.all_tags() {
                println!("{tag}");
            }
        }
        Command::Tagged { tag } => {
            for note in notes_with_tag(repo.get_all(), &tag) {
                println!("{}", list_line(&note));
            }
        }
        Command::Show { id } => {
            let id = resolve_id(repo, &id)?;
            let note = repo.get(&id).ok_or_else(|| not_found(&id))?;
            print_note(note);
        }
        Command::Edit { id, title, content } => {
            let id = resolve_id(repo, &id)?;
            let note = repo.get(&id).ok_or_else(|| not_found(&id))?;
            if content.is_some() && note.is_locked() {
                bail!(AiNotesError::NoteLocked(id).user_message());
            }
            let patch = NotePatch {
                id: id.clone(),
                title,
                content,
                ..NotePatch::default()
            };
            repo.update(patch).ok_or_else(|| not_found(&id))?;
        }
        Command::Tag { id, tags } => {
            let id = resolve_id(repo, &id)?;
            repo.update(NotePatch::new(&id).tags(tags))
                .ok_or_else(|| not_found(&id))?;
        }
        Command::Pin { id } => {
            let id = resolve_id(repo, &id)?;
            match repo.toggle_pin(&id) {
                Some(true) => println!("Pinned"),
                Some(false) => println!("Unpinned"),
                None => return Err(not_found(&id)),
            }
        }
        Command::Delete { id } => {
            let id = resolve_id(repo, &id)?;
            repo.delete(&id);
        }
        Command::Lock { id, password, confirm } => {
            let id = resolve_id(repo, &id)?;
            let note = repo.get(&id).ok_or_else(|| not_found(&id))?;
            let patch = lock_patch(note, &password, &confirm).map_err(user_error)?;
            repo.update(patch);
            let strength = match password_strength(&password) {
                Strength::Weak => "weak",
                Strength::Medium => "medium",
                Strength::Strong => "strong",
            };
            println!("Locked (password strength: {strength})");
        }
        Command::Unlock { id, password } => {
            let id = resolve_id(repo, &id)?;
            let note = repo.get(&id).ok_or_else(|| not_found(&id))?;
            let patch = unlock_patch(note, &password).map_err(user_error)?;
            repo.update(patch);
            println!("Unlocked");
        }
        Command::Export { file } => {
            let json = repo.store().export();
            match file {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            if !repo.store().import(&text) {
                bail!("Import failed: {} is not a valid notes backup", file.display());
            }
            repo.reload();
            println!("Imported {} notes", repo.get_all().len());
        }
        Command::Clear => {
            repo.store().clear().map_err(user_error)?;
            repo.reload();
        }
        Command::Analyze { id, apply_tags } => {
            let id = resolve_id(repo, &id)?;
            let note = repo.get(&id).ok_or_else(|| not_found(&id))?.clone();
            let gateway = gateway(settings)?;
            let bundle = analyze_note(&gateway, &note).await.map_err(user_error)?;

            println!("Summary: {}", bundle.summary);
            println!("Tags: {}", bundle.tags.join(", "));
            for entry in &bundle.glossary {
                println!("  {}: {}", entry.term, entry.definition);
            }
            for issue in &bundle.grammar {
                println!("  \"{}\" -> \"{}\"", issue.text, issue.suggestion);
                if let Some(explanation) = &issue.explanation {
                    println!("      {explanation}");
                }
            }
            if apply_tags && !bundle.tags.is_empty() {
                // The note may have been deleted meanwhile; update is then a no-op.
                repo.update(tags_patch(&id, &bundle));
            }
        }
        Command::Translate { id, language } => {
            let id = resolve_id(repo, &id)?;
            let note = repo.get(&id).ok_or_else(|| not_found(&id))?.clone();
            let gateway = gateway(settings)?;
            match translate_note(&gateway, &note, language).await.map_err(user_error)? {
                Some(patch) => {
                    repo.update(patch);
                    println!("Translated to {language}");
                }
                None => println!("Translation unavailable; note unchanged"),
            }
        }
        Command::Ping => {
            if gateway(settings)?.check_connection().await {
                println!("OK");
            } else {
                bail!("AI service did not respond");
            }
        }
        Command::Config { .. } => {}
    }
    Ok(())
}

fn show_config(settings: &AppSettings, init: bool) -> Result<()> {
    let path = settings::settings_file_path();
    if init {
        if path.exists() {
            println!("{} already exists", path.display());
        } else {
            settings::save_settings_to(&path, &AppSettings::default()).map_err(|e| anyhow!(e))?;
            println!("Wrote {}", path.display());
        }
        return Ok(());
    }
    let mut shown = settings.clone();
    if shown.ai.api_key.is_some() {
        shown.ai.api_key = Some("********".to_string());
    }
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}

/// Resolves an exact id or a unique id prefix.
fn resolve_id(repo: &NoteRepository, wanted: &str) -> Result<String> {
    if repo.get(wanted).is_some() {
        return Ok(wanted.to_string());
    }
    let mut matches = repo
        .get_all()
        .iter()
        .filter(|n| !wanted.is_empty() && n.id.starts_with(wanted));
    match (matches.next(), matches.next()) {
        (Some(note), None) => Ok(note.id.clone()),
        (Some(_), Some(_)) => bail!("id prefix `{wanted}` is ambiguous"),
        (None, _) => Err(not_found(wanted)),
    }
}

fn not_found(id: &str) -> anyhow::Error {
    anyhow!("{}: {id}", AiNotesError::NoteNotFound(id.to_string()).user_message())
}

fn user_error(e: AiNotesError) -> anyhow::Error {
    anyhow!(e.user_message())
}

fn list_line(note: &Note) -> String {
    let short_id: String = note.id.chars().take(8).collect();
    format!(
        "{} {} {}  {}{}",
        if note.is_pinned { "*" } else { " " },
        short_id,
        note.updated_at.format("%Y-%m-%d %H:%M"),
        note.title,
        if note.is_locked() { " [locked]" } else { "" },
    )
}

fn print_note(note: &Note) {
    println!("{}", note.title);
    println!("id:      {}", note.id);
    println!("created: {}", note.created_at.to_rfc3339());
    println!("updated: {}", note.updated_at.to_rfc3339());
    if note.is_pinned {
        println!("pinned");
    }
    if !note.tags.is_empty() {
        println!("tags:    {}", note.tags.join(", "));
    }
    println!();
    if note.is_locked() {
        println!("[locked; unlock to view]");
    } else {
        println!("{}", note.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("ainotes").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_missing_command_is_an_error() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
    }

    #[test]
    fn test_parse_list_collects_search_words() {
        assert_eq!(
            parse(&["list", "meeting", "notes"]).unwrap(),
            Command::List { search: vec!["meeting".into(), "notes".into()] }
        );
        assert_eq!(parse(&["ls"]).unwrap(), Command::List { search: vec![] });
    }

    #[test]
    fn test_parse_edit_flags() {
        assert_eq!(
            parse(&["edit", "abc", "--content", "<p>x</p>"]).unwrap(),
            Command::Edit { id: "abc".into(), title: None, content: Some("<p>x</p>".into()) }
        );
        assert_eq!(
            parse(&["edit", "abc", "--title", "T"]).unwrap(),
            Command::Edit { id: "abc".into(), title: Some("T".into()), content: None }
        );
        assert!(parse(&["edit", "abc"]).is_err());
        assert!(parse(&["edit", "abc", "--title"]).is_err());
        assert!(parse(&["edit", "abc", "--bogus", "v"]).is_err());
    }

    #[test]
    fn test_parse_translate_language() {
        assert_eq!(
            parse(&["translate", "abc", "ES"]).unwrap(),
            Command::Translate { id: "abc".into(), language: Language::Spanish }
        );
        assert!(parse(&["translate", "abc", "xx"]).is_err());
    }

    #[test]
    fn test_parse_missing_arguments() {
        assert!(parse(&["show"]).is_err());
        assert!(parse(&["lock", "abc", "secret1"]).is_err());
    }

    #[test]
    fn test_parse_flags() {
        assert_eq!(
            parse(&["analyze", "abc", "--apply-tags"]).unwrap(),
            Command::Analyze { id: "abc".into(), apply_tags: true }
        );
        assert_eq!(
            parse(&["analyze", "abc"]).unwrap(),
            Command::Analyze { id: "abc".into(), apply_tags: false }
        );
        assert_eq!(parse(&["config", "--init"]).unwrap(), Command::Config { init: true });
        assert_eq!(
            parse(&["tag", "abc", "rust", "notes"]).unwrap(),
            Command::Tag { id: "abc".into(), tags: vec!["rust".into(), "notes".into()] }
        );
    }

    #[test]
    fn test_resolve_id_prefix() {
        let mut repo = NoteRepository::open(NoteStore::in_memory().unwrap());
        let id = repo.create().id;
        assert_eq!(resolve_id(&repo, &id).unwrap(), id);
        assert_eq!(resolve_id(&repo, &id[..6]).unwrap(), id);
        assert!(resolve_id(&repo, "zzzz-not-there").is_err());
        assert!(resolve_id(&repo, "").is_err());
    }

    #[tokio::test]
    async fn test_run_edit_and_tag_merge() {
        let mut repo = NoteRepository::open(NoteStore::in_memory().unwrap());
        let settings = AppSettings::default();
        let id = repo.create().id;

        run(
            Command::Edit { id: id.clone(), title: None, content: Some("<p>body</p>".into()) },
            &mut repo,
            &settings,
        )
        .await
        .unwrap();
        run(Command::Tag { id: id.clone(), tags: vec!["a".into()] }, &mut repo, &settings)
            .await
            .unwrap();

        let note = repo.get(&id).unwrap();
        assert_eq!(note.content, "<p>body</p>");
        assert_eq!(note.tags, vec!["a"]);
    }

    #[tokio::test]
    async fn test_run_lock_blocks_content_edit() {
        let mut repo = NoteRepository::open(NoteStore::in_memory().unwrap());
        let settings = AppSettings::default();
        let id = repo.create().id;

        run(
            Command::Lock { id: id.clone(), password: "secret1".into(), confirm: "secret1".into() },
            &mut repo,
            &settings,
        )
        .await
        .unwrap();
        assert!(repo.get(&id).unwrap().is_locked());

        let edit = Command::Edit { id: id.clone(), title: None, content: Some("x".into()) };
        assert!(run(edit, &mut repo, &settings).await.is_err());

        let wrong = Command::Unlock { id: id.clone(), password: "nope".into() };
        assert!(run(wrong, &mut repo, &settings).await.is_err());

        let right = Command::Unlock { id: id.clone(), password: "secret1".into() };
        run(right, &mut repo, &settings).await.unwrap();
        assert!(!repo.get(&id).unwrap().is_locked());
    }

    #[tokio::test]
    async fn test_run_analyze_locked_note_is_refused() {
        let mut repo = NoteRepository::open(NoteStore::in_memory().unwrap());
        let settings = AppSettings::default();
        let id = repo.create().id;
        let note = repo.get(&id).unwrap().clone();
        repo.update(lock_patch(&note, "secret1", "secret1").unwrap());

        let result = run(Command::Analyze { id, apply_tags: true }, &mut repo, &settings).await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("locked"));
    }
}
