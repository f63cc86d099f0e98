//! AI insight gateway: analysis and translation of note text through a
//! remote chat-completion model.
//!
//! [`InsightGateway`] is the capability the rest of the application sees.
//! Its methods never fail: transport errors, timeouts and unparseable model
//! output all resolve to a defined fallback value, because insights are
//! advisory and must never block editing. [`ChatInsightGateway`] implements
//! it on top of any [`ChatProvider`]; [`OpenAiCompatibleClient`] is the
//! HTTP provider for OpenAI-style endpoints.

mod gateway;
mod openai;
mod provider;

use crate::AiNotesError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use gateway::ChatInsightGateway;
pub use openai::OpenAiCompatibleClient;
pub use provider::{ChatMessage, ChatProvider, ChatRequest, ChatRole};

/// A term from the note and its plain-text definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

/// A grammar, spelling, punctuation or style problem found in the note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarIssue {
    /// The exact offending text.
    pub text: String,
    /// The corrected version.
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// `grammar`, `spelling`, `punctuation` or `style`, as reported by the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Everything the gateway derives from one note.
///
/// The sequences are always present; an empty `Vec` means "nothing found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightBundle {
    pub summary: String,
    pub tags: Vec<String>,
    pub glossary: Vec<GlossaryEntry>,
    pub grammar: Vec<GrammarIssue>,
}

/// The analysis and translation capability.
///
/// Implementations must not fail: `analyze` returns a best-effort bundle and
/// `translate` returns its input unchanged when anything goes wrong. Callers
/// are responsible for never passing the content of a locked note (see
/// [`crate::analyze_note`]).
#[async_trait]
pub trait InsightGateway: Send + Sync {
    /// Analyzes plain (markup-free) note text.
    async fn analyze(&self, plain_text: &str) -> InsightBundle;

    /// Translates `content` into `target`.
    async fn translate(&self, content: &str, target: Language) -> String;
}

/// Target languages offered for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Chinese,
    Arabic,
    Russian,
    Korean,
    Bengali,
    Turkish,
    Hindi,
    Japanese,
    Punjabi,
}

impl Language {
    pub const ALL: [Language; 15] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Chinese,
        Language::Arabic,
        Language::Russian,
        Language::Korean,
        Language::Bengali,
        Language::Turkish,
        Language::Hindi,
        Language::Japanese,
        Language::Punjabi,
    ];

    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Italian => "it",
            Self::Portuguese => "pt",
            Self::Chinese => "zh",
            Self::Arabic => "ar",
            Self::Russian => "ru",
            Self::Korean => "ko",
            Self::Bengali => "bn",
            Self::Turkish => "tr",
            Self::Hindi => "hi",
            Self::Japanese => "ja",
            Self::Punjabi => "pa",
        }
    }

    /// English name used in the translation prompt.
    pub fn name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
            Self::Italian => "Italian",
            Self::Portuguese => "Portuguese",
            Self::Chinese => "Chinese (Simplified)",
            Self::Arabic => "Arabic",
            Self::Russian => "Russian",
            Self::Korean => "Korean",
            Self::Bengali => "Bengali",
            Self::Turkish => "Turkish",
            Self::Hindi => "Hindi",
            Self::Japanese => "Japanese",
            Self::Punjabi => "Punjabi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = AiNotesError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let wanted = code.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == wanted)
            .ok_or_else(|| AiNotesError::InvalidLanguage(code.to_string()))
    }
}

/// Connection settings for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound for a single request, in seconds.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: 30,
        }
    }
}
