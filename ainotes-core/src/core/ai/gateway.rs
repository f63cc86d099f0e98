use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use super::provider::{ChatMessage, ChatProvider, ChatRequest};
use super::{GlossaryEntry, GrammarIssue, InsightBundle, InsightGateway, Language};
use crate::core::markup::{first_sentence, plain_text};

const ANALYSIS_PROMPT: &str = r#"You are an advanced grammar checker and note analysis assistant. Analyze the text for grammar issues and important terms. Then provide the analysis in JSON format following this structure.

VERY IMPORTANT GUIDELINES:
1. For grammar issues: ONLY include REAL errors - do not make up issues if the text is grammatically correct
2. For glossary: ALWAYS identify important terms or phrases from the text that might need explanation
3. Each glossary term MUST be a word or phrase that actually appears in the input text
4. Provide clear, concise definitions for each term
5. If there are no errors, return an empty array for grammarIssues

{
  "summary": "A concise 2-3 sentence summary using only plain text.",
  "tags": ["tag1", "tag2", "tag3"],
  "glossary": [
    { "term": "exact word or phrase from the text", "definition": "clear, concise definition in plain text" }
  ],
  "grammarIssues": [
    {
      "text": "the exact text with the error",
      "type": "grammar/spelling/punctuation/style",
      "suggestion": "the corrected version",
      "explanation": "brief explanation of why this is an error"
    }
  ]
}

Guidelines:
- Summary: 2-3 clear sentences in plain text only
- Tags: 3-5 simple word tags without special characters
- Respond with the JSON object only. NO markdown, NO formatting."#;

const FALLBACK_SUMMARY: &str = "Failed to analyze note. Please try again.";
const MISSING_SUMMARY: &str = "No summary available";

fn translation_prompt(target: Language) -> String {
    format!(
        "You are an expert translator and localization specialist. Translate the following text into {} \
with fluent, natural, and idiomatic language while preserving the original meaning, tone, and formality.

Rules:
- Return ONLY the translated text. Do not add explanations, annotations, examples, or formatting notes.
- Preserve technical terms, proper nouns, numbers, dates, code snippets, placeholders (e.g. {{{{name}}}}), markdown, and HTML tags exactly as they appear.
- Keep paragraph and line-break boundaries.
- Prefer natural, idiomatic phrasing over literal word-for-word rendering.
- Detect the source language automatically.
- If you cannot translate a portion, copy it verbatim into the output.",
        target.name()
    )
}

/// [`InsightGateway`] backed by a chat-completion model.
///
/// Every failure is logged and turned into the documented fallback, so
/// callers never see an error.
pub struct ChatInsightGateway<P> {
    provider: P,
}

impl<P: ChatProvider> ChatInsightGateway<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Sends a trivial prompt and reports whether the model answered `OK`.
    pub async fn check_connection(&self) -> bool {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("Respond with just: OK")],
            temperature: None,
            max_tokens: Some(10),
        };
        match self.provider.complete(&request).await {
            Ok(reply) => reply.contains("OK"),
            Err(e) => {
                log::warn!("AI connection test failed: {e:#}");
                false
            }
        }
    }

    async fn request_analysis(&self, text: &str) -> Result<InsightBundle> {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(ANALYSIS_PROMPT),
                ChatMessage::user(format!(
                    "Please analyze this note and provide a complete analysis: {text}"
                )),
            ],
            ..ChatRequest::default()
        };
        let reply = self.provider.complete(&request).await?;
        parse_analysis(&reply)
    }

    async fn request_translation(&self, content: &str, target: Language) -> Result<String> {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(translation_prompt(target)),
                ChatMessage::user(content),
            ],
            ..ChatRequest::default()
        };
        let reply = self.provider.complete(&request).await?;
        let translated = reply.trim();
        if translated.is_empty() {
            return Err(anyhow!("no translation from model"));
        }
        Ok(translated.to_string())
    }
}

#[async_trait]
impl<P: ChatProvider> InsightGateway for ChatInsightGateway<P> {
    async fn analyze(&self, plain: &str) -> InsightBundle {
        if plain.trim().is_empty() {
            return InsightBundle::default();
        }
        match self.request_analysis(plain).await {
            Ok(bundle) => bundle,
            Err(e) => {
                log::error!("AI analysis failed: {e:#}");
                fallback_bundle(plain)
            }
        }
    }

    async fn translate(&self, content: &str, target: Language) -> String {
        if content.trim().is_empty() {
            return content.to_string();
        }
        match self.request_translation(content, target).await {
            Ok(translated) => translated,
            Err(e) => {
                log::error!("Translation to {} failed: {e:#}", target.code());
                content.to_string()
            }
        }
    }
}

/// Locally derived bundle used when the model cannot be reached or understood.
fn fallback_bundle(text: &str) -> InsightBundle {
    let plain = plain_text(text);
    InsightBundle {
        summary: first_sentence(&plain)
            .unwrap_or(FALLBACK_SUMMARY)
            .to_string(),
        ..InsightBundle::default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawAnalysis {
    summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    glossary: Vec<RawGlossaryEntry>,
    #[serde(deserialize_with = "null_as_default")]
    grammar_issues: Vec<RawGrammarIssue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGlossaryEntry {
    #[serde(deserialize_with = "null_as_default")]
    term: String,
    #[serde(deserialize_with = "null_as_default")]
    definition: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawGrammarIssue {
    #[serde(deserialize_with = "null_as_default")]
    text: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    suggestion: String,
    explanation: Option<String>,
}

/// Models sometimes send `null` where a list or string belongs.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn parse_analysis(reply: &str) -> Result<InsightBundle> {
    let json = extract_json_object(reply).context("model reply contains no JSON object")?;
    let raw: RawAnalysis = serde_json::from_str(json).context("model reply is not valid analysis JSON")?;

    let summary = raw
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| MISSING_SUMMARY.to_string());
    let tags = raw
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let glossary = raw
        .glossary
        .into_iter()
        .filter(|entry| !entry.term.trim().is_empty())
        .map(|entry| GlossaryEntry {
            term: entry.term.trim().to_string(),
            definition: entry.definition.trim().to_string(),
        })
        .collect();
    let grammar = raw
        .grammar_issues
        .into_iter()
        .filter(|issue| !issue.text.is_empty())
        .map(|issue| GrammarIssue {
            text: issue.text,
            suggestion: issue.suggestion,
            explanation: issue.explanation.filter(|e| !e.trim().is_empty()),
            kind: issue.kind,
        })
        .collect();

    Ok(InsightBundle {
        summary,
        tags,
        glossary,
        grammar,
    })
}

/// Finds the outermost `{ ... }` in a reply, skipping code fences or chatter
/// the model may wrap around it.
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}
