/// LLM client: the single point of entry for all Gemini API calls.
///
/// No other module may call the generative API directly. Handlers and tasks
/// depend on the `TextGenerator` trait so the backend can be swapped in tests.
///
/// The gateway fails closed: every failure comes back as text starting with
/// `Error`, never as a Rust error. Callers check with `is_error_text`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod normalize;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Error: No API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Error: No response candidates (possible safety block)")]
    NoCandidates,

    #[error("Error connecting to AI: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Error: Unexpected response from AI: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Returns true when a gateway result is a rendered failure rather than model output.
pub fn is_error_text(text: &str) -> bool {
    text.starts_with("Error")
}

/// Anything that turns one prompt into one block of text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Whether an upstream credential is configured at all.
    fn has_credentials(&self) -> bool;

    /// Sends `prompt` and returns the model text, or an `Error...` string.
    async fn generate(&self, prompt: &str) -> String;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default, rename = "usageMetadata")]
    usage: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(default, rename = "promptTokenCount")]
    prompt_tokens: u32,
    #[serde(default, rename = "candidatesTokenCount")]
    output_tokens: u32,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
    }
}

/// Gemini `generateContent` client. One attempt per call, fixed timeout.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, api_base: &str, model: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes one call to the API, returning the model text.
    pub async fn try_generate(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{}/{}:generateContent", self.api_base, self.model);

        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: GenerateResponse = serde_json::from_slice(&bytes)?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_tokens, usage.output_tokens
            );
        }

        parsed.into_text().ok_or(LlmError::NoCandidates)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: &str) -> String {
        match self.try_generate(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("LLM call failed: {e}");
                e.to_string()
            }
        }
    }
}
