//! Chat-completion providers.
//!
//! [`ChatProvider`] is the seam between the translation client and the remote
//! model. The crate ships one implementation, [`OpenAiCompatibleProvider`],
//! which speaks the OpenAI `/chat/completions` wire format used by Groq,
//! OpenAI, vLLM, LM Studio and friends. Tests and embedding applications can
//! inject their own implementation through
//! [`crate::config::TranslatorConfigBuilder::provider`].
//!
//! ## Status mapping
//!
//! | HTTP status | Error |
//! |-------------|-------|
//! | 401, 403 | [`PdfTranslateError::Auth`] |
//! | 5xx | [`PdfTranslateError::Transport`] |
//! | anything else non-2xx (400, 413, 429, …) | [`PdfTranslateError::RequestRejected`] |

use crate::config::ApiKey;
use crate::error::PdfTranslateError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Request body of `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// The part of a completion the translator cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    /// Content of the first choice, untrimmed.
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// A remote (or stubbed) chat-completion endpoint.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Issue exactly one completion request.
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion, PdfTranslateError>;
}

// ── OpenAI-compatible HTTP provider ─────────────────────────────────────────

/// Wire shape of a successful response; only the fields we read.
#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
}

/// Wire shape of an error body: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct WireErrorBody {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

/// Client for any endpoint implementing the OpenAI chat-completions API.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: ApiKey,
    name: String,
}

impl OpenAiCompatibleProvider {
    /// Create a provider for `endpoint` (base URL, e.g. `https://api.groq.com/openai/v1`).
    ///
    /// `timeout` of `None` keeps reqwest's default, which never times out.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: ApiKey,
        timeout: Option<Duration>,
    ) -> Result<Self, PdfTranslateError> {
        let endpoint = endpoint.into();
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| PdfTranslateError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            name: provider_name_for(&endpoint),
            endpoint,
            api_key,
        })
    }

    /// Full URL of the completions route.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for OpenAiCompatibleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key)
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion, PdfTranslateError> {
        let url = self.completions_url();
        debug!("POST {} (model {})", url, request.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&self.name, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} API error ({}): {}", self.name, status, body);
            return Err(classify_status(&self.name, status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&self.name, &e))?;
        parse_completion(&self.name, &body)
    }
}

/// Map a non-success status and its body to the error taxonomy.
pub fn classify_status(provider: &str, status: StatusCode, body: &str) -> PdfTranslateError {
    let detail = api_error_message(body);
    let provider = provider.to_string();
    match status.as_u16() {
        401 | 403 => PdfTranslateError::Auth {
            provider,
            status: status.as_u16(),
            detail,
        },
        500..=599 => PdfTranslateError::Transport {
            provider,
            detail: format!("HTTP {status}: {detail}"),
        },
        code => PdfTranslateError::RequestRejected {
            provider,
            status: code,
            detail,
        },
    }
}

/// Parse a 2xx body into the first choice's content.
pub fn parse_completion(provider: &str, body: &str) -> Result<ChatCompletion, PdfTranslateError> {
    let parsed: WireResponse =
        serde_json::from_str(body).map_err(|e| PdfTranslateError::MalformedResponse {
            provider: provider.to_string(),
            detail: format!("invalid JSON: {e}"),
        })?;

    let usage = parsed.usage;
    let first = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| PdfTranslateError::MalformedResponse {
            provider: provider.to_string(),
            detail: "response contained no choices".into(),
        })?;

    Ok(ChatCompletion {
        content: first.message.content.unwrap_or_default(),
        usage,
    })
}

/// Prefer the API's own `error.message`; otherwise a bounded slice of the raw body.
fn api_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<WireErrorBody>(body) {
        return parsed.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no response body".to_string();
    }
    match trimmed.char_indices().nth(300) {
        Some((idx, _)) => format!("{}\u{2026}", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

fn transport_error(provider: &str, e: &reqwest::Error) -> PdfTranslateError {
    let detail = if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    };
    PdfTranslateError::Transport {
        provider: provider.to_string(),
        detail,
    }
}

/// Derive a short provider name from the endpoint host.
fn provider_name_for(endpoint: &str) -> String {
    match reqwest::Url::parse(endpoint) {
        Ok(url) => match url.host_str() {
            Some(host) if host.ends_with("groq.com") => "groq".to_string(),
            Some(host) if host.ends_with("openai.com") => "openai".to_string(),
            Some(host) => host.to_string(),
            None => "openai-compatible".to_string(),
        },
        Err(_) => "openai-compatible".to_string(),
    }
}
