//! Configuration types for PDF translation.
//!
//! All translation behaviour is controlled through [`TranslatorConfig`], built
//! via its [`TranslatorConfigBuilder`]. The entry point (the CLI or an
//! embedding application) constructs it once, resolves the API key with
//! [`resolve_api_key`], and passes it to
//! [`crate::pipeline::llm::TranslationClient::from_config`]. Nothing in the
//! library reads the credential on its own after that.

use crate::error::PdfTranslateError;
use crate::provider::ChatProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Default OpenAI-compatible chat-completion endpoint (Groq).
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "mixtral-8x7b-32768";

/// Default sampling temperature: low, for literal rather than creative translation.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Environment variable pointing at a TOML secrets file.
pub const SECRETS_FILE_ENV: &str = "PDF_TRANSLATE_SECRETS";

/// An API key. `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// Configuration for the translation client and exporter.
///
/// Built via [`TranslatorConfig::builder()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf_translate::{ApiKey, ExportFormat, TranslatorConfig};
///
/// let config = TranslatorConfig::builder()
///     .api_key(ApiKey::new("gsk_test"))
///     .output_format(ExportFormat::Word)
///     .build()
///     .unwrap();
/// assert_eq!(config.temperature, 0.3);
/// ```
#[derive(Clone)]
pub struct TranslatorConfig {
    /// Credential for the remote endpoint.
    pub api_key: Option<ApiKey>,

    /// Base URL of an OpenAI-compatible API; `/chat/completions` is appended.
    pub endpoint: String,

    /// Model identifier sent with every request. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature. Default: 0.3.
    pub temperature: f32,

    /// Upper bound on generated tokens. `None` leaves it to the provider.
    pub max_tokens: Option<u32>,

    /// Per-request timeout. `None` keeps the HTTP client's default (no timeout).
    pub api_timeout_secs: Option<u64>,

    /// Which exporter path runs. Default: PDF.
    pub output_format: ExportFormat,

    /// Pre-constructed provider. Takes precedence over `endpoint` / `api_key`.
    pub provider: Option<Arc<dyn ChatProvider>>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            api_timeout_secs: None,
            output_format: ExportFormat::default(),
            provider: None,
        }
    }
}

impl fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("api_key", &self.api_key)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("output_format", &self.output_format)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

impl TranslatorConfig {
    /// Create a new builder for `TranslatorConfig`.
    pub fn builder() -> TranslatorConfigBuilder {
        TranslatorConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranslatorConfig`].
#[derive(Debug)]
pub struct TranslatorConfigBuilder {
    config: TranslatorConfig,
}

impl TranslatorConfigBuilder {
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.config.api_key = Some(key);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t;
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn output_format(mut self, format: ExportFormat) -> Self {
        self.config.output_format = format;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslatorConfig, PdfTranslateError> {
        let c = &self.config;
        if c.provider.is_none() {
            match c.api_key {
                Some(ref key) if !key.is_empty() => {}
                _ => {
                    return Err(PdfTranslateError::MissingCredential {
                        hint: missing_credential_hint(),
                    })
                }
            }
            if !(c.endpoint.starts_with("http://") || c.endpoint.starts_with("https://")) {
                return Err(PdfTranslateError::InvalidConfig(format!(
                    "endpoint must be an http(s) URL, got '{}'",
                    c.endpoint
                )));
            }
        }
        if c.model.trim().is_empty() {
            return Err(PdfTranslateError::InvalidConfig(
                "model identifier must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&c.temperature) {
            return Err(PdfTranslateError::InvalidConfig(format!(
                "temperature must be 0.0–2.0, got {}",
                c.temperature
            )));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(PdfTranslateError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Credential resolution ────────────────────────────────────────────────

/// Layout of the TOML secrets file:
///
/// ```toml
/// [groq]
/// api_key = "gsk_..."
/// ```
#[derive(Debug, Deserialize)]
struct SecretsFile {
    groq: Option<GroqSecrets>,
}

#[derive(Debug, Deserialize)]
struct GroqSecrets {
    api_key: Option<String>,
}

/// Resolve the API key, from most-specific to least-specific:
///
/// 1. `explicit` — a `--api-key` flag or the `GROQ_API_KEY` variable (the CLI
///    lets clap fill this from the environment);
/// 2. `secrets_path` — the `[groq] api_key` entry of a TOML secrets file.
///
/// Returns [`PdfTranslateError::MissingCredential`] when neither yields a
/// non-empty key.
pub fn resolve_api_key(
    explicit: Option<&str>,
    secrets_path: Option<&Path>,
) -> Result<ApiKey, PdfTranslateError> {
    if let Some(key) = explicit.map(str::trim).filter(|k| !k.is_empty()) {
        debug!("Using API key from command line / environment");
        return Ok(ApiKey::new(key));
    }

    if let Some(path) = secrets_path {
        if let Some(key) = load_secrets_file(path)? {
            debug!("Using API key from secrets file {}", path.display());
            return Ok(key);
        }
    }

    Err(PdfTranslateError::MissingCredential {
        hint: missing_credential_hint(),
    })
}

/// Read the `[groq] api_key` entry from a TOML secrets file.
///
/// `Ok(None)` when the file parses but has no (non-empty) key.
pub fn load_secrets_file(path: &Path) -> Result<Option<ApiKey>, PdfTranslateError> {
    let raw = std::fs::read_to_string(path).map_err(|e| PdfTranslateError::SecretsFile {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let parsed: SecretsFile = toml::from_str(&raw).map_err(|e| PdfTranslateError::SecretsFile {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    Ok(parsed
        .groq
        .and_then(|g| g.api_key)
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .map(ApiKey::new))
}

pub(crate) fn missing_credential_hint() -> String {
    format!(
        "Set {API_KEY_ENV}, pass --api-key, or point {SECRETS_FILE_ENV} / --secrets at a TOML \
         file containing:\n  [groq]\n  api_key = \"gsk_...\""
    )
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output format selector: a closed set of two exporter paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Paginated, letter-sized PDF. (default)
    #[default]
    Pdf,
    /// Word document (.docx).
    Word,
}

impl ExportFormat {
    /// Download name of the exported artifact.
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "translated.pdf",
            ExportFormat::Word => "translated.docx",
        }
    }

    /// MIME type of the exported artifact.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Label shown in the format selector.
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Word => "Word (.docx)",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Pdf => f.write_str("PDF"),
            ExportFormat::Word => f.write_str("Word"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PdfTranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "word" | "docx" | ".docx" | "word (.docx)" => Ok(ExportFormat::Word),
            other => Err(PdfTranslateError::InvalidConfig(format!(
                "unknown output format '{other}' (expected pdf or word)"
            ))),
        }
    }
}
