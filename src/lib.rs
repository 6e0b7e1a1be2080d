//! # edgequake-pdf-translate
//!
//! Translate the text of a PDF into English with a chat-completion model and
//! hand the result back as a PDF or Word document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract  read each page's text layer (pdf-extract); no OCR
//!  ├─ 2. Prompt   fixed translator role + instruction + full text
//!  ├─ 3. Call     one chat completion (Groq by default), no retries
//!  └─ 4. Export   one paragraph per line → translated.pdf / translated.docx
//! ```
//!
//! The steps are driven by a [`Session`], a small state machine that keeps one
//! document at a time and refuses overlapping actions. The `pdf-translate`
//! binary puts an interactive [`shell::Shell`] on top of it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf_translate::{translate_file, ExportFormat, TranslatorConfig};
//! use edgequake_pdf_translate::config::resolve_api_key;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // GROQ_API_KEY, or a TOML secrets file with [groq] api_key = "..."
//!     let config = TranslatorConfig::builder()
//!         .api_key(resolve_api_key(None, None)?)
//!         .output_format(ExportFormat::Word)
//!         .build()?;
//!     let stats = translate_file("contract.pdf", "translated.docx", &config).await?;
//!     eprintln!("{} pages, {} bytes written", stats.pages, stats.output_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-translate` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf-translate = { version = "0.1", default-features = false }
//! ```
//!
//! ## Limits
//!
//! The whole document goes out in one request; a document larger than the
//! model's context window is rejected by the endpoint and reported as
//! [`PdfTranslateError::RequestRejected`]. The PDF exporter embeds DejaVu Sans,
//! which covers Latin, Greek, Cyrillic, Arabic and Hebrew but not CJK; missing
//! characters print as `?`. Export as Word for those scripts.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod session;
pub mod shell;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ApiKey, ExportFormat, TranslatorConfig, TranslatorConfigBuilder};
pub use error::{ErrorKind, PdfTranslateError, SessionError};
pub use model::{
    ExportedDocument, ExtractedText, TranslationRequest, TranslationResult, UploadedDocument,
};
pub use pipeline::export::export;
pub use pipeline::extract::extract_text;
pub use pipeline::llm::TranslationClient;
pub use progress::{NoopObserver, SessionObserver};
pub use prompts::build_translation_request;
pub use provider::{ChatProvider, OpenAiCompatibleProvider};
pub use session::{Session, SessionState};
pub use translate::{
    extract_file, translate_document, translate_file, translate_sync, TranslationOutput,
    TranslationStats,
};
