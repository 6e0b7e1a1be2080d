//! One-shot entry points: upload → translate → export in a single call.
//!
//! These drive the same [`Session`] the interactive shell uses, so the
//! state rules and error reporting are identical; they just stop at the first
//! fault instead of waiting for the next command.

use crate::config::{ExportFormat, TranslatorConfig};
use crate::error::{PdfTranslateError, SessionError};
use crate::model::{ExportedDocument, ExtractedText, TranslationResult, UploadedDocument};
use crate::pipeline::{extract, llm::TranslationClient};
use crate::session::Session;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Everything produced by one translation.
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    pub extracted: ExtractedText,
    pub translation: TranslationResult,
    pub document: ExportedDocument,
    pub stats: TranslationStats,
}

/// Summary numbers for one translation, suitable for `--json`-style output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationStats {
    pub pages: usize,
    pub failed_pages: usize,
    pub extracted_chars: usize,
    pub translated_chars: usize,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub format: ExportFormat,
    pub output_bytes: usize,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Translate an uploaded PDF and export it in `config.output_format`.
///
/// # Errors
/// The first fault from extraction, the remote call or the exporter, as-is.
pub async fn translate_document(
    document: UploadedDocument,
    config: &TranslatorConfig,
) -> Result<TranslationOutput, PdfTranslateError> {
    let client = TranslationClient::from_config(config)?;
    let mut session = Session::new().with_format(config.output_format);
    translate_in_session(&mut session, document, &client).await
}

/// Run the whole flow on `session`, which must not be busy.
///
/// Callers that want events (a progress spinner, say) attach an observer to
/// the session before calling this.
pub async fn translate_in_session(
    session: &mut Session,
    document: UploadedDocument,
    client: &TranslationClient,
) -> Result<TranslationOutput, PdfTranslateError> {
    let total_start = Instant::now();
    info!("Starting translation: {}", document.name());

    session.upload(document).map_err(into_fault)?;

    let llm_start = Instant::now();
    session.translate(client).await.map_err(into_fault)?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    session.export().map_err(into_fault)?;

    let (Some(extracted), Some(translation), Some(document)) = (
        session.extracted().cloned(),
        session.translation().cloned(),
        session.exported().cloned(),
    ) else {
        return Err(PdfTranslateError::Internal(
            "session finished without a result".into(),
        ));
    };

    let usage = translation.usage();
    let stats = TranslationStats {
        pages: extracted.page_count(),
        failed_pages: extracted.failed_pages().len(),
        extracted_chars: extracted.char_len(),
        translated_chars: translation.as_str().chars().count(),
        input_tokens: usage.map(|u| u.prompt_tokens),
        output_tokens: usage.map(|u| u.completion_tokens),
        format: document.format(),
        output_bytes: document.len(),
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Translation complete: {} pages → {} bytes of {}, {}ms total",
        stats.pages, stats.output_bytes, stats.format, stats.total_duration_ms
    );

    Ok(TranslationOutput {
        extracted,
        translation,
        document,
        stats,
    })
}

/// Translate the PDF at `input` and write the export to `output`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn translate_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &TranslatorConfig,
) -> Result<TranslationStats, PdfTranslateError> {
    let document = UploadedDocument::from_path(input).await?;
    let TranslationOutput { document, stats, .. } = translate_document(document, config).await?;
    write_atomic(output.as_ref(), &document.into_bytes()).await?;
    Ok(stats)
}

/// Synchronous wrapper around [`translate_document`] for a file on disk.
///
/// Creates a temporary tokio runtime internally.
pub fn translate_sync(
    input: impl AsRef<Path>,
    config: &TranslatorConfig,
) -> Result<TranslationOutput, PdfTranslateError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfTranslateError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(async {
            let document = UploadedDocument::from_path(input).await?;
            translate_document(document, config).await
        })
}

/// Extract the text of a PDF without translating it.
///
/// Does not require an API key.
pub async fn extract_file(input: impl AsRef<Path>) -> Result<ExtractedText, PdfTranslateError> {
    let document = UploadedDocument::from_path(input).await?;
    extract::extract_text(document.bytes())
}

/// Write `bytes` to `path` via a sibling temp file and a rename, creating
/// parent directories as needed.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PdfTranslateError> {
    let write_err = |source| PdfTranslateError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}

/// Unwrap the component fault; session-rule violations cannot happen on a
/// fresh session but are reported rather than dropped.
fn into_fault(error: SessionError) -> PdfTranslateError {
    match error {
        SessionError::Fault(e) => e,
        other => PdfTranslateError::Internal(other.to_string()),
    }
}
