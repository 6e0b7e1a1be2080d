//! Transient data model of one translation interaction.
//!
//! ```text
//! UploadedDocument ──extract──▶ ExtractedText ──prompt──▶ TranslationRequest
//!                                                              │
//!                    ExportedDocument ◀──export── TranslationResult ◀──LLM──┘
//! ```
//!
//! Every value is produced once and never mutated afterwards.

use crate::config::ExportFormat;
use crate::error::PdfTranslateError;
use crate::provider::{ChatMessage, TokenUsage};
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Raw bytes of one uploaded PDF.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Wrap bytes that were already received (e.g. from a web form).
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read an upload from disk.
    ///
    /// Only `.pdf` files are accepted; the `%PDF` magic check happens in the
    /// extractor so that byte uploads get the same treatment.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, PdfTranslateError> {
        let path = path.as_ref();

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(PdfTranslateError::UnsupportedUpload {
                name: path.display().to_string(),
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => PdfTranslateError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => PdfTranslateError::FileNotFound {
                path: path.to_path_buf(),
            },
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        debug!("Read upload '{}' ({} bytes)", name, bytes.len());

        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Per-page text of a PDF, in page order.
///
/// A page whose content could not be interpreted is kept as an empty string
/// so numbering stays aligned with the PDF; its 1-based number is listed in
/// [`failed_pages`](Self::failed_pages).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pages: Vec<String>,
    failed_pages: Vec<usize>,
}

impl ExtractedText {
    pub fn from_pages(pages: Vec<String>) -> Self {
        Self {
            pages,
            failed_pages: Vec::new(),
        }
    }

    pub fn with_failed_pages(mut self, failed_pages: Vec<usize>) -> Self {
        self.failed_pages = failed_pages;
        self
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based numbers of the pages that yielded no text because of an error.
    pub fn failed_pages(&self) -> &[usize] {
        &self.failed_pages
    }

    /// Every page followed by one newline, concatenated.
    pub fn as_text(&self) -> String {
        let bytes: usize = self.pages.iter().map(String::len).sum();
        let mut out = String::with_capacity(bytes + self.pages.len());
        for page in &self.pages {
            out.push_str(page);
            out.push('\n');
        }
        out
    }

    /// Number of characters (Unicode scalar values) of page text, separators
    /// excluded.
    pub fn char_len(&self) -> usize {
        self.pages.iter().map(|p| p.chars().count()).sum()
    }

    /// True when no page has any non-whitespace text (e.g. a scanned PDF).
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for page in &self.pages {
            writeln!(f, "{page}")?;
        }
        Ok(())
    }
}

/// The two-message chat request sent for one translation.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub messages: Vec<ChatMessage>,
}

/// Text returned by the model, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationResult {
    text: String,
    usage: Option<TokenUsage>,
}

impl TranslationResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn usage(&self) -> Option<TokenUsage> {
        self.usage
    }

    /// The text split on `\n`, each line stripped of a trailing `\r`.
    ///
    /// Both exporters consume exactly this sequence. Like `str::split`, an
    /// empty text yields one empty line.
    pub fn lines(&self) -> Vec<&str> {
        split_lines(&self.text)
    }
}

impl fmt::Display for TranslationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect()
}

/// A fully written export, ready to hand to the user.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    format: ExportFormat,
    bytes: Vec<u8>,
}

impl ExportedDocument {
    pub(crate) fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A reader positioned at the start of the buffer.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(&self.bytes)
    }
}

impl fmt::Debug for ExportedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportedDocument")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}
