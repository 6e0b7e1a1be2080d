//! Error types for the edgequake-pdf-translate library.
//!
//! Two error types reflect two different failure sources:
//!
//! * [`PdfTranslateError`] — a fault raised by one of the pipeline components
//!   (extractor, translation client, exporter) or by configuration. Every
//!   variant belongs to exactly one [`ErrorKind`] of the taxonomy.
//!
//! * [`SessionError`] — returned by [`crate::session::Session`] actions. It
//!   either wraps a component fault verbatim or reports that the requested
//!   action is not possible in the current session state (busy, nothing
//!   uploaded yet, nothing translated yet).

use crate::config::ExportFormat;
use crate::session::SessionState;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All faults raised by the pipeline components and the configuration layer.
#[derive(Debug, Error)]
pub enum PdfTranslateError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Only PDF uploads are accepted.
    #[error("'{name}' is not a PDF upload (expected a .pdf file)")]
    UnsupportedUpload { name: String },

    /// The bytes were read, but they are not a PDF.
    #[error("Upload is not a valid PDF. First bytes: {magic:?}")]
    NotAPdf { magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt, or the document has no pages.
    #[error("Could not parse PDF: {detail}")]
    DocumentParse { detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The endpoint rejected the credential (401/403).
    #[error("Authentication error from provider '{provider}' (HTTP {status}): {detail}\nCheck GROQ_API_KEY.")]
    Auth {
        provider: String,
        status: u16,
        detail: String,
    },

    /// Network failure, timeout, or a server-side (5xx) failure.
    #[error("Could not reach provider '{provider}': {detail}")]
    Transport { provider: String, detail: String },

    /// The endpoint refused the request: quota, rate limit, input too large, bad model.
    #[error("Provider '{provider}' rejected the request (HTTP {status}): {detail}")]
    RequestRejected {
        provider: String,
        status: u16,
        detail: String,
    },

    /// The endpoint answered 2xx but the body was not a usable chat completion.
    #[error("Unexpected response from provider '{provider}': {detail}")]
    MalformedResponse { provider: String, detail: String },

    /// The model returned an empty or whitespace-only translation.
    #[error("The model returned an empty translation")]
    EmptyTranslation,

    // ── Export errors ─────────────────────────────────────────────────────
    /// A line could not be rendered into the selected output format.
    #[error("Could not render {format} export{}: {detail}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Render {
        format: ExportFormat,
        line: Option<usize>,
        detail: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API key could be found. Fatal at startup.
    #[error("No API key configured.\n{hint}")]
    MissingCredential { hint: String },

    /// The secrets file exists but could not be read or parsed.
    #[error("Failed to read secrets file '{path}': {detail}")]
    SecretsFile { path: PathBuf, detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the exported file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The fault taxonomy every [`PdfTranslateError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Bad or unsupported PDF.
    DocumentParse,
    /// Bad credential.
    Auth,
    /// Network, timeout or server failure.
    Transport,
    /// Quota, size limit or unusable answer.
    RequestRejected,
    /// Export-time encoding or packaging failure.
    Render,
    /// Missing or unreadable upload.
    Input,
    /// Missing credential or invalid settings.
    Config,
    /// Local file-system failure.
    Io,
}

impl PdfTranslateError {
    /// The taxonomy bucket of this fault.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DocumentParse { .. } | Self::NotAPdf { .. } => ErrorKind::DocumentParse,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::RequestRejected { .. } | Self::MalformedResponse { .. } | Self::EmptyTranslation => {
                ErrorKind::RequestRejected
            }
            Self::Render { .. } => ErrorKind::Render,
            Self::FileNotFound { .. } | Self::PermissionDenied { .. } | Self::UnsupportedUpload { .. } => {
                ErrorKind::Input
            }
            Self::MissingCredential { .. } | Self::SecretsFile { .. } | Self::InvalidConfig(_) => {
                ErrorKind::Config
            }
            Self::OutputWriteFailed { .. } | Self::Internal(_) => ErrorKind::Io,
        }
    }

    /// Only a missing credential ends the process; everything else is shown
    /// to the user and the session stays usable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingCredential { .. })
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::DocumentParse => "DocumentParseError",
            ErrorKind::Auth => "AuthError",
            ErrorKind::Transport => "TransportError",
            ErrorKind::RequestRejected => "RequestRejectedError",
            ErrorKind::Render => "RenderError",
            ErrorKind::Input => "InputError",
            ErrorKind::Config => "ConfigError",
            ErrorKind::Io => "IoError",
        };
        f.write_str(name)
    }
}

/// Errors returned by [`crate::session::Session`] actions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A component fault, surfaced unmodified.
    #[error(transparent)]
    Fault(#[from] PdfTranslateError),

    /// Another action is still running for this session.
    #[error("Please wait: the session is busy ({state})")]
    Busy { state: SessionState },

    /// The action's prerequisite is missing (no upload, no translation, …).
    #[error("Cannot {action}: {reason}")]
    NotReady {
        action: &'static str,
        reason: &'static str,
    },
}

impl SessionError {
    /// The wrapped component fault, if any.
    pub fn fault(&self) -> Option<&PdfTranslateError> {
        match self {
            SessionError::Fault(e) => Some(e),
            _ => None,
        }
    }
}
