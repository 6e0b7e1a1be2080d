//! The single-document session behind the shell.
//!
//! ```text
//!            upload ok                 translate               export ok
//!  Empty ───────────────▶ Extracted ─────────────▶ Translating ──────▶ Translated ◀─┐
//!    ▲    upload fault        │                         │ fault          │   export   │
//!    │         ▼              │                         ▼                ▼            │
//!    └─ reset ─ Error ◀───────┴─────────────────────── Error ◀─ fault ─ Exporting ───┘
//! ```
//!
//! A session holds at most one upload, its extracted text, the latest
//! successful translation and the latest export. Every action takes
//! `&mut self`, so two actions can never overlap on one session; the busy
//! states exist so that a front end driving the session from callbacks (or
//! calling [`Session::begin_translation`] and
//! [`Session::complete_translation`] around its own request) can refuse input
//! while the remote call is outstanding.
//!
//! A fault never loses earlier work: a failed translation keeps the extracted
//! text, a failed export keeps the translation.

use crate::config::ExportFormat;
use crate::error::{PdfTranslateError, SessionError};
use crate::model::{
    ExportedDocument, ExtractedText, TranslationRequest, TranslationResult, UploadedDocument,
};
use crate::pipeline::{export, extract, llm::TranslationClient};
use crate::progress::ObserverRef;
use crate::prompts::build_translation_request;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Where a session is in the upload → translate → export flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Nothing uploaded.
    #[default]
    Empty,
    /// Text extracted; ready to translate.
    Extracted,
    /// A translation request is outstanding.
    Translating,
    /// A translation is available (and possibly an export).
    Translated,
    /// An export is being written.
    Exporting,
    /// The last action failed; see [`Session::last_error`].
    Error,
}

impl SessionState {
    /// True while an action is in progress and new actions must wait.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Translating | SessionState::Exporting)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Empty => "empty",
            SessionState::Extracted => "extracted",
            SessionState::Translating => "translating",
            SessionState::Translated => "translated",
            SessionState::Exporting => "exporting",
            SessionState::Error => "error",
        };
        f.write_str(s)
    }
}

/// One user's interaction: one document at a time.
#[derive(Default)]
pub struct Session {
    state: SessionState,
    format: ExportFormat,
    upload: Option<UploadedDocument>,
    extracted: Option<ExtractedText>,
    translation: Option<TranslationResult>,
    exported: Option<ExportedDocument>,
    last_error: Option<String>,
    observer: Option<ObserverRef>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `format` selected instead of PDF.
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_observer(mut self, observer: ObserverRef) -> Self {
        self.observer = Some(observer);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn upload_info(&self) -> Option<&UploadedDocument> {
        self.upload.as_ref()
    }

    pub fn extracted(&self) -> Option<&ExtractedText> {
        self.extracted.as_ref()
    }

    /// The latest successful translation.
    pub fn translation(&self) -> Option<&TranslationResult> {
        self.translation.as_ref()
    }

    /// The export for the current format, if one has been built.
    pub fn exported(&self) -> Option<&ExportedDocument> {
        self.exported.as_ref()
    }

    /// Display form of the fault that put the session in [`SessionState::Error`].
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Export controls are offered only once a translation exists.
    pub fn can_export(&self) -> bool {
        !self.is_busy() && self.translation.is_some()
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Replace the session's document and extract its text immediately.
    ///
    /// All earlier data (text, translation, export, error) is discarded first,
    /// so a failed upload leaves the session with nothing to translate.
    pub fn upload(&mut self, document: UploadedDocument) -> Result<&ExtractedText, SessionError> {
        self.ensure_idle()?;
        self.clear();
        info!("Upload '{}' ({} bytes)", document.name(), document.len());

        let outcome = extract::extract_text(document.bytes());
        self.upload = Some(document);
        match outcome {
            Ok(text) => {
                if text.is_blank() {
                    warn!("No extractable text: the PDF may be a scan");
                }
                if let Some(ref obs) = self.observer {
                    obs.on_extracted(text.page_count(), text.char_len());
                }
                self.transition(SessionState::Extracted);
                Ok(self.extracted.insert(text))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Change the export format. A ready export for the old format is dropped.
    pub fn set_format(&mut self, format: ExportFormat) -> Result<(), SessionError> {
        self.ensure_idle()?;
        if format != self.format {
            debug!("Export format {} → {}", self.format, format);
            self.format = format;
            self.exported = None;
        }
        Ok(())
    }

    /// Enter [`SessionState::Translating`] and return the request to send.
    ///
    /// The previous translation and export are cleared: every translate
    /// action is a fresh attempt.
    pub fn begin_translation(&mut self) -> Result<TranslationRequest, SessionError> {
        self.ensure_idle()?;
        let request = match self.extracted {
            Some(ref text) => build_translation_request(text),
            None => {
                return Err(SessionError::NotReady {
                    action: "translate",
                    reason: "upload a PDF first",
                })
            }
        };

        self.translation = None;
        self.exported = None;
        self.last_error = None;
        if let Some(ref obs) = self.observer {
            let chars = request.messages.iter().map(|m| m.content.chars().count()).sum();
            obs.on_translation_start(chars);
        }
        self.transition(SessionState::Translating);
        Ok(request)
    }

    /// Record the outcome of the request returned by
    /// [`Session::begin_translation`].
    pub fn complete_translation(
        &mut self,
        outcome: Result<TranslationResult, PdfTranslateError>,
    ) -> Result<&TranslationResult, SessionError> {
        if self.state != SessionState::Translating {
            return Err(SessionError::NotReady {
                action: "complete translation",
                reason: "no translation is in progress",
            });
        }

        match outcome {
            Ok(result) => {
                if let Some(ref obs) = self.observer {
                    obs.on_translation_complete(result.as_str().chars().count());
                }
                self.transition(SessionState::Translated);
                Ok(self.translation.insert(result))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Translate the extracted text with one call through `client`.
    pub async fn translate(
        &mut self,
        client: &TranslationClient,
    ) -> Result<&TranslationResult, SessionError> {
        let request = self.begin_translation()?;
        let outcome = client.translate(&request).await;
        self.complete_translation(outcome)
    }

    /// Export the current translation in the selected format.
    pub fn export(&mut self) -> Result<&ExportedDocument, SessionError> {
        self.ensure_idle()?;
        if self.translation.is_none() {
            return Err(SessionError::NotReady {
                action: "export",
                reason: "there is no successful translation yet",
            });
        }

        self.transition(SessionState::Exporting);
        let outcome = match self.translation {
            Some(ref translation) => export::export(translation, self.format),
            None => Err(PdfTranslateError::Internal(
                "translation disappeared during export".into(),
            )),
        };

        match outcome {
            Ok(document) => {
                if let Some(ref obs) = self.observer {
                    obs.on_export_ready(document.format(), document.len());
                }
                self.transition(SessionState::Translated);
                Ok(self.exported.insert(document))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Translate, then export with the selected format, as one user action.
    pub async fn translate_and_export(
        &mut self,
        client: &TranslationClient,
    ) -> Result<&ExportedDocument, SessionError> {
        self.translate(client).await?;
        self.export()
    }

    /// Forget the document and everything derived from it. The format
    /// selection is kept.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.clear();
        self.transition(SessionState::Empty);
        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.state.is_busy() {
            return Err(SessionError::Busy { state: self.state });
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.upload = None;
        self.extracted = None;
        self.translation = None;
        self.exported = None;
        self.last_error = None;
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        self.state = to;
        debug!("Session {} → {}", from, to);
        if let Some(ref obs) = self.observer {
            obs.on_state_change(from, to);
        }
    }

    /// Record `error`, enter [`SessionState::Error`] and hand the fault back.
    fn fail(&mut self, error: PdfTranslateError) -> SessionError {
        warn!("Session action failed: {}", error);
        let message = error.to_string();
        if let Some(ref obs) = self.observer {
            obs.on_error(&message);
        }
        self.last_error = Some(message);
        self.transition(SessionState::Error);
        SessionError::Fault(error)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("format", &self.format)
            .field("upload", &self.upload)
            .field("pages", &self.extracted.as_ref().map(|t| t.page_count()))
            .field("translated", &self.translation.is_some())
            .field("exported", &self.exported)
            .field("last_error", &self.last_error)
            .finish()
    }
}
