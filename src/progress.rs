//! Observer trait for session events.
//!
//! Attach an [`Arc<dyn SessionObserver>`] with
//! [`crate::session::Session::with_observer`] to hear about every state change
//! and the outcome of each step. The binary uses this to show a spinner while
//! the session is [`SessionState::Translating`]; a web front end could forward
//! the same events to a socket.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf_translate::{Session, SessionObserver, SessionState};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct History(Mutex<Vec<SessionState>>);
//!
//! impl SessionObserver for History {
//!     fn on_state_change(&self, _from: SessionState, to: SessionState) {
//!         self.0.lock().unwrap().push(to);
//!     }
//! }
//!
//! let history = Arc::new(History::default());
//! let session = Session::new().with_observer(history.clone());
//! assert_eq!(session.state(), SessionState::Empty);
//! ```

use crate::config::ExportFormat;
use crate::session::SessionState;
use std::sync::Arc;

/// Called by [`crate::session::Session`] as actions run.
///
/// All methods have no-op defaults so implementors only override what they
/// need. Calls happen on the task running the session action, in order.
pub trait SessionObserver: Send + Sync {
    /// Called on every state transition, including `Error → Error`.
    fn on_state_change(&self, from: SessionState, to: SessionState) {
        let _ = (from, to);
    }

    /// Called after an upload was extracted.
    ///
    /// # Arguments
    /// * `pages` — page count of the PDF
    /// * `chars` — characters of extracted text, page separators excluded
    fn on_extracted(&self, pages: usize, chars: usize) {
        let _ = (pages, chars);
    }

    /// Called just before the remote request is sent.
    fn on_translation_start(&self, prompt_chars: usize) {
        let _ = prompt_chars;
    }

    fn on_translation_complete(&self, chars: usize) {
        let _ = chars;
    }

    fn on_export_ready(&self, format: ExportFormat, bytes: usize) {
        let _ = (format, bytes);
    }

    /// Called with the display form of any fault a session action hit.
    fn on_error(&self, error: &str) {
        let _ = error;
    }
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Convenience alias for the type stored in a session.
pub type ObserverRef = Arc<dyn SessionObserver>;
