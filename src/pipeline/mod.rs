//! Pipeline stages for PDF translation.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested without the others.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ prompts ──▶ llm ──▶ export ─┬─▶ render_pdf
//! (pdf-extract) (2 messages) (HTTP)        └─▶ render_docx
//! ```
//!
//! 1. [`extract`] — read the text layer of every page
//! 2. [`crate::prompts`] — wrap the text in the fixed translation prompt
//! 3. [`llm`] — one chat-completion call, the only stage with network I/O
//! 4. [`export`] — dispatch to the PDF or Word writer; both write one
//!    paragraph per line of the translation

pub mod export;
pub mod extract;
pub mod llm;
pub mod render_docx;
pub mod render_pdf;
