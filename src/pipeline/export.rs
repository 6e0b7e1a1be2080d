//! Document export: translated text → PDF or Word bytes.
//!
//! Both writers consume [`TranslationResult::lines`], so the paragraph count
//! of an export always equals the line count of the translation. Export is
//! total over any text: an empty translation becomes one empty paragraph.

use super::{render_docx, render_pdf};
use crate::config::ExportFormat;
use crate::error::PdfTranslateError;
use crate::model::{ExportedDocument, TranslationResult};
use std::time::Instant;
use tracing::{debug, info};

/// Render `result` in `format`.
///
/// # Errors
/// [`PdfTranslateError::Render`] when a writer fails to produce its file.
/// Text content alone never fails an export: the PDF writer prints
/// characters missing from its font as `?`.
pub fn export(
    result: &TranslationResult,
    format: ExportFormat,
) -> Result<ExportedDocument, PdfTranslateError> {
    let start = Instant::now();
    let lines = result.lines();
    debug!("Exporting {} lines as {}", lines.len(), format);

    let bytes = match format {
        ExportFormat::Pdf => render_pdf::render(&lines, &render_pdf::PageLayout::default())?,
        ExportFormat::Word => render_docx::render(&lines)?,
    };

    info!(
        "{} export ready: {} bytes in {:?}",
        format,
        bytes.len(),
        start.elapsed()
    );
    Ok(ExportedDocument::new(format, bytes))
}

/// Drop control characters a paragraph cannot carry. Tabs are kept when
/// `keep_tabs` is set; line breaks never reach here.
pub(crate) fn strip_control_chars(line: &str, keep_tabs: bool) -> String {
    line.chars()
        .filter(|&c| !c.is_control() || (keep_tabs && c == '\t'))
        .collect()
}
