//! Word writer: one `w:p` paragraph per line via `docx-rs`.

use super::export::strip_control_chars;
use crate::config::ExportFormat;
use crate::error::PdfTranslateError;
use docx_rs::{Docx, Paragraph, Run};
use std::io::Cursor;

/// Render `lines` to a complete `.docx` package.
pub fn render(lines: &[&str]) -> Result<Vec<u8>, PdfTranslateError> {
    let docx = lines
        .iter()
        .fold(Docx::new(), |docx, line| docx.add_paragraph(paragraph(line)));

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| PdfTranslateError::Render {
            format: ExportFormat::Word,
            line: None,
            detail: e.to_string(),
        })?;
    Ok(cursor.into_inner())
}

/// XML 1.0 cannot carry most control characters; tabs become `w:tab`.
fn paragraph(line: &str) -> Paragraph {
    let cleaned = strip_control_chars(line, true);
    if cleaned.is_empty() {
        return Paragraph::new();
    }

    let mut run = Run::new();
    for (i, part) in cleaned.split('\t').enumerate() {
        if i > 0 {
            run = run.add_tab();
        }
        if !part.is_empty() {
            run = run.add_text(part);
        }
    }
    Paragraph::new().add_run(run)
}
