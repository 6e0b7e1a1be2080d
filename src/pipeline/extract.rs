//! Text extraction: PDF bytes → per-page text.
//!
//! Pages are parsed with `lopdf` and interpreted by `pdf-extract`, which
//! tracks the text matrix through `Td`, `TD`, `Tm` and `T*` and decodes
//! simple, standard-14 and Type 0 (`Identity-H` + `ToUnicode`) fonts. Glyphs
//! are reassembled into lines by [`PageTextSink`] from their positions. The
//! `'` and `"` show operators are rewritten to their `T*` + `Tj` equivalents
//! first, since the interpreter skips them.
//!
//! Only embedded text layers are read; there is no OCR. A page without a text
//! layer (a scan) yields an empty string. The `%PDF` magic bytes are checked
//! before parsing so a mislabelled upload gets a precise error instead of a
//! parser message.

use crate::error::PdfTranslateError;
use crate::model::ExtractedText;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Extract the text of every page, in page order.
///
/// A page that cannot be interpreted contributes an empty string and is
/// listed in [`ExtractedText::failed_pages`].
///
/// # Errors
/// - [`PdfTranslateError::NotAPdf`] when the bytes do not start with `%PDF`
/// - [`PdfTranslateError::DocumentParse`] when the document cannot be parsed
///   or has no pages
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedText, PdfTranslateError> {
    check_magic(bytes)?;

    let mut document = Document::load_mem(bytes).map_err(|e| PdfTranslateError::DocumentParse {
        detail: e.to_string(),
    })?;

    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(PdfTranslateError::DocumentParse {
            detail: "document has no pages".into(),
        });
    }
    info!("PDF loaded: {} pages", pages.len());

    let mut texts = Vec::with_capacity(pages.len());
    let mut failed = Vec::new();
    for (&page_num, &page_id) in &pages {
        match page_text(&mut document, page_num, page_id) {
            Ok(text) => {
                debug!("Page {}: {} chars of text", page_num, text.chars().count());
                texts.push(text);
            }
            Err(detail) => {
                warn!("Page {}: no extractable text ({})", page_num, detail);
                failed.push(page_num as usize);
                texts.push(String::new());
            }
        }
    }
    if !failed.is_empty() {
        warn!("{} of {} pages could not be read", failed.len(), pages.len());
    }

    Ok(ExtractedText::from_pages(texts).with_failed_pages(failed))
}

/// Verify PDF magic bytes.
fn check_magic(bytes: &[u8]) -> Result<(), PdfTranslateError> {
    if bytes.len() < 4 {
        return Err(PdfTranslateError::DocumentParse {
            detail: format!("upload is only {} bytes long", bytes.len()),
        });
    }
    if &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(PdfTranslateError::NotAPdf { magic });
    }
    Ok(())
}

/// Text of one page. `pdf-extract` panics on some malformed content, so the
/// interpreter runs under `catch_unwind` and a panic fails only this page.
fn page_text(
    document: &mut Document,
    page_num: u32,
    page_id: ObjectId,
) -> Result<String, String> {
    rewrite_show_operators(document, page_id).map_err(|e| e.to_string())?;

    let mut sink = PageTextSink::default();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::output_doc_page(document, &mut sink, page_num)
    }));
    match outcome {
        Ok(Ok(())) => Ok(sink.into_text()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "malformed page content".into())
}

/// Replace `'` and `"` with the operator sequences they abbreviate, writing
/// the page content back only when something changed.
fn rewrite_show_operators(document: &mut Document, page_id: ObjectId) -> lopdf::Result<()> {
    let raw = document.get_page_content(page_id)?;
    let content = Content::decode(&raw)?;
    if !content
        .operations
        .iter()
        .any(|op| op.operator == "'" || op.operator == "\"")
    {
        return Ok(());
    }

    let operations = expand_show_operators(content.operations);
    let encoded = Content { operations }.encode()?;
    let stream_id = document.add_object(Stream::new(dictionary! {}, encoded));
    document
        .get_dictionary_mut(page_id)?
        .set("Contents", Object::Reference(stream_id));
    Ok(())
}

/// `(s) '` is `T* (s) Tj`; `aw ac (s) "` is `aw Tw ac Tc T* (s) Tj`.
fn expand_show_operators(operations: Vec<Operation>) -> Vec<Operation> {
    let mut out = Vec::with_capacity(operations.len());
    for op in operations {
        match op.operator.as_str() {
            "'" => {
                out.push(Operation::new("T*", vec![]));
                out.push(Operation::new("Tj", op.operands));
            }
            "\"" if op.operands.len() == 3 => {
                let mut operands = op.operands.into_iter();
                if let (Some(aw), Some(ac), Some(text)) =
                    (operands.next(), operands.next(), operands.next())
                {
                    out.push(Operation::new("Tw", vec![aw]));
                    out.push(Operation::new("Tc", vec![ac]));
                    out.push(Operation::new("T*", vec![]));
                    out.push(Operation::new("Tj", vec![text]));
                }
            }
            _ => out.push(op),
        }
    }
    out
}

/// Collects glyphs from `pdf-extract` and lays them out as lines.
///
/// A new line starts when the baseline moves by more than half the font
/// size; a space is inserted when the gap to the previous glyph exceeds a
/// tenth of it and neither side is already whitespace.
#[derive(Debug, Default)]
struct PageTextSink {
    lines: Vec<String>,
    current: String,
    /// Where the previous glyph ended: `(x, y)` in device space.
    pen: Option<(f64, f64)>,
}

impl PageTextSink {
    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line.trim_end().to_string());
    }

    fn into_text(mut self) -> String {
        if !self.current.is_empty() {
            self.break_line();
        }
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }
}

impl OutputDev for PageTextSink {
    fn begin_page(
        &mut self,
        _page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.lines.clear();
        self.current.clear();
        self.pen = None;
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        spacing: f64,
        font_size: f64,
        text: &str,
    ) -> Result<(), OutputError> {
        let (x, y) = (trm.m31, trm.m32);
        let scale = (trm.m11 * trm.m22 - trm.m12 * trm.m21).abs().sqrt();
        let size = match font_size * scale {
            s if s.is_finite() && s > 0.0 => s,
            _ => 1.0,
        };

        if let Some((end_x, last_y)) = self.pen {
            if (y - last_y).abs() > size * 0.5 {
                self.break_line();
            } else if x - end_x > size * 0.1
                && !self.current.ends_with(char::is_whitespace)
                && !text.starts_with(char::is_whitespace)
            {
                self.current.push(' ');
            }
        }

        self.current.push_str(text);
        self.pen = Some((x + (width * font_size + spacing) * trm.m11, y));
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}
