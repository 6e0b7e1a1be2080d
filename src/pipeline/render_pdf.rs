//! PDF writer: one paragraph per line on US letter pages, laid out by `genpdf`.
//!
//! DejaVu Sans is embedded in every export, so Latin, Greek, Cyrillic, Arabic
//! and Hebrew text and the common symbols (`≥`, `−`, `→`, `°`) render as-is.
//! `genpdf` wraps paragraphs on spaces and starts new pages on its own. A
//! character the font has no glyph for is printed as `?` with a warning
//! instead of failing the export.

use super::export::strip_control_chars;
use crate::config::ExportFormat;
use crate::error::PdfTranslateError;
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontCache, FontData, FontFamily};
use genpdf::{Mm, PaperSize, SimplePageDecorator, Size};
use tracing::{debug, warn};

static DEJAVU_SANS: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

const SUBSTITUTE: char = '?';

/// Page geometry and type settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub paper: PaperSize,
    pub margin_mm: u8,
    pub font_size: u8,
    pub line_spacing: f64,
}

impl Default for PageLayout {
    /// US letter, one-inch margins, 10 pt text.
    fn default() -> Self {
        Self {
            paper: PaperSize::Letter,
            margin_mm: 25,
            font_size: 10,
            line_spacing: 1.2,
        }
    }
}

impl PageLayout {
    fn column_width(&self) -> Mm {
        Size::from(self.paper).width - Mm::from(2 * u16::from(self.margin_mm))
    }
}

/// Render `lines` to a complete PDF file.
pub fn render(lines: &[&str], layout: &PageLayout) -> Result<Vec<u8>, PdfTranslateError> {
    let regular = FontData::new(DEJAVU_SANS.to_vec(), None)
        .map_err(|e| render_error(format!("cannot load the embedded font: {e}")))?;
    let family = FontFamily {
        regular: regular.clone(),
        bold: regular.clone(),
        italic: regular.clone(),
        bold_italic: regular,
    };

    let mut doc = genpdf::Document::new(family);
    doc.set_paper_size(layout.paper);
    doc.set_font_size(layout.font_size);
    doc.set_line_spacing(layout.line_spacing);
    doc.set_minimal_conformance();
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(layout.margin_mm);
    doc.set_page_decorator(decorator);

    let paragraphs: Vec<Option<String>> = {
        let typesetter = Typesetter::new(doc.font_cache(), layout);
        lines
            .iter()
            .enumerate()
            .map(|(idx, line)| typesetter.prepare(line, idx + 1))
            .collect()
    };

    for paragraph in paragraphs {
        match paragraph {
            Some(text) => doc.push(Paragraph::new(text)),
            None => doc.push(Break::new(1.0)),
        }
    }

    let mut bytes = Vec::new();
    doc.render(&mut bytes).map_err(|e| render_error(e.to_string()))?;
    debug!("PDF layout: {} lines → {} bytes", lines.len(), bytes.len());
    Ok(bytes)
}

/// Cleans lines and fits them to the font and the text column.
struct Typesetter<'a> {
    cache: &'a FontCache,
    font: genpdf::fonts::Font,
    font_size: u8,
    column: Mm,
}

impl<'a> Typesetter<'a> {
    fn new(cache: &'a FontCache, layout: &PageLayout) -> Self {
        Self {
            cache,
            font: cache.default_font_family().regular,
            font_size: layout.font_size,
            column: layout.column_width(),
        }
    }

    /// Paragraph text for one line, or `None` for a blank line.
    fn prepare(&self, line: &str, line_no: usize) -> Option<String> {
        let cleaned = line.replace('\t', "    ").replace(
            [
                '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
            ],
            "",
        );
        let cleaned = strip_control_chars(&cleaned, false);
        if cleaned.trim().is_empty() {
            return None;
        }

        let covered = self.substitute_missing(&cleaned, line_no);
        Some(self.break_long_words(&covered))
    }

    /// The font's `ToUnicode` map only holds four hex digits per entry, so
    /// characters beyond the Basic Multilingual Plane are never used.
    fn has_glyph(&self, c: char) -> bool {
        u32::from(c) <= 0xFFFF && self.cache.get_rt_font(self.font).glyph(c).id().0 != 0
    }

    fn substitute_missing(&self, line: &str, line_no: usize) -> String {
        let mut missing = 0usize;
        let out: String = line
            .chars()
            .map(|c| {
                if self.has_glyph(c) {
                    c
                } else {
                    missing += 1;
                    SUBSTITUTE
                }
            })
            .collect();
        if missing > 0 {
            warn!(
                "Line {}: {} character(s) not in the PDF font, printed as '{}'",
                line_no, missing, SUBSTITUTE
            );
        }
        out
    }

    fn fits(&self, s: &str) -> bool {
        self.font.str_width(self.cache, s, self.font_size) <= self.column
    }

    /// `genpdf` drops a word wider than the column, so such words are cut
    /// into pieces that fit, separated by spaces.
    fn break_long_words(&self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        for (idx, word) in line.split(' ').enumerate() {
            if idx > 0 {
                out.push(' ');
            }
            if self.fits(word) {
                out.push_str(word);
                continue;
            }

            let mut piece = String::new();
            for c in word.chars() {
                piece.push(c);
                if !self.fits(&piece) {
                    piece.pop();
                    out.push_str(&piece);
                    out.push(' ');
                    piece.clear();
                    piece.push(c);
                }
            }
            out.push_str(&piece);
        }
        out
    }
}

fn render_error(detail: String) -> PdfTranslateError {
    PdfTranslateError::Render {
        format: ExportFormat::Pdf,
        line: None,
        detail,
    }
}
