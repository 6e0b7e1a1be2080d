//! Export to PDF and Word, read back with the crate's extractor and docx-rs.

mod common;

use common::{docx_paragraphs, pdf_lines, pdf_page_texts};
use edgequake_pdf_translate::{export, ExportFormat, TranslationResult};

#[test]
fn test_both_formats_see_the_same_lines() {
    let result = TranslationResult::new(
        "Article 1: Definitions\nThe Seller (the \"Party\") agrees.\nSigned in Paris, 2024",
    );
    let expected: Vec<String> = result.lines().iter().map(|l| l.to_string()).collect();

    let pdf = export(&result, ExportFormat::Pdf).unwrap();
    let docx = export(&result, ExportFormat::Word).unwrap();

    assert_eq!(pdf_lines(pdf.as_bytes()), expected);
    assert_eq!(docx_paragraphs(docx.as_bytes()), expected);
}

#[test]
fn test_word_keeps_blank_lines_as_empty_paragraphs() {
    let result = TranslationResult::new("Heading\n\nBody\r\nEnd");
    let docx = export(&result, ExportFormat::Word).unwrap();
    assert_eq!(docx_paragraphs(docx.as_bytes()), ["Heading", "", "Body", "End"]);
}

#[test]
fn test_empty_text_still_produces_valid_documents() {
    let empty = TranslationResult::new("");

    let pdf = export(&empty, ExportFormat::Pdf).unwrap();
    let pages = pdf_page_texts(pdf.as_bytes());
    assert_eq!(pages.len(), 1);
    assert!(pages[0].trim().is_empty());

    let docx = export(&empty, ExportFormat::Word).unwrap();
    assert_eq!(docx_paragraphs(docx.as_bytes()), [""]);
}

#[test]
fn test_long_translation_spans_pages() {
    let text: Vec<String> = (1..=120).map(|i| format!("Clause {i}")).collect();
    let result = TranslationResult::new(text.join("\n"));

    let pdf = export(&result, ExportFormat::Pdf).unwrap();
    let pages = pdf_page_texts(pdf.as_bytes());

    assert_eq!(pages.len(), 3);
    assert_eq!(pdf_lines(pdf.as_bytes()), text);
}

#[test]
fn test_long_line_is_wrapped_not_truncated() {
    let sentence = "This agreement shall be governed by the laws of the jurisdiction \
                    in which the Seller has its registered office, without regard to \
                    conflict of law principles.";
    let pdf = export(&TranslationResult::new(sentence), ExportFormat::Pdf).unwrap();

    let lines = pdf_lines(pdf.as_bytes());
    assert!(lines.len() > 1, "expected wrapping, got {lines:?}");
    assert_eq!(lines.join(" "), sentence);
}

fn squash(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn test_text_outside_windows_1252_exports_to_pdf() {
    let lines = [
        "Applicants must be ≥ 18 years old.",
        "Store at −5 °C.",
        "Step 1 → Step 2",
        "Привет",
        "مرحبا",
    ];
    let result = TranslationResult::new(lines.join("\n"));

    let pdf = export(&result, ExportFormat::Pdf).unwrap();
    let read_back: Vec<String> = pdf_lines(pdf.as_bytes()).iter().map(|l| squash(l)).collect();
    assert_eq!(read_back, lines);

    let docx = export(&result, ExportFormat::Word).unwrap();
    assert_eq!(docx_paragraphs(docx.as_bytes()), lines);
}

#[test]
fn test_characters_missing_from_the_pdf_font_print_as_question_marks() {
    let result = TranslationResult::new("Office: Tokyo 東京");

    let pdf = export(&result, ExportFormat::Pdf).unwrap();
    let read_back: Vec<String> = pdf_lines(pdf.as_bytes()).iter().map(|l| squash(l)).collect();
    assert_eq!(read_back, ["Office: Tokyo ??"]);

    let docx = export(&result, ExportFormat::Word).unwrap();
    assert_eq!(docx_paragraphs(docx.as_bytes()), ["Office: Tokyo 東京"]);
}

#[test]
fn test_artifact_metadata() {
    let result = TranslationResult::new("Hi");

    let pdf = export(&result, ExportFormat::Pdf).unwrap();
    assert_eq!(pdf.file_name(), "translated.pdf");
    assert_eq!(pdf.mime_type(), "application/pdf");
    assert!(pdf.as_bytes().starts_with(b"%PDF"));

    let docx = export(&result, ExportFormat::Word).unwrap();
    assert_eq!(docx.file_name(), "translated.docx");
    assert_eq!(
        docx.mime_type(),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert!(docx.as_bytes().starts_with(b"PK"));
}

#[test]
fn test_export_is_deterministic_for_word_text() {
    let result = TranslationResult::new("Same\ninput");
    let a = docx_paragraphs(export(&result, ExportFormat::Word).unwrap().as_bytes());
    let b = docx_paragraphs(export(&result, ExportFormat::Word).unwrap().as_bytes());
    assert_eq!(a, b);
}
