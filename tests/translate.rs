//! One-shot entry points with an injected provider.

mod common;

use common::{
    docx_paragraphs, pdf_lines, pdf_with_contents, pdf_with_pages, write_fixture, FixedProvider,
};
use edgequake_pdf_translate::{
    translate_document, translate_file, translate_sync, ExportFormat, PdfTranslateError,
    TranslatorConfig, UploadedDocument,
};

#[tokio::test]
async fn test_translate_file_writes_pdf_and_reports_stats() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(&dir, "in.pdf", &pdf_with_pages(&[&["Hola"], &["Mundo"]]));
    let output = dir.path().join("out").join("translated.pdf");

    let config = TranslatorConfig::builder()
        .provider(FixedProvider::new("Hello\nWorld\n"))
        .build()
        .unwrap();
    let stats = translate_file(&input, &output, &config).await.unwrap();

    assert_eq!(stats.pages, 2);
    assert_eq!(stats.format, ExportFormat::Pdf);
    assert_eq!(stats.translated_chars, "Hello\nWorld".len());
    assert_eq!((stats.input_tokens, stats.output_tokens), (Some(42), Some(7)));

    let written = std::fs::read(&output).unwrap();
    assert_eq!(written.len(), stats.output_bytes);
    assert_eq!(pdf_lines(&written), ["Hello", "World"]);

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["format"], "Pdf");
    assert_eq!(json["pages"], 2);
    assert_eq!(json["failed_pages"], 0);
}

#[tokio::test]
async fn test_translate_document_in_word() {
    let config = TranslatorConfig::builder()
        .provider(FixedProvider::new("Line one\n\nLine two"))
        .output_format(ExportFormat::Word)
        .build()
        .unwrap();
    let upload = UploadedDocument::new("in.pdf", pdf_with_pages(&[&["Eins"]]));

    let output = translate_document(upload, &config).await.unwrap();

    assert_eq!(output.extracted.as_text(), "Eins\n");
    assert_eq!(output.document.file_name(), "translated.docx");
    assert_eq!(
        docx_paragraphs(output.document.as_bytes()),
        ["Line one", "", "Line two"]
    );
}

#[tokio::test]
async fn test_fault_leaves_no_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(&dir, "in.pdf", &pdf_with_pages(&[&["Hola"]]));
    let output = dir.path().join("translated.pdf");

    let config = TranslatorConfig::builder()
        .provider(FixedProvider::new("   "))
        .build()
        .unwrap();
    let err = translate_file(&input, &output, &config).await.unwrap_err();

    assert!(matches!(err, PdfTranslateError::EmptyTranslation));
    assert!(!output.exists());
}

#[test]
fn test_translate_sync_runs_without_a_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let pages = [
        b"BT /F1 12 Tf 72 700 Td (Gruesse) Tj ET".to_vec(),
        b"BT /F9 12 Tf 72 700 Td (Lost) Tj ET".to_vec(),
    ];
    let input = write_fixture(&dir, "in.pdf", &pdf_with_contents(&pages));

    let config = TranslatorConfig::builder()
        .provider(FixedProvider::new("Grüße aus Köln"))
        .output_format(ExportFormat::Word)
        .build()
        .unwrap();
    let output = translate_sync(&input, &config).unwrap();

    assert_eq!(output.translation.as_str(), "Grüße aus Köln");
    assert_eq!(output.stats.translated_chars, 14);
    assert!(output.stats.translated_chars < "Grüße aus Köln".len());
    assert_eq!(output.stats.extracted_chars, "Gruesse".len());
    assert_eq!(output.stats.pages, 2);
    assert_eq!(output.stats.failed_pages, 1);
    assert_eq!(
        docx_paragraphs(output.document.as_bytes()),
        ["Grüße aus Köln"]
    );
}
