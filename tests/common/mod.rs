//! Shared fixtures for the integration tests.
//!
//! Nothing here talks to a real endpoint: PDFs are built in memory with
//! `lopdf`, providers are stubs, and HTTP tests use a one-shot TCP server on
//! 127.0.0.1.

#![allow(dead_code)]

use async_trait::async_trait;
use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};
use edgequake_pdf_translate::provider::{
    ChatCompletion, ChatCompletionRequest, ChatProvider, TokenUsage,
};
use edgequake_pdf_translate::{extract_text, PdfTranslateError, TranslationClient};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TEST_MODEL: &str = "mixtral-8x7b-32768";

/// Route library logs to the test harness; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("edgequake_pdf_translate=debug")
        .with_test_writer()
        .try_init();
}

// ── PDF fixtures ─────────────────────────────────────────────────────────────

/// Build a letter-size PDF; `pages[i]` lists the text lines of page `i + 1`.
/// Each line is its own text object placed with `Td`. A page with no lines has
/// an empty content stream (like a scan).
pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = pages
        .iter()
        .map(|lines| {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new(
                    "Td",
                    vec![72.into(), (700 - 14 * i as i64).into()],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(line.as_bytes().to_vec(), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            }
            Content { operations }.encode().expect("encode content")
        })
        .collect();
    pdf_with_contents(&contents)
}

/// Build a letter-size PDF from raw content streams, one per page. Font
/// `/F1` is Helvetica with `WinAnsiEncoding`.
pub fn pdf_with_contents(contents: &[Vec<u8>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save fixture pdf");
    bytes
}

/// Write `bytes` to `<dir>/<name>` and return the path.
pub fn write_fixture(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

// ── Reading exports back ─────────────────────────────────────────────────────

/// Text of every page of a PDF, read back with the crate's own extractor.
pub fn pdf_page_texts(bytes: &[u8]) -> Vec<String> {
    extract_text(bytes).expect("readable pdf").pages().to_vec()
}

/// All non-empty text lines of a PDF, in reading order.
pub fn pdf_lines(bytes: &[u8]) -> Vec<String> {
    pdf_page_texts(bytes)
        .iter()
        .flat_map(|page| page.split('\n').map(str::to_string).collect::<Vec<_>>())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Text of every paragraph of a .docx, in order.
pub fn docx_paragraphs(bytes: &[u8]) -> Vec<String> {
    let docx = read_docx(bytes).expect("valid docx");
    docx.document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(p),
            _ => None,
        })
        .map(|p| {
            let mut text = String::new();
            for child in &p.children {
                if let ParagraphChild::Run(run) = child {
                    for rc in &run.children {
                        if let RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            text
        })
        .collect()
}

// ── Stub providers ───────────────────────────────────────────────────────────

/// Always answers with the same content and records every request.
pub struct FixedProvider {
    reply: String,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl FixedProvider {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion, PdfTranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        Ok(ChatCompletion {
            content: self.reply.clone(),
            usage: Some(TokenUsage {
                prompt_tokens: 42,
                completion_tokens: 7,
            }),
        })
    }
}

/// Fails every call with a transport fault.
pub struct UnreachableProvider {
    calls: AtomicUsize,
}

impl UnreachableProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for UnreachableProvider {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn complete(
        &self,
        _request: &ChatCompletionRequest,
    ) -> Result<ChatCompletion, PdfTranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PdfTranslateError::Transport {
            provider: "unreachable".into(),
            detail: "connection failed: connection refused".into(),
        })
    }
}

pub fn client_for(provider: Arc<dyn ChatProvider>) -> TranslationClient {
    TranslationClient::new(provider, TEST_MODEL)
}

// ── One-shot HTTP stub ───────────────────────────────────────────────────────

/// Serve exactly one HTTP response with `status` and `body`.
///
/// Returns the base URL (`http://127.0.0.1:<port>/openai/v1`) and a handle
/// resolving to the raw request the server received.
pub async fn http_stub(status: u16, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{addr}/openai/v1"), handle)
}

/// Accept one connection, read the request and never answer.
///
/// The socket stays open until the runtime shuts down, so a client without a
/// timeout would wait forever.
pub async fn silent_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let _request = read_request(&mut socket).await;
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        drop(socket);
    });

    format!("http://{addr}/openai/v1")
}

/// A base URL on which nothing is listening.
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/openai/v1")
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.expect("read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
