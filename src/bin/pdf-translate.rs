//! CLI binary for edgequake-pdf-translate.
//!
//! A thin shim over the library crate: maps CLI flags to `TranslatorConfig`,
//! then either runs the interactive shell or translates one file and saves it.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf_translate::config::{resolve_api_key, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use edgequake_pdf_translate::shell::{Shell, ShellCommand};
use edgequake_pdf_translate::translate::{translate_in_session, write_atomic};
use edgequake_pdf_translate::{
    ExportFormat, Session, SessionObserver, SessionState, TranslationClient, TranslatorConfig,
    UploadedDocument,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Spinner shown while the remote call is outstanding ───────────────────────

/// Session observer that shows an indicatif spinner for exactly as long as
/// the session is `Translating`.
struct SpinnerObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerObserver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn start(&self, message: String) {
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_prefix("Translating");
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(bar);
        }
    }

    fn stop(&self) {
        if let Some(bar) = self.bar.lock().ok().and_then(|mut slot| slot.take()) {
            bar.finish_and_clear();
        }
    }
}

impl SessionObserver for SpinnerObserver {
    fn on_translation_start(&self, prompt_chars: usize) {
        self.start(dim(&format!("{prompt_chars} chars")));
    }

    fn on_state_change(&self, from: SessionState, _to: SessionState) {
        if from == SessionState::Translating {
            self.stop();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Interactive shell
  pdf-translate

  # Interactive shell with a document already loaded
  pdf-translate -i contract.pdf

  # One-shot: translate to translated.pdf in the current directory
  pdf-translate contract.pdf

  # One-shot: Word output (format inferred from the extension)
  pdf-translate contract.pdf -o out/contract-en.docx

  # Another OpenAI-compatible endpoint and model
  pdf-translate --endpoint https://api.openai.com/v1 --model gpt-4.1-mini doc.pdf

  # Machine-readable summary
  pdf-translate --json -f word contract.pdf

SHELL COMMANDS:
  upload <path>   translate   format pdf|word   export   save [path]
  show extracted|translated   status   help   quit

ENVIRONMENT VARIABLES:
  GROQ_API_KEY              API key for the endpoint
  PDF_TRANSLATE_SECRETS     TOML file with  [groq] api_key = "gsk_..."
  PDF_TRANSLATE_MODEL       Override the model ID
  PDF_TRANSLATE_ENDPOINT    Override the API base URL
  RUST_LOG                  Log filter (e.g. edgequake_pdf_translate=debug)

LIMITS:
  The whole document is sent in one request; very long documents are
  rejected by the endpoint. PDF output embeds DejaVu Sans, which covers
  Latin, Greek, Cyrillic, Arabic and Hebrew; characters it lacks (CJK, for
  example) print as '?', so use -f word for those scripts.
"#;

/// Translate the text of PDF files into English with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-translate",
    version,
    about = "Translate PDF documents into English using an LLM",
    long_about = "Extract the text layer of a PDF, translate it into professional English with \
one chat-completion call (Groq by default, or any OpenAI-compatible endpoint), and export the \
result as PDF or Word. Runs an interactive shell when no input file is given.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to translate. Omit to start the interactive shell.
    input: Option<PathBuf>,

    /// Write the export here (default: translated.pdf / translated.docx).
    #[arg(short, long, env = "PDF_TRANSLATE_OUTPUT")]
    output: Option<PathBuf>,

    /// Export format. Inferred from --output's extension when omitted.
    #[arg(short, long, env = "PDF_TRANSLATE_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// Chat model ID.
    #[arg(long, env = "PDF_TRANSLATE_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "PDF_TRANSLATE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// API key.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// TOML secrets file holding `[groq] api_key`.
    #[arg(long, env = "PDF_TRANSLATE_SECRETS")]
    secrets: Option<PathBuf>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "PDF_TRANSLATE_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Max tokens the model may generate.
    #[arg(long, env = "PDF_TRANSLATE_MAX_TOKENS")]
    max_tokens: Option<u32>,

    /// Request timeout in seconds (default: none).
    #[arg(long, env = "PDF_TRANSLATE_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Start the interactive shell even when INPUT is given.
    #[arg(short, long)]
    interactive: bool,

    /// Print a JSON summary instead of the human-readable one (one-shot mode).
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "PDF_TRANSLATE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_TRANSLATE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_TRANSLATE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Pdf,
    #[value(alias = "docx")]
    Word,
}

impl From<FormatArg> for ExportFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Word => ExportFormat::Word,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Keep INFO logs out of the way while the spinner is drawing.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let format = output_format(cli.format, cli.output.as_deref());
    let config = build_config(&cli, format)?;
    let client = TranslationClient::from_config(&config).context("Invalid configuration")?;

    let mut session = Session::new().with_format(format);
    if show_progress {
        session = session.with_observer(SpinnerObserver::new());
    }

    match cli.input {
        Some(ref input) if !cli.interactive => {
            run_once(&cli, input, session, &client).await
        }
        _ => run_shell(&cli, session, client).await,
    }
}

/// Interactive mode: a shell on stdin/stdout.
async fn run_shell(cli: &Cli, session: Session, client: TranslationClient) -> Result<()> {
    if !cli.quiet {
        eprintln!(
            "{} {}  {}",
            cyan("◆"),
            bold("pdf-translate"),
            dim(&format!(
                "{} via {} · type 'help' for commands",
                client.model(),
                client.provider_name()
            ))
        );
    }

    let mut shell = Shell::new(session, client, io::stdout());
    if let Some(ref input) = cli.input {
        shell
            .execute(ShellCommand::Upload(input.clone()))
            .await
            .context("Failed to write to stdout")?;
    }
    shell
        .run(tokio::io::BufReader::new(tokio::io::stdin()))
        .await
        .context("Shell I/O failed")
}

/// One-shot mode: upload → translate → export → save.
async fn run_once(
    cli: &Cli,
    input: &Path,
    mut session: Session,
    client: &TranslationClient,
) -> Result<()> {
    let document = UploadedDocument::from_path(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let output = translate_in_session(&mut session, document, client)
        .await
        .context("Translation failed")?;

    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(output.document.file_name()));
    write_atomic(&path, output.document.as_bytes())
        .await
        .context("Failed to save the export")?;

    let stats = &output.stats;
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(stats).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} page(s)  {}ms  →  {}",
            green("✔"),
            stats.pages,
            stats.total_duration_ms,
            bold(&path.display().to_string()),
        );
        if stats.failed_pages > 0 {
            eprintln!(
                "   {} page(s) could not be read and were translated as blank",
                stats.failed_pages
            );
        }
        if let (Some(input_tokens), Some(output_tokens)) = (stats.input_tokens, stats.output_tokens)
        {
            eprintln!(
                "   {} tokens in  /  {} tokens out",
                dim(&input_tokens.to_string()),
                dim(&output_tokens.to_string()),
            );
        }
    }
    Ok(())
}

/// Explicit `--format` wins; otherwise a `.docx` output path selects Word.
fn output_format(flag: Option<FormatArg>, output: Option<&Path>) -> ExportFormat {
    if let Some(f) = flag {
        return f.into();
    }
    let is_docx = output
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"));
    if is_docx {
        ExportFormat::Word
    } else {
        ExportFormat::Pdf
    }
}

/// Map CLI args to `TranslatorConfig`. A missing credential stops here.
fn build_config(cli: &Cli, format: ExportFormat) -> Result<TranslatorConfig> {
    let api_key = resolve_api_key(cli.api_key.as_deref(), cli.secrets.as_deref())
        .context("No API key configured")?;

    let mut builder = TranslatorConfig::builder()
        .api_key(api_key)
        .endpoint(cli.endpoint.clone())
        .model(cli.model.clone())
        .temperature(cli.temperature)
        .output_format(format);

    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}
