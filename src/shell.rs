//! Line-oriented front end over a [`Session`].
//!
//! One command per line. Every fault is printed as `error: <message>` and the
//! shell keeps going; only `quit` (or end of input) stops it.
//!
//! | Command                       | Effect                                         |
//! |-------------------------------|------------------------------------------------|
//! | `upload <path>` / `open`      | read a PDF and show its extracted text         |
//! | `translate`                   | translate, show the result, export it          |
//! | `format pdf\|word`            | choose the export format                       |
//! | `export`                      | re-export the current translation              |
//! | `save [path]`                 | write the export (default `translated.<ext>`)  |
//! | `show extracted\|translated`  | print the text again                           |
//! | `status`                      | session summary                                |
//! | `help`, `quit` / `exit`       |                                                |

use crate::config::ExportFormat;
use crate::error::SessionError;
use crate::model::UploadedDocument;
use crate::pipeline::llm::TranslationClient;
use crate::session::Session;
use crate::translate::write_atomic;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

pub const PROMPT: &str = "pdf-translate> ";

const HELP: &str = "\
Commands:
  upload <path>               load a PDF and extract its text (alias: open)
  translate                   translate the extracted text, then export it
  format pdf|word             choose the export format
  export                      export the current translation again
  save [path]                 write the export to disk
  show extracted|translated   print the extracted or translated text
  status                      show the session state
  help                        show this help
  quit                        leave (alias: exit)";

/// Which text `show` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowTarget {
    Extracted,
    Translated,
}

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Upload(PathBuf),
    Translate,
    Format(ExportFormat),
    Export,
    Save(Option<PathBuf>),
    Show(ShowTarget),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

impl FromStr for ShellCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name.to_lowercase().as_str() {
            "upload" | "open" => {
                if rest.is_empty() {
                    return Err(CommandParseError::Usage("upload <path>"));
                }
                Ok(ShellCommand::Upload(PathBuf::from(unquote(rest))))
            }
            "translate" => Ok(ShellCommand::Translate),
            "format" => rest
                .parse()
                .map(ShellCommand::Format)
                .map_err(|_| CommandParseError::Usage("format pdf|word")),
            "export" => Ok(ShellCommand::Export),
            "save" => Ok(ShellCommand::Save(
                (!rest.is_empty()).then(|| PathBuf::from(unquote(rest))),
            )),
            "show" => match rest.to_lowercase().as_str() {
                "extracted" | "" => Ok(ShellCommand::Show(ShowTarget::Extracted)),
                "translated" | "translation" => Ok(ShellCommand::Show(ShowTarget::Translated)),
                _ => Err(CommandParseError::Usage("show extracted|translated")),
            },
            "status" => Ok(ShellCommand::Status),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

fn unquote(s: &str) -> &str {
    for q in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(q).and_then(|s| s.strip_suffix(q)) {
            return inner;
        }
    }
    s
}

/// Whether the shell should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs shell commands against one session, writing output to `W`.
pub struct Shell<W: Write> {
    session: Session,
    client: TranslationClient,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(session: Session, client: TranslationClient, out: W) -> Self {
        Self {
            session,
            client,
            out,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Read commands from `input` until `quit` or end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;
            let Some(line) = lines.next_line().await? else {
                writeln!(self.out)?;
                return Ok(());
            };
            if self.execute_line(&line).await? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Parse and run one line. Blank lines do nothing.
    pub async fn execute_line(&mut self, line: &str) -> io::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        match line.parse::<ShellCommand>() {
            Ok(command) => self.execute(command).await,
            Err(e) => {
                writeln!(self.out, "error: {e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub async fn execute(&mut self, command: ShellCommand) -> io::Result<Flow> {
        debug!("Shell command: {:?}", command);
        match command {
            ShellCommand::Upload(path) => self.upload(path).await?,
            ShellCommand::Translate => self.translate().await?,
            ShellCommand::Format(format) => match self.session.set_format(format) {
                Ok(()) => {
                    writeln!(self.out, "Output format: {}", format.label())?;
                    if self.session.can_export() {
                        writeln!(self.out, "Run 'export' to rebuild the document.")?;
                    }
                }
                Err(e) => self.report(&e)?,
            },
            ShellCommand::Export => self.export()?,
            ShellCommand::Save(path) => self.save(path).await?,
            ShellCommand::Show(target) => self.show(target)?,
            ShellCommand::Status => self.status()?,
            ShellCommand::Help => writeln!(self.out, "{HELP}")?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn upload(&mut self, path: PathBuf) -> io::Result<()> {
        let document = match UploadedDocument::from_path(&path).await {
            Ok(document) => document,
            Err(e) => return writeln!(self.out, "error: {e}"),
        };
        let name = document.name().to_string();

        match self.session.upload(document) {
            Ok(text) => {
                writeln!(
                    self.out,
                    "Extracted {} page(s) from '{}'.",
                    text.page_count(),
                    name
                )?;
                if !text.failed_pages().is_empty() {
                    let pages: Vec<String> =
                        text.failed_pages().iter().map(|p| p.to_string()).collect();
                    writeln!(
                        self.out,
                        "Could not read text on {} page(s): {}. They will be translated as blank.",
                        pages.len(),
                        pages.join(", ")
                    )?;
                }
                if text.is_blank() {
                    writeln!(
                        self.out,
                        "No text layer found; scanned PDFs are not supported."
                    )?;
                }
                writeln!(self.out, "--- Extracted text ---")?;
                write!(self.out, "{text}")?;
                Ok(())
            }
            Err(e) => self.report(&e),
        }
    }

    async fn translate(&mut self) -> io::Result<()> {
        match self.session.translate(&self.client).await {
            Ok(result) => {
                writeln!(self.out, "--- Translated text ---")?;
                writeln!(self.out, "{result}")?;
            }
            Err(e) => return self.report(&e),
        }
        self.export()
    }

    fn export(&mut self) -> io::Result<()> {
        match self.session.export() {
            Ok(document) => writeln!(
                self.out,
                "{} ready: {} ({} bytes). Use 'save [path]' to write it.",
                document.format(),
                document.file_name(),
                document.len()
            ),
            Err(e) => self.report(&e),
        }
    }

    async fn save(&mut self, path: Option<PathBuf>) -> io::Result<()> {
        let Some(document) = self.session.exported() else {
            return writeln!(
                self.out,
                "error: nothing to save yet; run 'translate' or 'export' first"
            );
        };
        let path = path.unwrap_or_else(|| PathBuf::from(document.file_name()));

        match write_atomic(&path, document.as_bytes()).await {
            Ok(()) => writeln!(
                self.out,
                "Saved {} ({} bytes).",
                path.display(),
                document.len()
            ),
            Err(e) => writeln!(self.out, "error: {e}"),
        }
    }

    fn show(&mut self, target: ShowTarget) -> io::Result<()> {
        match target {
            ShowTarget::Extracted => match self.session.extracted() {
                Some(text) => write!(self.out, "{text}"),
                None => writeln!(self.out, "Nothing extracted yet; use 'upload <path>'."),
            },
            ShowTarget::Translated => match self.session.translation() {
                Some(result) => writeln!(self.out, "{result}"),
                None => writeln!(self.out, "Nothing translated yet; use 'translate'."),
            },
        }
    }

    fn status(&mut self) -> io::Result<()> {
        let s = &self.session;
        writeln!(self.out, "state:       {}", s.state())?;
        writeln!(self.out, "format:      {}", s.format().label())?;
        match (s.upload_info(), s.extracted()) {
            (Some(doc), Some(text)) => writeln!(
                self.out,
                "document:    {} ({} page(s))",
                doc.name(),
                text.page_count()
            )?,
            (Some(doc), None) => writeln!(self.out, "document:    {} (not readable)", doc.name())?,
            _ => writeln!(self.out, "document:    none")?,
        }
        match s.translation() {
            Some(t) => writeln!(self.out, "translation: {} chars", t.as_str().chars().count())?,
            None => writeln!(self.out, "translation: none")?,
        }
        match s.exported() {
            Some(d) => writeln!(self.out, "export:      {} ({} bytes)", d.file_name(), d.len())?,
            None => writeln!(self.out, "export:      none")?,
        }
        if let Some(e) = s.last_error() {
            writeln!(self.out, "last error:  {e}")?;
        }
        Ok(())
    }

    fn report(&mut self, error: &SessionError) -> io::Result<()> {
        writeln!(self.out, "error: {error}")
    }
}
