//! Printing command results as text or JSON

use serde::Serialize;

use crate::board::{Notice, NoticeLevel};
use crate::storage;

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// One-line result of a mutating command in JSON mode
#[derive(Serialize)]
struct Status<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Shared printer handed to every command
///
/// Results go to stdout, errors and `--verbose` traces to stderr.
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Confirms a change, e.g. "Created group 'Phase 1'"
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => self.status(Status {
                success: true,
                message: Some(message),
                error: None,
            }),
        }
    }

    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", message),
            OutputFormat::Json => self.status(Status {
                success: false,
                message: None,
                error: Some(message),
            }),
        }
    }

    fn status(&self, status: Status<'_>) {
        if let Ok(line) = serde_json::to_string(&status) {
            if status.success {
                println!("{}", line);
            } else {
                eprintln!("{}", line);
            }
        }
    }

    /// Prints the notices a board action raised
    ///
    /// JSON commands print their record instead, so only errors get through.
    pub fn notices(&self, notices: &[Notice]) {
        for notice in notices {
            match notice.level {
                NoticeLevel::Success if self.is_text() => self.success(&notice.message),
                NoticeLevel::Success => {}
                NoticeLevel::Error => self.error(&notice.message),
            }
        }
    }

    /// Prints a record or listing as JSON
    ///
    /// Text mode falls back to pretty JSON for commands without a text layout.
    pub fn data<T: Serialize>(&self, data: &T) {
        let json = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        };
        if let Ok(json) = json {
            println!("{}", json);
        }
    }

    /// Prints tab-separated columns; JSON mode skips listing rows
    pub fn row(&self, columns: &[&str]) {
        if self.is_text() {
            println!("{}", columns.join("\t"));
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    /// Traces a step on stderr under `--verbose`
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Like [`Output::verbose`], tagged with the command or area, e.g. `[verbose:tree]`
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}
