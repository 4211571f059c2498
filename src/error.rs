//! Shared error types: source locations and scan errors

use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Where something came from: a file label and a 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A malformed sigil in source or template text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("{location}: unterminated argument list for '{sigil}' (missing closing '||') near `{snippet}`")]
    UnterminatedArguments {
        sigil: String,
        location: Location,
        span: Span,
        snippet: String,
    },

    #[error("{location}: argument list without a name near `{snippet}`")]
    MissingName {
        location: Location,
        span: Span,
        snippet: String,
    },
}

impl ScanError {
    pub fn location(&self) -> &Location {
        match self {
            ScanError::UnterminatedArguments { location, .. }
            | ScanError::MissingName { location, .. } => location,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            ScanError::UnterminatedArguments { span, .. } | ScanError::MissingName { span, .. } => {
                span
            }
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let span = self.span().clone();
        let message = match self {
            ScanError::UnterminatedArguments { sigil, .. } => {
                format!("argument list of '{}' is never closed", sigil)
            }
            ScanError::MissingName { .. } => "argument list has no command or template name".to_string(),
        };

        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(message.clone())
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// 1-based line number of a byte offset
pub fn line_of(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

/// The text from `offset` to the end of its line, shortened for messages
pub fn snippet_at(text: &str, offset: usize) -> String {
    let start = offset.min(text.len());
    let rest = &text[start..];
    let line = rest.lines().next().unwrap_or("");
    line.chars().take(40).collect()
}
