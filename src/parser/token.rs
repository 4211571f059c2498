//! Token types produced by the scanner

use crate::error::{Location, Span};

/// A scanned item with its byte range and 1-based line number
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
    pub line: usize,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span, line: usize) -> Self {
        Self { node, span, line }
    }

    /// Location of this item inside the named file
    pub fn location(&self, file: &str) -> Location {
        Location::new(file, self.line)
    }
}

/// One entry of a `||a|key=b||` argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Keyword, if the entry was written as `key=value`
    pub key: Option<String>,
    pub value: String,
}

impl Argument {
    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    pub fn keyword(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }
}

/// A piece of source or template text
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Plain text copied to the output
    Literal(String),
    /// `@name` or `@name||args||`; the argument text is kept raw
    Command { name: String, args: Option<String> },
    /// `#name` or `#name||args||`
    Template { name: String, args: Vec<Argument> },
    /// `%%name`
    Parameter(String),
}
