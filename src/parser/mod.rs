//! Lexical scanner for source and template text

pub mod lexer;
mod lines;
mod scanner;
pub mod token;

pub use lines::{split_lines, Line};
pub use scanner::{is_identifier, scan, scan_from_line, split_arguments, substitute_parameters};
pub use token::*;
