//! Error types for curve expression evaluation

use thiserror::Error;

use crate::error::Location;

/// What went wrong inside one expression
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalFault {
    #[error("syntax error at offset {position}: {message}")]
    Syntax { message: String, position: usize },

    #[error("unknown name `{0}`")]
    UnknownName(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{function}` expects {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: &'static str,
        found: usize,
    },

    #[error("shape mismatch in `{op}`: {left} vs {right}")]
    Shape {
        op: String,
        left: String,
        right: String,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("{0}")]
    Type(String),
}

impl EvalFault {
    pub fn type_error(message: impl Into<String>) -> Self {
        EvalFault::Type(message.into())
    }
}

/// A curve expression that failed to evaluate
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{location}: curve '{curve}' of plot '{plot}': cannot evaluate `{expression}`: {fault}")]
pub struct ExpressionError {
    pub plot: String,
    pub curve: String,
    pub expression: String,
    pub location: Location,
    #[source]
    pub fault: EvalFault,
}
