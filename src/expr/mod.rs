//! Curve expression language
//!
//! A small numeric language evaluated per curve. Table names resolve to
//! row-major matrices, so `t[0]` is the first row and `col(t, 0)` the first
//! column.
//!
//! ```text
//! .scope=r = col(voltage, 1); i = col(current, 1)
//! .x=i
//! .y=r / i
//! ```

mod ast;
mod error;
mod eval;
mod functions;
mod grammar;
mod lexer;
mod value;

pub use ast::{BinOp, Expr, Statement};
pub use error::{EvalFault, ExpressionError};
pub use eval::{evaluate, evaluate_curve, evaluate_plot, Environment, EvaluatedCurve, EvaluatedPlot};
pub use functions::FUNCTION_NAMES;
pub use grammar::{parse_expression, parse_statements};
pub use lexer::ExprToken;
pub use value::{Shape, Value};
