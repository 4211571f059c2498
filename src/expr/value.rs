//! Runtime values and element-wise arithmetic

use std::fmt;
use std::sync::Arc;

use super::error::EvalFault;

/// A value produced by an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
    /// Row-major table data, shared with the table it came from
    Matrix(Arc<Vec<Vec<f64>>>),
}

impl Value {
    pub fn shape(&self) -> Shape {
        match self {
            Value::Scalar(_) => Shape::Scalar,
            Value::Vector(v) => Shape::Vector(v.len()),
            Value::Matrix(m) => Shape::Matrix(m.len(), m.first().map_or(0, |r| r.len())),
        }
    }

    pub fn as_scalar(&self) -> Result<f64, EvalFault> {
        match self {
            Value::Scalar(n) => Ok(*n),
            other => Err(EvalFault::type_error(format!(
                "expected a scalar, got {}",
                other.shape()
            ))),
        }
    }

    pub fn as_matrix(&self) -> Result<&Arc<Vec<Vec<f64>>>, EvalFault> {
        match self {
            Value::Matrix(m) => Ok(m),
            other => Err(EvalFault::type_error(format!(
                "expected a table, got {}",
                other.shape()
            ))),
        }
    }

    /// All elements in row-major order
    pub fn elements(&self) -> Vec<f64> {
        match self {
            Value::Scalar(n) => vec![*n],
            Value::Vector(v) => v.clone(),
            Value::Matrix(m) => m.iter().flatten().copied().collect(),
        }
    }

    /// Apply `f` to every element
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(n) => Value::Scalar(f(*n)),
            Value::Vector(v) => Value::Vector(v.iter().map(|&x| f(x)).collect()),
            Value::Matrix(m) => Value::Matrix(Arc::new(
                m.iter()
                    .map(|row| row.iter().map(|&x| f(x)).collect())
                    .collect(),
            )),
        }
    }

    /// Combine two values element-wise, broadcasting scalars
    pub fn zip_with(
        &self,
        other: &Value,
        op: &str,
        f: impl Fn(f64, f64) -> Result<f64, EvalFault>,
    ) -> Result<Value, EvalFault> {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(*a, *b)?)),
            (Value::Scalar(a), Value::Vector(v)) => Ok(Value::Vector(
                v.iter().map(|&b| f(*a, b)).collect::<Result<_, _>>()?,
            )),
            (Value::Vector(v), Value::Scalar(b)) => Ok(Value::Vector(
                v.iter().map(|&a| f(a, *b)).collect::<Result<_, _>>()?,
            )),
            (Value::Vector(a), Value::Vector(b)) if a.len() == b.len() => Ok(Value::Vector(
                a.iter()
                    .zip(b)
                    .map(|(&a, &b)| f(a, b))
                    .collect::<Result<_, _>>()?,
            )),
            (Value::Scalar(a), Value::Matrix(m)) => map_rows(m, |row| {
                row.iter().map(|&b| f(*a, b)).collect()
            }),
            (Value::Matrix(m), Value::Scalar(b)) => map_rows(m, |row| {
                row.iter().map(|&a| f(a, *b)).collect()
            }),
            (Value::Matrix(a), Value::Matrix(b)) if self.shape() == other.shape() => {
                let rows = a
                    .iter()
                    .zip(b.iter())
                    .map(|(ra, rb)| {
                        ra.iter()
                            .zip(rb)
                            .map(|(&x, &y)| f(x, y))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Matrix(Arc::new(rows)))
            }
            _ => Err(EvalFault::Shape {
                op: op.to_string(),
                left: self.shape().to_string(),
                right: other.shape().to_string(),
            }),
        }
    }
}

fn map_rows(
    m: &[Vec<f64>],
    f: impl Fn(&[f64]) -> Result<Vec<f64>, EvalFault>,
) -> Result<Value, EvalFault> {
    let rows = m
        .iter()
        .map(|row| f(row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Matrix(Arc::new(rows)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Vector(usize),
    Matrix(usize, usize),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => write!(f, "scalar"),
            Shape::Vector(n) => write!(f, "vector of {}", n),
            Shape::Matrix(r, c) => write!(f, "{}x{} table", r, c),
        }
    }
}

/// Resolve a possibly negative index against a length
pub fn resolve_index(index: f64, len: usize) -> Result<usize, EvalFault> {
    if index.fract() != 0.0 || !index.is_finite() {
        return Err(EvalFault::type_error(format!(
            "index must be an integer, got {}",
            index
        )));
    }
    let raw = index as i64;
    let resolved = if raw < 0 { len as i64 + raw } else { raw };
    if resolved < 0 || resolved >= len as i64 {
        return Err(EvalFault::IndexOutOfRange { index: raw, len });
    }
    Ok(resolved as usize)
}
