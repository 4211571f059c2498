//! Curve evaluation against registered tables

use std::collections::HashMap;

use tracing::debug;

use crate::data::{AxisRange, Curve, CurveStyle, DataRegistry, Plot};

use super::ast::{BinOp, Expr, Statement};
use super::error::{EvalFault, ExpressionError};
use super::functions;
use super::grammar::{parse_expression, parse_statements};
use super::value::{resolve_index, Value};

/// Name bindings for one curve evaluation.
///
/// Lookup order: scope bindings, then tables, then constants.
pub struct Environment<'d> {
    data: &'d DataRegistry,
    locals: HashMap<String, Value>,
}

impl<'d> Environment<'d> {
    pub fn new(data: &'d DataRegistry) -> Self {
        Self {
            data,
            locals: HashMap::new(),
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.locals.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Result<Value, EvalFault> {
        if let Some(value) = self.locals.get(name) {
            return Ok(value.clone());
        }
        if let Some(table) = self.data.table(name) {
            return Ok(Value::Matrix(table.matrix()));
        }
        functions::constant(name)
            .map(Value::Scalar)
            .ok_or_else(|| EvalFault::UnknownName(name.to_string()))
    }

    /// Run scope statements, binding assigned names
    pub fn execute(&mut self, statements: &[Statement]) -> Result<(), EvalFault> {
        for statement in statements {
            match statement {
                Statement::Assign(name, expr) => {
                    let value = self.eval(expr)?;
                    self.bind(name.clone(), value);
                }
                Statement::Expr(expr) => {
                    self.eval(expr)?;
                }
            }
        }
        Ok(())
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, EvalFault> {
        match expr {
            Expr::Number(n) => Ok(Value::Scalar(*n)),
            Expr::Name(name) => self.lookup(name),
            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                functions::call(name, &args)
            }
            Expr::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?.as_scalar()?;
                match target {
                    Value::Vector(v) => Ok(Value::Scalar(v[resolve_index(index, v.len())?])),
                    Value::Matrix(m) => Ok(Value::Vector(m[resolve_index(index, m.len())?].clone())),
                    Value::Scalar(_) => Err(EvalFault::type_error("cannot index a scalar")),
                }
            }
            Expr::Neg(inner) => Ok(self.eval(inner)?.map(|x| -x)),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                let symbol = op.to_string();
                match op {
                    BinOp::Add => lhs.zip_with(&rhs, &symbol, |a, b| Ok(a + b)),
                    BinOp::Sub => lhs.zip_with(&rhs, &symbol, |a, b| Ok(a - b)),
                    BinOp::Mul => lhs.zip_with(&rhs, &symbol, |a, b| Ok(a * b)),
                    BinOp::Div => lhs.zip_with(&rhs, &symbol, |a, b| {
                        if b == 0.0 {
                            Err(EvalFault::DivisionByZero)
                        } else {
                            Ok(a / b)
                        }
                    }),
                    BinOp::Pow => lhs.zip_with(&rhs, &symbol, |a, b| Ok(a.powf(b))),
                }
            }
        }
    }
}

/// Evaluate a standalone expression with only tables and constants in scope
pub fn evaluate(expression: &str, data: &DataRegistry) -> Result<Value, EvalFault> {
    let expr = parse_expression(expression)?;
    Environment::new(data).eval(&expr)
}

/// A curve with concrete coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedCurve {
    pub name: String,
    pub color: String,
    pub style: CurveStyle,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// A plot whose curves have all been evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedPlot {
    pub name: String,
    pub title: String,
    pub label: String,
    pub axes: (String, String),
    pub xrange: AxisRange,
    pub yrange: AxisRange,
    pub curves: Vec<EvaluatedCurve>,
}

/// Evaluate one curve of `plot` in a fresh environment
pub fn evaluate_curve(
    plot: &Plot,
    curve: &Curve,
    data: &DataRegistry,
) -> Result<EvaluatedCurve, ExpressionError> {
    debug!(plot = %plot.name, curve = %curve.name, "evaluating curve");

    let fail = |expression: &str, fault: EvalFault| ExpressionError {
        plot: plot.name.clone(),
        curve: curve.name.clone(),
        expression: expression.to_string(),
        location: plot.origin.clone(),
        fault,
    };

    let mut env = Environment::new(data);
    if let Some(scope) = &curve.scope {
        parse_statements(scope)
            .and_then(|stmts| env.execute(&stmts))
            .map_err(|fault| fail(scope, fault))?;
    }

    let x = parse_expression(&curve.x)
        .and_then(|e| env.eval(&e))
        .map_err(|fault| fail(&curve.x, fault))?;
    let y = parse_expression(&curve.y)
        .and_then(|e| env.eval(&e))
        .map_err(|fault| fail(&curve.y, fault))?;

    let (x, y) = coordinates(x, y)
        .map_err(|fault| fail(&format!("x={}, y={}", curve.x, curve.y), fault))?;

    Ok(EvaluatedCurve {
        name: curve.name.clone(),
        color: curve.color.clone(),
        style: curve.style,
        x,
        y,
    })
}

/// Evaluate every curve of a plot; the first failing curve fails the plot
pub fn evaluate_plot(plot: &Plot, data: &DataRegistry) -> Result<EvaluatedPlot, ExpressionError> {
    let curves = plot
        .curves
        .iter()
        .map(|curve| evaluate_curve(plot, curve, data))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EvaluatedPlot {
        name: plot.name.clone(),
        title: plot.title().to_string(),
        label: plot.label(),
        axes: plot.axes.clone(),
        xrange: plot.xrange,
        yrange: plot.yrange,
        curves,
    })
}

fn coordinates(x: Value, y: Value) -> Result<(Vec<f64>, Vec<f64>), EvalFault> {
    match (x, y) {
        (Value::Vector(x), Value::Vector(y)) => {
            if x.len() != y.len() {
                return Err(EvalFault::Shape {
                    op: "x/y".to_string(),
                    left: format!("vector of {}", x.len()),
                    right: format!("vector of {}", y.len()),
                });
            }
            Ok((x, y))
        }
        (Value::Scalar(x), Value::Vector(y)) => Ok((vec![x; y.len()], y)),
        (Value::Vector(x), Value::Scalar(y)) => {
            let len = x.len();
            Ok((x, vec![y; len]))
        }
        (Value::Scalar(x), Value::Scalar(y)) => Ok((vec![x], vec![y])),
        (x, y) => Err(EvalFault::type_error(format!(
            "curve coordinates must be vectors, got {} and {}",
            x.shape(),
            y.shape()
        ))),
    }
}
