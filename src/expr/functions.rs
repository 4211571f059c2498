//! Built-in functions and constants available to curve expressions

use std::sync::Arc;

use super::error::EvalFault;
use super::value::{resolve_index, Value};

/// Named constants
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(std::f64::consts::PI),
        "e" => Some(std::f64::consts::E),
        _ => None,
    }
}

fn elementwise(name: &str) -> Option<fn(f64) -> f64> {
    let f: fn(f64) -> f64 = match name {
        "sin" => f64::sin,
        "cos" => f64::cos,
        "tan" => f64::tan,
        "asin" => f64::asin,
        "acos" => f64::acos,
        "atan" => f64::atan,
        "sinh" => f64::sinh,
        "cosh" => f64::cosh,
        "tanh" => f64::tanh,
        "exp" => f64::exp,
        "log" => f64::ln,
        "log10" => f64::log10,
        "log2" => f64::log2,
        "sqrt" => f64::sqrt,
        "abs" => f64::abs,
        "floor" => f64::floor,
        "ceil" => f64::ceil,
        "round" => f64::round,
        _ => return None,
    };
    Some(f)
}

/// Every callable name, for dumps and diagnostics
pub const FUNCTION_NAMES: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh", "exp", "log", "log10",
    "log2", "sqrt", "abs", "floor", "ceil", "round", "atan2", "pow", "sum", "mean", "min", "max",
    "len", "col", "row", "transpose", "linspace",
];

fn expect_args(function: &str, args: &[Value], expected: usize) -> Result<(), EvalFault> {
    if args.len() != expected {
        return Err(EvalFault::Arity {
            function: function.to_string(),
            expected: match expected {
                1 => "1",
                2 => "2",
                _ => "3",
            },
            found: args.len(),
        });
    }
    Ok(())
}

/// Call a built-in function by name
pub fn call(name: &str, args: &[Value]) -> Result<Value, EvalFault> {
    if let Some(f) = elementwise(name) {
        expect_args(name, args, 1)?;
        return Ok(args[0].map(f));
    }

    match name {
        "atan2" => {
            expect_args(name, args, 2)?;
            args[0].zip_with(&args[1], name, |y, x| Ok(y.atan2(x)))
        }
        "pow" => {
            expect_args(name, args, 2)?;
            args[0].zip_with(&args[1], name, |a, b| Ok(a.powf(b)))
        }
        "sum" => {
            expect_args(name, args, 1)?;
            Ok(Value::Scalar(args[0].elements().iter().sum()))
        }
        "len" => {
            expect_args(name, args, 1)?;
            let len = match &args[0] {
                Value::Scalar(_) => 1,
                Value::Vector(v) => v.len(),
                Value::Matrix(m) => m.len(),
            };
            Ok(Value::Scalar(len as f64))
        }
        "mean" | "min" | "max" => {
            expect_args(name, args, 1)?;
            let elements = args[0].elements();
            if elements.is_empty() {
                return Err(EvalFault::type_error(format!("`{}` of an empty value", name)));
            }
            let result = match name {
                "mean" => elements.iter().sum::<f64>() / elements.len() as f64,
                "min" => elements.iter().copied().fold(f64::INFINITY, f64::min),
                _ => elements.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            };
            Ok(Value::Scalar(result))
        }
        "col" => {
            expect_args(name, args, 2)?;
            let table = args[0].as_matrix()?;
            let width = table.first().map_or(0, |r| r.len());
            let j = resolve_index(args[1].as_scalar()?, width)?;
            Ok(Value::Vector(
                table
                    .iter()
                    .map(|row| row.get(j).copied().unwrap_or(f64::NAN))
                    .collect(),
            ))
        }
        "row" => {
            expect_args(name, args, 2)?;
            let table = args[0].as_matrix()?;
            let i = resolve_index(args[1].as_scalar()?, table.len())?;
            Ok(Value::Vector(table[i].clone()))
        }
        "transpose" => {
            expect_args(name, args, 1)?;
            let table = args[0].as_matrix()?;
            let width = table.first().map_or(0, |r| r.len());
            let columns = (0..width)
                .map(|j| {
                    table
                        .iter()
                        .map(|row| row.get(j).copied().unwrap_or(f64::NAN))
                        .collect()
                })
                .collect();
            Ok(Value::Matrix(Arc::new(columns)))
        }
        "linspace" => {
            expect_args(name, args, 3)?;
            let start = args[0].as_scalar()?;
            let stop = args[1].as_scalar()?;
            let n = args[2].as_scalar()?;
            if n < 1.0 || n.fract() != 0.0 {
                return Err(EvalFault::type_error(format!(
                    "linspace needs a positive integer count, got {}",
                    n
                )));
            }
            let n = n as usize;
            let values = if n == 1 {
                vec![start]
            } else {
                let step = (stop - start) / (n - 1) as f64;
                (0..n).map(|i| start + step * i as f64).collect()
            };
            Ok(Value::Vector(values))
        }
        _ => Err(EvalFault::UnknownFunction(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Value {
        Value::Matrix(Arc::new(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]))
    }

    #[test]
    fn test_every_listed_function_is_callable() {
        for name in FUNCTION_NAMES {
            let result = call(name, &[]);
            assert!(
                matches!(result, Err(EvalFault::Arity { .. })),
                "`{}` should be known",
                name
            );
        }
    }

    #[test]
    fn test_elementwise_vector() {
        let r = call("sqrt", &[Value::Vector(vec![4.0, 9.0])]).expect("Should call");
        assert_eq!(r, Value::Vector(vec![2.0, 3.0]));
    }

    #[test]
    fn test_reductions() {
        let v = Value::Vector(vec![1.0, 5.0, 3.0]);
        assert_eq!(call("sum", &[v.clone()]), Ok(Value::Scalar(9.0)));
        assert_eq!(call("mean", &[v.clone()]), Ok(Value::Scalar(3.0)));
        assert_eq!(call("min", &[v.clone()]), Ok(Value::Scalar(1.0)));
        assert_eq!(call("max", &[v.clone()]), Ok(Value::Scalar(5.0)));
        assert_eq!(call("len", &[v]), Ok(Value::Scalar(3.0)));
        assert!(call("max", &[Value::Vector(vec![])]).is_err());
    }

    #[test]
    fn test_col_row_transpose() {
        assert_eq!(
            call("col", &[table(), Value::Scalar(1.0)]),
            Ok(Value::Vector(vec![2.0, 4.0, 6.0]))
        );
        assert_eq!(
            call("row", &[table(), Value::Scalar(-1.0)]),
            Ok(Value::Vector(vec![5.0, 6.0]))
        );
        let t = call("transpose", &[table()]).expect("Should transpose");
        assert_eq!(
            t,
            Value::Matrix(Arc::new(vec![vec![1.0, 3.0, 5.0], vec![2.0, 4.0, 6.0]]))
        );
    }

    #[test]
    fn test_col_out_of_range() {
        assert!(matches!(
            call("col", &[table(), Value::Scalar(2.0)]),
            Err(EvalFault::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_linspace() {
        assert_eq!(
            call(
                "linspace",
                &[Value::Scalar(0.0), Value::Scalar(1.0), Value::Scalar(5.0)]
            ),
            Ok(Value::Vector(vec![0.0, 0.25, 0.5, 0.75, 1.0]))
        );
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            call("system", &[Value::Scalar(1.0)]),
            Err(EvalFault::UnknownFunction("system".to_string()))
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(constant("pi"), Some(std::f64::consts::PI));
        assert_eq!(constant("tau"), None);
    }
}
