//! Tables, plots and curves parsed from data files

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Location;

/// A single table cell: numeric when it parses as a number, text otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(n) => Cell::Number(n),
            Err(_) => Cell::Text(raw.to_string()),
        }
    }

    /// Numeric value; text cells read as NaN
    pub fn as_f64(&self) -> f64 {
        match self {
            Cell::Number(n) => *n,
            Cell::Text(_) => f64::NAN,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A named table of measurements
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub human_name: Option<String>,
    /// `key=v1;v2` metadata lines, values split on `;`
    pub metadata: BTreeMap<String, Vec<String>>,
    pub rows: Vec<Vec<Cell>>,
    pub origin: Location,
    numeric: Arc<Vec<Vec<f64>>>,
}

impl Table {
    pub fn new(
        name: impl Into<String>,
        human_name: Option<String>,
        metadata: BTreeMap<String, Vec<String>>,
        rows: Vec<Vec<Cell>>,
        origin: Location,
    ) -> Self {
        let numeric = rows
            .iter()
            .map(|row| row.iter().map(Cell::as_f64).collect())
            .collect();
        Self {
            name: name.into(),
            human_name,
            metadata,
            rows,
            origin,
            numeric: Arc::new(numeric),
        }
    }

    /// Column names from the `cols` metadata key
    pub fn columns(&self) -> Option<&[String]> {
        self.metadata.get("cols").map(|c| c.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns()
            .map(|c| c.len())
            .or_else(|| self.rows.first().map(|r| r.len()))
            .unwrap_or(0)
    }

    /// Row-major numeric view shared with the expression evaluator
    pub fn matrix(&self) -> Arc<Vec<Vec<f64>>> {
        Arc::clone(&self.numeric)
    }

    /// LaTeX label for cross references
    pub fn label(&self) -> String {
        format!("label_{}", self.name)
    }

    /// Human readable name, falling back to the table name
    pub fn caption(&self) -> &str {
        self.human_name.as_deref().unwrap_or(&self.name)
    }
}

/// Axis range: fixed bounds or auto-scaled from the data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisRange {
    Auto,
    Fixed(f64, f64),
}

impl AxisRange {
    /// Parse `autoscale` or `<lo>;<hi>`
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw == "autoscale" || raw == "auto" {
            return Some(AxisRange::Auto);
        }
        let (lo, hi) = raw.split_once(';')?;
        let lo = lo.trim().parse().ok()?;
        let hi = hi.trim().parse().ok()?;
        Some(AxisRange::Fixed(lo, hi))
    }
}

impl fmt::Display for AxisRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisRange::Auto => write!(f, "auto"),
            AxisRange::Fixed(lo, hi) => write!(f, "{};{}", lo, hi),
        }
    }
}

/// How a curve is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveStyle {
    Lines,
    Points,
    #[default]
    LinesPoints,
}

impl CurveStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "lines" => Some(CurveStyle::Lines),
            "points" => Some(CurveStyle::Points),
            "lines+points" | "points+lines" => Some(CurveStyle::LinesPoints),
            _ => None,
        }
    }

    pub fn draws_lines(&self) -> bool {
        matches!(self, CurveStyle::Lines | CurveStyle::LinesPoints)
    }

    pub fn draws_points(&self) -> bool {
        matches!(self, CurveStyle::Points | CurveStyle::LinesPoints)
    }
}

impl fmt::Display for CurveStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveStyle::Lines => write!(f, "lines"),
            CurveStyle::Points => write!(f, "points"),
            CurveStyle::LinesPoints => write!(f, "lines+points"),
        }
    }
}

/// One data series of a plot
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub name: String,
    pub color: String,
    pub style: CurveStyle,
    pub x: String,
    pub y: String,
    /// Statements run before `x` and `y` to bind local names
    pub scope: Option<String>,
}

impl Curve {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: "black".to_string(),
            style: CurveStyle::default(),
            x: "x".to_string(),
            y: "y".to_string(),
            scope: None,
        }
    }
}

/// A named plot made of curves
#[derive(Debug, Clone)]
pub struct Plot {
    pub name: String,
    pub human_name: Option<String>,
    pub axes: (String, String),
    pub xrange: AxisRange,
    pub yrange: AxisRange,
    pub curves: Vec<Curve>,
    pub origin: Location,
}

impl Plot {
    pub fn new(name: impl Into<String>, human_name: Option<String>, origin: Location) -> Self {
        Self {
            name: name.into(),
            human_name,
            axes: ("x".to_string(), "y".to_string()),
            xrange: AxisRange::Auto,
            yrange: AxisRange::Auto,
            curves: Vec::new(),
            origin,
        }
    }

    /// Figure label for cross references
    pub fn label(&self) -> String {
        format!("figure_{}", self.name)
    }

    pub fn title(&self) -> &str {
        self.human_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse("2.5"), Cell::Number(2.5));
        assert_eq!(Cell::parse("1e-3"), Cell::Number(0.001));
        assert_eq!(Cell::parse("n/a"), Cell::Text("n/a".to_string()));
        assert!(Cell::parse("n/a").as_f64().is_nan());
    }

    #[test]
    fn test_axis_range_parse() {
        assert_eq!(AxisRange::parse("autoscale"), Some(AxisRange::Auto));
        assert_eq!(AxisRange::parse(" 0 ; 10.5 "), Some(AxisRange::Fixed(0.0, 10.5)));
        assert_eq!(AxisRange::parse("0"), None);
        assert_eq!(AxisRange::parse("a;b"), None);
    }

    #[test]
    fn test_curve_defaults() {
        let curve = Curve::new("c");
        assert_eq!(curve.color, "black");
        assert_eq!(curve.style, CurveStyle::LinesPoints);
        assert_eq!(curve.x, "x");
        assert_eq!(curve.y, "y");
        assert!(curve.scope.is_none());
    }

    #[test]
    fn test_table_matrix_and_columns() {
        let mut metadata = BTreeMap::new();
        metadata.insert("cols".to_string(), vec!["t".to_string(), "v".to_string()]);
        let table = Table::new(
            "t1",
            None,
            metadata,
            vec![vec![Cell::Number(1.0), Cell::Text("x".to_string())]],
            Location::new("d", 1),
        );
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.caption(), "t1");
        assert_eq!(table.label(), "label_t1");
        let m = table.matrix();
        assert_eq!(m[0][0], 1.0);
        assert!(m[0][1].is_nan());
    }
}
