//! Data file parser: `^^table` and `$$plot` blocks

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::Location;
use crate::parser::{is_identifier, split_lines, Line};

use super::error::DataError;
use super::model::{AxisRange, Cell, Curve, CurveStyle, Plot, Table};

const TABLE: &str = "^^";
const PLOT: &str = "$$";
const END_OF_METADATA: &str = "&";

/// A parsed table or plot
#[derive(Debug, Clone)]
pub enum DataDefinition {
    Table(Table),
    Plot(Plot),
}

impl DataDefinition {
    pub fn name(&self) -> &str {
        match self {
            DataDefinition::Table(t) => &t.name,
            DataDefinition::Plot(p) => &p.name,
        }
    }

    pub fn origin(&self) -> &Location {
        match self {
            DataDefinition::Table(t) => &t.origin,
            DataDefinition::Plot(p) => &p.origin,
        }
    }
}

/// Parse every table and plot block of a data file, in file order.
///
/// Text outside blocks is ignored.
pub fn parse_data_file(text: &str, origin: &str) -> Result<Vec<DataDefinition>, DataError> {
    let lines = split_lines(text);
    let mut definitions = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let content = lines[idx].content.trim_start();
        let block = if let Some(header) = content.strip_prefix(TABLE) {
            Some((TABLE, header))
        } else {
            content.strip_prefix(PLOT).map(|header| (PLOT, header))
        };
        let Some((marker, header)) = block else {
            idx += 1;
            continue;
        };
        // closing markers with no open block, notes like `$$E=mc^2$$`
        let Some(header) = parse_header(header) else {
            if !header.trim().is_empty() {
                debug!(line = lines[idx].number, "skipping '{}' line outside a block", marker);
            }
            idx += 1;
            continue;
        };

        if marker == TABLE {
            let (table, next) = parse_table(&lines, idx, header, origin)?;
            debug!(
                table = %table.name,
                rows = table.row_count(),
                columns = table.column_count(),
                "parsed table"
            );
            definitions.push(DataDefinition::Table(table));
            idx = next;
        } else {
            let (plot, next) = parse_plot(&lines, idx, header, origin)?;
            debug!(plot = %plot.name, curves = plot.curves.len(), "parsed plot");
            definitions.push(DataDefinition::Plot(plot));
            idx = next;
        }
    }

    Ok(definitions)
}

fn parse_table(
    lines: &[Line<'_>],
    start: usize,
    (name, human_name): (String, Option<String>),
    origin: &str,
) -> Result<(Table, usize), DataError> {
    let location = Location::new(origin, lines[start].number);
    let mut metadata = BTreeMap::new();

    let mut idx = start + 1;
    loop {
        let Some(line) = lines.get(idx) else {
            return Err(DataError::Unterminated {
                kind: "table",
                name,
                location,
            });
        };
        idx += 1;
        let trimmed = line.content.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == END_OF_METADATA || trimmed == TABLE {
            break;
        }
        let here = Location::new(origin, line.number);
        if let Some(last) = trimmed.strip_suffix(END_OF_METADATA) {
            let (key, value) = parse_metadata_line(last, &here)?;
            metadata.insert(key, split_list(&value));
            break;
        }
        let (key, value) = parse_metadata_line(trimmed, &here)?;
        if key.starts_with('.') {
            return Err(DataError::InvalidMetadata {
                location: here,
                line: trimmed.to_string(),
            });
        }
        metadata.insert(key, split_list(&value));
    }

    let expected = metadata.get("cols").map(|cols: &Vec<String>| cols.len());
    let mut width = expected;
    let mut rows = Vec::new();

    let next = loop {
        let Some(line) = lines.get(idx) else {
            break idx;
        };
        let trimmed = line.content.trim();
        if trimmed == TABLE {
            break idx + 1;
        }
        if trimmed.is_empty() {
            // a blank line ends the table; swallow an optional `^^` after it
            let mut look = idx + 1;
            while lines.get(look).is_some_and(|l| l.content.trim().is_empty()) {
                look += 1;
            }
            match lines.get(look) {
                Some(l) if l.content.trim() == TABLE => break look + 1,
                _ => break idx + 1,
            }
        }

        let row: Vec<Cell> = trimmed.split_whitespace().map(Cell::parse).collect();
        match width {
            Some(w) if w != row.len() => {
                return Err(DataError::RaggedRow {
                    table: name,
                    location: Location::new(origin, line.number),
                    expected: w,
                    found: row.len(),
                });
            }
            Some(_) => {}
            None => width = Some(row.len()),
        }
        rows.push(row);
        idx += 1;
    };

    Ok((Table::new(name, human_name, metadata, rows, location), next))
}

fn parse_plot(
    lines: &[Line<'_>],
    start: usize,
    (name, human_name): (String, Option<String>),
    origin: &str,
) -> Result<(Plot, usize), DataError> {
    let location = Location::new(origin, lines[start].number);
    let mut plot = Plot::new(name, human_name, location);
    let mut curve: Option<Curve> = None;

    let mut idx = start + 1;
    loop {
        let Some(line) = lines.get(idx) else {
            return Err(DataError::Unterminated {
                kind: "plot",
                name: plot.name,
                location: plot.origin,
            });
        };
        idx += 1;
        let trimmed = line.content.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == PLOT {
            break;
        }

        let here = Location::new(origin, line.number);
        let (key, value) = parse_metadata_line(trimmed, &here)?;

        if let Some(attr) = key.strip_prefix('.') {
            let Some(current) = curve.as_mut() else {
                return Err(DataError::CurveContext {
                    plot: plot.name,
                    key: attr.to_string(),
                    location: here,
                });
            };
            apply_curve_attribute(current, attr, value, &plot.name, &here)?;
            continue;
        }

        match key.as_str() {
            "axes" => {
                let labels = split_list(&value);
                let [x, y] = labels.as_slice() else {
                    return Err(DataError::invalid_value(here, key.clone(), value, "expected two labels `x;y`"));
                };
                plot.axes = (x.clone(), y.clone());
            }
            "xrange" | "yrange" => {
                let range = AxisRange::parse(&value).ok_or_else(|| {
                    DataError::invalid_value(here.clone(), key.clone(), value.clone(), "expected `autoscale` or `lo;hi`")
                })?;
                if key == "xrange" {
                    plot.xrange = range;
                } else {
                    plot.yrange = range;
                }
            }
            "curve" => {
                if value.is_empty() {
                    return Err(DataError::invalid_value(here, key.clone(), value, "curve needs a name"));
                }
                if let Some(done) = curve.replace(Curve::new(value)) {
                    plot.curves.push(done);
                }
            }
            other => warn!(
                plot = %plot.name,
                location = %here,
                "ignoring unknown plot attribute '{}'",
                other
            ),
        }
    }

    if let Some(done) = curve {
        plot.curves.push(done);
    }

    Ok((plot, idx))
}

fn apply_curve_attribute(
    curve: &mut Curve,
    attr: &str,
    value: String,
    plot: &str,
    here: &Location,
) -> Result<(), DataError> {
    match attr {
        "x" => curve.x = value,
        "y" => curve.y = value,
        "scope" => curve.scope = Some(value).filter(|s| !s.trim().is_empty()),
        "color" => curve.color = value,
        "style" => {
            curve.style = CurveStyle::parse(&value).ok_or_else(|| {
                DataError::invalid_value(
                    here.clone(),
                    ".style",
                    value.clone(),
                    "expected `lines`, `points` or `lines+points`",
                )
            })?;
        }
        other => warn!(
            plot = %plot,
            curve = %curve.name,
            location = %here,
            "ignoring unknown curve attribute '.{}'",
            other
        ),
    }
    Ok(())
}

/// Split a `name \ human name` header; `None` when the line is not a header
fn parse_header(header: &str) -> Option<(String, Option<String>)> {
    let (name, human) = match header.split_once('\\') {
        Some((name, human)) => (name.trim(), Some(human.trim())),
        None => (header.trim(), None),
    };
    if !is_identifier(name) {
        return None;
    }
    let human = human.filter(|h| !h.is_empty()).map(str::to_string);
    Some((name.to_string(), human))
}

/// Split `key=value` (or `.key=value`); the value may be empty
fn parse_metadata_line(line: &str, location: &Location) -> Result<(String, String), DataError> {
    let malformed = || DataError::InvalidMetadata {
        location: location.clone(),
        line: line.to_string(),
    };
    let (key, value) = line.split_once('=').ok_or_else(malformed)?;
    let key = key.trim();
    let bare = key.strip_prefix('.').unwrap_or(key);
    if !is_identifier(bare) {
        return Err(malformed());
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn split_list(value: &str) -> Vec<String> {
    value.split(';').map(|v| v.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(text: &str) -> Vec<Table> {
        parse_data_file(text, "data.txt")
            .expect("Should parse")
            .into_iter()
            .filter_map(|d| match d {
                DataDefinition::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    fn plots(text: &str) -> Vec<Plot> {
        parse_data_file(text, "data.txt")
            .expect("Should parse")
            .into_iter()
            .filter_map(|d| match d {
                DataDefinition::Plot(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_table_with_blank_line_terminator() {
        let text = "^^t1 \\ Measurements\ncols=t;U\n&\n1 2\n3 4\n5 6\n\nafter\n";
        let t = &tables(text)[0];
        assert_eq!(t.name, "t1");
        assert_eq!(t.human_name.as_deref(), Some("Measurements"));
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.column_count(), 2);
        assert_eq!(t.rows[2], vec![Cell::Number(5.0), Cell::Number(6.0)]);
    }

    #[test]
    fn test_table_with_explicit_close() {
        let text = "^^t\ncols=a\n&\n1\n2\n^^\n";
        assert_eq!(tables(text)[0].row_count(), 2);
    }

    #[test]
    fn test_blank_line_then_close_marker() {
        let text = "^^t\ncols=a\n&\n1\n\n^^\n^^u\ncols=b\n&\n7\n";
        let parsed = tables(text);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].row_count(), 1);
        assert_eq!(parsed[1].name, "u");
    }

    #[test]
    fn test_metadata_terminator_on_last_line() {
        let text = "^^t\nunits=s;V\ncols=a;b&\n1 2\n";
        let t = &tables(text)[0];
        assert_eq!(t.columns(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(t.metadata["units"], vec!["s".to_string(), "V".to_string()]);
        assert_eq!(t.row_count(), 1);
    }

    #[test]
    fn test_legacy_double_caret_metadata_terminator() {
        let text = "^^t\ncols=a;b\n^^\n1 2\n3 4\n\n";
        assert_eq!(tables(text)[0].row_count(), 2);
    }

    #[test]
    fn test_text_cells_kept() {
        let text = "^^t\ncols=name;v\n&\nalpha 1\nbeta 2\n";
        let t = &tables(text)[0];
        assert_eq!(t.rows[0][0], Cell::Text("alpha".to_string()));
    }

    #[test]
    fn test_marker_lines_outside_blocks_are_skipped() {
        let text = "$$E=mc^2$$ in a note\n^^^^^^^^\n$$ see below\n^^t\ncols=a\n&\n1\n\n$$p\ncurve=c\n$$\n";
        let defs = parse_data_file(text, "d").expect("Should parse");
        let names: Vec<_> = defs.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["t", "p"]);
        assert_eq!(defs[0].origin().line, 4);
    }

    #[test]
    fn test_unicode_table_name() {
        let text = "^^таблица_1\ncols=a\n&\n1\n";
        assert_eq!(tables(text)[0].name, "таблица_1");
    }

    #[test]
    fn test_ragged_row() {
        let result = parse_data_file("^^t\ncols=a;b\n&\n1 2\n3\n", "d");
        match result {
            Err(DataError::RaggedRow {
                expected,
                found,
                location,
                ..
            }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
                assert_eq!(location.line, 5);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_ragged_row_without_cols() {
        let result = parse_data_file("^^t\n&\n1 2\n3 4 5\n", "d");
        assert!(matches!(result, Err(DataError::RaggedRow { .. })));
    }

    #[test]
    fn test_unterminated_metadata() {
        let result = parse_data_file("^^t\ncols=a\n", "d");
        assert!(matches!(result, Err(DataError::Unterminated { .. })));
    }

    #[test]
    fn test_plot_with_curves() {
        let text = "\
$$p1 \\ Voltage over time
axes=t, s;U, V
xrange=0;10
curve=measured
.x=col(t1, 0)
.y=col(t1, 1)
.color=red
.style=points
curve=model
.scope=k = 2; a = linspace(0, 10, 5)
.x=a
.y=k * a
$$
";
        let p = &plots(text)[0];
        assert_eq!(p.title(), "Voltage over time");
        assert_eq!(p.axes, ("t, s".to_string(), "U, V".to_string()));
        assert_eq!(p.xrange, AxisRange::Fixed(0.0, 10.0));
        assert_eq!(p.yrange, AxisRange::Auto);
        assert_eq!(p.curves.len(), 2);
        assert_eq!(p.curves[0].color, "red");
        assert_eq!(p.curves[0].style, CurveStyle::Points);
        assert_eq!(p.curves[1].color, "black");
        assert_eq!(p.curves[1].scope.as_deref(), Some("k = 2; a = linspace(0, 10, 5)"));
        assert_eq!(p.curves[1].y, "k * a");
    }

    #[test]
    fn test_curve_attribute_before_curve() {
        let result = parse_data_file("$$p\n.x=a\ncurve=c\n$$\n", "d");
        assert!(matches!(result, Err(DataError::CurveContext { .. })));
    }

    #[test]
    fn test_unknown_curve_attribute_is_ignored() {
        let p = &plots("$$p\ncurve=c\n.width=3\n.y=2\n$$\n")[0];
        assert_eq!(p.curves[0].y, "2");
    }

    #[test]
    fn test_invalid_range() {
        let result = parse_data_file("$$p\nxrange=wide\n$$\n", "d");
        assert!(matches!(result, Err(DataError::InvalidValue { .. })));
    }

    #[test]
    fn test_unterminated_plot() {
        let result = parse_data_file("$$p\ncurve=c\n", "d");
        assert!(matches!(result, Err(DataError::Unterminated { kind: "plot", .. })));
    }

    #[test]
    fn test_tables_and_plots_interleaved() {
        let text = "^^a\ncols=x\n&\n1\n\n$$p\ncurve=c\n$$\n^^b\ncols=x\n&\n2\n";
        let defs = parse_data_file(text, "d").expect("Should parse");
        let names: Vec<_> = defs.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["a", "p", "b"]);
    }
}
