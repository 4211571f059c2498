//! Data files: tables, plots, curve expressions and batch loading

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use labgen::data::DataItem;
use labgen::expr::{evaluate, EvalFault, Value};
use labgen::renderer::RecordingBackend;
use labgen::{DataError, DataRegistry, Project, ProjectConfig, ProjectError, RenderConfig, Source};

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
    }
}

#[test]
fn test_table_ends_at_blank_line() {
    let text = "^^t\ncols=a;b;c\n&\n1 2 3\n4 5 6\n7 8 9\n\n10 11 12\n";
    let mut data = DataRegistry::new();
    data.load_str(text, "data.txt").expect("Should load");

    let table = data.table("t").expect("table registered");
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_count(), 3);
    assert!(table.rows.iter().all(|row| row.len() == 3));
}

#[test]
fn test_table_old_metadata_terminator() {
    let text = "^^old \\ Legacy table\ncols=x;y\n^^\n1 2\n3 4\n^^\n";
    let mut data = DataRegistry::new();
    data.load_str(text, "old.txt").expect("Should load");
    let table = data.table("old").expect("table registered");
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.caption(), "Legacy table");
}

#[test]
fn test_non_ascii_table_name() {
    let mut data = DataRegistry::new();
    data.load_str("^^напряжение_1\ncols=U\n&\n1\n", "data.txt")
        .expect("Should load");
    assert!(matches!(data.lookup("напряжение_1"), Some(DataItem::Table(_))));
    let value = evaluate("sum(напряжение_1)", &data).expect("Should evaluate");
    assert_eq!(value, Value::Scalar(1.0));
}

#[test]
fn test_ragged_row_rejected() {
    let mut data = DataRegistry::new();
    let err = data
        .load_str("^^t\ncols=a;b\n&\n1 2\n3\n", "data.txt")
        .expect_err("Should fail");
    assert!(matches!(
        err,
        DataError::RaggedRow {
            expected: 2,
            found: 1,
            ..
        }
    ));
}

#[test]
fn test_duplicate_table_keeps_first() {
    let mut data = DataRegistry::new();
    data.load_str("^^t\ncols=a\n&\n1\n", "first.txt")
        .expect("Should load");
    let err = data
        .load_str("^^t\ncols=a;b\n&\n1 2\n", "second.txt")
        .expect_err("Should fail");

    match err {
        DataError::Duplicate {
            name,
            location,
            previous,
        } => {
            assert_eq!(name, "t");
            assert_eq!(location.file, "second.txt");
            assert_eq!(previous.file, "first.txt");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(data.table("t").expect("first kept").column_count(), 1);
}

#[test]
fn test_curve_attribute_before_curve() {
    let mut data = DataRegistry::new();
    let err = data
        .load_str("$$p\naxes=t;s\n.x=1\ncurve=c\n$$\n", "plots.txt")
        .expect_err("Should fail");
    match err {
        DataError::CurveContext { plot, key, location } => {
            assert_eq!(plot, "p");
            assert_eq!(key, "x");
            assert_eq!(location.line, 3);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_log_of_table_row() {
    let mut data = DataRegistry::new();
    data.load_str(
        "^^table1\ncols=a;b;c\n&\n1 2.718281828459045 7.38905609893065\n",
        "data.txt",
    )
    .expect("Should load");

    let value = evaluate("log(table1[0])", &data).expect("Should evaluate");
    let Value::Vector(values) = value else {
        panic!("expected a vector, got {:?}", value);
    };
    assert_close(&values, &[0.0, 1.0, 2.0]);
}

#[test]
fn test_expression_faults() {
    let data = DataRegistry::new();
    assert!(matches!(
        evaluate("nothing + 1", &data),
        Err(EvalFault::UnknownName(_))
    ));
    assert!(matches!(
        evaluate("frobnicate(1)", &data),
        Err(EvalFault::UnknownFunction(_))
    ));
    assert!(matches!(evaluate("1 / 0", &data), Err(EvalFault::DivisionByZero)));
    assert!(matches!(evaluate("(1 +", &data), Err(EvalFault::Syntax { .. })));
}

#[test]
fn test_curve_scope_and_transforms() {
    let mut data = DataRegistry::new();
    data.load_str(
        "^^r\ncols=U;I\n&\n2 1\n4 2\n\n$$p\ncurve=power\n.scope=u = col(r, 0); i = col(r, 1)\n.x=u\n.y=u * i / 2\n$$\n",
        "data.txt",
    )
    .expect("Should load");

    let project = Project {
        templates: Default::default(),
        data,
    };
    let results = project.render_all_plots();
    assert_eq!(results.len(), 1);
    let plot = results[0].1.as_ref().expect("Should evaluate");
    assert_close(&plot.curves[0].x, &[2.0, 4.0]);
    assert_close(&plot.curves[0].y, &[1.0, 4.0]);
}

#[test]
fn test_plot_errors_are_isolated() {
    let mut project = Project::new();
    project
        .load_data(
            "$$broken\ncurve=c\n.x=missing\n.y=1\n$$\n$$fine\ncurve=c\n.x=linspace(0, 1, 3)\n.y=2\n$$\n",
            "plots.txt",
        )
        .expect("Should load");

    let results = project.render_all_plots();
    let (name, broken) = &results[0];
    assert_eq!(name, "broken");
    let err = broken.as_ref().expect_err("Should fail");
    assert_eq!(err.curve, "c");
    assert_eq!(err.expression, "missing");

    let fine = results[1].1.as_ref().expect("Should evaluate");
    assert_close(&fine.curves[0].x, &[0.0, 0.5, 1.0]);
    assert_close(&fine.curves[0].y, &[2.0, 2.0, 2.0]);
}

#[test]
fn test_project_load_from_files() {
    let dir = std::env::temp_dir().join(format!("labgen-project-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    std::fs::write(dir.join("ok.txt"), "##hello\n++x\nhello %%x\n##\n").expect("write");
    std::fs::write(dir.join("bad.txt"), "##broken\n++x\n").expect("write");
    std::fs::write(dir.join("data.txt"), "^^t\ncols=a\n&\n1\n").expect("write");
    std::fs::write(
        dir.join("labgen.toml"),
        "templates = [\"ok.txt\", \"bad.txt\"]\ndata = [\"data.txt\"]\n",
    )
    .expect("write");

    let config = ProjectConfig::from_file(&dir.join("labgen.toml")).expect("Should parse");
    let (project, diagnostics) = Project::load(&config);
    let _ = std::fs::remove_dir_all(&dir);

    assert_eq!(diagnostics.len(), 1);
    assert!(matches!(diagnostics[0], ProjectError::Template(_)));
    assert!(project.templates.contains("hello"));
    assert!(!project.templates.contains("broken"));
    assert!(project.data.table("t").is_some());

    let backend = RecordingBackend::new();
    let sources = [
        Source::new("one.tex", "#hello||world||"),
        Source::new("two.tex", "#broken||x||"),
        Source::new("three.tex", "@table_label||t||"),
    ];
    let reports = project.render_all(&sources, &RenderConfig::default(), &backend);
    let labels: Vec<_> = reports.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["one.tex", "two.tex", "three.tex"]);
    assert_eq!(reports[0].result.as_ref().expect("renders"), "hello world");
    assert!(reports[1].result.is_err());
    assert_eq!(reports[2].result.as_ref().expect("renders"), "label_t");
}

#[test]
fn test_missing_file_is_a_diagnostic() {
    let mut config = ProjectConfig::new();
    config.data = vec![PathBuf::from("/definitely/not/here.txt")];
    let (project, diagnostics) = Project::load(&config);
    assert_eq!(diagnostics.len(), 1);
    assert!(project.data.is_empty());
}
