//! SVG generation for evaluated plots

use crate::data::AxisRange;
use crate::expr::{EvaluatedCurve, EvaluatedPlot};
use crate::palette::Palette;

use super::FigureConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: FigureConfig,
    styles: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: FigureConfig) -> Self {
        Self {
            config,
            styles: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    /// Add CSS rules for the figure chrome from a palette
    pub fn add_palette(&mut self, palette: &Palette) {
        let prefix = self.prefix();
        self.styles.push(format!(
            ".{prefix}axis {{ stroke: {}; fill: none; }}",
            palette.resolve_or_default("axis")
        ));
        self.styles.push(format!(
            ".{prefix}grid {{ stroke: {}; }}",
            palette.resolve_or_default("grid")
        ));
        self.styles.push(format!(
            ".{prefix}label {{ fill: {}; font-family: sans-serif; font-size: 12px; }}",
            palette.resolve_or_default("text")
        ));
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn class(&self, name: &str) -> String {
        format!("{}{}", self.prefix(), name)
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64, class: &str, styles: &str) {
        self.elements.push(format!(
            r#"{}<rect class="{}" x="{}" y="{}" width="{}" height="{}"{}/>"#,
            self.indent_str(),
            self.class(class),
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            styles
        ));
    }

    /// Add a line element
    pub fn add_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, class: &str) {
        self.elements.push(format!(
            r#"{}<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
            self.indent_str(),
            self.class(class),
            fmt_num(x1),
            fmt_num(y1),
            fmt_num(x2),
            fmt_num(y2)
        ));
    }

    /// Add a circle element
    pub fn add_circle(&mut self, cx: f64, cy: f64, r: f64, class: &str, styles: &str) {
        self.elements.push(format!(
            r#"{}<circle class="{}" cx="{}" cy="{}" r="{}"{}/>"#,
            self.indent_str(),
            self.class(class),
            fmt_num(cx),
            fmt_num(cy),
            fmt_num(r),
            styles
        ));
    }

    /// Add an unfilled path through `points`
    pub fn add_path(&mut self, points: &[(f64, f64)], class: &str, styles: &str) {
        self.elements.push(format!(
            r#"{}<path class="{}" d="{}" fill="none"{}/>"#,
            self.indent_str(),
            self.class(class),
            path_to_d(points),
            styles
        ));
    }

    /// Add a text element, optionally rotated about its anchor point
    pub fn add_text(&mut self, text: &str, x: f64, y: f64, anchor: TextAnchor, rotate: Option<f64>) {
        let anchor_str = match anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        let transform = rotate
            .map(|deg| {
                format!(
                    r#" transform="rotate({} {} {})""#,
                    fmt_num(deg),
                    fmt_num(x),
                    fmt_num(y)
                )
            })
            .unwrap_or_default();

        self.elements.push(format!(
            r#"{}<text class="{}" x="{}" y="{}" text-anchor="{}"{}>{}</text>"#,
            self.indent_str(),
            self.class("label"),
            fmt_num(x),
            fmt_num(y),
            anchor_str,
            transform,
            escape_xml(text)
        ));
    }

    /// Add a group element with optional ID and class
    pub fn start_group(&mut self, id: Option<&str>, class: &str) {
        let id_attr = id
            .map(|i| format!(r#" id="{}""#, escape_xml(i)))
            .unwrap_or_default();
        self.elements.push(format!(
            r#"{}<g{} class="{}">"#,
            self.indent_str(),
            id_attr,
            self.class(class)
        ));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string
    pub fn build(self) -> String {
        let nl = self.newline();
        let mut svg = String::new();

        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt_num(self.config.width),
            h = fmt_num(self.config.height)
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Data bounds of one axis
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisBounds {
    min: f64,
    max: f64,
}

impl AxisBounds {
    fn resolve<'a>(range: AxisRange, values: impl Iterator<Item = &'a f64>) -> Self {
        let (min, max) = match range {
            AxisRange::Fixed(lo, hi) if lo < hi => (lo, hi),
            AxisRange::Fixed(lo, hi) => (hi, lo),
            AxisRange::Auto => values
                .filter(|v| v.is_finite())
                .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                    Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                    None => Some((v, v)),
                })
                .unwrap_or((0.0, 1.0)),
        };
        if max - min > f64::EPSILON {
            Self { min, max }
        } else {
            Self {
                min: min - 0.5,
                max: max + 0.5,
            }
        }
    }

    /// Position of `v` as a fraction of the axis
    fn fraction(&self, v: f64) -> f64 {
        (v - self.min) / (self.max - self.min)
    }

    fn ticks(&self, count: usize) -> Vec<f64> {
        let count = count.max(1);
        let step = (self.max - self.min) / count as f64;
        (0..=count).map(|i| self.min + step * i as f64).collect()
    }
}

/// Plot area in figure coordinates
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    x: AxisBounds,
    y: AxisBounds,
}

impl Frame {
    fn new(plot: &EvaluatedPlot, config: &FigureConfig) -> Self {
        let pad = config.padding;
        Self {
            left: pad,
            top: pad / 2.0,
            width: (config.width - pad * 1.5).max(1.0),
            height: (config.height - pad * 1.5).max(1.0),
            x: AxisBounds::resolve(plot.xrange, plot.curves.iter().flat_map(|c| c.x.iter())),
            y: AxisBounds::resolve(plot.yrange, plot.curves.iter().flat_map(|c| c.y.iter())),
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.left + self.x.fraction(x) * self.width,
            self.bottom() - self.y.fraction(y) * self.height,
        )
    }
}

/// Render an evaluated plot to an SVG string
pub fn render_plot(plot: &EvaluatedPlot, config: &FigureConfig, palette: &Palette) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    builder.add_palette(palette);

    let frame = Frame::new(plot, config);
    builder.add_rect(
        0.0,
        0.0,
        config.width,
        config.height,
        "background",
        &format!(r#" fill="{}""#, palette.resolve_or_default("background")),
    );

    render_axes(&mut builder, &frame, plot, config);

    for curve in &plot.curves {
        render_curve(&mut builder, &frame, curve, config, palette);
    }

    render_legend(&mut builder, &frame, &plot.curves, palette);

    builder.build()
}

fn render_axes(builder: &mut SvgBuilder, frame: &Frame, plot: &EvaluatedPlot, config: &FigureConfig) {
    builder.start_group(None, "axes");

    for x in frame.x.ticks(config.tick_count) {
        let (px, _) = frame.map(x, frame.y.min);
        builder.add_line(px, frame.top, px, frame.bottom(), "grid");
        builder.add_text(&fmt_tick(x), px, frame.bottom() + 16.0, TextAnchor::Middle, None);
    }
    for y in frame.y.ticks(config.tick_count) {
        let (_, py) = frame.map(frame.x.min, y);
        builder.add_line(frame.left, py, frame.left + frame.width, py, "grid");
        builder.add_text(&fmt_tick(y), frame.left - 6.0, py + 4.0, TextAnchor::End, None);
    }

    builder.add_rect(frame.left, frame.top, frame.width, frame.height, "axis", "");

    builder.add_text(
        &plot.axes.0,
        frame.left + frame.width / 2.0,
        frame.bottom() + 36.0,
        TextAnchor::Middle,
        None,
    );
    let y_label_x = frame.left - 44.0;
    let y_label_y = frame.top + frame.height / 2.0;
    builder.add_text(&plot.axes.1, y_label_x, y_label_y, TextAnchor::Middle, Some(-90.0));
    builder.add_text(
        &plot.title,
        frame.left + frame.width / 2.0,
        frame.top - 10.0,
        TextAnchor::Middle,
        None,
    );

    builder.end_group();
}

fn render_curve(
    builder: &mut SvgBuilder,
    frame: &Frame,
    curve: &EvaluatedCurve,
    config: &FigureConfig,
    palette: &Palette,
) {
    let color = palette.resolve_or_default(&curve.color);
    builder.start_group(Some(&curve.name), "curve");

    let points: Vec<(f64, f64)> = curve
        .x
        .iter()
        .zip(&curve.y)
        .map(|(&x, &y)| (x, y))
        .collect();

    if curve.style.draws_lines() {
        // NaN breaks the line
        for segment in points.split(|(x, y)| !x.is_finite() || !y.is_finite()) {
            if segment.len() < 2 {
                continue;
            }
            let mapped: Vec<(f64, f64)> = segment.iter().map(|&(x, y)| frame.map(x, y)).collect();
            builder.add_path(
                &mapped,
                "line",
                &format!(
                    r#" stroke="{}" stroke-width="{}""#,
                    color,
                    fmt_num(config.stroke_width)
                ),
            );
        }
    }

    if curve.style.draws_points() {
        for &(x, y) in points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
            let (px, py) = frame.map(x, y);
            builder.add_circle(
                px,
                py,
                config.point_radius,
                "point",
                &format!(r#" fill="{}""#, color),
            );
        }
    }

    builder.end_group();
}

fn render_legend(builder: &mut SvgBuilder, frame: &Frame, curves: &[EvaluatedCurve], palette: &Palette) {
    if curves.is_empty() {
        return;
    }
    builder.start_group(None, "legend");
    let right = frame.left + frame.width - 8.0;
    for (i, curve) in curves.iter().enumerate() {
        let y = frame.top + 16.0 + 16.0 * i as f64;
        let color = palette.resolve_or_default(&curve.color);
        builder.add_path(
            &[(right - 20.0, y - 4.0), (right, y - 4.0)],
            "line",
            &format!(r#" stroke="{}" stroke-width="2""#, color),
        );
        builder.add_text(&curve.name, right - 26.0, y, TextAnchor::End, None);
    }
    builder.end_group();
}

/// Convert a list of points to an SVG path d attribute
fn path_to_d(points: &[(f64, f64)]) -> String {
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };

    let mut d = format!("M{} {}", fmt_num(first.0), fmt_num(first.1));
    for (x, y) in rest {
        d.push_str(&format!(" L{} {}", fmt_num(*x), fmt_num(*y)));
    }
    d
}

/// Coordinates rounded to two decimals
fn fmt_num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn fmt_tick(v: f64) -> String {
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
