//! LabGen - a template-driven generator for LaTeX lab reports
//!
//! Source files mix literal text with `#template||args||` invocations,
//! `@command||args||` calls and `%%param` references. Templates come from
//! template files, tables and plots from data files. Rendering expands
//! everything depth-first into the final report text.
//!
//! # Example
//!
//! ```rust
//! use labgen::{render, DataRegistry, TemplateRegistry};
//!
//! let mut templates = TemplateRegistry::new();
//! templates
//!     .load_str("##greet\n++who\nHello, %%who!\n##\n", "templates.txt")
//!     .unwrap();
//!
//! let text = render("#greet||who=World||", &templates, &DataRegistry::new()).unwrap();
//! assert_eq!(text, "Hello, World!");
//! ```

pub mod command;
pub mod config;
pub mod data;
pub mod error;
pub mod expand;
pub mod expr;
pub mod palette;
pub mod parser;
pub mod project;
pub mod renderer;
pub mod template;

use std::path::PathBuf;

use chrono::NaiveDateTime;

pub use command::{CommandError, CommandHandler, CommandRegistry};
pub use config::{ConfigError, ProjectConfig};
pub use data::{DataError, DataRegistry};
pub use error::{Location, ScanError};
pub use expand::{RenderError, RenderOutput, Renderer};
pub use expr::ExpressionError;
pub use palette::Palette;
pub use project::{Project, ProjectError, Source, SourceReport};
pub use renderer::{FigureBackend, FigureConfig, SvgFigureBackend};
pub use template::{TemplateError, TemplateRegistry};

/// asctime-style timestamp, e.g. `Tue Mar  5 14:07:09 2024`
pub const DEFAULT_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Configuration for rendering source files
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// `chrono` format string used by `@date`
    pub date_format: String,
    /// Default number of decimals in table cells
    pub table_precision: usize,
    /// Directory written into `@fig` output
    pub figure_dir: PathBuf,
    /// Fixed "now" for reproducible output; local time when unset
    pub timestamp: Option<NaiveDateTime>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            table_precision: 3,
            figure_dir: PathBuf::from("figures"),
            timestamp: None,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn with_table_precision(mut self, precision: usize) -> Self {
        self.table_precision = precision;
        self
    }

    pub fn with_figure_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.figure_dir = dir.into();
        self
    }

    /// Pin the timestamp seen by `@date`
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Render source text with default configuration and built-in commands
///
/// Figures requested by `@fig` are dropped; use [`render_with_config`] or a
/// [`Project`] to hand them to a backend.
pub fn render(
    source: &str,
    templates: &TemplateRegistry,
    data: &DataRegistry,
) -> Result<String, RenderError> {
    Ok(render_with_config(source, templates, data, RenderConfig::default())?.text)
}

/// Render source text with a custom configuration
///
/// # Example
///
/// ```rust
/// use labgen::{render_with_config, DataRegistry, RenderConfig, TemplateRegistry};
///
/// let mut data = DataRegistry::new();
/// data.load_str("^^t\ncols=a\n&\n1\n2\n", "data.txt").unwrap();
///
/// let config = RenderConfig::new().with_figure_dir("img");
/// let output = render_with_config(
///     "@table_label||t||",
///     &TemplateRegistry::new(),
///     &data,
///     config,
/// )
/// .unwrap();
/// assert_eq!(output.text, "label_t");
/// ```
pub fn render_with_config(
    source: &str,
    templates: &TemplateRegistry,
    data: &DataRegistry,
    config: RenderConfig,
) -> Result<RenderOutput, RenderError> {
    Renderer::new(templates, data)
        .with_config(config)
        .render(source, "<input>")
}
