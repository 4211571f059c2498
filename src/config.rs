//! Project configuration loaded from `labgen.toml`
//!
//! ```toml
//! templates = ["templates.txt"]
//! data = ["measurements.txt"]
//! sources = ["report.tex"]
//! output_dir = "out"
//! figure_dir = "figures"
//! palette = "palette.toml"
//!
//! [render]
//! date_format = "%Y-%m-%d"
//! table_precision = 2
//!
//! [figure]
//! width = 800
//! height = 600
//! ```
//!
//! Relative paths are resolved against the directory holding the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::renderer::FigureConfig;
use crate::RenderConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// `[render]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    pub date_format: Option<String>,
    pub table_precision: Option<usize>,
}

/// `[figure]` table
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FigureSection {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub padding: Option<f64>,
    pub tick_count: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub templates: Vec<PathBuf>,
    pub data: Vec<PathBuf>,
    pub sources: Vec<PathBuf>,
    /// Where rendered sources and figures go; stdout when unset
    pub output_dir: Option<PathBuf>,
    /// Figure directory as referenced from rendered text
    pub figure_dir: Option<PathBuf>,
    /// Palette TOML file
    pub palette: Option<PathBuf>,
    pub render: RenderSection,
    pub figure: FigureSection,
}

impl ProjectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file, resolving relative paths against its directory
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        Ok(match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => config.relative_to(base),
            _ => config,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve relative file paths against `base`.
    ///
    /// `figure_dir` is left alone: it is written into the rendered text and
    /// resolved against `output_dir` by the figure backend.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let join = |p: &PathBuf| if p.is_absolute() { p.clone() } else { base.join(p) };
        self.templates = self.templates.iter().map(join).collect();
        self.data = self.data.iter().map(join).collect();
        self.sources = self.sources.iter().map(join).collect();
        self.output_dir = self.output_dir.as_ref().map(join);
        self.palette = self.palette.as_ref().map(join);
        self
    }

    /// Renderer configuration with this file's overrides applied
    pub fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::new();
        if let Some(format) = &self.render.date_format {
            config = config.with_date_format(format.clone());
        }
        if let Some(precision) = self.render.table_precision {
            config = config.with_table_precision(precision);
        }
        if let Some(dir) = &self.figure_dir {
            config = config.with_figure_dir(dir.clone());
        }
        config
    }

    /// Figure configuration with this file's overrides applied
    pub fn figure_config(&self) -> FigureConfig {
        let mut config = FigureConfig::new();
        if let (Some(w), Some(h)) = (self.figure.width, self.figure.height) {
            config = config.with_size(w, h);
        } else if let Some(w) = self.figure.width {
            config.width = w;
        } else if let Some(h) = self.figure.height {
            config.height = h;
        }
        if let Some(padding) = self.figure.padding {
            config = config.with_padding(padding);
        }
        if let Some(count) = self.figure.tick_count {
            config = config.with_tick_count(count);
        }
        config
    }
}
