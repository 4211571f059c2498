//! Batch loading and rendering
//!
//! Template and data files are parsed once into shared registries. Each
//! source then renders on its own thread against those registries; a failure
//! in one source or one file never affects the others.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::ProjectConfig;
use crate::data::{DataError, DataRegistry};
use crate::expand::{RenderError, Renderer};
use crate::expr::{evaluate_plot, EvaluatedPlot, ExpressionError};
use crate::renderer::{FigureBackend, FigureError};
use crate::template::{TemplateError, TemplateRegistry};
use crate::RenderConfig;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Figure(#[from] FigureError),
}

/// A source file to render: label for diagnostics plus its text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub label: String,
    pub text: String,
}

impl Source {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn read(path: &Path) -> Result<Self, ProjectError> {
        let text = read_file(path)?;
        Ok(Self::new(path.display().to_string(), text))
    }
}

/// Outcome of rendering one source
#[derive(Debug)]
pub struct SourceReport {
    pub label: String,
    /// Rendered text, or the error that aborted the render
    pub result: Result<String, ProjectError>,
}

/// Template and data registries shared by every render
#[derive(Debug, Default)]
pub struct Project {
    pub templates: TemplateRegistry,
    pub data: DataRegistry,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every template and data file.
    ///
    /// A file that fails to read or parse registers nothing; its error is
    /// returned and the remaining files still load.
    pub fn load(config: &ProjectConfig) -> (Self, Vec<ProjectError>) {
        let mut project = Self::new();
        let mut diagnostics = Vec::new();

        for path in &config.templates {
            let result = read_file(path).and_then(|text| {
                project
                    .load_templates(&text, &path.display().to_string())
                    .map_err(ProjectError::from)
            });
            if let Err(e) = result {
                warn!(path = %path.display(), error = %e, "skipping template file");
                diagnostics.push(e);
            }
        }

        for path in &config.data {
            let result = read_file(path).and_then(|text| {
                project
                    .load_data(&text, &path.display().to_string())
                    .map_err(ProjectError::from)
            });
            if let Err(e) = result {
                warn!(path = %path.display(), error = %e, "skipping data file");
                diagnostics.push(e);
            }
        }

        (project, diagnostics)
    }

    pub fn load_templates(&mut self, text: &str, origin: &str) -> Result<usize, TemplateError> {
        let count = self.templates.load_str(text, origin)?;
        info!(file = origin, templates = count, "loaded templates");
        Ok(count)
    }

    pub fn load_data(&mut self, text: &str, origin: &str) -> Result<usize, DataError> {
        let count = self.data.load_str(text, origin)?;
        info!(file = origin, definitions = count, "loaded data");
        Ok(count)
    }

    pub fn renderer(&self, config: RenderConfig) -> Renderer<'_> {
        Renderer::new(&self.templates, &self.data).with_config(config)
    }

    /// Render one source and hand its figures to `backend` as one batch.
    ///
    /// Nothing reaches the backend when the render fails.
    pub fn render_source(
        &self,
        renderer: &Renderer<'_>,
        source: &Source,
        backend: &dyn FigureBackend,
    ) -> Result<String, ProjectError> {
        let output = renderer.render(&source.text, &source.label)?;
        backend.render_batch(&output.figures)?;
        info!(source = %source.label, figures = output.figures.len(), "rendered source");
        Ok(output.text)
    }

    /// Render every source on its own thread; reports keep input order
    pub fn render_all(
        &self,
        sources: &[Source],
        config: &RenderConfig,
        backend: &dyn FigureBackend,
    ) -> Vec<SourceReport> {
        let renderer = self.renderer(config.clone());
        let renderer = &renderer;

        std::thread::scope(|scope| {
            let handles: Vec<_> = sources
                .iter()
                .map(|source| {
                    scope.spawn(move || SourceReport {
                        label: source.label.clone(),
                        result: self.render_source(renderer, source, backend),
                    })
                })
                .collect();

            handles
                .into_iter()
                .zip(sources)
                .map(|(handle, source)| match handle.join() {
                    Ok(report) => report,
                    Err(_) => SourceReport {
                        label: source.label.clone(),
                        result: Err(ProjectError::Io {
                            path: PathBuf::from(&source.label),
                            source: std::io::Error::other("render thread panicked"),
                        }),
                    },
                })
                .collect()
        })
    }

    /// Evaluate every plot independently
    pub fn render_all_plots(&self) -> Vec<(String, Result<EvaluatedPlot, ExpressionError>)> {
        self.data
            .plots()
            .map(|plot| (plot.name.clone(), evaluate_plot(plot, &self.data)))
            .collect()
    }
}

fn read_file(path: &Path) -> Result<String, ProjectError> {
    std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RecordingBackend;

    fn project() -> Project {
        let mut project = Project::new();
        project
            .load_templates("##hi\n++n\nhi %%n\n##\n", "t.txt")
            .expect("Should load");
        project
            .load_data(
                "^^t\ncols=a\n&\n1\n2\n\n$$good\ncurve=c\n.x=col(t, 0)\n.y=col(t, 0)\n$$\n$$bad\ncurve=c\n.x=nope\n.y=1\n$$\n",
                "d.txt",
            )
            .expect("Should load");
        project
    }

    #[test]
    fn test_render_all_isolates_failures() {
        let project = project();
        let backend = RecordingBackend::new();
        let sources = vec![
            Source::new("a.tex", "#hi||A||"),
            Source::new("b.tex", "@fig||bad||"),
            Source::new("c.tex", "#hi||C|| @fig||good||"),
        ];
        let reports = project.render_all(&sources, &RenderConfig::default(), &backend);

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].result.as_ref().expect("a renders"), "hi A");
        assert!(matches!(reports[1].result, Err(ProjectError::Render(_))));
        assert_eq!(
            reports[2].result.as_ref().expect("c renders"),
            "hi C figures/figure_good.svg"
        );

        let recorded = backend.requests();
        assert_eq!(recorded.len(), 1, "failed source commits no figures");
        assert_eq!(recorded[0].plot.name, "good");
    }

    #[test]
    fn test_render_all_plots() {
        let project = project();
        let results = project.render_all_plots();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "bad");
        assert!(results[0].1.is_err());
        assert_eq!(results[1].0, "good");
        assert!(results[1].1.is_ok());
    }

    #[test]
    fn test_load_skips_missing_files() {
        let mut config = ProjectConfig::new();
        config.templates = vec![PathBuf::from("/nonexistent/labgen/templates.txt")];
        let (project, diagnostics) = Project::load(&config);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0], ProjectError::Io { .. }));
        assert!(project.templates.is_empty());
    }
}
