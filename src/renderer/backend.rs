//! Figure backends: turn queued figure requests into artifacts

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

use crate::command::FigureRequest;
use crate::palette::Palette;

use super::{render_plot, FigureConfig};

#[derive(Debug, Error)]
pub enum FigureError {
    #[error("cannot write figure {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Consumer of evaluated plots
pub trait FigureBackend: Send + Sync {
    /// Where the artifact for `request` ends up
    fn artifact_path(&self, request: &FigureRequest) -> PathBuf;

    /// Produce the artifact and return its path
    fn render(&self, request: &FigureRequest) -> Result<PathBuf, FigureError>;

    /// Produce the artifacts of one source, in order
    fn render_batch(&self, requests: &[FigureRequest]) -> Result<Vec<PathBuf>, FigureError> {
        requests.iter().map(|request| self.render(request)).collect()
    }
}

/// Writes SVG files below an output root
#[derive(Debug, Clone)]
pub struct SvgFigureBackend {
    root: PathBuf,
    config: FigureConfig,
    palette: Palette,
}

impl SvgFigureBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: FigureConfig::default(),
            palette: Palette::default(),
        }
    }

    pub fn with_config(mut self, config: FigureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FigureBackend for SvgFigureBackend {
    fn artifact_path(&self, request: &FigureRequest) -> PathBuf {
        self.root.join(&request.path)
    }

    fn render(&self, request: &FigureRequest) -> Result<PathBuf, FigureError> {
        let (staging, path) = self.stage(request)?;
        self.commit(request, staging, path)
    }

    /// Every figure is written to a staging file first; the final files
    /// appear only once all of them were written.
    fn render_batch(&self, requests: &[FigureRequest]) -> Result<Vec<PathBuf>, FigureError> {
        let mut staged = Vec::with_capacity(requests.len());
        for request in requests {
            match self.stage(request) {
                Ok(paths) => staged.push(paths),
                Err(e) => {
                    for (staging, _) in &staged {
                        let _ = std::fs::remove_file(staging);
                    }
                    return Err(e);
                }
            }
        }

        staged
            .into_iter()
            .zip(requests)
            .map(|((staging, path), request)| self.commit(request, staging, path))
            .collect()
    }
}

impl SvgFigureBackend {
    /// Write the SVG next to its final path; returns (staging, final)
    fn stage(&self, request: &FigureRequest) -> Result<(PathBuf, PathBuf), FigureError> {
        let path = self.artifact_path(request);
        let staging = staging_path(&path);
        let io_error = |source| FigureError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let svg = render_plot(&request.plot, &self.config, &self.palette);
        std::fs::write(&staging, svg).map_err(io_error)?;
        Ok((staging, path))
    }

    fn commit(
        &self,
        request: &FigureRequest,
        staging: PathBuf,
        path: PathBuf,
    ) -> Result<PathBuf, FigureError> {
        std::fs::rename(&staging, &path).map_err(|source| FigureError::Io {
            path: path.clone(),
            source,
        })?;
        info!(plot = %request.plot.name, path = %path.display(), "wrote figure");
        Ok(path)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Keeps requests in memory instead of writing files
#[derive(Debug, Default)]
pub struct RecordingBackend {
    requests: Mutex<Vec<FigureRequest>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests rendered so far
    pub fn requests(&self) -> Vec<FigureRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl FigureBackend for RecordingBackend {
    fn artifact_path(&self, request: &FigureRequest) -> PathBuf {
        request.path.clone()
    }

    fn render(&self, request: &FigureRequest) -> Result<PathBuf, FigureError> {
        match self.requests.lock() {
            Ok(mut requests) => requests.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }
        Ok(self.artifact_path(request))
    }
}
