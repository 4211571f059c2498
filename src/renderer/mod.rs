//! Figure rendering for evaluated plots
//!
//! Commands only queue figures. A [`FigureBackend`] receives them after the
//! source that requested them has rendered successfully.

pub mod backend;
pub mod config;
pub mod svg;

use std::path::{Path, PathBuf};

pub use backend::{FigureBackend, FigureError, RecordingBackend, SvgFigureBackend};
pub use config::FigureConfig;
pub use svg::render_plot;

/// Path of a figure as referenced from rendered text
pub fn figure_path(figure_dir: &Path, label: &str) -> PathBuf {
    figure_dir.join(format!("{}.svg", label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_path() {
        assert_eq!(
            figure_path(Path::new("figures"), "figure_p1"),
            PathBuf::from("figures/figure_p1.svg")
        );
    }
}
