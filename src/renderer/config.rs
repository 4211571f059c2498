//! Configuration for SVG figure rendering

/// Configuration options for SVG figures
#[derive(Debug, Clone, PartialEq)]
pub struct FigureConfig {
    /// Total figure width
    pub width: f64,

    /// Total figure height
    pub height: f64,

    /// Space between the plot area and the figure edge, for ticks and labels
    pub padding: f64,

    /// Number of intervals between axis ticks
    pub tick_count: usize,

    /// Radius of point markers
    pub point_radius: f64,

    /// Stroke width of curve lines
    pub stroke_width: f64,

    /// Whether to include XML declaration
    pub standalone: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Prefix for CSS class names (e.g., "lg-" for "lg-curve")
    pub class_prefix: Option<String>,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
            padding: 60.0,
            tick_count: 5,
            point_radius: 3.0,
            stroke_width: 1.5,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("lg-".to_string()),
        }
    }
}

impl FigureConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the figure size
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the padding around the plot area
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Set the number of tick intervals per axis
    pub fn with_tick_count(mut self, count: usize) -> Self {
        self.tick_count = count.max(1);
        self
    }

    /// Set whether output is standalone
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FigureConfig::default();
        assert_eq!(config.width, 640.0);
        assert_eq!(config.padding, 60.0);
        assert!(config.standalone);
        assert_eq!(config.class_prefix, Some("lg-".to_string()));
    }

    #[test]
    fn test_builder_pattern() {
        let config = FigureConfig::new()
            .with_size(300.0, 200.0)
            .with_padding(10.0)
            .with_tick_count(0)
            .with_pretty_print(false)
            .without_class_prefix();

        assert_eq!((config.width, config.height), (300.0, 200.0));
        assert_eq!(config.padding, 10.0);
        assert_eq!(config.tick_count, 1);
        assert!(!config.pretty_print);
        assert_eq!(config.class_prefix, None);
    }
}
