//! Color palette for figure rendering
//!
//! Curve colors in data files are plain names (`.color=red`). A palette maps
//! those names to concrete SVG colors; names it does not know are passed to
//! the SVG unchanged, so `#ff8800` works as well.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing palettes
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to read palette file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse palette TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A palette mapping color names to concrete values
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Optional name for the palette
    pub name: Option<String>,
    /// Color name -> SVG color
    pub colors: HashMap<String, String>,
}

/// TOML structure for deserializing palettes
#[derive(Deserialize)]
struct TomlPalette {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

/// Default palette - muted tones readable in print
const DEFAULT_PALETTE: &str = r##"
[colors]
black = "#1a1a1a"
gray = "#808080"
red = "#d62728"
green = "#2ca02c"
blue = "#1f77b4"
orange = "#ff7f0e"
purple = "#9467bd"
brown = "#8c564b"
pink = "#e377c2"
cyan = "#17becf"
yellow = "#bcbd22"

# Figure chrome
axis = "#333333"
grid = "#e0e0e0"
text = "#1a1a1a"
background = "#ffffff"
"##;

impl Palette {
    /// Load palette from TOML file
    pub fn from_file(path: &Path) -> Result<Self, PaletteError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load palette from TOML string
    pub fn from_toml(content: &str) -> Result<Self, PaletteError> {
        let parsed: TomlPalette = toml::from_str(content)?;

        Ok(Palette {
            name: parsed.metadata.and_then(|m| m.name),
            colors: parsed.colors,
        })
    }

    /// Color for a name defined in this palette
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.colors.get(name).map(|s| s.as_str())
    }

    /// Resolve a color name with fallback to the default palette.
    ///
    /// Unknown names are returned unchanged.
    pub fn resolve_or_default(&self, name: &str) -> String {
        if let Some(color) = self.resolve(name) {
            return color.to_string();
        }

        builtin()
            .resolve(name)
            .unwrap_or(name)
            .to_string()
    }
}

/// The built-in palette, parsed once
fn builtin() -> &'static Palette {
    static BUILTIN: OnceLock<Palette> = OnceLock::new();
    BUILTIN.get_or_init(|| match Palette::from_toml(DEFAULT_PALETTE) {
        Ok(palette) => palette,
        Err(_) => Palette {
            name: None,
            colors: HashMap::new(),
        },
    })
}

impl Default for Palette {
    fn default() -> Self {
        builtin().clone()
    }
}
