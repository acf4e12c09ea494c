//! Colour palettes for charts
//!
//! A palette maps the chart colour roles (`bar`, `positive`, `negative`) to
//! concrete colour values. Palettes are loaded from TOML and fall back to the
//! built-in defaults for any role they leave out.

use std::collections::HashMap;
use std::path::Path;

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

/// Colour role of every bar in bar charts and histograms
pub const BAR: &str = "bar";
/// Colour role of rising candles
pub const POSITIVE: &str = "positive";
/// Colour role of falling candles
pub const NEGATIVE: &str = "negative";

const DEFAULT_COLORS: [(&str, &str); 3] = [(BAR, "blue"), (POSITIVE, "green"), (NEGATIVE, "red")];

/// A palette mapping colour roles to concrete values
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Optional name for the palette
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Colour mappings: role -> colour
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
    description: Option<String>,
}

impl Palette {
    /// Load palette from TOML file
    pub fn from_file(path: &Path) -> Result<Self, PaletteError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load palette from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, PaletteError> {
        let parsed: TomlPalette = toml::from_str(content)?;

        Ok(Palette {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            colors: parsed.colors,
        })
    }

    /// Resolve a colour role defined in this palette
    pub fn resolve(&self, role: &str) -> Option<&str> {
        self.colors.get(role).map(|s| s.as_str())
    }

    /// Resolve a colour role, falling back to the default palette
    ///
    /// Unknown roles resolve to the bar colour.
    pub fn resolve_or_default(&self, role: &str) -> String {
        if let Some(color) = self.resolve(role) {
            return color.to_string();
        }
        DEFAULT_COLORS
            .iter()
            .find(|(default_role, _)| *default_role == role)
            .or_else(|| DEFAULT_COLORS.first())
            .map(|(_, color)| color.to_string())
            .unwrap_or_default()
    }

    pub fn bar(&self) -> String {
        self.resolve_or_default(BAR)
    }

    pub fn positive(&self) -> String {
        self.resolve_or_default(POSITIVE)
    }

    pub fn negative(&self) -> String {
        self.resolve_or_default(NEGATIVE)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            colors: DEFAULT_COLORS
                .iter()
                .map(|(role, color)| (role.to_string(), color.to_string()))
                .collect(),
        }
    }
}
