//! TOML chart descriptions
//!
//! A description holds raw data values, never pixels. It names one chart
//! kind through exactly one of `[[groups]]`, `[[bins]]` or `[[candles]]`,
//! and may carry a list of `[[edits]]` to replay once the chart is built.
//!
//! ```toml
//! title = "Rainfall"
//! width = 20
//!
//! [[groups]]
//! values = [12.5, 40, 31]
//! names = ["jan", "feb", "mar"]
//!
//! [[edits]]
//! op = "height"
//! name = "feb"
//! value = 35
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::DescriptionError;
use crate::layout::{FrameParams, LayoutConfig};

/// One group of bars
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDescription {
    pub values: Vec<f64>,
    #[serde(default)]
    pub names: Vec<String>,
}

/// One histogram bin `[low, high)` and the number of samples it holds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinDescription {
    pub low: f64,
    pub high: f64,
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandleDescription {
    pub name: String,
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
}

/// Which of the three chart kinds a description builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Histogram,
    Candlestick,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Histogram => "histogram",
            ChartKind::Candlestick => "candlestick",
        }
    }
}

/// Addresses one bar or candle, by name or by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementRef<'a> {
    pub name: Option<&'a str>,
    pub group: Option<usize>,
    pub index: Option<usize>,
}

/// One edit to replay on a built chart.
///
/// Levels (`height`, `opening`, `minimum`, `maximum`, `axis_height`) are raw
/// data values. Geometry (`width`, `spacing`, `inner_spacing`, `origin`,
/// `drag`) is in pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    Width {
        value: f64,
    },
    Spacing {
        value: f64,
    },
    InnerSpacing {
        value: f64,
    },
    Origin {
        x: f64,
        y: f64,
    },
    AxisHeight {
        value: f64,
    },
    /// Bar value, or signed `close - open` of a candle
    Height {
        name: Option<String>,
        group: Option<usize>,
        index: Option<usize>,
        value: f64,
    },
    Opening {
        name: Option<String>,
        index: Option<usize>,
        value: f64,
    },
    Minimum {
        name: Option<String>,
        index: Option<usize>,
        value: f64,
    },
    Maximum {
        name: Option<String>,
        index: Option<usize>,
        value: f64,
    },
    Color {
        name: Option<String>,
        group: Option<usize>,
        index: Option<usize>,
        color: String,
    },
    /// Rename a bar or candle
    Name {
        name: Option<String>,
        group: Option<usize>,
        index: Option<usize>,
        new_name: String,
    },
    ToggleName {
        name: Option<String>,
        index: Option<usize>,
    },
    PositiveColor {
        color: String,
    },
    NegativeColor {
        color: String,
    },
    Title {
        value: String,
    },
    /// Pointer drag in screen coordinates, y growing downward
    Drag {
        from: [f64; 2],
        to: [f64; 2],
    },
}

impl EditCommand {
    /// Name of the `op` tag
    pub fn op(&self) -> &'static str {
        match self {
            EditCommand::Width { .. } => "width",
            EditCommand::Spacing { .. } => "spacing",
            EditCommand::InnerSpacing { .. } => "inner_spacing",
            EditCommand::Origin { .. } => "origin",
            EditCommand::AxisHeight { .. } => "axis_height",
            EditCommand::Height { .. } => "height",
            EditCommand::Opening { .. } => "opening",
            EditCommand::Minimum { .. } => "minimum",
            EditCommand::Maximum { .. } => "maximum",
            EditCommand::Color { .. } => "color",
            EditCommand::Name { .. } => "name",
            EditCommand::ToggleName { .. } => "toggle_name",
            EditCommand::PositiveColor { .. } => "positive_color",
            EditCommand::NegativeColor { .. } => "negative_color",
            EditCommand::Title { .. } => "title",
            EditCommand::Drag { .. } => "drag",
        }
    }

    /// The element an edit addresses, if it addresses one
    pub fn element(&self) -> Option<ElementRef<'_>> {
        match self {
            EditCommand::Height {
                name, group, index, ..
            }
            | EditCommand::Color {
                name, group, index, ..
            }
            | EditCommand::Name {
                name, group, index, ..
            } => Some(ElementRef {
                name: name.as_deref(),
                group: *group,
                index: *index,
            }),
            EditCommand::Opening { name, index, .. }
            | EditCommand::Minimum { name, index, .. }
            | EditCommand::Maximum { name, index, .. }
            | EditCommand::ToggleName { name, index } => Some(ElementRef {
                name: name.as_deref(),
                group: None,
                index: *index,
            }),
            _ => None,
        }
    }
}

/// A chart, its frame and the edits to replay
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartDescription {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub x_label: String,
    #[serde(default)]
    pub y_label: String,
    pub canvas_height: Option<f64>,
    pub width: Option<f64>,
    pub spacing: Option<f64>,
    pub inner_spacing: Option<f64>,
    pub origin: Option<[f64; 2]>,
    /// Data value drawn on the x axis; candlesticks only
    #[serde(default)]
    pub x_axis_value: f64,
    #[serde(default)]
    pub groups: Vec<GroupDescription>,
    #[serde(default)]
    pub bins: Vec<BinDescription>,
    #[serde(default)]
    pub candles: Vec<CandleDescription>,
    #[serde(default)]
    pub edits: Vec<EditCommand>,
}

impl ChartDescription {
    pub fn from_file(path: &Path) -> Result<Self, DescriptionError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse and validate a description
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, DescriptionError> {
        let description: ChartDescription = toml::from_str(content)?;
        description.validate()?;
        Ok(description)
    }

    /// Check the structure that TOML typing alone cannot express
    pub fn validate(&self) -> Result<(), DescriptionError> {
        let present = [
            !self.groups.is_empty(),
            !self.bins.is_empty(),
            !self.candles.is_empty(),
        ];
        match present.iter().filter(|&&p| p).count() {
            0 => {
                return Err(DescriptionError::invalid(
                    "no [[groups]], [[bins]] or [[candles]] given",
                ))
            }
            1 => {}
            _ => {
                return Err(DescriptionError::invalid(
                    "only one of [[groups]], [[bins]] or [[candles]] may be given",
                ))
            }
        }

        for (i, group) in self.groups.iter().enumerate() {
            if group.values.is_empty() {
                return Err(DescriptionError::invalid(format!("group {i} has no values")));
            }
            if !group.names.is_empty() && group.names.len() != group.values.len() {
                return Err(DescriptionError::invalid(format!(
                    "group {i} has {} values but {} names",
                    group.values.len(),
                    group.names.len()
                )));
            }
        }

        let numbers = self
            .groups
            .iter()
            .flat_map(|g| g.values.iter().copied())
            .chain(self.bins.iter().flat_map(|b| [b.low, b.high, b.count]))
            .chain(
                self.candles
                    .iter()
                    .flat_map(|c| [c.open, c.close, c.low, c.high]),
            )
            .chain([self.x_axis_value]);
        if numbers.into_iter().any(|v| !v.is_finite()) {
            return Err(DescriptionError::invalid("data values must be finite"));
        }

        if let Some(height) = self.canvas_height {
            if !(height.is_finite() && height > 0.0) {
                return Err(DescriptionError::invalid(format!(
                    "canvas_height must be positive, got {height}"
                )));
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> ChartKind {
        if !self.candles.is_empty() {
            ChartKind::Candlestick
        } else if !self.bins.is_empty() {
            ChartKind::Histogram
        } else {
            ChartKind::Bar
        }
    }

    /// `base` with the description's canvas height applied
    pub fn layout_config(&self, base: &LayoutConfig) -> LayoutConfig {
        match self.canvas_height {
            Some(height) => base.clone().with_canvas_height(height),
            None => base.clone(),
        }
    }

    /// Default frame with the description's overrides applied
    pub fn frame(&self) -> FrameParams {
        let mut frame = FrameParams::new();
        if let Some(width) = self.width {
            frame = frame.with_width(width);
        }
        if let Some(spacing) = self.spacing {
            frame = frame.with_spacing(spacing);
        }
        if let Some([x, y]) = self.origin {
            frame = frame.with_origin(x, y);
        }
        frame
    }

    /// Bar name, defaulting to `group-index`
    pub fn bar_name(&self, group: usize, index: usize) -> String {
        self.groups
            .get(group)
            .and_then(|g| g.names.get(index))
            .cloned()
            .unwrap_or_else(|| format!("{group}-{index}"))
    }
}
