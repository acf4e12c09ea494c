//! Configuration for the layout engine

use super::scale::ScaleBounds;

/// Configuration options for chart construction
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Target canvas height in pixels, used by scaling and pointer conversion
    pub canvas_height: f64,

    /// Floor for the shared bar/candle width
    pub minimal_width: f64,

    /// Extra room above the tallest bar when suggesting the initial axis height
    pub axis_headroom: f64,

    /// Band of the canvas height in which raw data is drawn unscaled
    pub scale_bounds: ScaleBounds,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_height: 600.0,
            minimal_width: 10.0,
            axis_headroom: 10.0,
            scale_bounds: ScaleBounds::default(),
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas height
    pub fn with_canvas_height(mut self, height: f64) -> Self {
        self.canvas_height = height;
        self
    }

    /// Set the minimal width floor
    pub fn with_minimal_width(mut self, width: f64) -> Self {
        self.minimal_width = width;
        self
    }

    /// Set the axis headroom
    pub fn with_axis_headroom(mut self, headroom: f64) -> Self {
        self.axis_headroom = headroom;
        self
    }

    /// Set the unscaled band, as fractions of the canvas height
    pub fn with_scale_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.scale_bounds = ScaleBounds::new(lower, upper);
        self
    }
}
