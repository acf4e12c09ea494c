//! Scale factor and plot metadata
//!
//! Raw data of any magnitude is mapped into pixel space once, before any
//! constraint is built. [`PlotMetadata`] keeps the mapping so solved pixel
//! values can be turned back into data values for display and export.

use tracing::debug;

/// Fraction band of the canvas height in which data is drawn unscaled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ScaleBounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self::new(0.3, 0.8)
    }
}

/// Raw-to-pixel multiplier for a series whose largest magnitude is `max_magnitude`.
///
/// Data already inside the band is left alone; anything else is stretched or
/// shrunk so that the largest magnitude lands on the upper bound.
pub fn scale_factor(max_magnitude: f64, canvas_height: f64, bounds: ScaleBounds) -> f64 {
    let max_magnitude = max_magnitude.abs();
    if max_magnitude == 0.0 || !max_magnitude.is_finite() {
        return 1.0;
    }
    let low = canvas_height * bounds.lower;
    let high = canvas_height * bounds.upper;
    if (low..=high).contains(&max_magnitude) {
        1.0
    } else {
        high / max_magnitude
    }
}

/// Largest absolute value of a series, 0 for an empty one
pub fn max_magnitude(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().map(f64::abs).fold(0.0, f64::max)
}

/// Labels and the fixed raw/pixel mapping of one chart session
#[derive(Debug, Clone, PartialEq)]
pub struct PlotMetadata {
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    scale_factor: f64,
    x_axis_value: f64,
}

impl PlotMetadata {
    /// Metadata for a series, computing its scale factor
    pub fn for_series(
        values: impl IntoIterator<Item = f64>,
        x_axis_value: f64,
        canvas_height: f64,
        bounds: ScaleBounds,
    ) -> Self {
        let magnitude = max_magnitude(values);
        let factor = scale_factor(magnitude, canvas_height, bounds);
        debug!(magnitude, scale_factor = factor, "computed scale factor");
        Self::with_scale(factor, x_axis_value)
    }

    /// Metadata with an explicit scale factor
    pub fn with_scale(scale_factor: f64, x_axis_value: f64) -> Self {
        Self {
            title: String::new(),
            x_axis_label: String::new(),
            y_axis_label: String::new(),
            scale_factor,
            x_axis_value,
        }
    }

    pub fn with_labels(
        mut self,
        title: impl Into<String>,
        x_axis_label: impl Into<String>,
        y_axis_label: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.x_axis_label = x_axis_label.into();
        self.y_axis_label = y_axis_label.into();
        self
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Data value drawn on the x axis
    pub fn x_axis_value(&self) -> f64 {
        self.x_axis_value
    }

    /// Raw data value to a pixel level above the x axis
    pub fn to_pixels(&self, raw: f64) -> f64 {
        raw * self.scale_factor - self.x_axis_value * self.scale_factor
    }

    /// Pixel level above the x axis back to a raw data value
    pub fn to_data(&self, pixels: f64) -> f64 {
        pixels / self.scale_factor + self.x_axis_value
    }
}

/// Round up to the next multiple of ten (an exact multiple still moves up)
pub fn ceil_to_nearest_ten(number: f64) -> f64 {
    ((number / 10.0).floor() + 1.0) * 10.0
}

/// `parts` points from `low` on, separated by a whole-pixel step.
///
/// Fewer than two parts yields just the bounds.
pub fn divide_interval(low: f64, high: f64, parts: usize) -> Vec<f64> {
    if parts < 2 {
        return vec![low, high];
    }
    let step = ((high - low) / (parts - 1) as f64).floor();
    (0..parts).map(|i| low + i as f64 * step).collect()
}

/// One tick on the value axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisMark {
    /// Pixel level above the x axis
    pub pixels: f64,
    /// Data value shown next to the tick
    pub value: f64,
}

/// Ticks from `low_pixels` up to the axis top rounded to the next ten
pub fn axis_marks(
    metadata: &PlotMetadata,
    low_pixels: f64,
    axis_height: f64,
    parts: usize,
) -> Vec<AxisMark> {
    divide_interval(low_pixels, ceil_to_nearest_ten(axis_height), parts)
        .into_iter()
        .map(|pixels| AxisMark {
            pixels,
            value: metadata.to_data(pixels),
        })
        .collect()
}
