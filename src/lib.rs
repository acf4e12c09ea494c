//! Constraint Charts - interactive chart layout on a constraint solver
//!
//! Grouped bar charts, histograms and candlestick charts whose geometry is
//! held by a linear constraint solver. Edits only suggest new values for a
//! fixed set of editable variables; the solver keeps every bar adjacent,
//! every wick around its body and every coordinate on the canvas.
//!
//! # Example
//!
//! ```rust
//! use constraint_charts::run;
//!
//! let text = run(r#"
//!     [[groups]]
//!     values = [200, 300]
//!     names = ["jan", "feb"]
//!
//!     [[edits]]
//!     op = "height"
//!     name = "feb"
//!     value = 250
//! "#).unwrap();
//!
//! assert!(text.contains("* feb = 250"));
//! ```

pub mod description;
pub mod error;
pub mod export;
pub mod layout;
pub mod palette;
pub mod session;
pub mod telemetry;

pub use description::{ChartDescription, ChartKind, EditCommand};
pub use error::DescriptionError;
pub use export::{export, ExportConfig, ExportError, ExportFormat};
pub use layout::{LayoutConfig, LayoutError};
pub use palette::{Palette, PaletteError};
pub use session::{Chart, ChartBody};

use layout::axis_marks;
use thiserror::Error;

/// Errors that can occur between reading a description and exporting it
#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error("palette error: {0}")]
    Palette(#[from] PaletteError),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// Configuration for the complete pipeline
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Layout configuration; a description's `canvas_height` overrides it
    pub layout: LayoutConfig,
    pub palette: Palette,
    pub export: ExportConfig,
    pub format: ExportFormat,
    /// Debug mode: dump solved pixel geometry to stderr
    pub debug: bool,
}

impl RunConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_export(mut self, config: ExportConfig) -> Self {
        self.export = config;
        self
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Build, edit and export a chart description with default configuration
pub fn run(source: &str) -> Result<String, ChartError> {
    run_with_config(source, &RunConfig::default())
}

/// Build, edit and export a chart description
///
/// # Example
///
/// ```rust
/// use constraint_charts::{run_with_config, ExportConfig, ExportFormat, RunConfig};
///
/// let config = RunConfig::new()
///     .with_format(ExportFormat::Csv)
///     .with_export(ExportConfig::new().with_header(true));
///
/// let csv = run_with_config("[[groups]]\nvalues = [200]\n", &config).unwrap();
/// assert_eq!(csv, "group,name,value\n0,0-0,200\n");
/// ```
pub fn run_with_config(source: &str, config: &RunConfig) -> Result<String, ChartError> {
    let description = ChartDescription::from_str(source)?;
    let mut chart = Chart::from_description(&description, &config.palette, &config.layout)?;
    chart.apply_all(&description.edits)?;

    if config.debug {
        eprintln!("=== Layout Debug ===");
        eprint!("{}", debug_dump(&chart));
        eprintln!("====================");
    }

    Ok(export(&chart, config.format, &config.export)?)
}

/// Ticks drawn on the value axis
const AXIS_MARK_COUNT: usize = 5;

/// Solved pixel geometry, one element per line
fn debug_dump(chart: &Chart) -> String {
    let mut out = format!(
        "{} chart, scale factor {}, x axis value {}\n",
        chart.kind().as_str(),
        chart.metadata().scale_factor(),
        chart.metadata().x_axis_value()
    );
    match chart.body() {
        ChartBody::Bar(solver) | ChartBody::Histogram(solver) => {
            let origin = solver.origin();
            out.push_str(&format!(
                "origin=({:.1}, {:.1}) width={:.1} spacing={:.1} inner={:.1} axis={:.1}\n",
                origin.x,
                origin.y,
                solver.width(),
                solver.spacing(),
                solver.inner_spacing(),
                solver.axis_height()
            ));
            push_axis_marks(&mut out, chart, 0.0, solver.axis_height());
            for (g, group) in solver.rectangles().iter().enumerate() {
                for rect in group {
                    out.push_str(&format!(
                        "  [{}:{}] lb=({:.1}, {:.1}) rt=({:.1}, {:.1}) {}\n",
                        g,
                        rect.name,
                        rect.left_bottom.x,
                        rect.left_bottom.y,
                        rect.right_top.x,
                        rect.right_top.y,
                        rect.color
                    ));
                }
            }
        }
        ChartBody::Candlestick(solver) => {
            let origin = solver.origin();
            out.push_str(&format!(
                "origin=({:.1}, {:.1}) width={:.1} spacing={:.1} axis={:.1}\n",
                origin.x,
                origin.y,
                solver.width(),
                solver.spacing(),
                solver.axis_height()
            ));
            push_axis_marks(&mut out, chart, solver.lowest_level(), solver.axis_height());
            for candle in solver.candles() {
                out.push_str(&format!(
                    "  [{}] x={:.1}..{:.1} open={:.1} close={:.1} wick={:.1}..{:.1} {}\n",
                    candle.name(),
                    candle.opening_corner().x,
                    candle.closing_corner().x,
                    candle.opening(),
                    candle.closing(),
                    candle.minimum(),
                    candle.maximum(),
                    candle.color()
                ));
            }
        }
    }
    out
}

fn push_axis_marks(out: &mut String, chart: &Chart, low: f64, axis_height: f64) {
    let marks: Vec<String> = axis_marks(chart.metadata(), low, axis_height, AXIS_MARK_COUNT)
        .iter()
        .map(|mark| format!("{:.1}={}", mark.pixels, export::format_fixed(mark.value, 4)))
        .collect();
    out.push_str(&format!("axis marks: {}\n", marks.join(" ")));
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARS: &str = r#"
[[groups]]
values = [200, 300]
names = ["jan", "feb"]
"#;

    #[test]
    fn test_run_text_by_default() {
        let text = run(BARS).unwrap();
        assert_eq!(text, "  jan = 200\n  feb = 300\n");
    }

    #[test]
    fn test_run_csv() {
        let config = RunConfig::new().with_format(ExportFormat::Csv);
        let csv = run_with_config(BARS, &config).unwrap();
        assert_eq!(csv, "0,jan,200\n0,feb,300\n");
    }

    #[test]
    fn test_run_applies_palette() {
        let palette = Palette::from_str("[colors]\nbar = \"teal\"\n").unwrap();
        let description = ChartDescription::from_str(BARS).unwrap();
        let chart =
            Chart::from_description(&description, &palette, &LayoutConfig::default()).unwrap();
        assert!(debug_dump(&chart).contains("teal"));
    }

    #[test]
    fn test_debug_dump_lists_axis_marks() {
        let source = format!("{BARS}\n[[edits]]\nop = \"axis_height\"\nvalue = 390\n");
        let description = ChartDescription::from_str(&source).unwrap();
        let mut chart =
            Chart::from_description(&description, &Palette::default(), &LayoutConfig::default())
                .unwrap();
        chart.apply_all(&description.edits).unwrap();
        assert!(debug_dump(&chart)
            .contains("axis marks: 0.0=0 100.0=100 200.0=200 300.0=300 400.0=400\n"));
    }

    #[test]
    fn test_candle_axis_marks_start_at_lowest_wick() {
        let source = r#"
origin = [0, 0]

[[candles]]
name = "mon"
open = 100
close = 300
low = -10
high = 380
"#;
        let description = ChartDescription::from_str(source).unwrap();
        let chart =
            Chart::from_description(&description, &Palette::default(), &LayoutConfig::default())
                .unwrap();
        assert!(debug_dump(&chart).contains("axis marks: -10.0=-10 "));
    }

    #[test]
    fn test_description_error() {
        let err = run("title = 3").unwrap_err();
        assert!(matches!(err, ChartError::Description(_)));
    }

    #[test]
    fn test_layout_error() {
        let source = format!("{BARS}\n[[edits]]\nop = \"opening\"\nindex = 0\nvalue = 1\n");
        let err = run(&source).unwrap_err();
        assert!(matches!(
            err,
            ChartError::Layout(LayoutError::UnsupportedEdit { .. })
        ));
    }
}
