//! Data export for solved charts
//!
//! Every exported value is mapped back from pixels to data space through the
//! chart's [`PlotMetadata`](crate::layout::PlotMetadata), so output always
//! reflects the current solver state in the units the data came in.

pub mod config;
pub mod csv;
pub mod text;

pub use config::ExportConfig;
pub use self::csv::write_csv;
pub use text::render_text;

use clap::ValueEnum;
use thiserror::Error;

use crate::session::Chart;

/// Output format of [`export`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    Csv,
    #[default]
    Text,
}

/// Errors that can occur while writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn export(
    chart: &Chart,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => write_csv(chart, config),
        ExportFormat::Text => Ok(render_text(chart, config)),
    }
}

fn trim_zeros(number: &str) -> String {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        number.to_string()
    }
}

/// `value` rounded to `decimals` places, without trailing zeros
pub fn format_fixed(value: f64, decimals: usize) -> String {
    let formatted = trim_zeros(&format!("{value:.decimals$}"));
    if formatted == "-0" {
        "0".to_string()
    } else {
        formatted
    }
}

/// `value` with `significant` significant digits, switching to exponent
/// notation for very large or very small magnitudes
pub fn format_general(value: f64, significant: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format_fixed(value, 0);
    }
    let significant = significant.max(1);
    let exponent = value.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= significant as i32 {
        let formatted = format!("{:.*e}", significant - 1, value);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{}", trim_zeros(mantissa), exponent),
            None => formatted,
        }
    } else {
        let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
        format_fixed(value, decimals)
    }
}

/// Bar values: general notation at the extremes, fixed otherwise
pub(crate) fn format_value(value: f64, precision: usize) -> String {
    if value >= 1e6 || value <= 1e-4 {
        format_general(value, precision)
    } else {
        format_fixed(value, precision)
    }
}
