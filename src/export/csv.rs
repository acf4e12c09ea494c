//! CSV export
//!
//! One row per element, values in data space:
//! bars `group,name,value`, histogram bins `low,high,count` and candles
//! `name,open,close,min,max`.

use ::csv::WriterBuilder;

use super::config::ExportConfig;
use super::{format_fixed, ExportError};
use crate::session::{Chart, ChartBody};

pub fn write_csv(chart: &Chart, config: &ExportConfig) -> Result<String, ExportError> {
    let metadata = chart.metadata();
    let number = |pixels: f64| format_fixed(metadata.to_data(pixels), config.precision);
    let mut writer = WriterBuilder::new()
        .delimiter(config.separator)
        .has_headers(false)
        .from_writer(Vec::new());

    match chart.body() {
        ChartBody::Bar(solver) => {
            if config.header {
                writer.write_record(["group", "name", "value"])?;
            }
            for (g, group) in solver.rectangles().iter().enumerate() {
                for rect in group {
                    writer.write_record([g.to_string(), rect.name.clone(), number(rect.height())])?;
                }
            }
        }
        ChartBody::Histogram(solver) => {
            if config.header {
                writer.write_record(["low", "high", "count"])?;
            }
            for rect in solver.rectangles().iter().flatten() {
                let bound = |label: &Option<String>| label.clone().unwrap_or_default();
                writer.write_record([
                    bound(&rect.left_bottom.secondary_label),
                    bound(&rect.right_top.secondary_label),
                    number(rect.height()),
                ])?;
            }
        }
        ChartBody::Candlestick(solver) => {
            if config.header {
                writer.write_record(["name", "open", "close", "min", "max"])?;
            }
            for candle in solver.candles() {
                writer.write_record([
                    candle.name().to_string(),
                    number(candle.opening()),
                    number(candle.closing()),
                    number(candle.minimum()),
                    number(candle.maximum()),
                ])?;
            }
        }
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
