//! Textual data view
//!
//! Lists every element with its current data value. The element whose value
//! the last edit changed is marked with `*`.

use super::config::ExportConfig;
use super::format_value;
use crate::session::{Chart, ChartBody};

const MARKED: &str = "* ";
const UNMARKED: &str = "  ";

fn marker(edited: Option<usize>, index: usize) -> &'static str {
    if edited == Some(index) {
        MARKED
    } else {
        UNMARKED
    }
}

pub fn render_text(chart: &Chart, config: &ExportConfig) -> String {
    let metadata = chart.metadata();
    let edited = chart.edited();
    let mut out = String::new();

    if !metadata.title.is_empty() {
        out.push_str(&metadata.title);
        out.push('\n');
    }

    match chart.body() {
        ChartBody::Bar(solver) => {
            for (i, rect) in solver.rectangles().iter().flatten().enumerate() {
                let value = format_value(metadata.to_data(rect.height()), config.precision);
                out.push_str(&format!("{}{} = {}\n", marker(edited, i), rect.name, value));
            }
        }
        ChartBody::Histogram(solver) => {
            for (i, rect) in solver.rectangles().iter().flatten().enumerate() {
                let value = format_value(metadata.to_data(rect.height()), config.precision);
                out.push_str(&format!(
                    "{}({}, {}) = {}\n",
                    marker(edited, i),
                    rect.left_bottom.secondary_label.as_deref().unwrap_or(""),
                    rect.right_top.secondary_label.as_deref().unwrap_or(""),
                    value
                ));
            }
        }
        ChartBody::Candlestick(solver) => {
            let precision = config.precision;
            for (i, candle) in solver.candles().iter().enumerate() {
                let level = |pixels: f64| metadata.to_data(pixels);
                out.push_str(&format!(
                    "{}{}:\n    opening = {:.precision$},\n    closing = {:.precision$},\n    min = {:.precision$},\n    max = {:.precision$}\n",
                    marker(edited, i),
                    candle.name(),
                    level(candle.opening()),
                    level(candle.closing()),
                    level(candle.minimum()),
                    level(candle.maximum()),
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{ChartDescription, EditCommand};
    use crate::layout::LayoutConfig;
    use crate::palette::Palette;

    fn chart(source: &str) -> Chart {
        let description = ChartDescription::from_str(source).unwrap();
        Chart::from_description(&description, &Palette::default(), &LayoutConfig::default())
            .unwrap()
    }

    #[test]
    fn test_bar_view_marks_edited_bar() {
        let mut chart = chart(
            r#"
title = "Rainfall"

[[groups]]
values = [200, 300]
names = ["jan", "feb"]
"#,
        );
        chart
            .apply(&EditCommand::Height {
                name: None,
                group: Some(0),
                index: Some(1),
                value: 250.0,
            })
            .unwrap();

        insta::assert_snapshot!(render_text(&chart, &ExportConfig::default()), @r"
        Rainfall
          jan = 200
        * feb = 250
        ");
    }

    #[test]
    fn test_histogram_view_shows_intervals() {
        let chart = chart(
            r#"
[[bins]]
low = 0
high = 2.5
count = 200

[[bins]]
low = 2.5
high = 5
count = 300
"#,
        );
        let text = render_text(&chart, &ExportConfig::default());
        assert_eq!(text, "  (0, 2.5) = 200\n  (2.5, 5) = 300\n");
    }

    #[test]
    fn test_candle_view_uses_fixed_precision() {
        let chart = chart(
            r#"
[[candles]]
name = "mon"
open = 200
close = 250
low = 180
high = 300
"#,
        );
        let text = render_text(&chart, &ExportConfig::default().with_precision(1));
        assert_eq!(
            text,
            "  mon:\n    opening = 200.0,\n    closing = 250.0,\n    min = 180.0,\n    max = 300.0\n"
        );
    }
}
