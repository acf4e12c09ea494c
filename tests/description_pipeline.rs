//! Description -> chart -> edits -> export, through the public pipeline

use constraint_charts::export::{render_text, write_csv};
use constraint_charts::{
    run, run_with_config, Chart, ChartDescription, ChartError, ExportConfig, ExportFormat,
    LayoutConfig, LayoutError, Palette, RunConfig,
};
use pretty_assertions::assert_eq;

const CANDLES: &str = r#"
title = "Week 12"
origin = [0, 0]
width = 20
spacing = 10

[[candles]]
name = "mon"
open = 100
close = 200
low = 50
high = 250

[[candles]]
name = "tue"
open = 200
close = 150
low = 120
high = 260
"#;

fn candle_chart() -> Chart {
    let description = ChartDescription::from_str(CANDLES).unwrap();
    Chart::from_description(&description, &Palette::default(), &LayoutConfig::default()).unwrap()
}

#[test]
fn candle_edits_replay_in_order() {
    let source = format!(
        "{CANDLES}
[[edits]]
op = \"maximum\"
name = \"mon\"
value = 150

[[edits]]
op = \"minimum\"
index = 1
value = 100

[[edits]]
op = \"opening\"
name = \"tue\"
value = 180
"
    );
    let config = RunConfig::new().with_format(ExportFormat::Csv);
    let csv = run_with_config(&source, &config).unwrap();
    // the maximum of mon is clamped to its closing level
    assert_eq!(csv, "mon,100,200,50,200\ntue,180,130,100,260\n");
}

#[test]
fn candle_text_view_marks_last_level_edit() {
    let source = format!(
        "{CANDLES}
[[edits]]
op = \"height\"
name = \"tue\"
value = 20
"
    );
    let text = run(&source).unwrap();
    insta::assert_snapshot!(text, @r"
    Week 12
      mon:
        opening = 100.0000,
        closing = 200.0000,
        min = 50.0000,
        max = 250.0000
    * tue:
        opening = 200.0000,
        closing = 220.0000,
        min = 120.0000,
        max = 260.0000
    ");
}

#[test]
fn palette_colours_reach_candles() {
    let palette = Palette::from_str("[colors]\npositive = \"teal\"\nnegative = \"orange\"\n").unwrap();
    let description = ChartDescription::from_str(CANDLES).unwrap();
    let chart = Chart::from_description(&description, &palette, &LayoutConfig::default()).unwrap();
    let constraint_charts::ChartBody::Candlestick(solver) = chart.body() else {
        panic!("expected a candlestick chart");
    };
    assert_eq!(solver.candles()[0].color(), "teal");
    assert_eq!(solver.candles()[1].color(), "orange");
}

#[test]
fn decoration_edits_do_not_move_geometry() {
    let mut chart = candle_chart();
    let before = write_csv(&chart, &ExportConfig::default()).unwrap();
    let description = ChartDescription::from_str(&format!(
        "{CANDLES}
[[edits]]
op = \"toggle_name\"
name = \"mon\"

[[edits]]
op = \"name\"
index = 1
new_name = \"wed\"

[[edits]]
op = \"negative_color\"
color = \"black\"

[[edits]]
op = \"title\"
value = \"Week 13\"
"
    ))
    .unwrap();
    chart.apply_all(&description.edits).unwrap();

    let after = write_csv(&chart, &ExportConfig::default()).unwrap();
    assert_eq!(after, before.replace("tue", "wed"));
    assert_eq!(chart.metadata().title, "Week 13");
    assert_eq!(chart.edited(), None);
    assert!(render_text(&chart, &ExportConfig::default()).starts_with("Week 13\n"));
}

#[test]
fn histogram_through_pipeline() {
    let source = r#"
[[bins]]
low = 0
high = 10
count = 200

[[bins]]
low = 10
high = 30
count = 300

[[edits]]
op = "height"
index = 1
value = 350
"#;
    let config = RunConfig::new()
        .with_format(ExportFormat::Csv)
        .with_export(ExportConfig::new().with_header(true));
    let csv = run_with_config(source, &config).unwrap();
    assert_eq!(csv, "low,high,count\n0,10,200\n10,30,350\n");

    let description = ChartDescription::from_str(source).unwrap();
    let chart =
        Chart::from_description(&description, &Palette::default(), &LayoutConfig::default())
            .unwrap();
    let constraint_charts::ChartBody::Histogram(solver) = chart.body() else {
        panic!("expected a histogram");
    };
    // the second bin is twice as long, so its bar is twice as wide
    let bars = &solver.rectangles()[0];
    assert!((bars[1].width() - 2.0 * bars[0].width()).abs() < 0.001);
    assert!((bars[1].left_bottom.x - bars[0].right_top.x).abs() < 0.001);
}

#[test]
fn large_values_are_scaled_down() {
    let source = r#"
[[groups]]
values = [1000, 4000]
names = ["small", "large"]
"#;
    let description = ChartDescription::from_str(source).unwrap();
    let chart =
        Chart::from_description(&description, &Palette::default(), &LayoutConfig::default())
            .unwrap();
    // 0.8 * 600 / 4000
    assert!((chart.metadata().scale_factor() - 0.12).abs() < 1e-9);
    let constraint_charts::ChartBody::Bar(solver) = chart.body() else {
        panic!("expected a bar chart");
    };
    assert!((solver.rectangle(0, 1).unwrap().height() - 480.0).abs() < 0.001);

    // exported values are back in data space
    assert_eq!(run(source).unwrap(), "  small = 1000\n  large = 4000\n");
}

#[test]
fn unknown_candle_name_is_reported_with_suggestion() {
    let source = format!(
        "{CANDLES}
[[edits]]
op = \"opening\"
name = \"teu\"
value = 10
"
    );
    let err = match run(&source).unwrap_err() {
        ChartError::Layout(err) => err,
        other => panic!("expected a layout error, got {other:?}"),
    };
    assert!(matches!(err, LayoutError::UnknownElement { what: "candle", .. }));
    assert_eq!(err.suggestions(), Some(&["tue".to_string()][..]));
}

#[test]
fn bar_drag_changes_height() {
    // bar 0 spans x 10..30 and stands on y 0; its top is at screen y 600 - 200
    let source = r#"
origin = [0, 0]
width = 20

[[groups]]
values = [200, 300]
names = ["jan", "feb"]

[[edits]]
op = "drag"
from = [20, 400]
to = [20, 350]
"#;
    let text = run(source).unwrap();
    assert_eq!(text, "* jan = 250\n  feb = 300\n");
}
