//! End-to-end layout scenarios for bar and candlestick charts
//!
//! Each test builds a chart through the public solver API, applies edits and
//! checks the solved snapshot.

use constraint_charts::layout::{
    BarChartParams, BarChartSolver, BarSeed, CandleChartParams, CandleLevels, CandleSeed,
    CandlestickChartSolver, FrameParams, LayoutConfig,
};

const TOLERANCE: f64 = 0.001;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "{what}: expected {expected}, got {actual}"
    );
}

fn scenario_a() -> BarChartSolver {
    let params = BarChartParams::single_group(&[50.0, 60.0, 70.0])
        .with_width(20.0)
        .with_spacing(5.0)
        .with_inner_spacing(3.0)
        .with_origin(0.0, 0.0);
    BarChartSolver::new(&params, &LayoutConfig::default()).unwrap()
}

#[test]
fn scenario_a_single_group_layout() {
    let solver = scenario_a();
    let bars = &solver.rectangles()[0];
    assert_eq!(bars.len(), 3);

    for (bar, (left, height)) in bars.iter().zip([(5.0, 50.0), (28.0, 60.0), (51.0, 70.0)]) {
        assert_close(bar.left_bottom.x, left, "left");
        assert_close(bar.height(), height, "height");
        assert_close(bar.width(), 20.0, "width");
        assert_close(bar.left_bottom.y, 0.0, "baseline");
    }
}

#[test]
fn scenario_b_change_width() {
    let mut solver = scenario_a();
    solver.change_width(40.0).unwrap();

    let bars = &solver.rectangles()[0];
    for (bar, (left, height)) in bars.iter().zip([(5.0, 50.0), (48.0, 60.0), (91.0, 70.0)]) {
        assert_close(bar.width(), 40.0, "width");
        assert_close(bar.left_bottom.x, left, "left");
        assert_close(bar.height(), height, "height");
    }
    assert_close(solver.width(), 40.0, "shared width");
}

#[test]
fn scenario_c_candle_maximum_is_clamped() {
    let params = CandleChartParams::new(vec![CandleSeed::new(
        "mon",
        CandleLevels::new(10.0, 20.0, 5.0, 25.0),
    )])
    .with_frame(FrameParams::new().with_origin(0.0, 0.0));
    let mut solver = CandlestickChartSolver::new(&params, &LayoutConfig::default()).unwrap();

    let candle = &solver.candles()[0];
    assert_close(candle.minimum(), 5.0, "wick bottom");
    assert_close(candle.maximum(), 25.0, "wick top");
    assert_close(candle.opening(), 10.0, "opening");
    assert_close(candle.closing(), 20.0, "closing");

    solver.change_maximum(0, 3.0).unwrap();
    let candle = &solver.candles()[0];
    assert_close(candle.maximum(), 20.0, "clamped wick top");
    assert_close(candle.closing(), 20.0, "closing after clamp");
}

fn scenario_d() -> BarChartSolver {
    let params = BarChartParams::new(vec![
        vec![BarSeed::new(40.0, "a")],
        vec![BarSeed::new(50.0, "b"), BarSeed::new(60.0, "c")],
    ])
    .with_width(20.0)
    .with_spacing(10.0)
    .with_inner_spacing(2.0)
    .with_origin(0.0, 0.0);
    BarChartSolver::new(&params, &LayoutConfig::default()).unwrap()
}

fn group_gap(solver: &BarChartSolver) -> f64 {
    let groups = solver.rectangles();
    let first_right = groups[0].last().unwrap().right_top.x;
    let second_left = groups[1][0].left_bottom.x;
    second_left - first_right
}

#[test]
fn scenario_d_group_spacing() {
    let mut solver = scenario_d();
    assert_close(group_gap(&solver), 10.0, "initial gap");
    assert_close(solver.rectangles()[1][0].left_bottom.x, 40.0, "group 1 left");

    solver.change_spacing(15.0).unwrap();
    assert_close(group_gap(&solver), 15.0, "gap after edit");
    assert_close(solver.rectangles()[0][0].left_bottom.x, 15.0, "group 0 left");
    // inner spacing inside group 1 is untouched
    let group = &solver.rectangles()[1];
    assert_close(group[1].left_bottom.x - group[0].right_top.x, 2.0, "inner gap");
}

#[test]
fn flattened_indexing_round_trips() {
    let solver = scenario_d();
    assert_eq!(solver.len(), 3);
    assert_eq!(solver.locate(2).unwrap(), (1, 1));
    assert_eq!(solver.flat_index(1, 0).unwrap(), 1);
    assert_eq!(solver.rectangles_flat()[2].name, "c");
    assert!(solver.locate(3).is_err());
}

#[test]
fn width_below_minimum_is_absorbed() {
    let mut solver = scenario_a();
    solver.change_width(2.0).unwrap();
    assert_close(solver.width(), LayoutConfig::default().minimal_width, "width floor");
    for bar in &solver.rectangles()[0] {
        assert_close(bar.width(), 10.0, "bar width");
    }
}

#[test]
fn negative_height_is_absorbed() {
    let mut solver = scenario_a();
    solver.change_height(0, 1, -30.0).unwrap();
    let bars = &solver.rectangles()[0];
    assert_close(bars[1].height(), 0.0, "floored height");
    assert_close(bars[0].height(), 50.0, "neighbour height");
}

#[test]
fn origin_moves_whole_chart() {
    let mut solver = scenario_a();
    solver.change_origin(100.0, 40.0).unwrap();
    let bars = &solver.rectangles()[0];
    assert_close(bars[0].left_bottom.x, 105.0, "first left");
    assert_close(bars[2].left_bottom.x, 151.0, "last left");
    for bar in bars {
        assert_close(bar.left_bottom.y, 40.0, "baseline");
    }
}

#[test]
fn index_out_of_bounds_fails_fast() {
    let mut solver = scenario_a();
    assert!(solver.change_height(0, 3, 10.0).is_err());
    assert!(solver.change_height(1, 0, 10.0).is_err());

    let params = CandleChartParams::new(vec![CandleSeed::new(
        "mon",
        CandleLevels::new(10.0, 20.0, 5.0, 25.0),
    )]);
    let mut candles = CandlestickChartSolver::new(&params, &LayoutConfig::default()).unwrap();
    assert!(candles.change_opening(1, 5.0).is_err());
}
