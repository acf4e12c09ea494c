//! Drag targets and pointer-to-edit conversion
//!
//! A drag picks one target when it starts, capturing whatever it needs from
//! the chart at that moment. Every pointer move is then turned into at most
//! one solver edit. Pointer positions are in screen space: y grows downward
//! from the top of a canvas `canvas_height` pixels tall.

use tracing::trace;

use super::bar_solver::BarChartSolver;
use super::candle_solver::CandlestickChartSolver;
use super::config::LayoutConfig;
use super::error::LayoutError;

/// Pick radius around edges and points
const NEAR: f64 = 5.0;
/// Pick radius around the top of the value axis
const NEAR_AXIS_TOP: f64 = 10.0;
/// Pick radius around a bar's left edge
const NEAR_LEFT_EDGE: f64 = 10.0;
/// Pick radius around a bar's right edge
const NEAR_RIGHT_EDGE: f64 = 3.0;
/// Shortest value axis a drag may produce
const MIN_AXIS_HEIGHT: f64 = 10.0;

fn is_near(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// Pointer position in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Height above the canvas bottom
    fn level(&self, canvas_height: f64) -> f64 {
        canvas_height - self.y
    }
}

// ============================================================================
// Bar charts
// ============================================================================

/// What a drag on a bar chart manipulates; bar indices are flattened
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarEditTarget {
    /// Right edge of a bar: the shared width
    Width { flat: usize },
    /// Top edge of a bar: its height
    Height { flat: usize },
    /// Left edge of a group's first bar: the group spacing
    Spacing { flat: usize },
    /// Left edge of any later bar: the inner spacing
    InnerSpacing { flat: usize },
    Origin,
    AxisHeight,
}

impl BarEditTarget {
    /// Target under the pointer when a drag starts, if any
    pub fn pick(
        solver: &BarChartSolver,
        pointer: PointerPosition,
        canvas_height: f64,
    ) -> Option<Self> {
        let PointerPosition { x, y } = pointer;
        for (flat, rect) in solver.rectangles_flat().into_iter().enumerate() {
            let top = canvas_height - rect.right_top.y;
            let bottom = canvas_height - rect.left_bottom.y;
            let beside = top <= y && y <= bottom;

            if beside && is_near(x, rect.left_bottom.x, NEAR_LEFT_EDGE) {
                let first_in_group = matches!(solver.locate(flat), Ok((_, 0)));
                return Some(if first_in_group {
                    Self::Spacing { flat }
                } else {
                    Self::InnerSpacing { flat }
                });
            }
            if beside && is_near(x, rect.right_top.x, NEAR_RIGHT_EDGE) {
                return Some(Self::Width { flat });
            }
            let above = rect.left_bottom.x <= x && x <= rect.right_top.x;
            if above && is_near(y, top, NEAR) {
                return Some(Self::Height { flat });
            }
        }

        let origin = solver.origin();
        let axis_top = canvas_height - solver.axis_height() - origin.y;
        if is_near(y, axis_top, NEAR_AXIS_TOP) && is_near(x, origin.x, NEAR_AXIS_TOP) {
            return Some(Self::AxisHeight);
        }
        if is_near(x, origin.x, NEAR) && is_near(y, canvas_height - origin.y, NEAR) {
            return Some(Self::Origin);
        }
        None
    }

    /// Flattened bar index the target refers to
    pub fn index(&self) -> Option<usize> {
        match *self {
            Self::Width { flat }
            | Self::Height { flat }
            | Self::Spacing { flat }
            | Self::InnerSpacing { flat } => Some(flat),
            Self::Origin | Self::AxisHeight => None,
        }
    }

    /// Convert one pointer move into at most one edit.
    ///
    /// Returns whether an edit was issued. Candidates that would only be
    /// absorbed by a floor are dropped here.
    pub fn apply(
        &self,
        solver: &mut BarChartSolver,
        pointer: PointerPosition,
        config: &LayoutConfig,
    ) -> Result<bool, LayoutError> {
        let origin = solver.origin();
        let level = pointer.level(config.canvas_height);
        trace!(edit = ?self, x = pointer.x, y = pointer.y, "bar drag");

        match *self {
            Self::Width { flat } => {
                let (group, index) = solver.locate(flat)?;
                let inner = solver.inner_spacing();
                let preceding_inner: f64 = solver.rectangles()[..group]
                    .iter()
                    .map(|g| inner * (g.len() as f64 - 1.0))
                    .sum();
                let scales: f64 = solver.width_scales()[..=flat].iter().sum();
                if scales <= 0.0 {
                    return Ok(false);
                }
                let width = ((pointer.x
                    - solver.spacing() * (group + 1) as f64
                    - index as f64 * inner
                    - preceding_inner
                    - origin.x)
                    / scales)
                    .floor();
                if width > config.minimal_width {
                    solver.change_width(width)?;
                    return Ok(true);
                }
            }
            Self::Height { flat } => {
                let (group, index) = solver.locate(flat)?;
                let height = level - origin.y;
                if height > 0.0 {
                    solver.change_height(group, index, height)?;
                    return Ok(true);
                }
            }
            Self::Spacing { flat } => {
                let (group, _) = solver.locate(flat)?;
                let spacing = if group == 0 {
                    pointer.x - origin.x
                } else {
                    let preceding: f64 = solver.rectangles()[..group]
                        .iter()
                        .filter_map(|g| Some(g.last()?.right_top.x - g.first()?.left_bottom.x))
                        .sum();
                    ((pointer.x - preceding - origin.x) / (group + 1) as f64).floor()
                };
                if spacing > 0.0 {
                    solver.change_spacing(spacing)?;
                    return Ok(true);
                }
            }
            Self::InnerSpacing { flat } => {
                let (group, index) = solver.locate(flat)?;
                if index == 0 {
                    return Ok(false);
                }
                let gaps: usize = solver.rectangles()[..group]
                    .iter()
                    .map(|g| g.len() - 1)
                    .sum::<usize>()
                    + index;
                let inner = ((pointer.x
                    - flat as f64 * solver.width()
                    - (group + 1) as f64 * solver.spacing()
                    - origin.x)
                    / gaps as f64)
                    .floor();
                if inner > 0.0 {
                    solver.change_inner_spacing(inner)?;
                    return Ok(true);
                }
            }
            Self::Origin => {
                solver.change_origin(pointer.x, level)?;
                return Ok(true);
            }
            Self::AxisHeight => {
                let height = level - origin.y;
                if height > MIN_AXIS_HEIGHT {
                    solver.change_axis_height(height)?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

// ============================================================================
// Candlestick charts
// ============================================================================

/// What a drag on a candlestick chart manipulates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandleEditTarget {
    /// Right edge of a candle: the shared width
    Width { index: usize },
    /// Left edge of a candle: the spacing
    Spacing { index: usize },
    /// Closing edge, relative to where the drag started
    Closing {
        index: usize,
        start_y: f64,
        original_height: f64,
    },
    Opening { index: usize },
    Minimum { index: usize },
    Maximum { index: usize },
    Origin,
    AxisHeight,
}

impl CandleEditTarget {
    /// Target under the pointer when a drag starts, if any
    pub fn pick(
        solver: &CandlestickChartSolver,
        pointer: PointerPosition,
        canvas_height: f64,
    ) -> Option<Self> {
        let PointerPosition { x, y } = pointer;
        let origin = solver.origin();
        let screen = |level: f64| canvas_height - (level + origin.y);
        let axis_top = canvas_height - solver.axis_height() - origin.y;
        let near_axis_top = is_near(y, axis_top, NEAR_AXIS_TOP) && is_near(x, origin.x, NEAR_AXIS_TOP);

        for (index, candle) in solver.candles().iter().enumerate() {
            let opening = candle.opening_corner();
            let closing = candle.closing_corner();
            let across = opening.x <= x && x <= closing.x;
            let beside = screen(candle.body.top()) <= y && y <= screen(candle.body.bottom());

            if is_near(screen(candle.maximum()), y, NEAR) && is_near(candle.wick_top.x, x, NEAR) {
                return Some(Self::Maximum { index });
            }
            if is_near(screen(candle.minimum()), y, NEAR) && is_near(candle.wick_bottom.x, x, NEAR) {
                return Some(Self::Minimum { index });
            }
            if near_axis_top {
                return Some(Self::AxisHeight);
            }
            if across && is_near(screen(closing.y), y, NEAR) {
                return Some(Self::Closing {
                    index,
                    start_y: y,
                    original_height: candle.body.height(),
                });
            }
            if across && is_near(screen(opening.y), y, NEAR) {
                return Some(Self::Opening { index });
            }
            if beside && is_near(x, opening.x, NEAR) {
                return Some(Self::Spacing { index });
            }
            if beside && is_near(x, closing.x, NEAR) {
                return Some(Self::Width { index });
            }
        }

        if near_axis_top {
            return Some(Self::AxisHeight);
        }
        if is_near(x, origin.x, NEAR) && is_near(y, canvas_height - origin.y, NEAR) {
            return Some(Self::Origin);
        }
        None
    }

    /// Candle index the target refers to
    pub fn index(&self) -> Option<usize> {
        match *self {
            Self::Width { index }
            | Self::Spacing { index }
            | Self::Closing { index, .. }
            | Self::Opening { index }
            | Self::Minimum { index }
            | Self::Maximum { index } => Some(index),
            Self::Origin | Self::AxisHeight => None,
        }
    }

    /// Convert one pointer move into at most one edit; returns whether one was issued
    pub fn apply(
        &self,
        solver: &mut CandlestickChartSolver,
        pointer: PointerPosition,
        config: &LayoutConfig,
    ) -> Result<bool, LayoutError> {
        let origin = solver.origin();
        let level = pointer.level(config.canvas_height) - origin.y;
        trace!(edit = ?self, x = pointer.x, y = pointer.y, "candle drag");

        match *self {
            Self::Width { index } => {
                let count = (index + 1) as f64;
                let width = (pointer.x - count * solver.spacing() - origin.x) / count;
                if width >= config.minimal_width {
                    solver.change_width(width)?;
                    return Ok(true);
                }
            }
            Self::Spacing { index } => {
                let spacing =
                    (pointer.x - index as f64 * solver.width() - origin.x) / (index + 1) as f64;
                if spacing >= 0.0 {
                    solver.change_spacing(spacing)?;
                    return Ok(true);
                }
            }
            Self::Closing {
                index,
                start_y,
                original_height,
            } => {
                solver.change_height(index, original_height + (start_y - pointer.y))?;
                return Ok(true);
            }
            Self::Opening { index } => {
                solver.change_opening(index, level)?;
                return Ok(true);
            }
            Self::Minimum { index } => {
                solver.change_minimum(index, level)?;
                return Ok(true);
            }
            Self::Maximum { index } => {
                solver.change_maximum(index, level)?;
                return Ok(true);
            }
            Self::Origin => {
                solver.change_origin(pointer.x, pointer.level(config.canvas_height))?;
                return Ok(true);
            }
            Self::AxisHeight => {
                if level > MIN_AXIS_HEIGHT {
                    solver.change_axis_height(level)?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::chart::{BarChartParams, CandleChartParams, CandleSeed, FrameParams};
    use crate::layout::group::BarSeed;
    use crate::layout::variables::CandleLevels;

    const TOLERANCE: f64 = 0.001;
    const H: f64 = 600.0;

    fn bars() -> BarChartSolver {
        let params = BarChartParams::new(vec![
            vec![BarSeed::new(50.0, "a"), BarSeed::new(60.0, "b")],
            vec![BarSeed::new(70.0, "c")],
        ])
        .with_width(20.0)
        .with_spacing(5.0)
        .with_inner_spacing(3.0)
        .with_origin(0.0, 0.0);
        BarChartSolver::new(&params, &LayoutConfig::default()).unwrap()
    }

    fn candles() -> CandlestickChartSolver {
        let params = CandleChartParams::new(vec![
            CandleSeed::new("a", CandleLevels::new(10.0, 20.0, 5.0, 25.0)),
            CandleSeed::new("b", CandleLevels::new(40.0, 30.0, 20.0, 60.0)),
        ])
        .with_frame(FrameParams::new().with_width(20.0).with_spacing(10.0).with_origin(50.0, 30.0));
        CandlestickChartSolver::new(&params, &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn test_pick_bar_edges() {
        let solver = bars();
        // bar a spans x 5..25 and y 0..50 above the bottom
        let mid = PointerPosition::new(15.0, H - 25.0);
        assert_eq!(
            BarEditTarget::pick(&solver, PointerPosition::new(5.0, mid.y), H),
            Some(BarEditTarget::Spacing { flat: 0 })
        );
        assert_eq!(
            BarEditTarget::pick(&solver, PointerPosition::new(29.0, H - 10.0), H),
            Some(BarEditTarget::InnerSpacing { flat: 1 })
        );
        assert_eq!(
            BarEditTarget::pick(&solver, PointerPosition::new(15.0, H - 50.0), H),
            Some(BarEditTarget::Height { flat: 0 })
        );
        assert_eq!(BarEditTarget::pick(&solver, PointerPosition::new(300.0, 10.0), H), None);
    }

    #[test]
    fn test_drag_bar_height() {
        let mut solver = bars();
        let target = BarEditTarget::Height { flat: 2 };
        let config = LayoutConfig::default();

        assert!(target.apply(&mut solver, PointerPosition::new(0.0, H - 120.0), &config).unwrap());
        assert!((solver.rectangle(1, 0).unwrap().height() - 120.0).abs() < TOLERANCE);

        // Below the baseline: filtered, nothing changes
        assert!(!target.apply(&mut solver, PointerPosition::new(0.0, H + 5.0), &config).unwrap());
        assert!((solver.rectangle(1, 0).unwrap().height() - 120.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_drag_bar_width() {
        let mut solver = bars();
        let config = LayoutConfig::default();
        // Right edge of bar b near x = 5 + 30 + 3 + 30 means width 30
        let target = BarEditTarget::Width { flat: 1 };
        assert!(target.apply(&mut solver, PointerPosition::new(69.0, 0.0), &config).unwrap());
        assert!((solver.width() - 30.0).abs() < TOLERANCE);

        assert!(!target.apply(&mut solver, PointerPosition::new(20.0, 0.0), &config).unwrap());
        assert!((solver.width() - 30.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_drag_second_group_spacing() {
        let mut solver = bars();
        let config = LayoutConfig::default();
        // Group 0 spans 43px; left of group 1 at 2 * spacing + 43
        let target = BarEditTarget::Spacing { flat: 2 };
        assert!(target.apply(&mut solver, PointerPosition::new(64.0, 0.0), &config).unwrap());
        assert!((solver.spacing() - 10.0).abs() < TOLERANCE);
        assert!((solver.rectangle(1, 0).unwrap().left_bottom.x - 63.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_drag_inner_spacing_on_first_bar_is_ignored() {
        let mut solver = bars();
        let config = LayoutConfig::default();
        let target = BarEditTarget::InnerSpacing { flat: 0 };
        assert!(!target.apply(&mut solver, PointerPosition::new(90.0, 0.0), &config).unwrap());

        let target = BarEditTarget::InnerSpacing { flat: 1 };
        assert!(target.apply(&mut solver, PointerPosition::new(35.5, 0.0), &config).unwrap());
        assert!((solver.inner_spacing() - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_drag_origin_and_axis() {
        let mut solver = bars();
        let config = LayoutConfig::default();
        assert!(BarEditTarget::Origin
            .apply(&mut solver, PointerPosition::new(40.0, H - 20.0), &config)
            .unwrap());
        let origin = solver.origin();
        assert!((origin.x - 40.0).abs() < TOLERANCE);
        assert!((origin.y - 20.0).abs() < TOLERANCE);

        assert!(!BarEditTarget::AxisHeight
            .apply(&mut solver, PointerPosition::new(0.0, H - 25.0), &config)
            .unwrap());
        assert!(BarEditTarget::AxisHeight
            .apply(&mut solver, PointerPosition::new(0.0, H - 220.0), &config)
            .unwrap());
        assert!((solver.axis_height() - 200.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_pick_candle_targets() {
        let solver = candles();
        // candle a: x 60..80, opening 10, closing 20, wick 5..25, origin y 30
        let screen = |level: f64| H - (level + 30.0);
        assert_eq!(
            CandleEditTarget::pick(&solver, PointerPosition::new(70.0, screen(25.0)), H),
            Some(CandleEditTarget::Maximum { index: 0 })
        );
        assert_eq!(
            CandleEditTarget::pick(&solver, PointerPosition::new(65.0, screen(10.0)), H),
            Some(CandleEditTarget::Opening { index: 0 })
        );
        match CandleEditTarget::pick(&solver, PointerPosition::new(65.0, screen(20.0)), H) {
            Some(CandleEditTarget::Closing {
                index,
                start_y,
                original_height,
            }) => {
                assert_eq!(index, 0);
                assert_eq!(start_y, screen(20.0));
                assert!((original_height - 10.0).abs() < TOLERANCE);
            }
            other => panic!("Expected closing edge, got: {:?}", other),
        }
    }

    #[test]
    fn test_drag_candle_closing_is_relative() {
        let mut solver = candles();
        let config = LayoutConfig::default();
        let target = CandleEditTarget::Closing {
            index: 1,
            start_y: 300.0,
            original_height: -10.0,
        };
        // 25px upward turns the falling candle into a rising one
        assert!(target.apply(&mut solver, PointerPosition::new(0.0, 275.0), &config).unwrap());
        let candle = &solver.candles()[1];
        assert!((candle.body.height() - 15.0).abs() < TOLERANCE);
        assert_eq!(candle.color(), "green");
    }

    #[test]
    fn test_drag_candle_maximum_is_clamped() {
        let mut solver = candles();
        let config = LayoutConfig::default();
        let target = CandleEditTarget::Maximum { index: 0 };
        // Level 3 above the origin, below the body top of 20
        assert!(target.apply(&mut solver, PointerPosition::new(0.0, H - 33.0), &config).unwrap());
        assert!((solver.candles()[0].maximum() - 20.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_drag_candle_width_respects_minimum() {
        let mut solver = candles();
        let config = LayoutConfig::default();
        let target = CandleEditTarget::Width { index: 1 };
        // Right edge of candle b: origin 50 + 2 * spacing 10 + 2 * width
        assert!(target.apply(&mut solver, PointerPosition::new(130.0, 0.0), &config).unwrap());
        assert!((solver.width() - 30.0).abs() < TOLERANCE);
        assert!(!target.apply(&mut solver, PointerPosition::new(75.0, 0.0), &config).unwrap());
    }
}
