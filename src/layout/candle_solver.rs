//! Incremental solver for candlestick charts

use kasuari::Variable;
use tracing::{debug, trace};

use super::chart::{CandleChartParams, VariableCandlestickChart};
use super::config::LayoutConfig;
use super::error::{check_index, LayoutError};
use super::solver::{ConstraintSet, ConstraintSolver};
use super::types::{Candle, Point};
use super::variables::LayoutElement;

/// Owns one candlestick chart and its solver
#[derive(Debug)]
pub struct CandlestickChartSolver {
    chart: VariableCandlestickChart,
    solver: ConstraintSolver,
    data: Vec<Candle>,
}

impl CandlestickChartSolver {
    pub fn new(params: &CandleChartParams, config: &LayoutConfig) -> Result<Self, LayoutError> {
        let chart = VariableCandlestickChart::new(params, config)?;
        let constraints: ConstraintSet = chart.constraints().into_iter().collect();
        let solver = ConstraintSolver::with_setup(&constraints, chart.edit_variables())?;
        let data = chart.snapshot(solver.solution());
        debug!(
            candles = params.candles.len(),
            constraints = constraints.len(),
            "candlestick chart ready"
        );
        Ok(Self {
            chart,
            solver,
            data,
        })
    }

    /// Solved candles, in chart order
    pub fn candles(&self) -> &[Candle] {
        &self.data
    }

    pub fn candle(&self, index: usize) -> Result<&Candle, LayoutError> {
        self.check(index)?;
        Ok(&self.data[index])
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn origin(&self) -> Point {
        self.chart.frame.origin.value(self.solver.solution())
    }

    pub fn width(&self) -> f64 {
        self.solver.value(self.chart.frame.width)
    }

    pub fn spacing(&self) -> f64 {
        self.solver.value(self.chart.frame.spacing)
    }

    pub fn axis_height(&self) -> f64 {
        self.solver.value(self.chart.frame.axis_height)
    }

    pub fn name(&self, index: usize) -> Result<&str, LayoutError> {
        Ok(self.candle(index)?.name())
    }

    /// Lowest wick level, or zero when every candle sits above the x axis
    pub fn lowest_level(&self) -> f64 {
        self.data
            .iter()
            .map(Candle::minimum)
            .fold(0.0, f64::min)
    }

    // ------------------------------------------------------------------
    // Geometry edits
    // ------------------------------------------------------------------

    pub fn change_width(&mut self, width: f64) -> Result<(), LayoutError> {
        self.suggest(&[(self.chart.frame.width, width)])
    }

    pub fn change_spacing(&mut self, spacing: f64) -> Result<(), LayoutError> {
        self.suggest(&[(self.chart.frame.spacing, spacing)])
    }

    pub fn change_origin(&mut self, x: f64, y: f64) -> Result<(), LayoutError> {
        let (origin_x, origin_y) = (self.chart.frame.origin.x, self.chart.frame.origin.y);
        self.suggest(&[(origin_x, x), (origin_y, y)])
    }

    pub fn change_axis_height(&mut self, height: f64) -> Result<(), LayoutError> {
        self.suggest(&[(self.chart.frame.axis_height, height)])
    }

    /// Signed body height: `closing - opening`
    pub fn change_height(&mut self, index: usize, height: f64) -> Result<(), LayoutError> {
        self.check(index)?;
        let var = self.chart.candles()[index].body.height;
        self.suggest(&[(var, height)])
    }

    pub fn change_opening(&mut self, index: usize, level: f64) -> Result<(), LayoutError> {
        self.check(index)?;
        let var = self.chart.candles()[index].opening_corner().y;
        self.suggest(&[(var, level)])
    }

    /// Move the wick bottom, never above the current body bottom
    pub fn change_minimum(&mut self, index: usize, level: f64) -> Result<(), LayoutError> {
        self.check(index)?;
        let body_bottom = self.data[index].body.bottom();
        let clamped = level.min(body_bottom);
        if clamped != level {
            debug!(index, requested = level, clamped, "minimum clamped to body");
        }
        let var = self.chart.candles()[index].wick_bottom.y;
        self.suggest(&[(var, clamped)])
    }

    /// Move the wick top, never below the current body top
    pub fn change_maximum(&mut self, index: usize, level: f64) -> Result<(), LayoutError> {
        self.check(index)?;
        let body_top = self.data[index].body.top();
        let clamped = level.max(body_top);
        if clamped != level {
            debug!(index, requested = level, clamped, "maximum clamped to body");
        }
        let var = self.chart.candles()[index].wick_top.y;
        self.suggest(&[(var, clamped)])
    }

    // ------------------------------------------------------------------
    // Decoration edits, no solving
    // ------------------------------------------------------------------

    pub fn switch_name_visibility(&mut self, index: usize) -> Result<(), LayoutError> {
        self.check(index)?;
        self.chart.switch_name_visibility(index);
        self.refresh();
        Ok(())
    }

    pub fn change_name(&mut self, index: usize, name: impl Into<String>) -> Result<(), LayoutError> {
        self.check(index)?;
        self.chart.change_name(index, name);
        self.refresh();
        Ok(())
    }

    /// Colour of every rising candle
    pub fn change_positive_color(&mut self, color: &str) {
        self.chart.change_positive_color(color);
        self.refresh();
    }

    /// Colour of every falling candle
    pub fn change_negative_color(&mut self, color: &str) {
        self.chart.change_negative_color(color);
        self.refresh();
    }

    fn check(&self, index: usize) -> Result<(), LayoutError> {
        check_index("candle", index, self.data.len())
    }

    fn suggest(&mut self, suggestions: &[(Variable, f64)]) -> Result<(), LayoutError> {
        self.solver.suggest_all(suggestions)?;
        self.solver.solve();
        self.refresh();
        trace!(suggestions = suggestions.len(), "candlestick chart re-solved");
        Ok(())
    }

    fn refresh(&mut self) {
        self.data = self.chart.snapshot(self.solver.solution());
    }
}
