//! Incremental solver for bar charts and histograms

use kasuari::Variable;
use tracing::{debug, trace};

use super::chart::{BarChartParams, FrameParams, VariableBarChart};
use super::config::LayoutConfig;
use super::error::{check_index, LayoutError};
use super::group::BarSeed;
use super::solver::{ConstraintSet, ConstraintSolver};
use super::types::{Point, Rectangle};
use super::variables::LayoutElement;

/// One histogram bin: the interval `[low, high)` and its bar height in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub low: f64,
    pub high: f64,
    pub height: f64,
}

impl HistogramBin {
    pub fn new(low: f64, high: f64, height: f64) -> Self {
        Self { low, high, height }
    }

    pub fn length(&self) -> f64 {
        self.high - self.low
    }
}

/// Bin widths relative to the shortest positive bin
pub fn interval_scales(bins: &[HistogramBin]) -> Vec<f64> {
    let shortest = bins
        .iter()
        .map(HistogramBin::length)
        .filter(|&length| length > 0.0)
        .fold(f64::INFINITY, f64::min);
    let unit = if shortest.is_finite() { shortest } else { 1.0 };
    bins.iter().map(|bin| bin.length() / unit).collect()
}

/// Owns one bar chart and its solver; every geometric edit re-solves
/// and refreshes the cached rectangles before returning.
#[derive(Debug)]
pub struct BarChartSolver {
    chart: VariableBarChart,
    solver: ConstraintSolver,
    data: Vec<Vec<Rectangle>>,
    /// Flattened index to (group, index)
    positions: Vec<(usize, usize)>,
}

impl BarChartSolver {
    pub fn new(params: &BarChartParams, config: &LayoutConfig) -> Result<Self, LayoutError> {
        let chart = VariableBarChart::new(params, config)?;
        let constraints: ConstraintSet = chart.constraints().into_iter().collect();
        let solver = ConstraintSolver::with_setup(&constraints, chart.edit_variables())?;

        let positions = params
            .groups
            .iter()
            .enumerate()
            .flat_map(|(g, seeds)| (0..seeds.len()).map(move |r| (g, r)))
            .collect();

        let data = chart.snapshot(solver.solution());
        debug!(
            groups = params.groups.len(),
            constraints = constraints.len(),
            "bar chart ready"
        );
        Ok(Self {
            chart,
            solver,
            data,
            positions,
        })
    }

    /// A single group with zero inner spacing and widths proportional to bin length
    pub fn histogram(
        bins: &[HistogramBin],
        frame: FrameParams,
        color: impl Into<String>,
        config: &LayoutConfig,
    ) -> Result<Self, LayoutError> {
        if bins.is_empty() {
            return Err(LayoutError::empty_chart("histogram"));
        }
        if let Some(bin) = bins
            .iter()
            .find(|bin| bin.length().is_nan() || bin.length() < 0.0)
        {
            return Err(LayoutError::InvalidInterval {
                low: bin.low,
                high: bin.high,
            });
        }

        let seeds = bins
            .iter()
            .zip(interval_scales(bins))
            .map(|(bin, scale)| BarSeed::new(bin.height, "").with_width_scale(scale))
            .collect();
        let params = BarChartParams::new(vec![seeds])
            .with_frame(frame)
            .with_inner_spacing(0.0)
            .with_color(color);

        let mut solver = Self::new(&params, config)?;
        let intervals: Vec<(f64, f64)> = bins.iter().map(|bin| (bin.low, bin.high)).collect();
        solver.set_interval_values(&intervals)?;
        Ok(solver)
    }

    // ------------------------------------------------------------------
    // Snapshot accessors
    // ------------------------------------------------------------------

    /// Solved rectangles, grouped
    pub fn rectangles(&self) -> &[Vec<Rectangle>] {
        &self.data
    }

    /// Solved rectangles in flattened order
    pub fn rectangles_flat(&self) -> Vec<&Rectangle> {
        self.data.iter().flatten().collect()
    }

    pub fn rectangle(&self, group: usize, index: usize) -> Result<&Rectangle, LayoutError> {
        self.check(group, index)?;
        Ok(&self.data[group][index])
    }

    /// Number of bars over all groups
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Translate a flattened bar index into `(group, index)`
    pub fn locate(&self, flat: usize) -> Result<(usize, usize), LayoutError> {
        self.positions
            .get(flat)
            .copied()
            .ok_or_else(|| LayoutError::out_of_bounds("bar", flat, self.positions.len()))
    }

    /// Translate `(group, index)` into a flattened bar index
    pub fn flat_index(&self, group: usize, index: usize) -> Result<usize, LayoutError> {
        self.check(group, index)?;
        Ok(self.data[..group].iter().map(Vec::len).sum::<usize>() + index)
    }

    /// Width multipliers in flattened order
    pub fn width_scales(&self) -> Vec<f64> {
        self.chart
            .groups()
            .iter()
            .flat_map(|group| group.rectangles().iter().map(|rect| rect.width_scale))
            .collect()
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

    pub fn inner_spacing(&self) -> f64 {
        self.solver.value(self.chart.inner_spacing)
    }

    pub fn axis_height(&self) -> f64 {
        self.solver.value(self.chart.frame.axis_height)
    }

    pub fn name(&self, group: usize, index: usize) -> Result<&str, LayoutError> {
        Ok(&self.rectangle(group, index)?.name)
    }

    // ------------------------------------------------------------------
    // Geometry edits
    // ------------------------------------------------------------------

    pub fn change_width(&mut self, width: f64) -> Result<(), LayoutError> {
        self.suggest(&[(self.chart.frame.width, width)])
    }

    pub fn change_height(&mut self, group: usize, index: usize, height: f64) -> Result<(), LayoutError> {
        self.check(group, index)?;
        let var = self.chart.groups()[group].rectangles()[index].height;
        self.suggest(&[(var, height)])
    }

    pub fn change_spacing(&mut self, spacing: f64) -> Result<(), LayoutError> {
        self.suggest(&[(self.chart.frame.spacing, spacing)])
    }

    pub fn change_inner_spacing(&mut self, inner_spacing: f64) -> Result<(), LayoutError> {
        self.suggest(&[(self.chart.inner_spacing, inner_spacing)])
    }

    pub fn change_origin(&mut self, x: f64, y: f64) -> Result<(), LayoutError> {
        let (origin_x, origin_y) = (self.chart.frame.origin.x, self.chart.frame.origin.y);
        self.suggest(&[(origin_x, x), (origin_y, y)])
    }

    pub fn change_axis_height(&mut self, height: f64) -> Result<(), LayoutError> {
        self.suggest(&[(self.chart.frame.axis_height, height)])
    }

    // ------------------------------------------------------------------
    // Decoration edits, no solving
    // ------------------------------------------------------------------

    pub fn change_color(
        &mut self,
        group: usize,
        index: usize,
        color: impl Into<String>,
    ) -> Result<(), LayoutError> {
        self.check(group, index)?;
        self.chart.change_color(group, index, color);
        self.refresh();
        Ok(())
    }

    pub fn change_name(
        &mut self,
        group: usize,
        index: usize,
        name: impl Into<String>,
    ) -> Result<(), LayoutError> {
        self.check(group, index)?;
        self.chart.change_name(group, index, name);
        self.refresh();
        Ok(())
    }

    /// Label the first group's bar corners with interval bounds
    pub fn set_interval_values(&mut self, intervals: &[(f64, f64)]) -> Result<(), LayoutError> {
        self.chart.set_interval_values(intervals)?;
        self.refresh();
        Ok(())
    }

    fn check(&self, group: usize, index: usize) -> Result<(), LayoutError> {
        check_index("group", group, self.data.len())?;
        check_index("bar", index, self.data[group].len())
    }

    fn suggest(&mut self, suggestions: &[(Variable, f64)]) -> Result<(), LayoutError> {
        self.solver.suggest_all(suggestions)?;
        self.solver.solve();
        self.refresh();
        trace!(suggestions = suggestions.len(), "bar chart re-solved");
        Ok(())
    }

    fn refresh(&mut self) {
        self.data = self.chart.snapshot(self.solver.solution());
    }
}
