//! Whole-chart variable models
//!
//! A chart owns the chart-wide variables (width, spacing, origin, axis height)
//! and chains its groups or candles to them. It also declares which variables
//! are editable and what each one is suggested at construction.

use kasuari::Variable;

use super::config::LayoutConfig;
use super::error::LayoutError;
use super::group::{BarSeed, RectangleGroup};
use super::solver::{ChartConstraint, ConstraintSource, EditVariable, Priority, Solution};
use super::types::{Candle, Rectangle};
use super::variables::{CandleLevels, LayoutElement, VariableCandle, VariablePoint};

/// Initial chart-wide geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub width: f64,
    pub spacing: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            width: 10.0,
            spacing: 10.0,
            origin_x: 50.0,
            origin_y: 30.0,
        }
    }
}

impl FrameParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }
}

// ============================================================================
// ChartFrame
// ============================================================================

/// Variables and constraints shared by every chart kind
#[derive(Debug, Clone)]
pub struct ChartFrame {
    pub width: Variable,
    pub spacing: Variable,
    pub origin: VariablePoint,
    pub axis_height: Variable,
    constraints: Vec<ChartConstraint>,
}

impl ChartFrame {
    fn new(params: &FrameParams, config: &LayoutConfig) -> Self {
        let width = Variable::new();
        let spacing = Variable::new();
        let origin = VariablePoint::new();
        let axis_height = Variable::new();

        let constraints = vec![
            ChartConstraint::at_least(
                width,
                config.minimal_width,
                Priority::Required,
                ConstraintSource::floor(format!("width >= {}", config.minimal_width)),
            ),
            ChartConstraint::at_least(
                spacing,
                0.0,
                Priority::Required,
                ConstraintSource::floor("spacing >= 0"),
            ),
            ChartConstraint::at_least(
                origin.x,
                0.0,
                Priority::Required,
                ConstraintSource::floor("origin.x >= 0"),
            ),
            ChartConstraint::at_least(
                origin.y,
                0.0,
                Priority::Required,
                ConstraintSource::floor("origin.y >= 0"),
            ),
            ChartConstraint::at_least(
                axis_height,
                0.0,
                Priority::Required,
                ConstraintSource::floor("axis height >= 0"),
            ),
            ChartConstraint::equal(
                width,
                params.width,
                Priority::Strong,
                ConstraintSource::target(format!("width = {}", params.width)),
            ),
            ChartConstraint::equal(
                spacing,
                params.spacing,
                Priority::Strong,
                ConstraintSource::target(format!("spacing = {}", params.spacing)),
            ),
            ChartConstraint::equal(
                origin.x,
                params.origin_x,
                Priority::Strong,
                ConstraintSource::target(format!("origin.x = {}", params.origin_x)),
            ),
            ChartConstraint::equal(
                origin.y,
                params.origin_y,
                Priority::Strong,
                ConstraintSource::target(format!("origin.y = {}", params.origin_y)),
            ),
        ];

        Self {
            width,
            spacing,
            origin,
            axis_height,
            constraints,
        }
    }

    fn edit_variables(&self, params: &FrameParams) -> Vec<EditVariable> {
        vec![
            EditVariable::new(self.width, "width", params.width),
            EditVariable::new(self.spacing, "spacing", params.spacing),
            EditVariable::new(self.origin.x, "origin.x", params.origin_x),
            EditVariable::new(self.origin.y, "origin.y", params.origin_y),
        ]
    }
}

// ============================================================================
// VariableBarChart
// ============================================================================

/// Construction parameters of a bar chart, in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartParams {
    pub frame: FrameParams,
    pub inner_spacing: f64,
    pub groups: Vec<Vec<BarSeed>>,
    pub color: String,
}

impl BarChartParams {
    pub fn new(groups: Vec<Vec<BarSeed>>) -> Self {
        Self {
            frame: FrameParams::default(),
            inner_spacing: 0.0,
            groups,
            color: "blue".to_string(),
        }
    }

    /// One group of unnamed bars
    pub fn single_group(heights: &[f64]) -> Self {
        Self::new(vec![heights.iter().map(|&h| BarSeed::new(h, "")).collect()])
    }

    pub fn with_frame(mut self, frame: FrameParams) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.frame.width = width;
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.frame.spacing = spacing;
        self
    }

    pub fn with_inner_spacing(mut self, inner_spacing: f64) -> Self {
        self.inner_spacing = inner_spacing;
        self
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.frame.origin_x = x;
        self.frame.origin_y = y;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Groups of bars chained by spacing, all standing on the origin's baseline
#[derive(Debug, Clone)]
pub struct VariableBarChart {
    pub frame: ChartFrame,
    pub inner_spacing: Variable,
    groups: Vec<RectangleGroup>,
    constraints: Vec<ChartConstraint>,
    edit_variables: Vec<EditVariable>,
}

impl VariableBarChart {
    pub fn new(params: &BarChartParams, config: &LayoutConfig) -> Result<Self, LayoutError> {
        if params.groups.is_empty() {
            return Err(LayoutError::empty_chart("bar"));
        }

        let frame = ChartFrame::new(&params.frame, config);
        let inner_spacing = Variable::new();

        let mut groups = params
            .groups
            .iter()
            .enumerate()
            .map(|(index, seeds)| {
                RectangleGroup::new(index, frame.width, inner_spacing, seeds, &params.color)
            })
            .collect::<Result<Vec<_>, _>>()?;

        for i in 1..groups.len() {
            let previous_right = groups[i - 1].right_most_x();
            let current = &mut groups[i];
            current.set_left_spacing(ChartConstraint::equal(
                previous_right + frame.spacing,
                current.left_most_x(),
                Priority::Required,
                ConstraintSource::adjacency(format!(
                    "group {i} left = group {} right + spacing",
                    i - 1
                )),
            ));
        }

        let mut constraints = vec![
            ChartConstraint::at_least(
                inner_spacing,
                0.0,
                Priority::Required,
                ConstraintSource::floor("inner spacing >= 0"),
            ),
            ChartConstraint::equal(
                inner_spacing,
                params.inner_spacing,
                Priority::Strong,
                ConstraintSource::target(format!("inner spacing = {}", params.inner_spacing)),
            ),
            ChartConstraint::equal(
                groups[0].left_most_x(),
                frame.origin.x + frame.spacing,
                Priority::Required,
                ConstraintSource::adjacency("group 0 left = origin.x + spacing"),
            ),
            ChartConstraint::equal(
                groups[0].bottom_y(),
                frame.origin.y,
                Priority::Required,
                ConstraintSource::adjacency("group 0 bottom = origin.y"),
            ),
        ];
        for i in 1..groups.len() {
            constraints.push(ChartConstraint::equal(
                groups[i - 1].bottom_y(),
                groups[i].bottom_y(),
                Priority::Required,
                ConstraintSource::adjacency(format!("group {i} shares baseline")),
            ));
        }

        let mut edit_variables = frame.edit_variables(&params.frame);
        edit_variables.push(EditVariable::new(
            inner_spacing,
            "inner spacing",
            params.inner_spacing,
        ));
        let mut tallest = f64::NEG_INFINITY;
        for (g, seeds) in params.groups.iter().enumerate() {
            for (r, seed) in seeds.iter().enumerate() {
                tallest = tallest.max(seed.height);
                edit_variables.push(EditVariable::new(
                    groups[g].rectangles()[r].height,
                    format!("group {g} bar {r} height"),
                    seed.height,
                ));
            }
        }
        edit_variables.push(EditVariable::new(
            frame.axis_height,
            "axis height",
            tallest + config.axis_headroom,
        ));

        Ok(Self {
            frame,
            inner_spacing,
            groups,
            constraints,
            edit_variables,
        })
    }

    pub fn groups(&self) -> &[RectangleGroup] {
        &self.groups
    }

    pub fn edit_variables(&self) -> &[EditVariable] {
        &self.edit_variables
    }

    /// Attach interval bounds to the corners of the first group's bars
    pub fn set_interval_values(&mut self, intervals: &[(f64, f64)]) -> Result<(), LayoutError> {
        let bars = self.groups[0].rectangles_mut();
        if intervals.len() != bars.len() {
            return Err(LayoutError::mismatched("intervals", bars.len(), intervals.len()));
        }
        for (bar, &(low, high)) in bars.iter_mut().zip(intervals) {
            bar.left_bottom.secondary_label = Some(low.to_string());
            bar.right_top.secondary_label = Some(high.to_string());
        }
        Ok(())
    }

    /// Indices must already be checked against the groups
    pub(crate) fn change_color(&mut self, group: usize, index: usize, color: impl Into<String>) {
        self.groups[group].rectangles_mut()[index].color = color.into();
    }

    pub(crate) fn change_name(&mut self, group: usize, index: usize, name: impl Into<String>) {
        self.groups[group].rectangles_mut()[index].name = name.into();
    }
}

impl LayoutElement for VariableBarChart {
    type Snapshot = Vec<Vec<Rectangle>>;

    fn constraints(&self) -> Vec<ChartConstraint> {
        let mut constraints: Vec<ChartConstraint> = self
            .groups
            .iter()
            .flat_map(|group| group.constraints())
            .collect();
        constraints.extend(self.frame.constraints.iter().cloned());
        constraints.extend(self.constraints.iter().cloned());
        constraints
    }

    fn snapshot(&self, solution: &Solution) -> Vec<Vec<Rectangle>> {
        self.groups
            .iter()
            .map(|group| group.snapshot(solution))
            .collect()
    }
}

// ============================================================================
// VariableCandlestickChart
// ============================================================================

/// Initial data of one candle, in pixels above the x axis
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeed {
    pub name: String,
    pub levels: CandleLevels,
}

impl CandleSeed {
    pub fn new(name: impl Into<String>, levels: CandleLevels) -> Self {
        Self {
            name: name.into(),
            levels,
        }
    }
}

/// Construction parameters of a candlestick chart, in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct CandleChartParams {
    pub frame: FrameParams,
    pub candles: Vec<CandleSeed>,
    pub positive_color: String,
    pub negative_color: String,
}

impl CandleChartParams {
    pub fn new(candles: Vec<CandleSeed>) -> Self {
        Self {
            frame: FrameParams::default(),
            candles,
            positive_color: "green".to_string(),
            negative_color: "red".to_string(),
        }
    }

    pub fn with_frame(mut self, frame: FrameParams) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_colors(mut self, positive: impl Into<String>, negative: impl Into<String>) -> Self {
        self.positive_color = positive.into();
        self.negative_color = negative.into();
        self
    }
}

/// Candles chained by spacing from the origin
#[derive(Debug, Clone)]
pub struct VariableCandlestickChart {
    pub frame: ChartFrame,
    candles: Vec<VariableCandle>,
    constraints: Vec<ChartConstraint>,
    edit_variables: Vec<EditVariable>,
}

impl VariableCandlestickChart {
    pub fn new(params: &CandleChartParams, config: &LayoutConfig) -> Result<Self, LayoutError> {
        if params.candles.is_empty() {
            return Err(LayoutError::empty_chart("candlestick"));
        }

        let frame = ChartFrame::new(&params.frame, config);
        let mut candles: Vec<VariableCandle> = params
            .candles
            .iter()
            .map(|seed| {
                VariableCandle::new(
                    frame.width,
                    seed.levels,
                    &seed.name,
                    &params.positive_color,
                    &params.negative_color,
                )
            })
            .collect();

        let first_left = candles[0].opening_corner().x;
        candles[0].body.set_left_spacing(ChartConstraint::equal(
            first_left,
            frame.origin.x + frame.spacing,
            Priority::Required,
            ConstraintSource::adjacency("candle 0 left = origin.x + spacing"),
        ));
        for i in 1..candles.len() {
            let previous_right = candles[i - 1].closing_corner().x;
            let current = &mut candles[i];
            let current_left = current.opening_corner().x;
            current.body.set_left_spacing(ChartConstraint::equal(
                previous_right + frame.spacing,
                current_left,
                Priority::Required,
                ConstraintSource::adjacency(format!(
                    "candle {i} left = candle {} right + spacing",
                    i - 1
                )),
            ));
        }

        let constraints = vec![ChartConstraint::at_least(
            first_left,
            frame.origin.x,
            Priority::Required,
            ConstraintSource::adjacency("candle 0 left >= origin.x"),
        )];

        let mut edit_variables = frame.edit_variables(&params.frame);
        let mut highest = f64::NEG_INFINITY;
        for (i, (candle, seed)) in candles.iter().zip(&params.candles).enumerate() {
            let levels = seed.levels;
            highest = highest.max(levels.maximum);
            edit_variables.push(EditVariable::new(
                candle.body.height,
                format!("candle {i} height"),
                levels.closing - levels.opening,
            ));
            edit_variables.push(
                EditVariable::new(candle.wick_bottom.y, format!("candle {i} minimum"), levels.minimum)
                    .soft(),
            );
            edit_variables.push(
                EditVariable::new(candle.wick_top.y, format!("candle {i} maximum"), levels.maximum)
                    .soft(),
            );
            edit_variables.push(EditVariable::new(
                candle.opening_corner().y,
                format!("candle {i} opening"),
                levels.opening,
            ));
        }
        edit_variables.push(EditVariable::new(frame.axis_height, "axis height", highest.max(0.0)));

        Ok(Self {
            frame,
            candles,
            constraints,
            edit_variables,
        })
    }

    pub fn candles(&self) -> &[VariableCandle] {
        &self.candles
    }

    pub fn edit_variables(&self) -> &[EditVariable] {
        &self.edit_variables
    }

    pub fn change_positive_color(&mut self, color: &str) {
        for candle in &mut self.candles {
            candle.positive_color = color.to_string();
        }
    }

    pub fn change_negative_color(&mut self, color: &str) {
        for candle in &mut self.candles {
            candle.negative_color = color.to_string();
        }
    }

    /// `index` must already be checked against the candles
    pub(crate) fn switch_name_visibility(&mut self, index: usize) {
        self.candles[index].switch_name_visibility();
    }

    pub(crate) fn change_name(&mut self, index: usize, name: impl Into<String>) {
        self.candles[index].body.name = name.into();
    }
}

impl LayoutElement for VariableCandlestickChart {
    type Snapshot = Vec<Candle>;

    fn constraints(&self) -> Vec<ChartConstraint> {
        let mut constraints: Vec<ChartConstraint> = self
            .candles
            .iter()
            .flat_map(|candle| candle.constraints())
            .collect();
        constraints.extend(self.frame.constraints.iter().cloned());
        constraints.extend(self.constraints.iter().cloned());
        constraints
    }

    fn snapshot(&self, solution: &Solution) -> Vec<Candle> {
        self.candles
            .iter()
            .map(|candle| candle.snapshot(solution))
            .collect()
    }
}
