//! Chart sessions: one solved chart, its plot metadata and edit replay

use tracing::{debug, warn};

use crate::description::{ChartDescription, ChartKind, EditCommand, ElementRef};
use crate::layout::{
    find_similar, BarChartParams, BarChartSolver, BarEditTarget, BarSeed, CandleChartParams,
    CandleEditTarget, CandleLevels, CandleSeed, CandlestickChartSolver, FrameParams,
    HistogramBin, LayoutConfig, LayoutError, PlotMetadata, PointerPosition,
};
use crate::palette::Palette;

/// Largest edit distance for name suggestions
const SUGGESTION_DISTANCE: usize = 2;

/// The solver behind a chart
#[derive(Debug)]
pub enum ChartBody {
    Bar(BarChartSolver),
    Histogram(BarChartSolver),
    Candlestick(CandlestickChartSolver),
}

/// A solved chart together with the raw/pixel mapping it was built with
#[derive(Debug)]
pub struct Chart {
    metadata: PlotMetadata,
    config: LayoutConfig,
    body: ChartBody,
    /// Element whose value the last edit changed (flattened for bars)
    edited: Option<usize>,
}

impl Chart {
    pub fn bar(
        params: &BarChartParams,
        metadata: PlotMetadata,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        let solver = BarChartSolver::new(params, &config)?;
        Ok(Self::with_body(ChartBody::Bar(solver), metadata, config))
    }

    pub fn histogram(
        bins: &[HistogramBin],
        frame: FrameParams,
        color: impl Into<String>,
        metadata: PlotMetadata,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        let solver = BarChartSolver::histogram(bins, frame, color, &config)?;
        Ok(Self::with_body(ChartBody::Histogram(solver), metadata, config))
    }

    pub fn candlestick(
        params: &CandleChartParams,
        metadata: PlotMetadata,
        config: LayoutConfig,
    ) -> Result<Self, LayoutError> {
        let solver = CandlestickChartSolver::new(params, &config)?;
        Ok(Self::with_body(ChartBody::Candlestick(solver), metadata, config))
    }

    fn with_body(body: ChartBody, metadata: PlotMetadata, config: LayoutConfig) -> Self {
        Self {
            metadata,
            config,
            body,
            edited: None,
        }
    }

    /// Scale the description's raw data and build the matching chart.
    ///
    /// Colours come from `palette`. The description's edits are not applied.
    pub fn from_description(
        description: &ChartDescription,
        palette: &Palette,
        base: &LayoutConfig,
    ) -> Result<Self, LayoutError> {
        let config = description.layout_config(base);
        let frame = description.frame();
        let labelled = |metadata: PlotMetadata| {
            metadata.with_labels(
                &description.title,
                &description.x_label,
                &description.y_label,
            )
        };

        match description.kind() {
            ChartKind::Bar => {
                let metadata = labelled(PlotMetadata::for_series(
                    description
                        .groups
                        .iter()
                        .flat_map(|g| g.values.iter().copied()),
                    0.0,
                    config.canvas_height,
                    config.scale_bounds,
                ));
                let groups = description
                    .groups
                    .iter()
                    .enumerate()
                    .map(|(g, group)| {
                        group
                            .values
                            .iter()
                            .enumerate()
                            .map(|(i, &value)| {
                                BarSeed::new(metadata.to_pixels(value), description.bar_name(g, i))
                            })
                            .collect()
                    })
                    .collect();
                let mut params = BarChartParams::new(groups)
                    .with_frame(frame)
                    .with_color(palette.bar());
                if let Some(inner) = description.inner_spacing {
                    params = params.with_inner_spacing(inner);
                }
                Self::bar(&params, metadata, config)
            }
            ChartKind::Histogram => {
                let metadata = labelled(PlotMetadata::for_series(
                    description.bins.iter().map(|b| b.count),
                    0.0,
                    config.canvas_height,
                    config.scale_bounds,
                ));
                if description.inner_spacing.is_some() {
                    warn!("inner_spacing is ignored for histograms");
                }
                let bins: Vec<HistogramBin> = description
                    .bins
                    .iter()
                    .map(|b| HistogramBin::new(b.low, b.high, metadata.to_pixels(b.count)))
                    .collect();
                Self::histogram(&bins, frame, palette.bar(), metadata, config)
            }
            ChartKind::Candlestick => {
                let metadata = labelled(PlotMetadata::for_series(
                    description
                        .candles
                        .iter()
                        .flat_map(|c| [c.open, c.close, c.low, c.high]),
                    description.x_axis_value,
                    config.canvas_height,
                    config.scale_bounds,
                ));
                let candles = description
                    .candles
                    .iter()
                    .map(|c| {
                        CandleSeed::new(
                            c.name.clone(),
                            CandleLevels::new(
                                metadata.to_pixels(c.open),
                                metadata.to_pixels(c.close),
                                metadata.to_pixels(c.low),
                                metadata.to_pixels(c.high),
                            ),
                        )
                    })
                    .collect();
                let params = CandleChartParams::new(candles)
                    .with_frame(frame)
                    .with_colors(palette.positive(), palette.negative());
                Self::candlestick(&params, metadata, config)
            }
        }
    }

    pub fn kind(&self) -> ChartKind {
        match self.body {
            ChartBody::Bar(_) => ChartKind::Bar,
            ChartBody::Histogram(_) => ChartKind::Histogram,
            ChartBody::Candlestick(_) => ChartKind::Candlestick,
        }
    }

    pub fn metadata(&self) -> &PlotMetadata {
        &self.metadata
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn body(&self) -> &ChartBody {
        &self.body
    }

    /// Element whose value the last edit changed
    pub fn edited(&self) -> Option<usize> {
        self.edited
    }

    pub fn change_title(&mut self, title: impl Into<String>) {
        self.metadata.title = title.into();
    }

    /// Replay edits in order, stopping at the first failure
    pub fn apply_all<'a>(
        &mut self,
        edits: impl IntoIterator<Item = &'a EditCommand>,
    ) -> Result<(), LayoutError> {
        for edit in edits {
            self.apply(edit)?;
        }
        Ok(())
    }

    /// Apply one edit; a failed edit leaves the chart as it was
    pub fn apply(&mut self, edit: &EditCommand) -> Result<(), LayoutError> {
        debug!(op = edit.op(), chart = self.kind().as_str(), "applying edit");
        let edited = match &mut self.body {
            ChartBody::Bar(solver) => {
                apply_to_bars(solver, ChartKind::Bar, edit, &self.metadata, &self.config)?
            }
            ChartBody::Histogram(solver) => {
                apply_to_bars(solver, ChartKind::Histogram, edit, &self.metadata, &self.config)?
            }
            ChartBody::Candlestick(solver) => {
                apply_to_candles(solver, edit, &self.metadata, &self.config)?
            }
        };
        if let EditCommand::Title { value } = edit {
            self.metadata.title = value.clone();
        }
        self.edited = edited;
        Ok(())
    }
}

fn unsupported(edit: &EditCommand, chart: ChartKind) -> LayoutError {
    LayoutError::UnsupportedEdit {
        edit: edit.op(),
        chart: chart.as_str(),
    }
}

fn missing_reference(what: &'static str) -> LayoutError {
    LayoutError::unknown(what, "", Vec::new())
}

/// `(group, index)` of the bar an edit addresses
fn bar_position(solver: &BarChartSolver, at: ElementRef<'_>) -> Result<(usize, usize), LayoutError> {
    if let Some(name) = at.name {
        return solver
            .rectangles()
            .iter()
            .enumerate()
            .find_map(|(g, bars)| bars.iter().position(|r| r.name == name).map(|i| (g, i)))
            .ok_or_else(|| {
                let names = solver.rectangles().iter().flatten().map(|r| r.name.as_str());
                LayoutError::unknown("bar", name, find_similar(names, name, SUGGESTION_DISTANCE))
            });
    }
    let index = at.index.ok_or_else(|| missing_reference("bar"))?;
    let group = at.group.unwrap_or(0);
    solver.flat_index(group, index)?;
    Ok((group, index))
}

fn candle_index(solver: &CandlestickChartSolver, at: ElementRef<'_>) -> Result<usize, LayoutError> {
    if let Some(name) = at.name {
        return solver
            .candles()
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| {
                let names = solver.candles().iter().map(|c| c.name());
                LayoutError::unknown("candle", name, find_similar(names, name, SUGGESTION_DISTANCE))
            });
    }
    let index = at.index.ok_or_else(|| missing_reference("candle"))?;
    solver.candle(index)?;
    Ok(index)
}

fn pointer(position: &[f64; 2]) -> PointerPosition {
    PointerPosition::new(position[0], position[1])
}

/// Returns the flattened index of the bar whose value changed, if any
fn apply_to_bars(
    solver: &mut BarChartSolver,
    kind: ChartKind,
    edit: &EditCommand,
    metadata: &PlotMetadata,
    config: &LayoutConfig,
) -> Result<Option<usize>, LayoutError> {
    let element = edit.element();
    match edit {
        EditCommand::Width { value } => solver.change_width(*value)?,
        EditCommand::Spacing { value } => solver.change_spacing(*value)?,
        EditCommand::InnerSpacing { value } if kind == ChartKind::Bar => {
            solver.change_inner_spacing(*value)?
        }
        EditCommand::Origin { x, y } => solver.change_origin(*x, *y)?,
        EditCommand::AxisHeight { value } => {
            solver.change_axis_height(metadata.to_pixels(*value))?
        }
        EditCommand::Height { value, .. } => {
            let (group, index) = bar_position(solver, element.unwrap_or_default())?;
            solver.change_height(group, index, metadata.to_pixels(*value))?;
            return Ok(Some(solver.flat_index(group, index)?));
        }
        EditCommand::Color { color, .. } => {
            let (group, index) = bar_position(solver, element.unwrap_or_default())?;
            solver.change_color(group, index, color.as_str())?;
        }
        EditCommand::Name { new_name, .. } => {
            let (group, index) = bar_position(solver, element.unwrap_or_default())?;
            solver.change_name(group, index, new_name.as_str())?;
        }
        EditCommand::Title { .. } => {}
        EditCommand::Drag { from, to } => {
            let Some(target) = BarEditTarget::pick(solver, pointer(from), config.canvas_height)
            else {
                warn!(x = from[0], y = from[1], "nothing to drag");
                return Ok(None);
            };
            if kind == ChartKind::Histogram && matches!(target, BarEditTarget::InnerSpacing { .. }) {
                return Err(LayoutError::UnsupportedEdit {
                    edit: "inner_spacing",
                    chart: kind.as_str(),
                });
            }
            let applied = target.apply(solver, pointer(to), config)?;
            if applied && matches!(target, BarEditTarget::Height { .. }) {
                return Ok(target.index());
            }
        }
        _ => return Err(unsupported(edit, kind)),
    }
    Ok(None)
}

/// Returns the index of the candle whose levels changed, if any
fn apply_to_candles(
    solver: &mut CandlestickChartSolver,
    edit: &EditCommand,
    metadata: &PlotMetadata,
    config: &LayoutConfig,
) -> Result<Option<usize>, LayoutError> {
    let element = edit.element();
    match edit {
        EditCommand::Width { value } => solver.change_width(*value)?,
        EditCommand::Spacing { value } => solver.change_spacing(*value)?,
        EditCommand::Origin { x, y } => solver.change_origin(*x, *y)?,
        EditCommand::AxisHeight { value } => {
            solver.change_axis_height(metadata.to_pixels(*value))?
        }
        EditCommand::Height { value, .. } => {
            let index = candle_index(solver, element.unwrap_or_default())?;
            solver.change_height(index, value * metadata.scale_factor())?;
            return Ok(Some(index));
        }
        EditCommand::Opening { value, .. } => {
            let index = candle_index(solver, element.unwrap_or_default())?;
            solver.change_opening(index, metadata.to_pixels(*value))?;
            return Ok(Some(index));
        }
        EditCommand::Minimum { value, .. } => {
            let index = candle_index(solver, element.unwrap_or_default())?;
            solver.change_minimum(index, metadata.to_pixels(*value))?;
            return Ok(Some(index));
        }
        EditCommand::Maximum { value, .. } => {
            let index = candle_index(solver, element.unwrap_or_default())?;
            solver.change_maximum(index, metadata.to_pixels(*value))?;
            return Ok(Some(index));
        }
        EditCommand::Name { new_name, .. } => {
            let index = candle_index(solver, element.unwrap_or_default())?;
            solver.change_name(index, new_name.as_str())?;
        }
        EditCommand::ToggleName { .. } => {
            let index = candle_index(solver, element.unwrap_or_default())?;
            solver.switch_name_visibility(index)?;
        }
        EditCommand::PositiveColor { color } => solver.change_positive_color(color),
        EditCommand::NegativeColor { color } => solver.change_negative_color(color),
        EditCommand::Title { .. } => {}
        EditCommand::Drag { from, to } => {
            let Some(target) =
                CandleEditTarget::pick(solver, pointer(from), config.canvas_height)
            else {
                warn!(x = from[0], y = from[1], "nothing to drag");
                return Ok(None);
            };
            let applied = target.apply(solver, pointer(to), config)?;
            let changes_level = matches!(
                target,
                CandleEditTarget::Closing { .. }
                    | CandleEditTarget::Opening { .. }
                    | CandleEditTarget::Minimum { .. }
                    | CandleEditTarget::Maximum { .. }
            );
            if applied && changes_level {
                return Ok(target.index());
            }
        }
        _ => return Err(unsupported(edit, ChartKind::Candlestick)),
    }
    Ok(None)
}
