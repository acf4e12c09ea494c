//! Constraint-based chart layout engine
//!
//! Chart geometry is never computed directly. Every corner, gap and axis
//! extent is a solver variable; a chart registers its constraints once and
//! afterwards only suggests new values for a fixed set of editable variables.
//! Each suggestion re-solves the whole system and refreshes a plain snapshot
//! ([`Rectangle`], [`Candle`]) that rendering and export code reads.

pub mod bar_solver;
pub mod candle_solver;
pub mod chart;
pub mod config;
pub mod edit;
pub mod error;
pub mod group;
pub mod scale;
pub mod solver;
pub mod types;
pub mod variables;

pub use bar_solver::{interval_scales, BarChartSolver, HistogramBin};
pub use candle_solver::CandlestickChartSolver;
pub use chart::{
    BarChartParams, CandleChartParams, CandleSeed, FrameParams, VariableBarChart,
    VariableCandlestickChart,
};
pub use config::LayoutConfig;
pub use edit::{BarEditTarget, CandleEditTarget, PointerPosition};
pub use error::LayoutError;
pub use group::{BarSeed, RectangleGroup};
pub use scale::{axis_marks, AxisMark, PlotMetadata, ScaleBounds};
pub use solver::{ConstraintSolver, Priority, SolverError};
pub use types::*;
pub use variables::{CandleLevels, LayoutElement};

use std::collections::HashSet;

/// Compute Levenshtein edit distance between two strings
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut previous: Vec<usize> = (0..=n).collect();
    let mut current = vec![0usize; n + 1];
    for i in 1..=m {
        current[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            current[j] = (previous[j] + 1)
                .min(current[j - 1] + 1)
                .min(previous[j - 1] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[n]
}

/// Names within `max_distance` edits of `target`, closest first
pub fn find_similar<'a>(
    names: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let unique: HashSet<&str> = names.into_iter().collect();
    let mut candidates: Vec<(&str, usize)> = unique
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then_some((name, dist))
        })
        .collect();

    candidates.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    candidates
        .into_iter()
        .map(|(name, _)| name.to_string())
        .take(3)
        .collect()
}
