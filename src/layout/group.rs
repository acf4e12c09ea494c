//! Rectangle groups: bars chained by one shared inner spacing

use kasuari::Variable;

use super::error::LayoutError;
use super::solver::{ChartConstraint, ConstraintSource, Priority, Solution};
use super::types::Rectangle;
use super::variables::{LayoutElement, VariableRectangle};

/// Initial data of one bar inside a group
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeed {
    pub height: f64,
    pub name: String,
    pub width_scale: f64,
}

impl BarSeed {
    pub fn new(height: f64, name: impl Into<String>) -> Self {
        Self {
            height,
            name: name.into(),
            width_scale: 1.0,
        }
    }

    pub fn with_width_scale(mut self, width_scale: f64) -> Self {
        self.width_scale = width_scale;
        self
    }
}

/// Bars sharing one baseline, chained left to right by `inner_spacing`
#[derive(Debug, Clone)]
pub struct RectangleGroup {
    rectangles: Vec<VariableRectangle>,
    inner_spacing: Variable,
    baselines: Vec<ChartConstraint>,
    left_spacing: Option<ChartConstraint>,
}

impl RectangleGroup {
    pub fn new(
        index: usize,
        width: Variable,
        inner_spacing: Variable,
        seeds: &[BarSeed],
        color: &str,
    ) -> Result<Self, LayoutError> {
        if seeds.is_empty() {
            return Err(LayoutError::EmptyGroup { group: index });
        }

        let mut rectangles: Vec<VariableRectangle> = seeds
            .iter()
            .map(|seed| {
                VariableRectangle::new(width, seed.height, &seed.name, color, seed.width_scale)
            })
            .collect();

        let mut baselines = Vec::with_capacity(rectangles.len() - 1);
        for i in 1..rectangles.len() {
            let (before, after) = rectangles.split_at_mut(i);
            let previous = &before[i - 1];
            let current = &mut after[0];
            current.set_left_spacing(ChartConstraint::equal(
                previous.right_top.x + inner_spacing,
                current.left_bottom.x,
                Priority::Required,
                ConstraintSource::adjacency(format!(
                    "group {index}: bar {i} left = bar {} right + inner spacing",
                    i - 1
                )),
            ));
            baselines.push(ChartConstraint::equal(
                previous.left_bottom.y,
                current.left_bottom.y,
                Priority::Required,
                ConstraintSource::adjacency(format!("group {index}: bar {i} shares baseline")),
            ));
        }

        Ok(Self {
            rectangles,
            inner_spacing,
            baselines,
            left_spacing: None,
        })
    }

    /// Left edge of the first bar
    pub fn left_most_x(&self) -> Variable {
        self.rectangles[0].left_bottom.x
    }

    /// Right edge of the last bar
    pub fn right_most_x(&self) -> Variable {
        self.rectangles[self.rectangles.len() - 1].right_top.x
    }

    /// Shared baseline
    pub fn bottom_y(&self) -> Variable {
        self.rectangles[0].left_bottom.y
    }

    pub fn inner_spacing(&self) -> Variable {
        self.inner_spacing
    }

    /// Tie the group's left edge to the previous group or the origin
    pub fn set_left_spacing(&mut self, constraint: ChartConstraint) {
        self.left_spacing = Some(constraint);
    }

    pub fn rectangles(&self) -> &[VariableRectangle] {
        &self.rectangles
    }

    pub fn rectangles_mut(&mut self) -> &mut [VariableRectangle] {
        &mut self.rectangles
    }

    pub fn len(&self) -> usize {
        self.rectangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }
}

impl LayoutElement for RectangleGroup {
    type Snapshot = Vec<Rectangle>;

    fn constraints(&self) -> Vec<ChartConstraint> {
        let mut constraints: Vec<ChartConstraint> = self
            .rectangles
            .iter()
            .flat_map(|rect| rect.constraints())
            .collect();
        constraints.extend(self.baselines.iter().cloned());
        if let Some(spacing) = &self.left_spacing {
            constraints.push(spacing.clone());
        }
        constraints
    }

    fn snapshot(&self, solution: &Solution) -> Vec<Rectangle> {
        self.rectangles
            .iter()
            .map(|rect| rect.snapshot(solution))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::solver::{ConstraintSet, ConstraintSolver};

    const TOLERANCE: f64 = 0.001;

    fn seeds(heights: &[f64]) -> Vec<BarSeed> {
        heights
            .iter()
            .enumerate()
            .map(|(i, &h)| BarSeed::new(h, format!("bar{i}")))
            .collect()
    }

    #[test]
    fn test_empty_group_is_rejected() {
        let result = RectangleGroup::new(2, Variable::new(), Variable::new(), &[], "blue");
        assert!(matches!(result, Err(LayoutError::EmptyGroup { group: 2 })));
    }

    #[test]
    fn test_group_chains_bars() {
        let width = Variable::new();
        let inner = Variable::new();
        let group = RectangleGroup::new(0, width, inner, &seeds(&[10.0, 20.0, 30.0]), "blue").unwrap();

        let mut solver = ConstraintSolver::new();
        let set: ConstraintSet = group.constraints().into_iter().collect();
        solver.add_constraints(&set).unwrap();
        for (var, label, value) in [
            (width, "width", 20.0),
            (inner, "inner", 3.0),
            (group.left_most_x(), "left", 5.0),
            (group.bottom_y(), "bottom", 7.0),
        ] {
            solver.add_edit_variable(var, label).unwrap();
            solver.suggest(var, value).unwrap();
        }
        let solution = solver.solve().clone();

        let bars = group.snapshot(&solution);
        let lefts: Vec<f64> = bars.iter().map(|b| b.left_bottom.x).collect();
        for (actual, expected) in lefts.iter().zip([5.0, 28.0, 51.0]) {
            assert!((actual - expected).abs() < TOLERANCE, "left {actual} != {expected}");
        }
        for bar in &bars {
            assert!((bar.left_bottom.y - 7.0).abs() < TOLERANCE);
        }
        assert!((solution.get(group.right_most_x()) - 71.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_single_bar_group_has_no_chaining() {
        let group =
            RectangleGroup::new(0, Variable::new(), Variable::new(), &seeds(&[10.0]), "blue").unwrap();
        assert_eq!(group.left_most_x(), group.rectangles()[0].left_bottom.x);
        assert_eq!(group.right_most_x(), group.rectangles()[0].right_top.x);
        assert_eq!(group.constraints().len(), group.rectangles()[0].constraints().len());
    }
}
