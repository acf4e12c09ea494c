//! Solver-backed geometric entities
//!
//! Each entity owns kasuari variables instead of numbers and builds its
//! constraints once, at construction. Constraints are handed out as clones, so
//! a constraint reached through two composites is still one constraint.

use kasuari::Variable;

use super::solver::{ChartConstraint, ConstraintSource, Priority, Solution};
use super::types::{Candle, Point, Rectangle};

/// Capability shared by every entity of the layout model
pub trait LayoutElement {
    /// Plain value produced once the solver has converged
    type Snapshot;

    /// Every constraint needed to pin this entity's shape and tie it to its neighbours
    fn constraints(&self) -> Vec<ChartConstraint>;

    /// Copy the solved numbers out of the solution
    fn snapshot(&self, solution: &Solution) -> Self::Snapshot;
}

// ============================================================================
// VariablePoint
// ============================================================================

/// A point whose coordinates are two solver unknowns
#[derive(Debug, Clone)]
pub struct VariablePoint {
    pub x: Variable,
    pub y: Variable,
    pub label: Option<String>,
    pub secondary_label: Option<String>,
}

impl VariablePoint {
    pub fn new() -> Self {
        Self {
            x: Variable::new(),
            y: Variable::new(),
            label: None,
            secondary_label: None,
        }
    }

    pub fn value(&self, solution: &Solution) -> Point {
        Point {
            x: solution.get(self.x),
            y: solution.get(self.y),
            label: self.label.clone(),
            secondary_label: self.secondary_label.clone(),
        }
    }

    /// `x >= 0` and `y >= 0`
    fn floors(&self, owner: &str, what: &str) -> [ChartConstraint; 2] {
        [
            ChartConstraint::at_least(
                self.x,
                0.0,
                Priority::Required,
                ConstraintSource::floor(format!("{owner}.{what}.x >= 0")),
            ),
            ChartConstraint::at_least(
                self.y,
                0.0,
                Priority::Required,
                ConstraintSource::floor(format!("{owner}.{what}.y >= 0")),
            ),
        ]
    }

    /// `x >= 0` only
    fn horizontal_floor(&self, owner: &str, what: &str) -> ChartConstraint {
        ChartConstraint::at_least(
            self.x,
            0.0,
            Priority::Required,
            ConstraintSource::floor(format!("{owner}.{what}.x >= 0")),
        )
    }
}

impl Default for VariablePoint {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// VariableRectangle
// ============================================================================

/// A rectangle whose corners are solver unknowns.
///
/// Width is the chart-wide variable scaled by `width_scale`; height is local.
#[derive(Debug, Clone)]
pub struct VariableRectangle {
    pub left_bottom: VariablePoint,
    pub right_top: VariablePoint,
    pub height: Variable,
    pub width: Variable,
    pub width_scale: f64,
    pub name: String,
    pub color: String,
    height_target: ChartConstraint,
    horizontal: ChartConstraint,
    vertical: ChartConstraint,
    left_spacing: Option<ChartConstraint>,
    floors: Vec<ChartConstraint>,
}

impl VariableRectangle {
    /// A bar: every coordinate and the height are floored at zero
    pub fn new(
        width: Variable,
        height: f64,
        name: impl Into<String>,
        color: impl Into<String>,
        width_scale: f64,
    ) -> Self {
        let mut rect = Self::build(width, height, name.into(), color.into(), width_scale);
        let name = rect.name.clone();
        rect.floors.push(ChartConstraint::at_least(
            rect.height,
            0.0,
            Priority::Required,
            ConstraintSource::floor(format!("{name}.height >= 0")),
        ));
        rect.floors.extend(rect.left_bottom.floors(&name, "left_bottom"));
        rect.floors.extend(rect.right_top.floors(&name, "right_top"));
        rect
    }

    /// A rectangle without domain floors; the owner supplies its own
    pub fn unfloored(
        width: Variable,
        height: f64,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self::build(width, height, name.into(), color.into(), 1.0)
    }

    fn build(width: Variable, height: f64, name: String, color: String, width_scale: f64) -> Self {
        let left_bottom = VariablePoint::new();
        let right_top = VariablePoint::new();
        let height_var = Variable::new();

        let height_target = ChartConstraint::equal(
            height_var,
            height,
            Priority::Strong,
            ConstraintSource::target(format!("{name}.height = {height}")),
        );
        let horizontal = ChartConstraint::equal(
            left_bottom.x + width * width_scale,
            right_top.x,
            Priority::Required,
            ConstraintSource::shape(format!("{name}.right = left + width * {width_scale}")),
        );
        let vertical = ChartConstraint::equal(
            left_bottom.y + height_var,
            right_top.y,
            Priority::Required,
            ConstraintSource::shape(format!("{name}.top = bottom + height")),
        );

        Self {
            left_bottom,
            right_top,
            height: height_var,
            width,
            width_scale,
            name,
            color,
            height_target,
            horizontal,
            vertical,
            left_spacing: None,
            floors: Vec::new(),
        }
    }

    /// Tie the left edge to the previous neighbour
    pub fn set_left_spacing(&mut self, constraint: ChartConstraint) {
        self.left_spacing = Some(constraint);
    }

    /// Target, spacing and shape constraints, without domain floors
    pub fn shape_constraints(&self) -> Vec<ChartConstraint> {
        let mut constraints = vec![self.height_target.clone()];
        if let Some(spacing) = &self.left_spacing {
            constraints.push(spacing.clone());
        }
        constraints.push(self.horizontal.clone());
        constraints.push(self.vertical.clone());
        constraints
    }
}

impl LayoutElement for VariableRectangle {
    type Snapshot = Rectangle;

    fn constraints(&self) -> Vec<ChartConstraint> {
        let mut constraints = self.shape_constraints();
        constraints.extend(self.floors.iter().cloned());
        constraints
    }

    fn snapshot(&self, solution: &Solution) -> Rectangle {
        Rectangle {
            left_bottom: self.left_bottom.value(solution),
            right_top: self.right_top.value(solution),
            color: self.color.clone(),
            name: self.name.clone(),
        }
    }
}

// ============================================================================
// VariableCandle
// ============================================================================

/// Initial pixel levels of one candle, relative to the chart origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandleLevels {
    pub opening: f64,
    pub closing: f64,
    pub minimum: f64,
    pub maximum: f64,
}

impl CandleLevels {
    pub fn new(opening: f64, closing: f64, minimum: f64, maximum: f64) -> Self {
        Self {
            opening,
            closing,
            minimum,
            maximum,
        }
    }
}

/// A candle: a body rectangle plus two wick endpoints.
///
/// The body's `left_bottom` is the opening corner and `right_top` the closing
/// corner, so the body height is signed (`closing - opening`).
#[derive(Debug, Clone)]
pub struct VariableCandle {
    pub body: VariableRectangle,
    pub wick_bottom: VariablePoint,
    pub wick_top: VariablePoint,
    pub positive_color: String,
    pub negative_color: String,
    pub name_visible: bool,
    wick_constraints: Vec<ChartConstraint>,
    targets: Vec<ChartConstraint>,
    floors: Vec<ChartConstraint>,
}

impl VariableCandle {
    pub fn new(
        width: Variable,
        levels: CandleLevels,
        name: impl Into<String>,
        positive_color: impl Into<String>,
        negative_color: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let positive_color = positive_color.into();
        let negative_color = negative_color.into();
        let height = levels.closing - levels.opening;
        let color = if height >= 0.0 {
            positive_color.clone()
        } else {
            negative_color.clone()
        };
        let body = VariableRectangle::unfloored(width, height, name.clone(), color);
        let wick_bottom = VariablePoint::new();
        let wick_top = VariablePoint::new();

        let opening = &body.left_bottom;
        let closing = &body.right_top;

        let wick_constraints = vec![
            ChartConstraint::equal(
                wick_bottom.x,
                opening.x * 0.5 + closing.x * 0.5,
                Priority::Required,
                ConstraintSource::shape(format!("{name}.wick centered on body")),
            ),
            ChartConstraint::equal(
                wick_bottom.x,
                wick_top.x,
                Priority::Required,
                ConstraintSource::shape(format!("{name}.wick is vertical")),
            ),
            ChartConstraint::at_most(
                wick_bottom.y,
                closing.y,
                Priority::Required,
                ConstraintSource::shape(format!("{name}.wick bottom <= closing")),
            ),
            ChartConstraint::at_most(
                wick_bottom.y,
                opening.y,
                Priority::Required,
                ConstraintSource::shape(format!("{name}.wick bottom <= opening")),
            ),
            ChartConstraint::at_least(
                wick_top.y,
                closing.y,
                Priority::Required,
                ConstraintSource::shape(format!("{name}.wick top >= closing")),
            ),
            ChartConstraint::at_least(
                wick_top.y,
                opening.y,
                Priority::Required,
                ConstraintSource::shape(format!("{name}.wick top >= opening")),
            ),
        ];

        let targets = vec![
            ChartConstraint::equal(
                wick_bottom.y,
                levels.minimum,
                Priority::Weak,
                ConstraintSource::target(format!("{name}.minimum = {}", levels.minimum)),
            ),
            ChartConstraint::equal(
                wick_top.y,
                levels.maximum,
                Priority::Weak,
                ConstraintSource::target(format!("{name}.maximum = {}", levels.maximum)),
            ),
            ChartConstraint::equal(
                opening.y,
                levels.opening,
                Priority::Weak,
                ConstraintSource::target(format!("{name}.opening = {}", levels.opening)),
            ),
        ];

        // Levels may sit below the x axis, so only horizontal coordinates are floored
        let floors = vec![
            closing.horizontal_floor(&name, "closing"),
            opening.horizontal_floor(&name, "opening"),
            wick_bottom.horizontal_floor(&name, "wick_bottom"),
            wick_top.horizontal_floor(&name, "wick_top"),
        ];

        Self {
            body,
            wick_bottom,
            wick_top,
            positive_color,
            negative_color,
            name_visible: false,
            wick_constraints,
            targets,
            floors,
        }
    }

    pub fn opening_corner(&self) -> &VariablePoint {
        &self.body.left_bottom
    }

    pub fn closing_corner(&self) -> &VariablePoint {
        &self.body.right_top
    }

    pub fn name(&self) -> &str {
        &self.body.name
    }

    pub fn switch_name_visibility(&mut self) {
        self.name_visible = !self.name_visible;
    }
}

impl LayoutElement for VariableCandle {
    type Snapshot = Candle;

    fn constraints(&self) -> Vec<ChartConstraint> {
        let mut constraints = self.body.shape_constraints();
        constraints.extend(self.wick_constraints.iter().cloned());
        constraints.extend(self.targets.iter().cloned());
        constraints.extend(self.floors.iter().cloned());
        constraints
    }

    fn snapshot(&self, solution: &Solution) -> Candle {
        let mut body = self.body.snapshot(solution);
        body.color = if solution.get(self.body.height) >= 0.0 {
            self.positive_color.clone()
        } else {
            self.negative_color.clone()
        };
        Candle {
            body,
            wick_bottom: self.wick_bottom.value(solution),
            wick_top: self.wick_top.value(solution),
            name_visible: self.name_visible,
        }
    }
}
