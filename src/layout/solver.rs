//! Constraint solver integration for chart layout
//!
//! This module provides a wrapper around the kasuari Cassowary constraint solver.
//! Chart entities hand it a duplicate-free constraint set once, mark the variables
//! that may be edited, and from then on only suggest values and read back the solution.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use indexmap::IndexSet;
use kasuari::{
    Constraint, Expression, Solver as KasuariSolver, Strength, Variable, WeightedRelation::*,
};
use thiserror::Error;
use tracing::{debug, trace};

// ============================================================================
// Priorities
// ============================================================================

/// Priority level of a constraint or of an edit variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Never violated: shape identities and domain floors
    Required,
    /// Suggestions made through edit variables
    Edit,
    /// Initial numeric targets that editing is expected to override
    Strong,
    /// Soft hints that give way to everything else
    Weak,
}

impl Priority {
    /// The kasuari strength for this priority
    ///
    /// `Edit` sits between `Strong` and `Required`: a suggestion always wins over
    /// the initial target of the same variable, and never over a floor.
    pub fn strength(self) -> Strength {
        match self {
            Priority::Required => Strength::REQUIRED,
            Priority::Edit => Strength::STRONG.mul_f64(10.0),
            Priority::Strong => Strength::STRONG,
            Priority::Weak => Strength::WEAK,
        }
    }
}

// ============================================================================
// Constraint sources
// ============================================================================

/// Kind of layout policy a constraint encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOrigin {
    /// Mathematical identity of a shape (corner = corner + width)
    Shape,
    /// Chaining between neighbours (spacing, shared baselines, origin anchoring)
    Adjacency,
    /// Domain floor such as `height >= 0`
    Floor,
    /// Initial desired value
    Target,
}

impl std::fmt::Display for ConstraintOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConstraintOrigin::Shape => "shape",
            ConstraintOrigin::Adjacency => "adjacency",
            ConstraintOrigin::Floor => "floor",
            ConstraintOrigin::Target => "target",
        };
        f.write_str(name)
    }
}

/// Tracks where a constraint came from
#[derive(Debug, Clone)]
pub struct ConstraintSource {
    /// Human-readable description, debug metadata only
    pub description: String,
    /// Origin type
    pub origin: ConstraintOrigin,
}

impl ConstraintSource {
    pub fn shape(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            origin: ConstraintOrigin::Shape,
        }
    }

    pub fn adjacency(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            origin: ConstraintOrigin::Adjacency,
        }
    }

    pub fn floor(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            origin: ConstraintOrigin::Floor,
        }
    }

    pub fn target(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            origin: ConstraintOrigin::Target,
        }
    }
}

// ============================================================================
// ChartConstraint and ConstraintSet
// ============================================================================

/// A solver constraint together with its source.
///
/// Identity is the identity of the underlying kasuari constraint: clones of the
/// same constraint compare equal, two separately built constraints never do.
#[derive(Debug, Clone)]
pub struct ChartConstraint {
    constraint: Constraint,
    source: ConstraintSource,
}

impl ChartConstraint {
    /// `lhs == rhs`
    pub fn equal(
        lhs: impl Into<Expression>,
        rhs: impl Into<Expression>,
        priority: Priority,
        source: ConstraintSource,
    ) -> Self {
        let constraint = lhs.into() | EQ(priority.strength()) | rhs.into();
        Self { constraint, source }
    }

    /// `lhs >= rhs`
    pub fn at_least(
        lhs: impl Into<Expression>,
        rhs: impl Into<Expression>,
        priority: Priority,
        source: ConstraintSource,
    ) -> Self {
        let constraint = lhs.into() | GE(priority.strength()) | rhs.into();
        Self { constraint, source }
    }

    /// `lhs <= rhs`
    pub fn at_most(
        lhs: impl Into<Expression>,
        rhs: impl Into<Expression>,
        priority: Priority,
        source: ConstraintSource,
    ) -> Self {
        let constraint = lhs.into() | LE(priority.strength()) | rhs.into();
        Self { constraint, source }
    }
}

impl PartialEq for ChartConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.constraint == other.constraint
    }
}

impl Eq for ChartConstraint {}

impl Hash for ChartConstraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.constraint.hash(state);
    }
}

/// Ordered, duplicate-free collection of constraints
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    constraints: IndexSet<ChartConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a constraint, returning false if it was already present
    pub fn insert(&mut self, constraint: ChartConstraint) -> bool {
        self.constraints.insert(constraint)
    }

    pub fn contains(&self, constraint: &ChartConstraint) -> bool {
        self.constraints.contains(constraint)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChartConstraint> {
        self.constraints.iter()
    }
}

impl Extend<ChartConstraint> for ConstraintSet {
    fn extend<T: IntoIterator<Item = ChartConstraint>>(&mut self, iter: T) {
        self.constraints.extend(iter);
    }
}

impl FromIterator<ChartConstraint> for ConstraintSet {
    fn from_iter<T: IntoIterator<Item = ChartConstraint>>(iter: T) -> Self {
        Self {
            constraints: iter.into_iter().collect(),
        }
    }
}

/// A variable to register as editable, with the value suggested at setup
#[derive(Debug, Clone)]
pub struct EditVariable {
    pub variable: Variable,
    /// Debug label
    pub label: String,
    pub priority: Priority,
    pub initial: f64,
}

impl EditVariable {
    pub fn new(variable: Variable, label: impl Into<String>, initial: f64) -> Self {
        Self {
            variable,
            label: label.into(),
            priority: Priority::Edit,
            initial,
        }
    }

    /// Suggest at `Strong`, giving way to ordinary edits
    pub fn soft(mut self) -> Self {
        self.priority = Priority::Strong;
        self
    }
}

// ============================================================================
// SolverError
// ============================================================================

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Unsatisfiable constraints: {reason}")]
    Unsatisfiable {
        conflicting: Vec<ConstraintSource>,
        reason: String,
    },

    #[error("Variable {variable} is not editable")]
    NotEditable { variable: String },

    #[error("Variable '{label}' is already registered as editable")]
    DuplicateEditVariable { label: String },

    #[error("Internal solver error: {0}")]
    Internal(String),
}

// ============================================================================
// Solution
// ============================================================================

/// Last converged values of every variable the solver has reported
#[derive(Debug, Clone, Default)]
pub struct Solution {
    values: HashMap<Variable, f64>,
}

impl Solution {
    /// Get value for a variable
    ///
    /// Variables the solver never reported are still at their initial value of zero.
    pub fn get(&self, var: Variable) -> f64 {
        self.values.get(&var).copied().unwrap_or(0.0)
    }
}

// ============================================================================
// ConstraintSolver
// ============================================================================

/// Wrapper around kasuari solver
pub struct ConstraintSolver {
    solver: KasuariSolver,
    solution: Solution,
    /// Editable variables and their debug labels
    edit_variables: HashMap<Variable, String>,
    /// Tracks constraint sources for error reporting
    sources: Vec<ConstraintSource>,
}

impl ConstraintSolver {
    pub fn new() -> Self {
        Self {
            solver: KasuariSolver::new(),
            solution: Solution::default(),
            edit_variables: HashMap::new(),
            sources: Vec::new(),
        }
    }

    /// One-time setup: register the constraints, mark the edit variables,
    /// suggest their initial values and solve
    pub fn with_setup(
        constraints: &ConstraintSet,
        edit_variables: &[EditVariable],
    ) -> Result<Self, SolverError> {
        let mut solver = Self::new();
        solver.add_constraints(constraints)?;
        for edit in edit_variables {
            solver.add_edit_variable_with(edit.variable, edit.label.as_str(), edit.priority)?;
        }
        let initial: Vec<(Variable, f64)> = edit_variables
            .iter()
            .map(|edit| (edit.variable, edit.initial))
            .collect();
        solver.suggest_all(&initial)?;
        solver.solve();
        debug!(
            constraints = solver.constraint_count(),
            edit_variables = solver.edit_variable_count(),
            "solver ready"
        );
        Ok(solver)
    }

    /// Number of registered constraints
    pub fn constraint_count(&self) -> usize {
        self.sources.len()
    }

    /// Number of registered edit variables
    pub fn edit_variable_count(&self) -> usize {
        self.edit_variables.len()
    }

    /// Last converged solution
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Last converged value of a variable
    pub fn value(&self, var: Variable) -> f64 {
        self.solution.get(var)
    }
}

impl Default for ConstraintSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConstraintSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintSolver")
            .field("constraints", &self.sources.len())
            .field("edit_variables", &self.edit_variables.len())
            .finish()
    }
}

impl ConstraintSolver {
    /// Convert a kasuari error to a SolverError with context
    fn convert_kasuari_error(
        &self,
        e: kasuari::AddConstraintError,
        source: &ConstraintSource,
    ) -> SolverError {
        match e {
            kasuari::AddConstraintError::UnsatisfiableConstraint => {
                let mut conflicting = vec![source.clone()];
                conflicting.extend(self.sources.iter().cloned());
                SolverError::Unsatisfiable {
                    conflicting,
                    reason: format!(
                        "Cannot satisfy {} constraint {}: conflicts with existing constraints",
                        source.origin, source.description
                    ),
                }
            }
            kasuari::AddConstraintError::DuplicateConstraint => {
                SolverError::Internal(format!("Duplicate constraint: {}", source.description))
            }
            kasuari::AddConstraintError::InternalSolverError(msg) => SolverError::Internal(
                format!("Internal solver error for {}: {}", source.description, msg),
            ),
        }
    }

    /// Add a single constraint to the solver
    pub fn add_constraint(&mut self, constraint: &ChartConstraint) -> Result<(), SolverError> {
        self.solver
            .add_constraint(constraint.constraint.clone())
            .map_err(|e| self.convert_kasuari_error(e, &constraint.source))?;
        self.sources.push(constraint.source.clone());
        Ok(())
    }

    /// Register every constraint of a set, in insertion order
    pub fn add_constraints(&mut self, constraints: &ConstraintSet) -> Result<(), SolverError> {
        for constraint in constraints.iter() {
            self.add_constraint(constraint)?;
        }
        debug!(count = constraints.len(), "registered constraints");
        Ok(())
    }

    /// Mark a variable as editable
    pub fn add_edit_variable(
        &mut self,
        var: Variable,
        label: impl Into<String>,
    ) -> Result<(), SolverError> {
        self.add_edit_variable_with(var, label, Priority::Edit)
    }

    /// Mark a variable as editable with an explicit suggestion priority
    ///
    /// A suggestion made below `Priority::Edit` yields to ordinary edits when
    /// a required constraint couples the two variables.
    pub fn add_edit_variable_with(
        &mut self,
        var: Variable,
        label: impl Into<String>,
        priority: Priority,
    ) -> Result<(), SolverError> {
        let label = label.into();
        if priority == Priority::Required {
            return Err(SolverError::Internal(format!(
                "edit variable '{}' cannot be required",
                label
            )));
        }
        if self.edit_variables.contains_key(&var) {
            return Err(SolverError::DuplicateEditVariable { label });
        }
        self.solver
            .add_edit_variable(var, priority.strength())
            .map_err(|e| {
                SolverError::Internal(format!("Failed to add edit variable '{}': {}", label, e))
            })?;
        self.edit_variables.insert(var, label);
        Ok(())
    }

    fn label_of(&self, var: Variable) -> Result<&str, SolverError> {
        self.edit_variables
            .get(&var)
            .map(String::as_str)
            .ok_or_else(|| SolverError::NotEditable {
                variable: format!("{:?}", var),
            })
    }

    /// Suggest a value for one editable variable, without solving
    pub fn suggest(&mut self, var: Variable, value: f64) -> Result<(), SolverError> {
        self.suggest_all(&[(var, value)])
    }

    /// Suggest values for several editable variables, without solving
    ///
    /// Every variable is checked before the first suggestion is issued, so a
    /// rejected call leaves the solver untouched.
    pub fn suggest_all(&mut self, suggestions: &[(Variable, f64)]) -> Result<(), SolverError> {
        for &(var, _) in suggestions {
            self.label_of(var)?;
        }
        for &(var, value) in suggestions {
            if let Some(label) = self.edit_variables.get(&var) {
                trace!(variable = label.as_str(), value, "suggest value");
            }
            self.solver.suggest_value(var, value).map_err(|e| {
                SolverError::Internal(format!("Failed to suggest value: {}", e))
            })?;
        }
        Ok(())
    }

    /// Pull the converged values out of kasuari into the cached solution
    pub fn solve(&mut self) -> &Solution {
        let changes = self.solver.fetch_changes();
        trace!(changed = changes.len(), "solved");
        for &(var, value) in changes {
            self.solution.values.insert(var, value);
        }
        &self.solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 0.001;

    #[test]
    fn test_equal_constraint() {
        let mut solver = ConstraintSolver::new();
        let a = Variable::new();
        let b = Variable::new();

        solver
            .add_constraint(&ChartConstraint::equal(
                a,
                b + 20.0,
                Priority::Required,
                ConstraintSource::adjacency("a = b + 20"),
            ))
            .unwrap();
        solver.add_edit_variable(b, "b").unwrap();
        solver.suggest(b, 50.0).unwrap();
        let solution = solver.solve();

        assert!((solution.get(a) - 70.0).abs() < TOLERANCE);
        assert!((solution.get(b) - 50.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_floor_beats_suggestion() {
        let mut solver = ConstraintSolver::new();
        let width = Variable::new();

        solver
            .add_constraint(&ChartConstraint::at_least(
                width,
                10.0,
                Priority::Required,
                ConstraintSource::floor("width >= 10"),
            ))
            .unwrap();
        solver.add_edit_variable(width, "width").unwrap();
        solver.suggest(width, 3.0).unwrap();

        assert!(solver.solve().get(width) >= 10.0 - TOLERANCE);
    }

    #[test]
    fn test_edit_overrides_strong_target() {
        let mut solver = ConstraintSolver::new();
        let height = Variable::new();

        solver
            .add_constraint(&ChartConstraint::equal(
                height,
                42.0,
                Priority::Strong,
                ConstraintSource::target("height = 42"),
            ))
            .unwrap();
        solver.add_edit_variable(height, "height").unwrap();
        solver.suggest(height, 42.0).unwrap();
        assert!((solver.solve().get(height) - 42.0).abs() < TOLERANCE);

        solver.suggest(height, 80.0).unwrap();
        assert!((solver.solve().get(height) - 80.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_softer_edit_yields() {
        let mut solver = ConstraintSolver::new();
        let body_top = Variable::new();
        let wick_top = Variable::new();

        solver
            .add_constraint(&ChartConstraint::at_least(
                wick_top,
                body_top,
                Priority::Required,
                ConstraintSource::shape("wick_top >= body_top"),
            ))
            .unwrap();
        solver.add_edit_variable(body_top, "body_top").unwrap();
        solver
            .add_edit_variable_with(wick_top, "wick_top", Priority::Strong)
            .unwrap();
        solver.suggest_all(&[(body_top, 50.0), (wick_top, 20.0)]).unwrap();
        let solution = solver.solve();

        assert!((solution.get(body_top) - 50.0).abs() < TOLERANCE);
        assert!((solution.get(wick_top) - 50.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_required_edit_variable_is_rejected() {
        let mut solver = ConstraintSolver::new();
        let result = solver.add_edit_variable_with(Variable::new(), "x", Priority::Required);
        assert!(matches!(result, Err(SolverError::Internal(_))));
    }

    #[test]
    fn test_suggest_on_non_editable_variable_is_rejected() {
        let mut solver = ConstraintSolver::new();
        let editable = Variable::new();
        let derived = Variable::new();
        solver.add_edit_variable(editable, "editable").unwrap();

        let result = solver.suggest_all(&[(editable, 5.0), (derived, 1.0)]);
        assert!(matches!(result, Err(SolverError::NotEditable { .. })));

        // The valid half of the rejected call was not applied
        assert!(solver.solve().get(editable).abs() < TOLERANCE);
    }

    #[test]
    fn test_duplicate_edit_variable_error() {
        let mut solver = ConstraintSolver::new();
        let var = Variable::new();
        solver.add_edit_variable(var, "width").unwrap();

        match solver.add_edit_variable(var, "width") {
            Err(SolverError::DuplicateEditVariable { label }) => assert_eq!(label, "width"),
            other => panic!("Expected DuplicateEditVariable, got: {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_constraints_error() {
        let mut solver = ConstraintSolver::new();
        let x = Variable::new();

        solver
            .add_constraint(&ChartConstraint::at_least(
                x,
                200.0,
                Priority::Required,
                ConstraintSource::floor("x >= 200"),
            ))
            .unwrap();

        let result = solver.add_constraint(&ChartConstraint::at_most(
            x,
            100.0,
            Priority::Required,
            ConstraintSource::floor("x <= 100"),
        ));

        match result {
            Err(SolverError::Unsatisfiable {
                reason,
                conflicting,
            }) => {
                assert_eq!(
                    reason,
                    "Cannot satisfy floor constraint x <= 100: conflicts with existing constraints"
                );
                assert_eq!(conflicting[0].origin, ConstraintOrigin::Floor);
                assert_eq!(conflicting.len(), 2);
            }
            other => panic!("Expected Unsatisfiable error, got: {:?}", other),
        }
    }

    #[test]
    fn test_constraint_set_deduplicates_clones() {
        let x = Variable::new();
        let floor = ChartConstraint::at_least(
            x,
            0.0,
            Priority::Required,
            ConstraintSource::floor("x >= 0"),
        );
        let twin = ChartConstraint::at_least(
            x,
            0.0,
            Priority::Required,
            ConstraintSource::floor("x >= 0"),
        );

        let mut set = ConstraintSet::new();
        assert!(set.insert(floor.clone()));
        assert!(!set.insert(floor.clone()));
        // Identity, not structure: a separately built twin is a new constraint
        assert!(set.insert(twin));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&floor));
    }
}
