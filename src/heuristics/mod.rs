//! The heuristic engine: generators of candidate incumbent solutions, invoked on
//! the same strategy/frequency convention the cut engine uses.

pub mod feasibility_pump;
pub mod rounding;

pub use feasibility_pump::FeasibilityPumpHeuristic;
pub use rounding::RoundingHeuristic;

use crate::basic_types::GeneratorStrategy;
use crate::model::Problem;
use crate::relaxation::Relaxation;

/// A primal heuristic: given the current relaxation point, tries to produce a
/// problem-feasible point for the search driver to consider as a new incumbent.
pub trait Heuristic<R: Relaxation> {
    fn name(&self) -> &str;
    fn strategy(&self) -> GeneratorStrategy;
    fn frequency(&self) -> u32;

    /// Attempts to find a feasible solution near `x`. Implementations that need to
    /// resolve the relaxation (the feasibility pump) must leave it in the state it
    /// started in before returning.
    fn try_find_solution(&mut self, problem: &Problem, relaxation: &mut R, x: &[f64]) -> Option<Vec<f64>>;
}

/// Checks every linear and conic row, returning `true` only if all are satisfied
/// within tolerance; used by every heuristic to validate a candidate before
/// reporting it as a solution.
pub(crate) fn is_fully_feasible(problem: &Problem, x: &[f64], tolerance: f64) -> bool {
    problem
        .linear_constraints
        .iter()
        .all(|row| row.is_satisfied(x, tolerance))
        && problem
            .conic_constraints
            .iter()
            .all(|cone| cone.is_satisfied(x, tolerance))
}
