#![cfg(any(test, doc))]
//! Fixture helpers for end-to-end scenario tests: small, hand-built problems
//! exercising each of the named scenarios (pure LP, MILP, a single Lorentz cone,
//! a mixed-integer conic program, an infeasible instance) without every test
//! re-deriving the same variable/row wiring.

use crate::api::Solver;
use crate::basic_types::ConeType;
use crate::basic_types::Sense;
use crate::basic_types::SolverStatus;
use crate::driver::SolveResult;
use crate::messages::SilentMessageHandler;
use crate::relaxation::reference_simplex::ReferenceSimplex;
use crate::termination::NodeBudget;

/// Runs `solver` to completion against a fresh [`ReferenceSimplex`] under a
/// generous node budget, discarding progress messages.
pub fn solve(solver: Solver) -> SolveResult {
    let mut termination = NodeBudget::new(100_000);
    solver
        .solve(ReferenceSimplex::new(), &mut termination, &mut SilentMessageHandler)
        .expect("scenario fixtures never build a malformed problem")
}

/// `maximize x + y subject to x + y <= 10, 0 <= x, y <= 10` — a pure LP with no
/// integer or conic structure; the root relaxation is already optimal.
pub fn pure_lp_scenario() -> Solver {
    let mut solver = Solver::new();
    solver.set_sense(Sense::Maximize);
    let x = solver.add_variable(0.0, 10.0, false).unwrap();
    let y = solver.add_variable(0.0, 10.0, false).unwrap();
    solver.set_objective_coefficient(x, 1.0);
    solver.set_objective_coefficient(y, 1.0);
    solver.add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 0.0, 10.0).unwrap();
    solver
}

/// `maximize 2x + y subject to x + y <= 6.5, x integer` — the smallest instance
/// where branching actually has to happen.
pub fn simple_milp_scenario() -> Solver {
    let mut solver = Solver::new();
    solver.set_sense(Sense::Maximize);
    let x = solver.add_variable(0.0, 10.0, true).unwrap();
    let y = solver.add_variable(0.0, 10.0, false).unwrap();
    solver.set_objective_coefficient(x, 2.0);
    solver.set_objective_coefficient(y, 1.0);
    solver.add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 0.0, 6.5).unwrap();
    solver
}

/// `minimize -z subject to z <= ||[x, y]||, x + y >= 3, z,x,y <= 5` — a pure conic
/// program (no integer columns), testing outer-approximation alone.
pub fn lorentz_cone_scenario() -> Solver {
    let mut solver = Solver::new();
    solver.set_sense(Sense::Minimize);
    let z = solver.add_variable(0.0, 5.0, false).unwrap();
    let x = solver.add_variable(0.0, 5.0, false).unwrap();
    let y = solver.add_variable(0.0, 5.0, false).unwrap();
    solver.set_objective_coefficient(z, -1.0);
    solver.add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 3.0, f64::INFINITY).unwrap();
    solver.add_conic_constraint(ConeType::Lorentz, vec![z, x, y]).unwrap();
    solver
}

/// A mixed-integer second-order conic instance: the [`lorentz_cone_scenario`] rows
/// with `x` additionally constrained to be integer, so both branching and
/// outer-approximation cuts participate.
pub fn misoco_scenario() -> Solver {
    let mut solver = Solver::new();
    solver.set_sense(Sense::Minimize);
    let z = solver.add_variable(0.0, 5.0, false).unwrap();
    let x = solver.add_variable(0.0, 5.0, true).unwrap();
    let y = solver.add_variable(0.0, 5.0, false).unwrap();
    solver.set_objective_coefficient(z, -1.0);
    solver.add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 3.0, f64::INFINITY).unwrap();
    solver.add_conic_constraint(ConeType::Lorentz, vec![z, x, y]).unwrap();
    solver
}

/// An integer column whose feasible range excludes every integer in `[0.2, 0.4]`.
pub fn infeasible_scenario() -> Solver {
    let mut solver = Solver::new();
    solver.set_sense(Sense::Minimize);
    let x = solver.add_variable(0.0, 0.4, true).unwrap();
    solver.set_objective_coefficient(x, 1.0);
    solver.add_linear_constraint(vec![(x, 1.0)], 0.2, 0.4).unwrap();
    solver
}

/// Asserts a solve reached the expected status and, if optimal, that the
/// incumbent's objective value is within `tolerance` of `expected_objective`.
pub fn assert_optimal(result: &SolveResult, expected_objective: f64, tolerance: f64) {
    assert_eq!(result.status, SolverStatus::Optimal);
    let incumbent = result.incumbent.as_ref().expect("optimal result always carries an incumbent");
    assert!(
        (incumbent.objective_value - expected_objective).abs() <= tolerance,
        "expected objective {expected_objective}, found {}",
        incumbent.objective_value
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_lp_scenario_is_solved_at_the_root() {
        let result = solve(pure_lp_scenario());
        assert_optimal(&result, 10.0, 1e-6);
        assert_eq!(result.statistics.nodes_processed, 1);
    }

    #[test]
    fn simple_milp_scenario_finds_the_rounded_optimum() {
        let result = solve(simple_milp_scenario());
        assert_optimal(&result, 13.0, 1e-6);
    }

    #[test]
    fn infeasible_scenario_reports_infeasible() {
        let result = solve(infeasible_scenario());
        assert_eq!(result.status, SolverStatus::Infeasible);
        assert!(result.incumbent.is_none());
    }
}
