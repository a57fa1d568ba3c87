//! The embedding surface: a `Solver` facade that owns a problem under
//! construction and a set of tuned options, and wires up the cut generators,
//! branching strategy, and heuristics a direct [`crate::driver::SearchDriver`]
//! user would otherwise have to assemble by hand.

use crate::basic_types::BranchConeError;
use crate::basic_types::BranchStrategyKind;
use crate::basic_types::ConeId;
use crate::basic_types::ConeType;
use crate::basic_types::GeneratorStrategy;
use crate::basic_types::LinearRowId;
use crate::basic_types::Result;
use crate::basic_types::Sense;
use crate::basic_types::VariableId;
use crate::branching::BranchingStrategy;
use crate::branching::HotStartStrategy;
use crate::branching::MostFractionalStrategy;
use crate::branching::PseudoCostStrategy;
use crate::branching::ReliabilityStrategy;
use crate::branching::StrongBranchingStrategy;
use crate::cuts::conic_support::ConicSupportGenerator;
use crate::cuts::gomory::GomoryMixedIntegerGenerator;
use crate::cuts::CutEngine;
use crate::driver::SearchDriver;
use crate::driver::SolveResult;
use crate::heuristics::FeasibilityPumpHeuristic;
use crate::heuristics::Heuristic;
use crate::heuristics::RoundingHeuristic;
use crate::messages::catalog;
use crate::messages::Message;
use crate::messages::MessageHandler;
use crate::model::ProblemBuilder;
use crate::options::SolverOptions;
use crate::relaxation::Relaxation;
use crate::termination::TerminationCondition;

/// The main interaction point for embedding this engine: create variables and
/// rows, tune [`SolverOptions`], then [`Solver::solve`] against a chosen
/// [`Relaxation`] backend.
///
/// # Example
///
/// ```
/// use branchcone::api::Solver;
/// use branchcone::basic_types::Sense;
/// use branchcone::messages::SilentMessageHandler;
/// use branchcone::relaxation::reference_simplex::ReferenceSimplex;
/// use branchcone::termination::NodeBudget;
///
/// let mut solver = Solver::new();
/// solver.set_sense(Sense::Maximize);
/// let x = solver.add_variable(0.0, 10.0, true).unwrap();
/// solver.set_objective_coefficient(x, 1.0);
///
/// let result = solver
///     .solve(
///         ReferenceSimplex::new(),
///         &mut NodeBudget::new(1000),
///         &mut SilentMessageHandler,
///     )
///     .unwrap();
/// assert!(result.incumbent.is_some());
/// ```
pub struct Solver {
    builder: ProblemBuilder,
    options: SolverOptions,
}

impl Default for Solver {
    fn default() -> Self {
        Solver {
            builder: ProblemBuilder::new(),
            options: SolverOptions::default(),
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Solver::default()
    }

    pub fn with_options(options: SolverOptions) -> Self {
        Solver {
            builder: ProblemBuilder::new(),
            options,
        }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SolverOptions {
        &mut self.options
    }

    pub fn set_sense(&mut self, sense: Sense) -> &mut Self {
        self.builder.set_sense(sense);
        self
    }

    pub fn add_variable(&mut self, lower_bound: f64, upper_bound: f64, integer: bool) -> Result<VariableId> {
        self.builder.add_variable(lower_bound, upper_bound, integer)
    }

    pub fn set_objective_coefficient(&mut self, variable: VariableId, coefficient: f64) -> &mut Self {
        self.builder.set_objective_coefficient(variable, coefficient);
        self
    }

    pub fn add_linear_constraint(
        &mut self,
        entries: Vec<(VariableId, f64)>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<LinearRowId> {
        self.builder.add_linear_constraint(entries, lower_bound, upper_bound)
    }

    pub fn add_conic_constraint(&mut self, cone_type: ConeType, members: Vec<VariableId>) -> Result<ConeId> {
        self.builder.add_conic_constraint(cone_type, members)
    }

    /// Builds the problem and runs the branch-and-bound search to completion, or
    /// until `termination` says to stop.
    pub fn solve<R: Relaxation + 'static>(
        self,
        relaxation: R,
        termination: &mut dyn TerminationCondition,
        message_handler: &mut dyn MessageHandler,
    ) -> Result<SolveResult> {
        let problem = self.builder.build()?;
        solve_problem(problem, &self.options, relaxation, termination, message_handler)
    }
}

fn branching_strategy<R: Relaxation + 'static>(kind: BranchStrategyKind, options: &SolverOptions) -> Box<dyn BranchingStrategy<R>> {
    match kind {
        BranchStrategyKind::MostFractional => Box::new(MostFractionalStrategy),
        BranchStrategyKind::PseudoCost => Box::new(PseudoCostStrategy::new()),
        BranchStrategyKind::StrongBranching => {
            Box::new(StrongBranchingStrategy::new(options.num_strong))
        }
        BranchStrategyKind::Reliability => Box::new(ReliabilityStrategy::new(
            options.reliability_min_observations,
            options.num_strong,
        )),
    }
}

/// Wires up the cut generators, branching strategy, and heuristics named by
/// `options` around an already-built [`crate::model::Problem`], then runs the
/// search. Used directly by [`Solver::solve`], and by the CLI runner which builds
/// its `Problem` from a file rather than the incremental builder API above.
pub fn solve_problem<R: Relaxation + 'static>(
    problem: crate::model::Problem,
    options: &SolverOptions,
    relaxation: R,
    termination: &mut dyn TerminationCondition,
    message_handler: &mut dyn MessageHandler,
) -> Result<SolveResult> {
    if matches!(options.cut_strategy, GeneratorStrategy::Periodic) && options.cut_frequency == 0 {
        return Err(BranchConeError::InvalidCutFrequency("cutFrequency"));
    }
    if matches!(options.heur_strategy, GeneratorStrategy::Periodic) && options.heur_frequency == 0 {
        return Err(BranchConeError::InvalidCutFrequency("heurFrequency"));
    }

    let mut cut_engine = CutEngine::new(
        problem.num_variables(),
        options.dense_con_cutoff,
        options.cut_max_age,
        options.cut_seed,
    );
    if options.use_outer_approximation && !problem.conic_constraints.is_empty() {
        cut_engine.register(Box::new(ConicSupportGenerator::new(
            options.cone_tol,
            options.cut_strategy,
            options.cut_frequency,
        )));
    }
    if !problem.integer_columns().is_empty() {
        cut_engine.register(Box::new(GomoryMixedIntegerGenerator::new(
            options.cut_strategy,
            options.cut_frequency,
        )));
    }

    let heuristics: Vec<Box<dyn Heuristic<R>>> = vec![
        Box::new(RoundingHeuristic::new(options.heur_strategy, options.heur_frequency)),
        Box::new(FeasibilityPumpHeuristic::new(
            options.feasibility_pump_max_iterations,
            options.heur_strategy,
            options.heur_frequency,
        )),
    ];

    let mut driver = SearchDriver::new(
        relaxation,
        cut_engine,
        branching_strategy(options.branch_strategy, options),
        heuristics,
    );

    if let Some(kind) = options.ramp_up_branch_strategy {
        driver.set_ramp_up_strategy(branching_strategy(kind, options));
    }

    let (hot_start, hint_ignored) = HotStartStrategy::from_raw(options.hot_start_strategy);
    if hint_ignored {
        message_handler.handle(&Message::new(
            catalog::HOT_START_HINT_IGNORED,
            format!("unrecognized hotStartStrategy value {}, ignoring", options.hot_start_strategy),
        ));
    }
    driver.set_hot_start_strategy(hot_start);

    driver.solve(&problem, options, termination, message_handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::SilentMessageHandler;
    use crate::relaxation::reference_simplex::ReferenceSimplex;
    use crate::termination::NodeBudget;

    #[test]
    fn solves_a_tiny_milp_end_to_end() {
        let mut solver = Solver::new();
        solver.set_sense(Sense::Maximize);
        let x = solver.add_variable(0.0, 10.0, true).unwrap();
        let y = solver.add_variable(0.0, 10.0, false).unwrap();
        solver.set_objective_coefficient(x, 2.0);
        solver.set_objective_coefficient(y, 1.0);
        solver
            .add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 0.0, 6.5)
            .unwrap();

        let mut termination = NodeBudget::new(10_000);
        let result = solver
            .solve(ReferenceSimplex::new(), &mut termination, &mut SilentMessageHandler)
            .unwrap();

        assert!(result.incumbent.is_some());
        let incumbent = result.incumbent.unwrap();
        assert!(incumbent.objective_value <= 13.0 + 1e-6);
    }

    #[test]
    fn reports_infeasible_when_no_integer_point_exists() {
        let mut solver = Solver::new();
        solver.set_sense(Sense::Minimize);
        let x = solver.add_variable(0.0, 0.4, true).unwrap();
        solver.set_objective_coefficient(x, 1.0);
        solver.add_linear_constraint(vec![(x, 1.0)], 0.2, 0.4).unwrap();

        let mut termination = NodeBudget::new(1_000);
        let result = solver
            .solve(ReferenceSimplex::new(), &mut termination, &mut SilentMessageHandler)
            .unwrap();
        assert_eq!(result.status, crate::basic_types::SolverStatus::Infeasible);
        assert!(result.incumbent.is_none());
    }
}
