//! The search driver: the main branch-and-bound loop tying the relaxation, cut
//! engine, branching strategy, and heuristics together.

use std::time::Instant;

use crate::basic_types::BranchConeError;
use crate::basic_types::Direction;
use crate::basic_types::NodeId;
use crate::basic_types::NodeSelectionRule;
use crate::basic_types::NodeStatus;
use crate::basic_types::ObjectRef;
use crate::basic_types::RelaxationStatus;
use crate::basic_types::SolverStatus;
use crate::basic_types::Statistics;
use crate::basic_types::StorageKey;
use crate::branching::BranchingStrategy;
use crate::branching::HotStartStrategy;
use crate::branching::Priorities;
use crate::cuts::CutEngine;
use crate::heuristics::Heuristic;
use crate::messages::catalog;
use crate::messages::Message;
use crate::messages::MessageHandler;
use crate::model::Problem;
use crate::node::Node;
use crate::objects;
use crate::options::SolverOptions;
use crate::relaxation::Relaxation;
use crate::termination::TerminationCondition;

/// The best problem-feasible point found so far, and its objective value in the
/// problem's own sense (not the internal minimization orientation).
#[derive(Debug, Clone)]
pub struct Incumbent {
    pub values: Vec<f64>,
    pub objective_value: f64,
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub status: SolverStatus,
    pub incumbent: Option<Incumbent>,
    pub best_bound: f64,
    pub statistics: Statistics,
}

pub struct SearchDriver<R: Relaxation + 'static> {
    relaxation: R,
    cut_engine: CutEngine,
    branching: Box<dyn BranchingStrategy<R>>,
    heuristics: Vec<Box<dyn Heuristic<R>>>,
    priorities: Priorities,
    /// Override installed by an embedder's ramp-up phase; consulted instead of
    /// `branching` while `ramp_up_active` is set. The ramp-up orchestration itself
    /// (starting parallel workers, handing off once they converge) is outside this
    /// engine; this is only the strategy-swap hook it would need.
    ramp_up_branching: Option<Box<dyn BranchingStrategy<R>>>,
    ramp_up_active: bool,
    hot_start: HotStartStrategy,
}

impl<R: Relaxation + 'static> SearchDriver<R> {
    pub fn new(
        relaxation: R,
        cut_engine: CutEngine,
        branching: Box<dyn BranchingStrategy<R>>,
        heuristics: Vec<Box<dyn Heuristic<R>>>,
    ) -> Self {
        SearchDriver {
            relaxation,
            cut_engine,
            branching,
            heuristics,
            priorities: Priorities::default(),
            ramp_up_branching: None,
            ramp_up_active: false,
            hot_start: HotStartStrategy::default(),
        }
    }

    pub fn set_priorities(&mut self, priorities: Priorities) {
        self.priorities = priorities;
    }

    pub fn set_ramp_up_strategy(&mut self, strategy: Box<dyn BranchingStrategy<R>>) {
        self.ramp_up_branching = Some(strategy);
    }

    pub fn set_ramp_up_active(&mut self, active: bool) {
        self.ramp_up_active = active;
    }

    pub fn set_hot_start_strategy(&mut self, hot_start: HotStartStrategy) {
        self.hot_start = hot_start;
    }

    /// The dual bound implied by every node still open: a branch-and-bound search
    /// can never prove an objective better than the best bound any live node could
    /// still reach, so the minimum over `open` is the tightest bound currently
    /// known, regardless of whether an incumbent exists yet.
    fn live_dual_bound(open: &[Node<R>]) -> f64 {
        open.iter()
            .map(|node| node.estimated_bound)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn solve(
        &mut self,
        problem: &Problem,
        options: &SolverOptions,
        termination: &mut dyn TerminationCondition,
        message_handler: &mut dyn MessageHandler,
    ) -> Result<SolveResult, BranchConeError> {
        self.relaxation.load(problem);

        let mut statistics = Statistics::default();
        let mut open: Vec<Node<R>> = vec![Node::root(problem, NodeId(0))];
        let mut next_node_id = 1u64;
        let mut incumbent: Option<Incumbent> = None;
        let mut best_minimization_value = f64::INFINITY;
        let mut exhausted = false;
        let mut gap_limit_reached = false;
        let mut final_gap_abs = 0.0;
        let mut final_gap_rel = 0.0;

        loop {
            if open.is_empty() {
                exhausted = true;
                break;
            }
            if termination.should_stop(&statistics) {
                break;
            }
            if let Some(limit) = options.node_limit {
                if statistics.nodes_processed >= limit {
                    break;
                }
            }
            if incumbent.is_some() {
                let dual_bound = Self::live_dual_bound(&open);
                let gap_abs = (best_minimization_value - dual_bound).abs();
                let gap_rel = if best_minimization_value.abs() > 1e-12 {
                    gap_abs / best_minimization_value.abs()
                } else {
                    gap_abs
                };
                if gap_abs <= options.optimal_abs_gap || gap_rel <= options.optimal_rel_gap {
                    gap_limit_reached = true;
                    final_gap_abs = gap_abs;
                    final_gap_rel = gap_rel;
                    break;
                }
            }

            let index = Self::select_index(&open, options.node_selection_rule);
            let mut node = open.swap_remove(index);

            node.install(&mut self.relaxation);
            let cutoff = if incumbent.is_some() {
                Some(best_minimization_value - 1e-7)
            } else {
                None
            };
            self.relaxation.set_cutoff(cutoff);

            let resolve_started = Instant::now();
            let status = self.relaxation.resolve();
            let resolve_elapsed = resolve_started.elapsed();
            statistics.relaxations_solved += 1;
            statistics.relaxation_iterations += self.relaxation.iteration_count();

            if node.depth == 0 {
                if matches!(status, RelaxationStatus::Optimal) {
                    message_handler.handle(&Message::new(
                        catalog::ROOT_RELAXATION_SOLVED,
                        format!("root relaxation value = {}", self.relaxation.objective_value()),
                    ));
                }
                message_handler.handle(&Message::new(
                    catalog::ROOT_RELAXATION_TIMING,
                    format!("root relaxation took {}ms", resolve_elapsed.as_millis()),
                ));
            }

            if matches!(status, RelaxationStatus::IterationLimit) {
                message_handler.handle(&Message::new(
                    catalog::RELAXATION_ITERATION_LIMIT,
                    format!("node {} hit the relaxation iteration limit", node.id),
                ));
            }

            match status {
                RelaxationStatus::Infeasible => {
                    node.set_status(NodeStatus::Infeasible);
                    statistics.nodes_infeasible += 1;
                }
                RelaxationStatus::CutoffReached
                | RelaxationStatus::Unbounded
                | RelaxationStatus::IterationLimit => {
                    node.set_status(NodeStatus::Fathomed);
                    statistics.nodes_fathomed += 1;
                }
                RelaxationStatus::Failed => {
                    if node.depth == 0 {
                        return Err(BranchConeError::RelaxationFailure(
                            "root relaxation reported Failed".to_owned(),
                        ));
                    }
                    message_handler.handle(&Message::new(
                        catalog::RELAXATION_FAILED,
                        format!("node {} relaxation failed, fathoming", node.id),
                    ));
                    node.set_status(NodeStatus::Fathomed);
                    statistics.nodes_fathomed += 1;
                }
                RelaxationStatus::Optimal => {
                    self.process_optimal_node(
                        problem,
                        options,
                        &mut node,
                        &mut statistics,
                        &mut incumbent,
                        &mut best_minimization_value,
                        message_handler,
                        &mut open,
                        &mut next_node_id,
                    );
                }
            }

            node.uninstall(&self.relaxation);
            statistics.nodes_processed += 1;
            statistics.max_depth_reached = statistics.max_depth_reached.max(node.depth);

            let expired = self.cut_engine.age_and_collect_expired();
            if !expired.is_empty() {
                self.relaxation.remove_rows(&expired);
            }
        }

        let dual_bound_value = if exhausted {
            if incumbent.is_some() {
                best_minimization_value
            } else {
                f64::INFINITY
            }
        } else {
            Self::live_dual_bound(&open).min(best_minimization_value)
        };

        let final_status = if incumbent.is_some() {
            if exhausted {
                SolverStatus::Optimal
            } else if gap_limit_reached {
                SolverStatus::GapLimitReached
            } else if options.node_limit.is_some()
                && statistics.nodes_processed >= options.node_limit.unwrap_or(u64::MAX)
            {
                SolverStatus::NodeLimitReached
            } else {
                SolverStatus::TimeLimitReached
            }
        } else if exhausted {
            SolverStatus::Infeasible
        } else {
            SolverStatus::TimeLimitReached
        };

        if gap_limit_reached {
            message_handler.handle(&Message::new(
                catalog::GAP_ABSOLUTE,
                format!("absolute gap = {final_gap_abs}"),
            ));
            message_handler.handle(&Message::new(
                catalog::GAP_RELATIVE,
                format!("relative gap = {final_gap_rel}"),
            ));
        }

        message_handler.handle(&Message::new(
            catalog::SEARCH_CONCLUDED,
            format!("search concluded: {final_status:?}"),
        ));
        statistics.log("%% ");

        Ok(SolveResult {
            status: final_status,
            incumbent,
            best_bound: problem.sense_adjusted_bound(dual_bound_value),
            statistics,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn process_optimal_node(
        &mut self,
        problem: &Problem,
        options: &SolverOptions,
        node: &mut Node<R>,
        statistics: &mut Statistics,
        incumbent: &mut Option<Incumbent>,
        best_minimization_value: &mut f64,
        message_handler: &mut dyn MessageHandler,
        open: &mut Vec<Node<R>>,
        next_node_id: &mut u64,
    ) -> RelaxationStatus {
        let mut x = self.relaxation.primal().to_vec();
        let mut minimization_value = problem.minimization_value(self.relaxation.objective_value());

        for _ in 0..options.max_passes_per_node.max(1) {
            let cuts = self.cut_engine.collect_cuts(
                problem,
                &x,
                node.depth,
                statistics.nodes_processed,
                statistics,
            );
            if cuts.is_empty() {
                break;
            }
            for generated in &cuts {
                let handle = self.relaxation.add_row(&generated.constraint);
                self.cut_engine.track_installed(handle);
            }
            let status = self.relaxation.resolve();
            statistics.relaxations_solved += 1;
            statistics.relaxation_iterations += self.relaxation.iteration_count();
            if !matches!(status, RelaxationStatus::Optimal) {
                node.set_status(NodeStatus::Fathomed);
                statistics.nodes_fathomed += 1;
                return status;
            }
            x = self.relaxation.primal().to_vec();
            minimization_value = problem.minimization_value(self.relaxation.objective_value());
        }

        if minimization_value >= *best_minimization_value - 1e-9 {
            node.set_status(NodeStatus::Fathomed);
            statistics.nodes_fathomed += 1;
            return RelaxationStatus::CutoffReached;
        }

        for heuristic in &mut self.heuristics {
            if !heuristic
                .strategy()
                .should_run(node.depth, statistics.nodes_processed, heuristic.frequency())
            {
                continue;
            }
            let heuristic_stats = statistics.heuristic_mut(heuristic.name());
            heuristic_stats.calls += 1;
            let started = Instant::now();
            let found = heuristic.try_find_solution(problem, &mut self.relaxation, &x);
            statistics.heuristic_mut(heuristic.name()).time_spent += started.elapsed();
            if let Some(candidate) = found {
                let candidate_value = problem.minimization_value(problem.objective_value(&candidate));
                if candidate_value < *best_minimization_value {
                    statistics.heuristic_mut(heuristic.name()).solutions_found += 1;
                    message_handler.handle(&Message::new(
                        catalog::HEURISTIC_HIT,
                        format!("heuristic {} found an improving solution", heuristic.name()),
                    ));
                    Self::install_incumbent(
                        problem,
                        &candidate,
                        candidate_value,
                        incumbent,
                        best_minimization_value,
                        statistics,
                        message_handler,
                    );
                }
            }
        }

        let candidates: Vec<ObjectRef> = objects::all_objects(problem)
            .into_iter()
            .filter(|object| !matches!(object, ObjectRef::Linear(_)))
            .filter(|object| {
                !objects::infeasibility(problem, *object, &x, options.integer_tol, options.cone_tol)
                    .is_feasible()
            })
            .collect();

        if candidates.is_empty() {
            if minimization_value < *best_minimization_value {
                Self::install_incumbent(
                    problem,
                    &x,
                    minimization_value,
                    incumbent,
                    best_minimization_value,
                    statistics,
                    message_handler,
                );
            }
            node.set_status(NodeStatus::Fathomed);
            statistics.nodes_fathomed += 1;
            return RelaxationStatus::Optimal;
        }

        let use_ramp_up = self.ramp_up_active && self.ramp_up_branching.is_some();
        let selected = if use_ramp_up {
            self.ramp_up_branching.as_mut().unwrap().select(
                problem,
                &mut self.relaxation,
                &x,
                &candidates,
                &self.priorities,
            )
        } else {
            self.branching
                .select(problem, &mut self.relaxation, &x, &candidates, &self.priorities)
        };
        let Some(object) = selected else {
            node.set_status(NodeStatus::Fathomed);
            statistics.nodes_fathomed += 1;
            return RelaxationStatus::Optimal;
        };

        if let ObjectRef::Integer(variable) = object {
            message_handler.handle(&Message::new(
                catalog::BRANCHED_ON_INTEGER,
                format!("branching on integer variable {}", variable.0),
            ));
        }

        let descriptor = objects::create_branch(problem, object, &x);
        if descriptor.children.is_empty() {
            node.set_status(NodeStatus::Fathomed);
            statistics.nodes_fathomed += 1;
            return RelaxationStatus::Optimal;
        }

        let mut tagged: Vec<(Direction, &objects::ChildSpec)> = descriptor
            .children
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let direction = if index == 0 { Direction::Down } else { Direction::Up };
                (direction, spec)
            })
            .collect();

        if matches!(
            self.hot_start,
            HotStartStrategy::TowardIncumbent | HotStartStrategy::PruneToIncumbent
        ) {
            if let (ObjectRef::Integer(variable), Some(inc)) = (object, incumbent.as_ref()) {
                let incumbent_value = inc.values[variable.index()];
                let contains_incumbent = |spec: &objects::ChildSpec| {
                    spec.bound_deltas.iter().all(|delta| {
                        delta.new_lower_bound.map_or(true, |lower| incumbent_value >= lower - 1e-9)
                            && delta.new_upper_bound.map_or(true, |upper| incumbent_value <= upper + 1e-9)
                    })
                };
                if self.hot_start == HotStartStrategy::PruneToIncumbent
                    && tagged.iter().any(|(_, spec)| contains_incumbent(spec))
                {
                    tagged.retain(|(_, spec)| contains_incumbent(spec));
                } else {
                    // DepthFirst selection pops the last element, so the child
                    // whose tightened bounds still contain the incumbent's value
                    // should sort last to be explored first.
                    tagged.sort_by_key(|(_, spec)| u8::from(contains_incumbent(spec)));
                }
            }
        }

        for (direction, spec) in tagged {
            let child = node.child(NodeId(*next_node_id), spec, object, direction, minimization_value);
            *next_node_id += 1;
            open.push(child);
        }
        node.set_status(NodeStatus::Branched);
        RelaxationStatus::Optimal
    }

    #[allow(clippy::too_many_arguments)]
    fn install_incumbent(
        problem: &Problem,
        values: &[f64],
        minimization_value: f64,
        incumbent: &mut Option<Incumbent>,
        best_minimization_value: &mut f64,
        statistics: &mut Statistics,
        message_handler: &mut dyn MessageHandler,
    ) {
        *best_minimization_value = minimization_value;
        let objective_value = problem.objective_value(values);
        *incumbent = Some(Incumbent {
            values: values.to_vec(),
            objective_value,
        });
        statistics.incumbents_found += 1;
        message_handler.handle(&Message::new(
            catalog::INCUMBENT_FOUND,
            format!("incumbent found, objective = {objective_value}"),
        ));
        message_handler.handle(&Message::new(
            catalog::CUTOFF_INCREMENT,
            format!("cutoff tightened to {minimization_value}"),
        ));
    }

    fn select_index(open: &[Node<R>], rule: NodeSelectionRule) -> usize {
        match rule {
            NodeSelectionRule::DepthFirst => open.len() - 1,
            NodeSelectionRule::BestBound | NodeSelectionRule::BestEstimate => open
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    a.estimated_bound
                        .partial_cmp(&b.estimated_bound)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(index, _)| index)
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branching::MostFractionalStrategy;
    use crate::cuts::CutEngine;
    use crate::messages::SilentMessageHandler;
    use crate::model::ProblemBuilder;
    use crate::relaxation::reference_simplex::ReferenceSimplex;
    use crate::termination::NodeBudget;

    fn milp() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(crate::basic_types::Sense::Maximize);
        let x = builder.add_variable(0.0, 10.0, true).unwrap();
        let y = builder.add_variable(0.0, 10.0, false).unwrap();
        builder.set_objective_coefficient(x, 2.0);
        builder.set_objective_coefficient(y, 1.0);
        builder
            .add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 0.0, 6.5)
            .unwrap();
        builder.build().unwrap()
    }

    fn driver() -> SearchDriver<ReferenceSimplex> {
        SearchDriver::new(
            ReferenceSimplex::new(),
            CutEngine::new(2, 0.5, 20, 7),
            Box::new(MostFractionalStrategy),
            Vec::new(),
        )
    }

    #[test]
    fn live_dual_bound_is_the_minimum_over_open_nodes_not_the_incumbent() {
        let problem = milp();
        let root = Node::<ReferenceSimplex>::root(&problem, NodeId(0));
        let mut tight = root.clone();
        tight.estimated_bound = -20.0;
        let mut loose = root.clone();
        loose.estimated_bound = -5.0;
        let open = vec![loose, tight];
        // The live dual bound is the best (lowest, in the internal minimization
        // orientation) bound any open node could still reach, not the first or the
        // last node's bound, and regardless of whether an incumbent exists.
        assert_eq!(SearchDriver::<ReferenceSimplex>::live_dual_bound(&open), -20.0);
    }

    #[test]
    fn live_dual_bound_of_an_empty_queue_is_plus_infinity() {
        let open: Vec<Node<ReferenceSimplex>> = Vec::new();
        assert_eq!(SearchDriver::<ReferenceSimplex>::live_dual_bound(&open), f64::INFINITY);
    }

    #[test]
    fn exhausted_search_reports_optimal() {
        let problem = milp();
        let mut driver = driver();
        let mut termination = NodeBudget::new(10_000);
        let result = driver
            .solve(&problem, &SolverOptions::default(), &mut termination, &mut SilentMessageHandler)
            .unwrap();
        assert_eq!(result.status, SolverStatus::Optimal);
    }

    #[test]
    fn a_generous_gap_tolerance_stops_the_search_early() {
        let problem = milp();
        let mut driver = driver();
        let mut options = SolverOptions::default();
        options.optimal_rel_gap = 1.0;
        options.optimal_abs_gap = 1.0;
        let mut termination = NodeBudget::new(10_000);
        let result = driver
            .solve(&problem, &options, &mut termination, &mut SilentMessageHandler)
            .unwrap();
        assert!(matches!(
            result.status,
            SolverStatus::Optimal | SolverStatus::GapLimitReached
        ));
        assert!(result.incumbent.is_some());
    }

    #[test]
    fn hot_start_toward_incumbent_still_reaches_optimality() {
        let problem = milp();
        let mut driver = driver();
        driver.set_hot_start_strategy(crate::branching::HotStartStrategy::TowardIncumbent);
        let mut termination = NodeBudget::new(10_000);
        let result = driver
            .solve(&problem, &SolverOptions::default(), &mut termination, &mut SilentMessageHandler)
            .unwrap();
        assert_eq!(result.status, SolverStatus::Optimal);
        assert!(result.incumbent.is_some());
    }
}
