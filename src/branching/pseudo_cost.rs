use fnv::FnvHashMap;

use crate::basic_types::ObjectRef;
use crate::basic_types::StorageKey;
use crate::basic_types::VariableId;
use crate::branching::infeasibility_amount;
use crate::branching::most_fractional::MostFractionalStrategy;
use crate::branching::BranchingStrategy;
use crate::branching::Priorities;
use crate::model::Problem;
use crate::relaxation::Relaxation;

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: u32,
}

impl Accumulator {
    fn average(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / f64::from(self.count))
        }
    }

    fn observe(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }
}

/// Pseudo-cost branching: estimates, per integer variable, the objective
/// degradation per unit of fractionality resolved in each direction, learned from
/// past branches on that variable, and scores candidates by the minimum of the two
/// estimated degradations (the standard "product rule" proxy for how much each
/// child's bound will worsen).
#[derive(Debug, Default)]
pub struct PseudoCostStrategy {
    down: FnvHashMap<VariableId, Accumulator>,
    up: FnvHashMap<VariableId, Accumulator>,
    fallback: MostFractionalStrategy,
}

impl PseudoCostStrategy {
    pub fn new() -> Self {
        PseudoCostStrategy::default()
    }

    /// Records the objective degradation observed after branching `variable` in
    /// `direction`, per unit of fractional distance moved. Called by the search
    /// driver once both children of a branch have been created.
    pub fn record(
        &mut self,
        variable: VariableId,
        direction: crate::basic_types::Direction,
        degradation_per_unit: f64,
    ) {
        let table = match direction {
            crate::basic_types::Direction::Down => &mut self.down,
            crate::basic_types::Direction::Up => &mut self.up,
        };
        table.entry(variable).or_default().observe(degradation_per_unit);
    }

    fn score(&self, problem: &Problem, variable: VariableId, x: &[f64]) -> Option<f64> {
        let value = x[variable.index()];
        let fractional = value - value.floor();
        let down_estimate = self
            .down
            .get(&variable)
            .and_then(Accumulator::average)
            .map(|c| c * fractional);
        let up_estimate = self
            .up
            .get(&variable)
            .and_then(Accumulator::average)
            .map(|c| c * (1.0 - fractional));
        match (down_estimate, up_estimate) {
            (Some(d), Some(u)) => Some(d.min(u)),
            _ => {
                let _ = problem;
                None
            }
        }
    }

    pub fn is_reliable(&self, variable: VariableId, min_observations: u32) -> bool {
        self.down.get(&variable).map_or(0, |a| a.count) >= min_observations
            && self.up.get(&variable).map_or(0, |a| a.count) >= min_observations
    }
}

impl<R: Relaxation> BranchingStrategy<R> for PseudoCostStrategy {
    fn select(
        &mut self,
        problem: &Problem,
        relaxation: &mut R,
        x: &[f64],
        candidates: &[ObjectRef],
        priorities: &Priorities,
    ) -> Option<ObjectRef> {
        let mut best: Option<(ObjectRef, f64)> = None;
        let mut unscored = Vec::new();
        for &candidate in candidates {
            let scored = match candidate {
                ObjectRef::Integer(variable) => self.score(problem, variable, x),
                _ => None,
            };
            match scored {
                Some(score) => {
                    if best.map_or(true, |(_, best_score)| score > best_score) {
                        best = Some((candidate, score));
                    }
                }
                None => unscored.push(candidate),
            }
        }
        match best {
            Some((object, _)) => Some(object),
            None => {
                if unscored.is_empty() {
                    None
                } else {
                    self.fallback.select(problem, relaxation, x, &unscored, priorities)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Direction;
    use crate::basic_types::Sense;
    use crate::model::ProblemBuilder;
    use crate::relaxation::reference_simplex::ReferenceSimplex;

    #[test]
    fn falls_back_to_most_fractional_when_no_history_exists() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let a = builder.add_variable(0.0, 10.0, true).unwrap();
        let problem = builder.build().unwrap();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);

        let mut strategy = PseudoCostStrategy::new();
        let priorities = Priorities::default();
        let selected = strategy.select(&problem, &mut relaxation, &[2.3], &[ObjectRef::Integer(a)], &priorities);
        assert_eq!(selected, Some(ObjectRef::Integer(a)));
    }

    #[test]
    fn prefers_the_candidate_with_higher_estimated_degradation() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let a = builder.add_variable(0.0, 10.0, true).unwrap();
        let b = builder.add_variable(0.0, 10.0, true).unwrap();
        let problem = builder.build().unwrap();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);

        let mut strategy = PseudoCostStrategy::new();
        strategy.record(a, Direction::Down, 1.0);
        strategy.record(a, Direction::Up, 1.0);
        strategy.record(b, Direction::Down, 5.0);
        strategy.record(b, Direction::Up, 5.0);

        let x = [2.5, 2.5];
        let priorities = Priorities::default();
        let selected = strategy.select(
            &problem,
            &mut relaxation,
            &x,
            &[ObjectRef::Integer(a), ObjectRef::Integer(b)],
            &priorities,
        );
        assert_eq!(selected, Some(ObjectRef::Integer(b)));
    }
}
