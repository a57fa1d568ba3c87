use crate::basic_types::Direction;
use crate::basic_types::ObjectRef;
use crate::branching::BranchingStrategy;
use crate::branching::Priorities;
use crate::branching::PseudoCostStrategy;
use crate::branching::StrongBranchingStrategy;
use crate::model::Problem;
use crate::relaxation::Relaxation;

/// Reliability branching: trusts a variable's pseudo-cost estimate once it has been
/// observed at least `min_observations` times in each direction; until then, falls
/// back to strong branching on that variable to both pick a good branch now and
/// seed its pseudo-cost history for later.
#[derive(Debug)]
pub struct ReliabilityStrategy {
    pseudo_cost: PseudoCostStrategy,
    strong_branching: StrongBranchingStrategy,
    min_observations: u32,
}

impl ReliabilityStrategy {
    pub fn new(min_observations: u32, strong_branching_candidate_limit: usize) -> Self {
        ReliabilityStrategy {
            pseudo_cost: PseudoCostStrategy::new(),
            strong_branching: StrongBranchingStrategy::new(strong_branching_candidate_limit),
            min_observations,
        }
    }

    pub fn record(&mut self, variable: crate::basic_types::VariableId, direction: Direction, degradation_per_unit: f64) {
        self.pseudo_cost.record(variable, direction, degradation_per_unit);
    }
}

impl<R: Relaxation> BranchingStrategy<R> for ReliabilityStrategy {
    fn select(
        &mut self,
        problem: &Problem,
        relaxation: &mut R,
        x: &[f64],
        candidates: &[ObjectRef],
        priorities: &Priorities,
    ) -> Option<ObjectRef> {
        let unreliable: Vec<ObjectRef> = candidates
            .iter()
            .copied()
            .filter(|object| match object {
                ObjectRef::Integer(variable) => {
                    !self.pseudo_cost.is_reliable(*variable, self.min_observations)
                }
                _ => true,
            })
            .collect();

        if !unreliable.is_empty() {
            if let Some(object) =
                self.strong_branching
                    .select(problem, relaxation, x, &unreliable, priorities)
            {
                return Some(object);
            }
        }
        self.pseudo_cost.select(problem, relaxation, x, candidates, priorities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Sense;
    use crate::model::ProblemBuilder;
    use crate::relaxation::reference_simplex::ReferenceSimplex;

    #[test]
    fn uses_strong_branching_until_reliable_then_pseudo_cost() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let a = builder.add_variable(0.0, 10.0, true).unwrap();
        builder.set_objective_coefficient(a, 1.0);
        let problem = builder.build().unwrap();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);
        relaxation.resolve();
        let x = relaxation.primal().to_vec();

        let mut strategy = ReliabilityStrategy::new(1, 3);
        let priorities = Priorities::default();
        let selected = strategy.select(&problem, &mut relaxation, &x, &[ObjectRef::Integer(a)], &priorities);
        assert!(selected.is_some());
    }
}
