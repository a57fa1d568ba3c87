use crate::basic_types::ObjectRef;
use crate::branching::infeasibility_amount;
use crate::branching::prefers;
use crate::branching::BranchingStrategy;
use crate::branching::Priorities;
use crate::model::Problem;
use crate::relaxation::Relaxation;

/// Picks the candidate with the largest infeasibility amount, breaking ties by
/// lowest priority number and then lowest object index. The simplest strategy, and
/// the one every other strategy falls back to when it has nothing better to go on.
#[derive(Debug, Clone, Copy, Default)]
pub struct MostFractionalStrategy;

impl<R: Relaxation> BranchingStrategy<R> for MostFractionalStrategy {
    fn select(
        &mut self,
        problem: &Problem,
        _relaxation: &mut R,
        x: &[f64],
        candidates: &[ObjectRef],
        priorities: &Priorities,
    ) -> Option<ObjectRef> {
        let mut best: Option<(ObjectRef, f64)> = None;
        for &candidate in candidates {
            let amount = infeasibility_amount(problem, candidate, x);
            best = Some(match best {
                None => (candidate, amount),
                Some((current, current_amount)) => {
                    if prefers(candidate, amount, current, current_amount, priorities) {
                        (candidate, amount)
                    } else {
                        (current, current_amount)
                    }
                }
            });
        }
        best.map(|(object, _)| object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Sense;
    use crate::basic_types::VariableId;
    use crate::model::ProblemBuilder;
    use crate::relaxation::reference_simplex::ReferenceSimplex;

    #[test]
    fn picks_the_most_fractional_candidate() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let a = builder.add_variable(0.0, 10.0, true).unwrap();
        let b = builder.add_variable(0.0, 10.0, true).unwrap();
        let problem = builder.build().unwrap();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);

        let candidates = [ObjectRef::Integer(a), ObjectRef::Integer(b)];
        let x = [2.1, 2.5];
        let mut strategy = MostFractionalStrategy;
        let priorities = Priorities::default();
        let selected = strategy.select(&problem, &mut relaxation, &x, &candidates, &priorities);
        assert_eq!(selected, Some(ObjectRef::Integer(VariableId(1))));
    }

    #[test]
    fn ties_prefer_the_lowest_index_by_default() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let a = builder.add_variable(0.0, 10.0, true).unwrap();
        let b = builder.add_variable(0.0, 10.0, true).unwrap();
        let problem = builder.build().unwrap();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);

        let candidates = [ObjectRef::Integer(a), ObjectRef::Integer(b)];
        let x = [2.5, 2.5];
        let mut strategy = MostFractionalStrategy;
        let priorities = Priorities::default();
        let selected = strategy.select(&problem, &mut relaxation, &x, &candidates, &priorities);
        assert_eq!(selected, Some(ObjectRef::Integer(VariableId(0))));
    }

    #[test]
    fn a_lower_priority_number_wins_a_fractionality_tie() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let a = builder.add_variable(0.0, 10.0, true).unwrap();
        let b = builder.add_variable(0.0, 10.0, true).unwrap();
        let problem = builder.build().unwrap();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);

        let candidates = [ObjectRef::Integer(a), ObjectRef::Integer(b)];
        let x = [2.5, 2.5];
        let mut priorities = Priorities::default();
        priorities.set(ObjectRef::Integer(b), 1);
        let mut strategy = MostFractionalStrategy;
        let selected = strategy.select(&problem, &mut relaxation, &x, &candidates, &priorities);
        assert_eq!(selected, Some(ObjectRef::Integer(VariableId(1))));
    }
}
