use crate::basic_types::ObjectRef;
use crate::basic_types::RelaxationStatus;
use crate::basic_types::StorageKey;
use crate::basic_types::VariableId;
use crate::branching::infeasibility_amount;
use crate::branching::BranchingStrategy;
use crate::branching::Priorities;
use crate::model::Problem;
use crate::relaxation::Relaxation;

/// Strong branching: for each candidate, tentatively tightens bounds in both
/// directions, resolves the relaxation, and scores the candidate by how much both
/// children's objectives degrade relative to the parent. Expensive per node, so the
/// search driver typically restricts it to the `candidate_limit` most fractional
/// candidates rather than every violated object.
#[derive(Debug, Clone, Copy)]
pub struct StrongBranchingStrategy {
    pub candidate_limit: usize,
}

impl StrongBranchingStrategy {
    pub fn new(candidate_limit: usize) -> Self {
        StrongBranchingStrategy { candidate_limit }
    }

    /// Degradation of the relaxation objective (in minimization units) caused by
    /// tightening `variable` to `[lower, upper]`, restoring the original bounds
    /// before returning.
    fn probe<R: Relaxation>(
        problem: &Problem,
        relaxation: &mut R,
        variable: VariableId,
        lower: Option<f64>,
        upper: Option<f64>,
        parent_value: f64,
        original_lower: f64,
        original_upper: f64,
    ) -> f64 {
        relaxation.set_bounds(
            variable,
            lower.unwrap_or(original_lower),
            upper.unwrap_or(original_upper),
        );
        let status = relaxation.resolve();
        let degradation = match status {
            RelaxationStatus::Optimal => {
                let value = problem.minimization_value(relaxation.objective_value());
                (value - parent_value).max(0.0)
            }
            RelaxationStatus::Infeasible => f64::INFINITY,
            _ => 0.0,
        };
        relaxation.set_bounds(variable, original_lower, original_upper);
        degradation
    }
}

impl<R: Relaxation> BranchingStrategy<R> for StrongBranchingStrategy {
    fn select(
        &mut self,
        problem: &Problem,
        relaxation: &mut R,
        x: &[f64],
        candidates: &[ObjectRef],
        _priorities: &Priorities,
    ) -> Option<ObjectRef> {
        let mut ranked: Vec<ObjectRef> = candidates.to_vec();
        ranked.sort_by(|a, b| {
            infeasibility_amount(problem, *b, x)
                .partial_cmp(&infeasibility_amount(problem, *a, x))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(self.candidate_limit.max(1));

        let parent_value = problem.minimization_value(relaxation.objective_value());
        let mut best: Option<(ObjectRef, f64)> = None;
        for object in ranked {
            let ObjectRef::Integer(variable) = object else {
                continue;
            };
            let original_lower = problem.variables[variable].lower_bound;
            let original_upper = problem.variables[variable].upper_bound;
            let value = x[variable.index()];

            let down = Self::probe(
                problem,
                relaxation,
                variable,
                None,
                Some(value.floor()),
                parent_value,
                original_lower,
                original_upper,
            );
            let up = Self::probe(
                problem,
                relaxation,
                variable,
                Some(value.ceil()),
                None,
                parent_value,
                original_lower,
                original_upper,
            );
            let score = down.min(up);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((object, score));
            }
        }
        relaxation.resolve();
        best.map(|(object, _)| object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Sense;
    use crate::model::ProblemBuilder;
    use crate::relaxation::reference_simplex::ReferenceSimplex;

    #[test]
    fn selects_among_integer_candidates() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let a = builder.add_variable(0.0, 10.0, true).unwrap();
        let b = builder.add_variable(0.0, 10.0, true).unwrap();
        builder.set_objective_coefficient(a, 1.0);
        builder.set_objective_coefficient(b, 3.0);
        builder
            .add_linear_constraint(vec![(a, 1.0), (b, 1.0)], 4.5, 4.5)
            .unwrap();
        let problem = builder.build().unwrap();

        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);
        relaxation.resolve();
        let x = relaxation.primal().to_vec();

        let mut strategy = StrongBranchingStrategy::new(2);
        let priorities = Priorities::default();
        let selected = strategy.select(
            &problem,
            &mut relaxation,
            &x,
            &[ObjectRef::Integer(a), ObjectRef::Integer(b)],
            &priorities,
        );
        assert!(selected.is_some());
    }
}
