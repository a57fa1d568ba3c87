use crate::basic_types::GeneratorStrategy;
use crate::basic_types::StorageKey;
use crate::heuristics::is_fully_feasible;
use crate::heuristics::Heuristic;
use crate::model::Problem;
use crate::relaxation::Relaxation;

/// Rounds every integer column of the relaxation point to its nearest feasible
/// integer and checks whether the result is fully feasible as-is. Cheap, and
/// succeeds often enough on loosely constrained problems to be worth trying at
/// every node.
#[derive(Debug, Clone, Copy)]
pub struct RoundingHeuristic {
    strategy: GeneratorStrategy,
    frequency: u32,
}

impl RoundingHeuristic {
    pub fn new(strategy: GeneratorStrategy, frequency: u32) -> Self {
        RoundingHeuristic { strategy, frequency }
    }
}

impl Default for RoundingHeuristic {
    fn default() -> Self {
        RoundingHeuristic::new(GeneratorStrategy::Auto, 1)
    }
}

impl<R: Relaxation> Heuristic<R> for RoundingHeuristic {
    fn name(&self) -> &str {
        "rounding"
    }

    fn strategy(&self) -> GeneratorStrategy {
        self.strategy
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn try_find_solution(&mut self, problem: &Problem, _relaxation: &mut R, x: &[f64]) -> Option<Vec<f64>> {
        let mut candidate = x.to_vec();
        for &variable in problem.integer_columns() {
            let variable_obj = &problem.variables[variable];
            let rounded = candidate[variable.index()].round();
            candidate[variable.index()] = rounded.clamp(variable_obj.lower_bound, variable_obj.upper_bound);
        }
        if is_fully_feasible(problem, &candidate, 1e-6) {
            Some(candidate)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Sense;
    use crate::model::ProblemBuilder;
    use crate::relaxation::reference_simplex::ReferenceSimplex;

    #[test]
    fn rounds_to_a_feasible_point_when_one_exists_nearby() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let x = builder.add_variable(0.0, 10.0, true).unwrap();
        let problem = builder.build().unwrap();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);

        let mut heuristic = RoundingHeuristic::default();
        let solution = heuristic.try_find_solution(&problem, &mut relaxation, &[3.4]);
        assert_eq!(solution, Some(vec![3.0]));
    }

    #[test]
    fn fails_when_rounding_breaks_a_row() {
        let mut builder = ProblemBuilder::new();
        let x = builder.add_variable(0.0, 10.0, true).unwrap();
        let y = builder.add_variable(0.0, 10.0, true).unwrap();
        builder
            .add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 5.0, 5.0)
            .unwrap();
        let problem = builder.build().unwrap();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);

        let mut heuristic = RoundingHeuristic::default();
        let solution = heuristic.try_find_solution(&problem, &mut relaxation, &[2.4, 2.4]);
        assert_eq!(solution, None);
    }
}
