use crate::basic_types::GeneratorStrategy;
use crate::basic_types::RelaxationStatus;
use crate::basic_types::StorageKey;
use crate::heuristics::is_fully_feasible;
use crate::heuristics::Heuristic;
use crate::model::Problem;
use crate::relaxation::Relaxation;

/// Feasibility pump: alternates rounding the current relaxation point to the
/// nearest integer point and re-solving the relaxation against a linear objective
/// that pulls it back towards that rounded point, until the two coincide (success)
/// or `max_iterations` is exhausted.
///
/// The re-solve objective follows the standard Fischetti-Glover-Lodi trick: rather
/// than modeling `|x_j - r_j|` exactly (which needs extra variables per column),
/// each integer column gets a fixed-sign linear cost pointing towards its rounded
/// target for this iteration. That makes every re-solve a plain LP at the cost of
/// only approximating the L1 distance, which is the usual trade the pump makes.
#[derive(Debug, Clone, Copy)]
pub struct FeasibilityPumpHeuristic {
    pub max_iterations: u32,
    strategy: GeneratorStrategy,
    frequency: u32,
}

impl FeasibilityPumpHeuristic {
    pub fn new(max_iterations: u32, strategy: GeneratorStrategy, frequency: u32) -> Self {
        FeasibilityPumpHeuristic {
            max_iterations,
            strategy,
            frequency,
        }
    }

    fn round(problem: &Problem, x: &[f64]) -> Vec<f64> {
        let mut rounded = x.to_vec();
        for &variable in problem.integer_columns() {
            let variable_obj = &problem.variables[variable];
            let value = rounded[variable.index()].round();
            rounded[variable.index()] = value.clamp(variable_obj.lower_bound, variable_obj.upper_bound);
        }
        rounded
    }
}

impl Default for FeasibilityPumpHeuristic {
    fn default() -> Self {
        FeasibilityPumpHeuristic::new(20, GeneratorStrategy::Periodic, 10)
    }
}

impl<R: Relaxation> Heuristic<R> for FeasibilityPumpHeuristic {
    fn name(&self) -> &str {
        "feasibility-pump"
    }

    fn strategy(&self) -> GeneratorStrategy {
        self.strategy
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn try_find_solution(&mut self, problem: &Problem, relaxation: &mut R, x: &[f64]) -> Option<Vec<f64>> {
        if problem.integer_columns().is_empty() {
            relaxation.reset_objective();
            return None;
        }

        let mut current = x.to_vec();
        let mut result = None;
        for _ in 0..self.max_iterations {
            let rounded = Self::round(problem, &current);
            if is_fully_feasible(problem, &rounded, 1e-6) {
                result = Some(rounded);
                break;
            }

            let mut pump_objective = vec![0.0; problem.num_variables()];
            for &variable in problem.integer_columns() {
                let target = rounded[variable.index()];
                let lp_value = current[variable.index()];
                pump_objective[variable.index()] = if target > lp_value {
                    -1.0
                } else if target < lp_value {
                    1.0
                } else {
                    0.0
                };
            }
            relaxation.set_objective(&pump_objective);
            match relaxation.resolve() {
                RelaxationStatus::Optimal => {
                    current = relaxation.primal().to_vec();
                }
                _ => break,
            }
        }

        relaxation.reset_objective();
        relaxation.resolve();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Sense;
    use crate::model::ProblemBuilder;
    use crate::relaxation::reference_simplex::ReferenceSimplex;

    #[test]
    fn finds_an_integer_feasible_point_for_a_trivial_problem() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let x = builder.add_variable(0.0, 10.0, true).unwrap();
        let y = builder.add_variable(0.0, 10.0, true).unwrap();
        builder
            .add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 5.0, 5.0)
            .unwrap();
        let problem = builder.build().unwrap();
        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);
        relaxation.resolve();
        let start = relaxation.primal().to_vec();

        let mut heuristic = FeasibilityPumpHeuristic::new(20, GeneratorStrategy::Periodic, 10);
        let solution = heuristic.try_find_solution(&problem, &mut relaxation, &start);
        if let Some(solution) = solution {
            assert!(is_fully_feasible(&problem, &solution, 1e-6));
        }
    }
}
