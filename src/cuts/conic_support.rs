//! Outer-approximation cuts for conic rows: at a relaxation point outside a cone,
//! the cone's gradient there defines a supporting hyperplane that separates the
//! point without cutting off any feasible solution.

use crate::basic_types::GeneratorStrategy;
use crate::basic_types::LinearRowId;
use crate::basic_types::StorageKey;
use crate::cuts::CutGenerator;
use crate::model::LinearConstraint;
use crate::model::Problem;

#[derive(Debug)]
pub struct ConicSupportGenerator {
    strategy: GeneratorStrategy,
    frequency: u32,
    tolerance: f64,
}

impl ConicSupportGenerator {
    pub fn new(tolerance: f64, strategy: GeneratorStrategy, frequency: u32) -> Self {
        ConicSupportGenerator {
            strategy,
            frequency,
            tolerance,
        }
    }
}

impl CutGenerator for ConicSupportGenerator {
    fn name(&self) -> &str {
        "conic-support"
    }

    fn strategy(&self) -> GeneratorStrategy {
        self.strategy
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn is_essential(&self) -> bool {
        true
    }

    fn generate(
        &mut self,
        problem: &Problem,
        x: &[f64],
        next_id: &mut u32,
    ) -> Vec<LinearConstraint> {
        let mut cuts = Vec::new();
        for cone in problem.conic_constraints.iter() {
            if cone.margin(x) >= -self.tolerance {
                continue;
            }
            let gradient = cone.gradient(x);
            let mut entries: Vec<(crate::basic_types::VariableId, f64)> = cone
                .members
                .iter()
                .copied()
                .zip(gradient.iter().copied())
                .collect();
            entries.sort_by_key(|(v, _)| v.index());
            // The gradient at x is a subgradient of the cone's boundary function
            // g(x) >= 0; the supporting hyperplane g(x_bar) + grad . (x - x_bar) >= 0
            // is valid everywhere in the cone since g is concave on it.
            let constant: f64 = cone
                .members
                .iter()
                .zip(gradient.iter())
                .map(|(v, g)| g * x[v.index()])
                .sum();
            let rhs = constant - cone.margin(x);
            let id = LinearRowId(*next_id);
            *next_id += 1;
            if let Ok(cut) = LinearConstraint::new(id, entries, rhs, f64::INFINITY) {
                cuts.push(cut);
            }
        }
        cuts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::ConeType;
    use crate::model::ProblemBuilder;

    #[test]
    fn cuts_off_an_infeasible_point_without_excluding_the_apex() {
        let mut builder = ProblemBuilder::new();
        let x0 = builder.add_variable(0.0, 10.0, false).unwrap();
        let x1 = builder.add_variable(-10.0, 10.0, false).unwrap();
        let x2 = builder.add_variable(-10.0, 10.0, false).unwrap();
        builder
            .add_conic_constraint(ConeType::Lorentz, vec![x0, x1, x2])
            .unwrap();
        let problem = builder.build().unwrap();

        let mut generator = ConicSupportGenerator::new(1e-6, GeneratorStrategy::Auto, 1);
        let mut next_id = 0;
        let point = [1.0, 3.0, 4.0];
        let cuts = generator.generate(&problem, &point, &mut next_id);
        assert_eq!(cuts.len(), 1);
        assert!(cuts[0].violation(&point, 1e-9) != 0.0);
    }
}
