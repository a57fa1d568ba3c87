//! A single-row mixed-integer-rounding (MIR) cut generator: the same family Gomory
//! cuts belong to, derived here directly from a problem row rather than from a
//! simplex tableau row, since the [`crate::relaxation::Relaxation`] interface does
//! not expose tableau internals to callers.
//!
//! For a row `sum a_j x_j <= b` with `x_j >= lower_j`, shifting to `x'_j = x_j -
//! lower_j >= 0` and applying the classic MIR construction (Wolsey, *Integer
//! Programming*, ch. 8) yields a valid inequality whenever the shifted right-hand
//! side is fractional. Rows with an unbounded lower bound on some participating
//! variable are skipped, since the shift needs a finite anchor.

use crate::basic_types::GeneratorStrategy;
use crate::basic_types::LinearRowId;
use crate::basic_types::StorageKey;
use crate::cuts::CutGenerator;
use crate::model::LinearConstraint;
use crate::model::Problem;

#[derive(Debug)]
pub struct GomoryMixedIntegerGenerator {
    strategy: GeneratorStrategy,
    frequency: u32,
}

impl GomoryMixedIntegerGenerator {
    pub fn new(strategy: GeneratorStrategy, frequency: u32) -> Self {
        GomoryMixedIntegerGenerator { strategy, frequency }
    }

    fn mir_from_upper_bound_row(
        &self,
        problem: &Problem,
        entries: &[(crate::basic_types::VariableId, f64)],
        upper_bound: f64,
    ) -> Option<(Vec<(crate::basic_types::VariableId, f64)>, f64)> {
        const LARGE: f64 = 1.0e7;
        let mut shift = 0.0;
        for (variable, coefficient) in entries {
            let lower = problem.variables[*variable].lower_bound;
            if lower.is_infinite() || lower.abs() > LARGE {
                return None;
            }
            shift += coefficient * lower;
        }
        let shifted_rhs = upper_bound - shift;
        let f0 = shifted_rhs - shifted_rhs.floor();
        if !(1e-6..=1.0 - 1e-6).contains(&f0) {
            return None;
        }
        let mut cut_entries = Vec::with_capacity(entries.len());
        for (variable, coefficient) in entries {
            let variable_obj = &problem.variables[*variable];
            let alpha = if variable_obj.integer {
                let floor_a = coefficient.floor();
                let fj = coefficient - floor_a;
                floor_a + (fj - f0).max(0.0) / (1.0 - f0)
            } else if *coefficient > 0.0 {
                coefficient / (1.0 - f0)
            } else {
                0.0
            };
            if alpha.abs() > 1e-12 {
                cut_entries.push((*variable, alpha));
            }
        }
        if cut_entries.is_empty() {
            return None;
        }
        let rhs = shifted_rhs.floor() + cut_entries
            .iter()
            .map(|(v, a)| a * problem.variables[*v].lower_bound)
            .sum::<f64>();
        Some((cut_entries, rhs))
    }
}

impl Default for GomoryMixedIntegerGenerator {
    fn default() -> Self {
        GomoryMixedIntegerGenerator::new(GeneratorStrategy::Auto, 5)
    }
}

impl CutGenerator for GomoryMixedIntegerGenerator {
    fn name(&self) -> &str {
        "gomory-mixed-integer"
    }

    fn strategy(&self) -> GeneratorStrategy {
        self.strategy
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }

    fn generate(
        &mut self,
        problem: &Problem,
        x: &[f64],
        next_id: &mut u32,
    ) -> Vec<LinearConstraint> {
        if problem.integer_columns().is_empty() {
            return Vec::new();
        }
        let mut cuts = Vec::new();
        for row in problem.linear_constraints.iter() {
            let has_integer_member = row
                .entries
                .iter()
                .any(|(v, _)| problem.variables[*v].integer);
            if !has_integer_member || !row.upper_bound.is_finite() {
                continue;
            }
            let Some((mut entries, rhs)) =
                self.mir_from_upper_bound_row(problem, &row.entries, row.upper_bound)
            else {
                continue;
            };
            entries.sort_by_key(|(v, _)| v.index());
            let id = LinearRowId(*next_id);
            *next_id += 1;
            if let Ok(cut) = LinearConstraint::new(id, entries, f64::NEG_INFINITY, rhs) {
                if cut.violation(x, 1e-9) != 0.0 {
                    cuts.push(cut);
                }
            }
        }
        cuts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Sense;
    use crate::model::ProblemBuilder;

    #[test]
    fn generates_a_cut_for_a_fractional_knapsack_row() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Maximize);
        let x = builder.add_variable(0.0, 10.0, true).unwrap();
        let y = builder.add_variable(0.0, 10.0, true).unwrap();
        builder.set_objective_coefficient(x, 1.0);
        builder.set_objective_coefficient(y, 1.0);
        builder
            .add_linear_constraint(vec![(x, 2.0), (y, 3.0)], f64::NEG_INFINITY, 7.5)
            .unwrap();
        let problem = builder.build().unwrap();

        let mut generator = GomoryMixedIntegerGenerator::new(GeneratorStrategy::Auto, 5);
        let mut next_id = 0;
        // LP optimum of 2x + 3y <= 7.5 pushing y up: x=0, y=2.5
        let point = [0.0, 2.5];
        let cuts = generator.generate(&problem, &point, &mut next_id);
        assert!(!cuts.is_empty());
    }

    #[test]
    fn skips_rows_with_no_integer_members() {
        let mut builder = ProblemBuilder::new();
        let x = builder.add_variable(0.0, 10.0, false).unwrap();
        builder
            .add_linear_constraint(vec![(x, 1.0)], f64::NEG_INFINITY, 4.5)
            .unwrap();
        let problem = builder.build().unwrap();

        let mut generator = GomoryMixedIntegerGenerator::new(GeneratorStrategy::Auto, 5);
        let mut next_id = 0;
        let cuts = generator.generate(&problem, &[4.5], &mut next_id);
        assert!(cuts.is_empty());
    }
}
