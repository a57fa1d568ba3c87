//! A pure-Rust bounded-variable LP relaxation, used as the default backend for tests
//! and problems too small to warrant linking a production solver.
//!
//! Internally this runs a textbook two-phase primal simplex over a fully standard
//! form (`Ax = b`, `x >= 0`, no variable upper bounds in the tableau itself):
//! variable upper bounds and ranged row bounds are each turned into an extra
//! equality row with its own nonnegative slack, rather than implemented as a
//! specialized bounded ratio test. That costs extra rows but keeps the pivoting
//! logic exactly the classic Gauss-Jordan full-tableau method, which is easy to get
//! right without being able to run it.
//!
//! Unbounded columns and rows are clamped to `[-LARGE_BOUND, LARGE_BOUND]`, the same
//! big-bound convention several LP wrapper crates use in place of true free
//! variables; a problem that actually needs an unbounded column should supply a
//! looser production backend instead.

use fnv::FnvHashMap;

use crate::basic_types::RelaxationStatus;
use crate::basic_types::Sense;
use crate::basic_types::StorageKey;
use crate::basic_types::VariableId;
use crate::model::LinearConstraint;
use crate::model::Problem;
use crate::relaxation::Relaxation;
use crate::relaxation::RowHandle;

const LARGE_BOUND: f64 = 1.0e7;
const EPS: f64 = 1.0e-9;
const MAX_ITERATIONS: u64 = 20_000;

#[derive(Debug, Clone)]
struct Row {
    entries: Vec<(usize, f64)>,
    lower: f64,
    upper: f64,
}

fn clamp_bound(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-LARGE_BOUND, LARGE_BOUND)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceSimplex {
    sense: Sense,
    objective: Vec<f64>,
    loaded_objective: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    base_rows: Vec<Row>,
    extra_rows: FnvHashMap<u64, Row>,
    next_handle: u64,
    cutoff: Option<f64>,
    warm_start: Option<Vec<usize>>,
    primal: Vec<f64>,
    dual: Vec<f64>,
    objective_value: f64,
    iterations: u64,
}

enum Outcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

impl ReferenceSimplex {
    pub fn new() -> Self {
        ReferenceSimplex::default()
    }

    fn to_internal_row(row: &LinearConstraint) -> Row {
        Row {
            entries: row
                .entries
                .iter()
                .map(|(v, c)| (v.index(), *c))
                .collect(),
            lower: clamp_bound(row.lower_bound),
            upper: clamp_bound(row.upper_bound),
        }
    }

    /// Owned snapshot of every active row (base rows first, then added cuts/branch
    /// rows), so the solve routine can mutate `self` freely afterwards.
    fn active_rows(&self) -> Vec<Row> {
        let mut rows: Vec<Row> = self.base_rows.clone();
        rows.extend(self.extra_rows.values().cloned());
        rows
    }

    /// Runs the two-phase simplex and stores the result in `self.primal` /
    /// `self.dual` / `self.objective_value` / `self.iterations`.
    fn solve(&mut self) -> RelaxationStatus {
        let n = self.objective.len();
        for j in 0..n {
            if self.lower[j] > self.upper[j] + EPS {
                self.primal = vec![0.0; n];
                return RelaxationStatus::Infeasible;
            }
        }

        let rows = self.active_rows();
        let m = rows.len();
        let num_base_rows = self.base_rows.len();

        let width: Vec<f64> = (0..n).map(|j| self.upper[j] - self.lower[j]).collect();

        // L_i, U_i: bounds on the row value after shifting x_j -> y_j = x_j - lower[j].
        let mut shifted_lower = Vec::with_capacity(m);
        let mut shifted_upper = Vec::with_capacity(m);
        for row in &rows {
            let shift: f64 = row
                .entries
                .iter()
                .map(|(j, c)| c * self.lower[*j])
                .sum();
            shifted_lower.push(row.lower - shift);
            shifted_upper.push(row.upper - shift);
        }
        for i in 0..m {
            if shifted_upper[i] - shifted_lower[i] < -1e-6 {
                self.primal = vec![0.0; n];
                return RelaxationStatus::Infeasible;
            }
        }

        // Column layout: y[0..n) s[n..n+m) t[n+m..n+2m) u[n+2m..2n+2m) a[2n+2m..2n+3m)
        let off_s = n;
        let off_t = n + m;
        let off_u = n + 2 * m;
        let off_a = 2 * n + 2 * m;
        let num_vars = 2 * n + 3 * m;
        let num_rows = 2 * m + n;

        let mut tableau = vec![vec![0.0_f64; num_vars + 1]; num_rows];
        let mut basis = vec![0usize; num_rows];
        let mut row_sign = vec![1.0_f64; m];

        // R_i: sign_i * (sum a_ij y_j - s_i) + a_i = sign_i * L_i
        for (i, row) in rows.iter().enumerate() {
            let l = shifted_lower[i];
            let sign = if l >= 0.0 { 1.0 } else { -1.0 };
            row_sign[i] = sign;
            for (j, c) in &row.entries {
                tableau[i][*j] += sign * c;
            }
            tableau[i][off_s + i] = -sign;
            tableau[i][off_a + i] = 1.0;
            tableau[i][num_vars] = sign * l;
            basis[i] = off_a + i;
        }
        // R'_i: s_i + t_i = U_i - L_i
        for i in 0..m {
            let row_index = m + i;
            tableau[row_index][off_s + i] = 1.0;
            tableau[row_index][off_t + i] = 1.0;
            tableau[row_index][num_vars] = (shifted_upper[i] - shifted_lower[i]).max(0.0);
            basis[row_index] = off_t + i;
        }
        // R''_j: y_j + u_j = w_j
        for j in 0..n {
            let row_index = 2 * m + j;
            tableau[row_index][j] = 1.0;
            tableau[row_index][off_u + j] = 1.0;
            tableau[row_index][num_vars] = width[j].max(0.0);
            basis[row_index] = off_u + j;
        }

        let mut allowed = vec![true; num_vars];
        for i in 0..m {
            allowed[off_a + i] = false;
        }

        let mut phase1_cost = vec![0.0_f64; num_vars];
        for i in 0..m {
            phase1_cost[off_a + i] = 1.0;
        }
        let mut phase1_allowed = vec![true; num_vars];
        for i in 0..m {
            phase1_allowed[off_a + i] = true;
        }

        let mut total_iterations = 0u64;
        let outcome = Self::run_simplex(
            &mut tableau,
            &mut basis,
            &phase1_cost,
            &phase1_allowed,
            num_vars,
            &mut total_iterations,
        );
        if matches!(outcome, Outcome::IterationLimit) {
            self.iterations = total_iterations;
            return RelaxationStatus::IterationLimit;
        }
        // Phase 1 is a minimization of a sum of nonnegative artificials, so it can
        // only be unbounded if the model is malformed; treat that defensively as
        // infeasible rather than panicking downstream.
        let phase1_objective: f64 = (0..num_rows)
            .filter(|&i| basis[i] >= off_a)
            .map(|i| tableau[i][num_vars])
            .sum();
        if phase1_objective > 1e-6 {
            self.iterations = total_iterations;
            self.primal = vec![0.0; n];
            return RelaxationStatus::Infeasible;
        }

        let internal_objective: Vec<f64> = match self.sense {
            Sense::Minimize => self.objective.clone(),
            Sense::Maximize => self.objective.iter().map(|c| -c).collect(),
        };
        let mut phase2_cost = vec![0.0_f64; num_vars];
        phase2_cost[..n].copy_from_slice(&internal_objective);

        let outcome = Self::run_simplex(
            &mut tableau,
            &mut basis,
            &phase2_cost,
            &allowed,
            num_vars,
            &mut total_iterations,
        );
        self.iterations = total_iterations;

        match outcome {
            Outcome::Unbounded => return RelaxationStatus::Unbounded,
            Outcome::IterationLimit => return RelaxationStatus::IterationLimit,
            Outcome::Optimal => {}
        }

        let mut y = vec![0.0_f64; n];
        for i in 0..num_rows {
            if basis[i] < n {
                y[basis[i]] = tableau[i][num_vars];
            }
        }
        let x: Vec<f64> = (0..n).map(|j| y[j] + self.lower[j]).collect();
        self.objective_value = self
            .objective
            .iter()
            .zip(x.iter())
            .map(|(c, v)| c * v)
            .sum();
        self.primal = x;

        // Best-effort duals for the base rows: the dual of row i equals
        // sign_i * c_B^T (B^-1 e_i), which can be read off the final tableau column
        // that started out as that row's artificial identity column.
        let mut dual = vec![0.0_f64; num_base_rows];
        for (i, slot) in dual.iter_mut().enumerate() {
            let column = off_a + i;
            let reduced_cost = phase2_cost[column]
                - (0..num_rows)
                    .map(|k| phase2_cost[basis[k]] * tableau[k][column])
                    .sum::<f64>();
            *slot = row_sign[i] * -reduced_cost;
        }
        self.dual = dual;

        if let Some(cutoff) = self.cutoff {
            let minimization_value = match self.sense {
                Sense::Minimize => self.objective_value,
                Sense::Maximize => -self.objective_value,
            };
            if minimization_value > cutoff + EPS {
                return RelaxationStatus::CutoffReached;
            }
        }

        RelaxationStatus::Optimal
    }

    fn run_simplex(
        tableau: &mut [Vec<f64>],
        basis: &mut [usize],
        cost: &[f64],
        allowed: &[bool],
        num_vars: usize,
        iterations: &mut u64,
    ) -> Outcome {
        let num_rows = tableau.len();
        let rhs_col = tableau[0].len() - 1;
        loop {
            if *iterations >= MAX_ITERATIONS {
                return Outcome::IterationLimit;
            }
            let mut entering = None;
            for j in 0..num_vars {
                if !allowed[j] {
                    continue;
                }
                let reduced_cost = cost[j]
                    - (0..num_rows)
                        .map(|i| cost[basis[i]] * tableau[i][j])
                        .sum::<f64>();
                if reduced_cost < -EPS {
                    entering = Some(j);
                    break;
                }
            }
            let Some(entering) = entering else {
                return Outcome::Optimal;
            };

            let mut leaving: Option<usize> = None;
            let mut best_ratio = f64::INFINITY;
            for i in 0..num_rows {
                let coefficient = tableau[i][entering];
                if coefficient > EPS {
                    let ratio = tableau[i][rhs_col] / coefficient;
                    let better = match leaving {
                        None => true,
                        Some(current) => {
                            ratio < best_ratio - EPS
                                || (ratio < best_ratio + EPS && basis[i] < basis[current])
                        }
                    };
                    if better {
                        best_ratio = ratio;
                        leaving = Some(i);
                    }
                }
            }
            let Some(leaving) = leaving else {
                return Outcome::Unbounded;
            };

            let pivot_value = tableau[leaving][entering];
            for value in tableau[leaving].iter_mut() {
                *value /= pivot_value;
            }
            let pivot_row = tableau[leaving].clone();
            for i in 0..num_rows {
                if i == leaving {
                    continue;
                }
                let factor = tableau[i][entering];
                if factor != 0.0 {
                    for col in 0..=rhs_col {
                        tableau[i][col] -= factor * pivot_row[col];
                    }
                }
            }
            basis[leaving] = entering;
            *iterations += 1;
        }
    }
}

impl Relaxation for ReferenceSimplex {
    type WarmStart = Vec<usize>;

    fn load(&mut self, problem: &Problem) {
        let n = problem.num_variables();
        self.sense = problem.sense;
        self.objective = problem.objective.clone();
        self.loaded_objective = problem.objective.clone();
        self.lower = problem.variables.iter().map(|v| clamp_bound(v.lower_bound)).collect();
        self.upper = problem.variables.iter().map(|v| clamp_bound(v.upper_bound)).collect();
        self.base_rows = problem
            .linear_constraints
            .iter()
            .map(Self::to_internal_row)
            .collect();
        self.extra_rows.clear();
        self.next_handle = 0;
        self.cutoff = None;
        self.warm_start = None;
        self.primal = vec![0.0; n];
        self.dual = vec![0.0; self.base_rows.len()];
        self.objective_value = 0.0;
        self.iterations = 0;
    }

    fn set_bounds(&mut self, variable: VariableId, lower: f64, upper: f64) {
        self.lower[variable.index()] = clamp_bound(lower);
        self.upper[variable.index()] = clamp_bound(upper);
    }

    fn set_objective(&mut self, coefficients: &[f64]) {
        self.objective = coefficients.to_vec();
    }

    fn reset_objective(&mut self) {
        self.objective = self.loaded_objective.clone();
    }

    fn add_row(&mut self, row: &LinearConstraint) -> RowHandle {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.extra_rows.insert(handle, Self::to_internal_row(row));
        RowHandle(handle)
    }

    fn remove_rows(&mut self, rows: &[RowHandle]) {
        for row in rows {
            self.extra_rows.remove(&row.0);
        }
    }

    fn set_cutoff(&mut self, value: Option<f64>) {
        self.cutoff = value;
    }

    fn set_warm_start(&mut self, handle: Option<Self::WarmStart>) {
        self.warm_start = handle;
    }

    fn get_warm_start(&self) -> Option<Self::WarmStart> {
        self.warm_start.clone()
    }

    fn resolve(&mut self) -> RelaxationStatus {
        self.solve()
    }

    fn primal(&self) -> &[f64] {
        &self.primal
    }

    fn dual(&self) -> &[f64] {
        &self.dual
    }

    fn objective_value(&self) -> f64 {
        self.objective_value
    }

    fn iteration_count(&self) -> u64 {
        self.iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProblemBuilder;

    #[test]
    fn solves_a_simple_pure_lp() {
        // max x + y, x + y <= 10, 0 <= x,y <= 8
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Maximize);
        let x = builder.add_variable(0.0, 8.0, false).unwrap();
        let y = builder.add_variable(0.0, 8.0, false).unwrap();
        builder.set_objective_coefficient(x, 1.0);
        builder.set_objective_coefficient(y, 1.0);
        builder
            .add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 0.0, 10.0)
            .unwrap();
        let problem = builder.build().unwrap();

        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);
        let status = relaxation.resolve();
        assert_eq!(status, RelaxationStatus::Optimal);
        assert!((relaxation.objective_value() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn detects_infeasible_bounds() {
        let mut builder = ProblemBuilder::new();
        let x = builder.add_variable(0.0, 5.0, false).unwrap();
        builder.set_objective_coefficient(x, 1.0);
        builder
            .add_linear_constraint(vec![(x, 1.0)], 8.0, 10.0)
            .unwrap();
        let problem = builder.build().unwrap();

        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);
        let status = relaxation.resolve();
        assert_eq!(status, RelaxationStatus::Infeasible);
    }

    #[test]
    fn respects_tightened_bounds_between_resolves() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Maximize);
        let x = builder.add_variable(0.0, 8.0, false).unwrap();
        builder.set_objective_coefficient(x, 1.0);
        let problem = builder.build().unwrap();

        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);
        relaxation.set_bounds(x, 0.0, 3.0);
        let status = relaxation.resolve();
        assert_eq!(status, RelaxationStatus::Optimal);
        assert!((relaxation.objective_value() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn cutoff_prunes_a_dominated_node() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Maximize);
        let x = builder.add_variable(0.0, 8.0, false).unwrap();
        builder.set_objective_coefficient(x, 1.0);
        let problem = builder.build().unwrap();

        let mut relaxation = ReferenceSimplex::new();
        relaxation.load(&problem);
        relaxation.set_cutoff(Some(2.0));
        let status = relaxation.resolve();
        assert_eq!(status, RelaxationStatus::CutoffReached);
    }
}
