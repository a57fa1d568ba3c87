//! A [`Relaxation`] backed by `good_lp`, for deployments that want a production LP
//! solver (HiGHS, by default) behind the same interface the reference simplex
//! implements. Gated behind the `good_lp_backend` feature since it needs a native
//! HiGHS toolchain; the reference simplex is what the test suite exercises.
//!
//! `good_lp` does not expose incremental re-solve, so every [`Relaxation::resolve`]
//! rebuilds the model from the stored bounds and rows. That is wasteful compared to
//! a warm-started revised simplex, but it is correct, and it is the same tradeoff
//! other `good_lp`-based solvers in this space make in exchange for being able to
//! swap the underlying LP engine freely.

use fnv::FnvHashMap;
use good_lp::constraint;
use good_lp::variable;
use good_lp::Expression;
use good_lp::ProblemVariables;
use good_lp::Solution;
use good_lp::SolverModel;
use good_lp::Variable as GoodLpVariable;

use crate::basic_types::RelaxationStatus;
use crate::basic_types::Sense;
use crate::basic_types::VariableId;
use crate::model::LinearConstraint;
use crate::model::Problem;
use crate::relaxation::Relaxation;
use crate::relaxation::RowHandle;

#[derive(Debug, Clone)]
struct Row {
    entries: Vec<(usize, f64)>,
    lower: f64,
    upper: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GoodLpRelaxation {
    sense: Sense,
    objective: Vec<f64>,
    loaded_objective: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    base_rows: Vec<Row>,
    extra_rows: FnvHashMap<u64, Row>,
    next_handle: u64,
    cutoff: Option<f64>,
    primal: Vec<f64>,
    objective_value: f64,
    last_status: RelaxationStatus,
}

impl GoodLpRelaxation {
    pub fn new() -> Self {
        GoodLpRelaxation::default()
    }

    fn to_internal_row(row: &LinearConstraint) -> Row {
        Row {
            entries: row.entries.iter().map(|(v, c)| (v.index(), *c)).collect(),
            lower: row.lower_bound,
            upper: row.upper_bound,
        }
    }
}

impl Relaxation for GoodLpRelaxation {
    type WarmStart = ();

    fn load(&mut self, problem: &Problem) {
        self.sense = problem.sense;
        self.objective = problem.objective.clone();
        self.loaded_objective = problem.objective.clone();
        self.lower = problem.variables.iter().map(|v| v.lower_bound).collect();
        self.upper = problem.variables.iter().map(|v| v.upper_bound).collect();
        self.base_rows = problem
            .linear_constraints
            .iter()
            .map(Self::to_internal_row)
            .collect();
        self.extra_rows.clear();
        self.next_handle = 0;
        self.cutoff = None;
        self.primal = vec![0.0; problem.num_variables()];
        self.objective_value = 0.0;
        self.last_status = RelaxationStatus::Failed;
    }

    fn set_bounds(&mut self, variable: VariableId, lower: f64, upper: f64) {
        self.lower[variable.index()] = lower;
        self.upper[variable.index()] = upper;
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

    fn set_warm_start(&mut self, _handle: Option<Self::WarmStart>) {}

    fn get_warm_start(&self) -> Option<Self::WarmStart> {
        None
    }

    fn resolve(&mut self) -> RelaxationStatus {
        let n = self.objective.len();
        let mut vars = ProblemVariables::new();
        let columns: Vec<GoodLpVariable> = (0..n)
            .map(|j| vars.add(variable().min(self.lower[j]).max(self.upper[j])))
            .collect();

        let mut objective = Expression::from(0.0);
        for (j, coefficient) in self.objective.iter().enumerate() {
            objective += *coefficient * columns[j];
        }

        let mut model = match self.sense {
            Sense::Minimize => vars.minimise(objective.clone()).using(good_lp::default_solver),
            Sense::Maximize => vars.maximise(objective.clone()).using(good_lp::default_solver),
        };

        let rows: Vec<&Row> = self
            .base_rows
            .iter()
            .chain(self.extra_rows.values())
            .collect();
        for row in &rows {
            let mut expr = Expression::from(0.0);
            for (j, coefficient) in &row.entries {
                expr += *coefficient * columns[*j];
            }
            if row.lower.is_finite() {
                model = model.with(constraint!(expr.clone() >= row.lower));
            }
            if row.upper.is_finite() {
                model = model.with(constraint!(expr <= row.upper));
            }
        }
        if let Some(cutoff) = self.cutoff {
            match self.sense {
                Sense::Minimize => model = model.with(constraint!(objective.clone() <= cutoff)),
                Sense::Maximize => model = model.with(constraint!(objective.clone() >= cutoff)),
            }
        }

        match model.solve() {
            Ok(solution) => {
                self.primal = columns.iter().map(|c| solution.value(*c)).collect();
                self.objective_value = self
                    .objective
                    .iter()
                    .zip(self.primal.iter())
                    .map(|(c, v)| c * v)
                    .sum();
                self.last_status = RelaxationStatus::Optimal;
            }
            Err(_) => {
                self.last_status = RelaxationStatus::Infeasible;
            }
        }
        self.last_status
    }

    fn primal(&self) -> &[f64] {
        &self.primal
    }

    fn dual(&self) -> &[f64] {
        &[]
    }

    fn objective_value(&self) -> f64 {
        self.objective_value
    }

    fn iteration_count(&self) -> u64 {
        0
    }
}
