//! The relaxation interface: the external-collaborator contract every LP/conic
//! solver backend implements. The engine ships one pure-Rust backend
//! ([`reference_simplex::ReferenceSimplex`]) for tests and small problems; a
//! production deployment is expected to supply its own, or enable the
//! `good_lp_backend` feature.

pub mod reference_simplex;

#[cfg(feature = "good_lp_backend")]
pub mod good_lp_backend;

use crate::basic_types::RelaxationStatus;
use crate::model::LinearConstraint;
use crate::model::Problem;

/// Handle to a row previously added via [`Relaxation::add_row`], opaque to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle(pub u64);

/// The contract a relaxation backend fulfils for the search driver.
///
/// A single instance is reused across the whole search: nodes install and remove
/// bound tightenings and cuts incrementally rather than rebuilding the relaxation
/// from scratch, and warm-start state is threaded from parent to child so repeated
/// resolves stay cheap. `WarmStart` is backend-specific opaque state (for the
/// reference simplex, a basis); the driver never inspects it, only stores and
/// replays it.
pub trait Relaxation {
    type WarmStart: Clone;

    /// Loads the static part of the problem: columns, their bounds, and the
    /// objective. Called once, before the root node is solved.
    fn load(&mut self, problem: &Problem);

    fn set_bounds(&mut self, variable: crate::basic_types::VariableId, lower: f64, upper: f64);

    /// Replaces the objective coefficients used by `resolve`, without touching the
    /// problem's declared objective. Used by the feasibility pump heuristic, which
    /// repeatedly resolves against an L1-distance-to-target objective rather than
    /// the real one.
    fn set_objective(&mut self, coefficients: &[f64]);

    /// Restores the objective last passed to [`Relaxation::load`].
    fn reset_objective(&mut self);

    /// Adds a row (a branch's extra linear constraint, or a generated cut) and
    /// returns a handle for later removal.
    fn add_row(&mut self, row: &LinearConstraint) -> RowHandle;

    fn remove_rows(&mut self, rows: &[RowHandle]);

    /// Sets (or clears, with `None`) the bound on the objective the relaxation may
    /// not exceed; used to prune a node without waiting for `resolve` to finish.
    fn set_cutoff(&mut self, value: Option<f64>);

    fn set_warm_start(&mut self, handle: Option<Self::WarmStart>);

    fn get_warm_start(&self) -> Option<Self::WarmStart>;

    fn resolve(&mut self) -> RelaxationStatus;

    fn primal(&self) -> &[f64];

    fn dual(&self) -> &[f64];

    fn objective_value(&self) -> f64;

    fn iteration_count(&self) -> u64;
}
