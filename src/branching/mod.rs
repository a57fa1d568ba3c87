//! Branching strategies: given the set of objects the current relaxation point
//! violates, choose the one to branch on next.

pub mod most_fractional;
pub mod pseudo_cost;
pub mod reliability;
pub mod strong_branching;

pub use most_fractional::MostFractionalStrategy;
pub use pseudo_cost::PseudoCostStrategy;
pub use reliability::ReliabilityStrategy;
pub use strong_branching::StrongBranchingStrategy;

use fnv::FnvHashMap;

use crate::basic_types::ObjectRef;
use crate::model::Problem;
use crate::relaxation::Relaxation;

/// Priority an object absent from an installed [`Priorities`] map is given: lower
/// priority numbers branch first, so leaving every object unset makes every object
/// equally eligible and tie-breaking falls through to the strategy's own rule.
pub const DEFAULT_PRIORITY: i32 = 1000;

/// Per-object branch priority, lower branches first. An object with no entry uses
/// [`DEFAULT_PRIORITY`], matching the spec's "absence defaults to 1000" rule.
#[derive(Debug, Clone, Default)]
pub struct Priorities {
    values: FnvHashMap<ObjectRef, i32>,
}

impl Priorities {
    pub fn new() -> Self {
        Priorities::default()
    }

    pub fn set(&mut self, object: ObjectRef, priority: i32) {
        self.values.insert(object, priority);
    }

    pub fn get(&self, object: ObjectRef) -> i32 {
        self.values.get(&object).copied().unwrap_or(DEFAULT_PRIORITY)
    }
}

/// Chooses which violated object to branch on next.
///
/// Implementations that need to probe the relaxation (strong branching, and
/// reliability branching while a variable is still unreliable) are given mutable
/// access to it; they are responsible for leaving it in the state it started in
/// (same bounds, same rows) before returning. `priorities` carries the caller's
/// installed branch priorities (see [`Priorities`]); strategies that don't rank by
/// priority may ignore it.
pub trait BranchingStrategy<R: Relaxation> {
    fn select(
        &mut self,
        problem: &Problem,
        relaxation: &mut R,
        x: &[f64],
        candidates: &[ObjectRef],
        priorities: &Priorities,
    ) -> Option<ObjectRef>;
}

/// Fractionality of an integer object, or the cone violation amount for a conic
/// object; the common scalar both [`MostFractionalStrategy`] and the pseudo-cost
/// fallback for non-integer objects rank candidates by.
pub(crate) fn infeasibility_amount(problem: &Problem, object: ObjectRef, x: &[f64]) -> f64 {
    crate::objects::infeasibility(problem, object, x, 1e-6, 1e-6).amount
}

fn object_index(object: ObjectRef) -> u32 {
    match object {
        ObjectRef::Integer(id) => id.0,
        ObjectRef::Linear(id) => id.0,
        ObjectRef::Conic(id) => id.0,
    }
}

/// Picks the preferred of two candidates under the spec's most-fractional tie-break:
/// more infeasible wins; tied infeasibility defers to the lower priority number;
/// still tied defers to the lower object index. Shared by [`MostFractionalStrategy`]
/// and any other ranking strategy that falls back to the same rule.
pub(crate) fn prefers(
    candidate: ObjectRef,
    candidate_amount: f64,
    current: ObjectRef,
    current_amount: f64,
    priorities: &Priorities,
) -> bool {
    if candidate_amount != current_amount {
        return candidate_amount > current_amount;
    }
    let candidate_priority = priorities.get(candidate);
    let current_priority = priorities.get(current);
    if candidate_priority != current_priority {
        return candidate_priority < current_priority;
    }
    object_index(candidate) < object_index(current)
}

/// `0`/`1`/`2` are the defined hot-start behaviors; any other raw value is
/// accepted but currently treated as `Off` (reserved for a future behavior),
/// logged once via [`crate::messages::catalog::HOT_START_HINT_IGNORED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HotStartStrategy {
    #[default]
    Off,
    /// Reorders newly created children so the one whose tightened bounds still
    /// contain the incumbent's value for the branched variable is explored first.
    TowardIncumbent,
    /// Like `TowardIncumbent`, but also fathoms any sibling child whose
    /// tightened bounds exclude the incumbent's value, forcing the search down
    /// the single path that reconstructs it. Only takes effect once an
    /// incumbent exists; before that it behaves like `Off`.
    PruneToIncumbent,
}

impl HotStartStrategy {
    /// `true` if `raw` names a behavior other than the three defined above; the
    /// caller should log [`crate::messages::catalog::HOT_START_HINT_IGNORED`] and
    /// fall back to [`HotStartStrategy::Off`].
    pub fn from_raw(raw: u32) -> (Self, bool) {
        match raw {
            0 => (HotStartStrategy::Off, false),
            1 => (HotStartStrategy::TowardIncumbent, false),
            2 => (HotStartStrategy::PruneToIncumbent, false),
            _ => (HotStartStrategy::Off, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_recognizes_the_three_defined_values() {
        assert_eq!(HotStartStrategy::from_raw(0), (HotStartStrategy::Off, false));
        assert_eq!(HotStartStrategy::from_raw(1), (HotStartStrategy::TowardIncumbent, false));
        assert_eq!(HotStartStrategy::from_raw(2), (HotStartStrategy::PruneToIncumbent, false));
    }

    #[test]
    fn from_raw_falls_back_to_off_for_unrecognized_values() {
        assert_eq!(HotStartStrategy::from_raw(7), (HotStartStrategy::Off, true));
    }

    #[test]
    fn priorities_default_to_one_thousand() {
        let priorities = Priorities::new();
        assert_eq!(priorities.get(ObjectRef::Integer(crate::basic_types::VariableId(0))), DEFAULT_PRIORITY);
    }

    #[test]
    fn prefers_breaks_fractionality_ties_by_priority_then_index() {
        let a = ObjectRef::Integer(crate::basic_types::VariableId(0));
        let b = ObjectRef::Integer(crate::basic_types::VariableId(1));
        let mut priorities = Priorities::new();
        priorities.set(a, 5);
        priorities.set(b, 10);
        assert!(prefers(a, 0.5, b, 0.5, &priorities));
        assert!(!prefers(b, 0.5, a, 0.5, &priorities));
    }
}
