//! The object layer: a uniform way to measure infeasibility and produce branch
//! descriptors across the three kinds of thing the search can branch on (an
//! integer-constrained variable, a linear row, or a conic row).
//!
//! Rather than boxing each kind behind a trait object, objects are a plain tagged
//! enum ([`ObjectRef`]) dispatched over in free functions; there is no per-object
//! state to own, only a reference into the [`Problem`] plus the current relaxation
//! point.

use crate::basic_types::Direction;
use crate::basic_types::ObjectRef;
use crate::basic_types::StorageKey;
use crate::model::Problem;

/// How far, and in which direction, an object is from being satisfied.
#[derive(Debug, Clone, Copy)]
pub struct Infeasibility {
    pub amount: f64,
    pub preferred_direction: Direction,
}

impl Infeasibility {
    pub const NONE: Infeasibility = Infeasibility {
        amount: 0.0,
        preferred_direction: Direction::Down,
    };

    pub fn is_feasible(&self) -> bool {
        self.amount <= 0.0
    }
}

/// A bound tightening applied to one variable in one child of a branch.
#[derive(Debug, Clone, Copy)]
pub struct BoundDelta {
    pub variable: crate::basic_types::VariableId,
    pub new_lower_bound: Option<f64>,
    pub new_upper_bound: Option<f64>,
}

/// One child of a branch: the local bound tightenings it installs relative to its
/// parent. Conic branches only ever produce bound deltas (on the apex or a member
/// variable); row additions are reserved for future object kinds.
#[derive(Debug, Clone, Default)]
pub struct ChildSpec {
    pub bound_deltas: Vec<BoundDelta>,
}

/// The result of branching on an object: two or more alternatives, each locally
/// tightening the relaxation so their union still covers every feasible solution the
/// parent covered, but their interiors are disjoint.
#[derive(Debug, Clone)]
pub struct BranchDescriptor {
    pub object: ObjectRef,
    pub children: Vec<ChildSpec>,
}

/// Measures how far the relaxation point `x` is from satisfying `object`, with
/// `integer_tolerance` and `cone_tolerance` as the respective feasibility tolerances.
pub fn infeasibility(
    problem: &Problem,
    object: ObjectRef,
    x: &[f64],
    integer_tolerance: f64,
    cone_tolerance: f64,
) -> Infeasibility {
    match object {
        ObjectRef::Integer(variable_id) => {
            let variable = &problem.variables[variable_id];
            let value = x[variable_id.index()];
            let fractionality = variable.fractionality(value);
            if fractionality <= integer_tolerance {
                Infeasibility::NONE
            } else {
                let direction = if value - value.floor() > 0.5 {
                    Direction::Up
                } else {
                    Direction::Down
                };
                Infeasibility {
                    amount: fractionality,
                    preferred_direction: direction,
                }
            }
        }
        ObjectRef::Linear(row_id) => {
            let row = &problem.linear_constraints[row_id];
            let violation = row.violation(x, 1e-9).abs();
            if violation <= 1e-9 {
                Infeasibility::NONE
            } else {
                Infeasibility {
                    amount: violation,
                    preferred_direction: Direction::Down,
                }
            }
        }
        ObjectRef::Conic(cone_id) => {
            let cone = &problem.conic_constraints[cone_id];
            let margin = cone.margin(x);
            if margin >= -cone_tolerance {
                Infeasibility::NONE
            } else {
                Infeasibility {
                    amount: -margin,
                    preferred_direction: Direction::Down,
                }
            }
        }
    }
}

/// Produces a two-way branch on `object` at the current relaxation point `x`.
///
/// Integer variables branch on the fractional value in the usual way
/// (`x <= floor`, `x >= ceil`). Conic constraints that cannot be linearized away by
/// an outer-approximation cut (see [`crate::cuts`]) branch by bisecting the apex
/// variable's bound range, which is always finite once the relaxation has clamped
/// unbounded columns.
pub fn create_branch(problem: &Problem, object: ObjectRef, x: &[f64]) -> BranchDescriptor {
    match object {
        ObjectRef::Integer(variable_id) => {
            let value = x[variable_id.index()];
            let floor = value.floor();
            let ceil = value.ceil();
            BranchDescriptor {
                object,
                children: vec![
                    ChildSpec {
                        bound_deltas: vec![BoundDelta {
                            variable: variable_id,
                            new_lower_bound: None,
                            new_upper_bound: Some(floor),
                        }],
                    },
                    ChildSpec {
                        bound_deltas: vec![BoundDelta {
                            variable: variable_id,
                            new_lower_bound: Some(ceil),
                            new_upper_bound: None,
                        }],
                    },
                ],
            }
        }
        ObjectRef::Linear(_) => BranchDescriptor {
            object,
            children: vec![],
        },
        ObjectRef::Conic(cone_id) => {
            let cone = &problem.conic_constraints[cone_id];
            let apex = cone.members[0];
            let value = x[apex.index()];
            let variable = &problem.variables[apex];
            let midpoint = 0.5 * (value + variable.lower_bound.max(0.0));
            BranchDescriptor {
                object,
                children: vec![
                    ChildSpec {
                        bound_deltas: vec![BoundDelta {
                            variable: apex,
                            new_lower_bound: None,
                            new_upper_bound: Some(midpoint),
                        }],
                    },
                    ChildSpec {
                        bound_deltas: vec![BoundDelta {
                            variable: apex,
                            new_lower_bound: Some(midpoint),
                            new_upper_bound: None,
                        }],
                    },
                ],
            }
        }
    }
}

/// Every object the search may need to reason about for this problem: one per
/// integer column, one per linear row, one per cone.
pub fn all_objects(problem: &Problem) -> Vec<ObjectRef> {
    let mut objects: Vec<ObjectRef> = problem
        .integer_columns()
        .iter()
        .map(|&v| ObjectRef::Integer(v))
        .collect();
    objects.extend(problem.linear_constraints.keys().map(ObjectRef::Linear));
    objects.extend(problem.conic_constraints.keys().map(ObjectRef::Conic));
    objects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::ConeType;
    use crate::basic_types::Sense;
    use crate::model::ProblemBuilder;

    fn milp() -> Problem {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Minimize);
        let x = builder.add_variable(0.0, 5.0, true).unwrap();
        builder.set_objective_coefficient(x, 1.0);
        builder.build().unwrap()
    }

    #[test]
    fn integer_infeasibility_is_zero_at_integral_point() {
        let problem = milp();
        let x = ObjectRef::Integer(crate::basic_types::VariableId(0));
        let result = infeasibility(&problem, x, &[2.0], 1e-6, 1e-6);
        assert!(result.is_feasible());
    }

    #[test]
    fn integer_branch_produces_disjoint_bound_tightenings() {
        let problem = milp();
        let object = ObjectRef::Integer(crate::basic_types::VariableId(0));
        let descriptor = create_branch(&problem, object, &[2.5]);
        assert_eq!(descriptor.children.len(), 2);
        assert_eq!(
            descriptor.children[0].bound_deltas[0].new_upper_bound,
            Some(2.0)
        );
        assert_eq!(
            descriptor.children[1].bound_deltas[0].new_lower_bound,
            Some(3.0)
        );
    }

    #[test]
    fn conic_infeasibility_is_positive_outside_the_cone() {
        let mut builder = ProblemBuilder::new();
        let x0 = builder.add_variable(0.0, 10.0, false).unwrap();
        let x1 = builder.add_variable(-10.0, 10.0, false).unwrap();
        let x2 = builder.add_variable(-10.0, 10.0, false).unwrap();
        builder
            .add_conic_constraint(ConeType::Lorentz, vec![x0, x1, x2])
            .unwrap();
        let problem = builder.build().unwrap();
        let object = ObjectRef::Conic(crate::basic_types::ConeId(0));
        let result = infeasibility(&problem, object, &[1.0, 3.0, 4.0], 1e-6, 1e-6);
        assert!(!result.is_feasible());
        assert!((result.amount - 4.0).abs() < 1e-9);
    }
}
