use crate::basic_types::BranchConeError;
use crate::basic_types::ConeId;
use crate::basic_types::ConeType;
use crate::basic_types::KeyedVec;
use crate::basic_types::LinearRowId;
use crate::basic_types::Result;
use crate::basic_types::Sense;
use crate::basic_types::StorageKey;
use crate::basic_types::VariableId;
use crate::model::conic_constraint::ConicConstraint;
use crate::model::linear_constraint::LinearConstraint;
use crate::model::variable::Variable;

/// An immutable problem description: the column set, the objective, and the two
/// families of rows (linear and conic). Everything downstream — relaxations, cuts,
/// branching, nodes — treats this as read-only; mutation happens by constructing a
/// new `Problem` through [`ProblemBuilder`].
#[derive(Debug, Clone)]
pub struct Problem {
    pub sense: Sense,
    pub objective: Vec<f64>,
    pub variables: KeyedVec<VariableId, Variable>,
    pub linear_constraints: KeyedVec<LinearRowId, LinearConstraint>,
    pub conic_constraints: KeyedVec<ConeId, ConicConstraint>,
    integer_columns: Vec<VariableId>,
}

impl Problem {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn integer_columns(&self) -> &[VariableId] {
        &self.integer_columns
    }

    pub fn is_milp(&self) -> bool {
        self.conic_constraints.is_empty()
    }

    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(x.iter())
            .map(|(c, v)| c * v)
            .sum()
    }

    /// Orients a relaxation objective value so that smaller is always better,
    /// regardless of the problem's declared [`Sense`].
    pub fn minimization_value(&self, objective_value: f64) -> f64 {
        match self.sense {
            Sense::Minimize => objective_value,
            Sense::Maximize => -objective_value,
        }
    }

    /// Inverse of [`Self::minimization_value`]: turns an internal minimization-sense
    /// bound back into the problem's own objective orientation.
    pub fn sense_adjusted_bound(&self, minimization_value: f64) -> f64 {
        match self.sense {
            Sense::Minimize => minimization_value,
            Sense::Maximize => -minimization_value,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    sense: Sense,
    objective: Vec<f64>,
    variables: Vec<Variable>,
    linear_constraints: Vec<LinearConstraint>,
    conic_constraints: Vec<ConicConstraint>,
}

impl ProblemBuilder {
    pub fn new() -> Self {
        ProblemBuilder::default()
    }

    pub fn set_sense(&mut self, sense: Sense) -> &mut Self {
        self.sense = sense;
        self
    }

    pub fn add_variable(&mut self, lower_bound: f64, upper_bound: f64, integer: bool) -> Result<VariableId> {
        let id = VariableId(self.variables.len() as u32);
        let variable = Variable::new(id, lower_bound, upper_bound, integer)?;
        self.variables.push(variable);
        self.objective.push(0.0);
        Ok(id)
    }

    pub fn set_objective_coefficient(&mut self, variable: VariableId, coefficient: f64) {
        self.objective[variable.index()] = coefficient;
    }

    pub fn add_linear_constraint(
        &mut self,
        entries: Vec<(VariableId, f64)>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<LinearRowId> {
        for (variable, _) in &entries {
            if variable.index() >= self.variables.len() {
                return Err(BranchConeError::VariableIndexOutOfRange {
                    index: variable.0,
                });
            }
        }
        let id = LinearRowId(self.linear_constraints.len() as u32);
        let constraint = LinearConstraint::new(id, entries, lower_bound, upper_bound)?;
        self.linear_constraints.push(constraint);
        Ok(id)
    }

    pub fn add_conic_constraint(
        &mut self,
        cone_type: ConeType,
        members: Vec<VariableId>,
    ) -> Result<ConeId> {
        for variable in &members {
            if variable.index() >= self.variables.len() {
                return Err(BranchConeError::VariableIndexOutOfRange { index: variable.0 });
            }
        }
        let id = ConeId(self.conic_constraints.len() as u32);
        let constraint = ConicConstraint::new(id, cone_type, members)?;
        self.conic_constraints.push(constraint);
        Ok(id)
    }

    pub fn build(self) -> Result<Problem> {
        if self.objective.len() != self.variables.len() {
            return Err(BranchConeError::ObjectiveLengthMismatch {
                given: self.objective.len(),
                expected: self.variables.len(),
            });
        }
        let integer_columns = self
            .variables
            .iter()
            .filter(|v| v.integer)
            .map(|v| v.id)
            .collect();
        Ok(Problem {
            sense: self.sense,
            objective: self.objective,
            variables: KeyedVec::new(self.variables),
            linear_constraints: KeyedVec::new(self.linear_constraints),
            conic_constraints: KeyedVec::new(self.conic_constraints),
            integer_columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_small_milp() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Maximize);
        let x = builder.add_variable(0.0, 10.0, true).unwrap();
        let y = builder.add_variable(0.0, 10.0, false).unwrap();
        builder.set_objective_coefficient(x, 1.0);
        builder.set_objective_coefficient(y, 2.0);
        builder
            .add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 0.0, 10.0)
            .unwrap();
        let problem = builder.build().unwrap();
        assert_eq!(problem.num_variables(), 2);
        assert_eq!(problem.integer_columns(), &[x]);
        assert!(problem.is_milp());
    }

    #[test]
    fn rejects_row_referencing_unknown_variable() {
        let mut builder = ProblemBuilder::new();
        let err = builder
            .add_linear_constraint(vec![(VariableId(3), 1.0)], 0.0, 1.0)
            .unwrap_err();
        assert!(matches!(
            err,
            BranchConeError::VariableIndexOutOfRange { .. }
        ));
    }
}
