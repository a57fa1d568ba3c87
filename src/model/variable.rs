use crate::basic_types::BranchConeError;
use crate::basic_types::Result;
use crate::basic_types::VariableId;

/// A decision variable: a column of the relaxation plus, optionally, the integrality
/// requirement the branching layer enforces.
#[derive(Debug, Clone)]
pub struct Variable {
    pub id: VariableId,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub integer: bool,
    pub name: Option<String>,
}

impl Variable {
    pub fn new(
        id: VariableId,
        mut lower_bound: f64,
        mut upper_bound: f64,
        integer: bool,
    ) -> Result<Self> {
        if lower_bound > upper_bound {
            return Err(BranchConeError::InconsistentVariableBounds {
                lower: lower_bound,
                upper: upper_bound,
            });
        }
        if integer {
            lower_bound = lower_bound.ceil();
            upper_bound = upper_bound.floor();
            if lower_bound > upper_bound {
                return Err(BranchConeError::InconsistentVariableBounds {
                    lower: lower_bound,
                    upper: upper_bound,
                });
            }
        }
        Ok(Variable {
            id,
            lower_bound,
            upper_bound,
            integer,
            name: None,
        })
    }

    pub fn is_fixed(&self) -> bool {
        self.upper_bound - self.lower_bound < 1e-12
    }

    /// Distance of `value` from the nearest integer, `0.0` for continuous variables.
    pub fn fractionality(&self, value: f64) -> f64 {
        if !self.integer {
            return 0.0;
        }
        (value - value.round()).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_bounds_round_inward() {
        let v = Variable::new(VariableId(0), 0.4, 3.6, true).unwrap();
        assert_eq!(v.lower_bound, 1.0);
        assert_eq!(v.upper_bound, 3.0);
    }

    #[test]
    fn inconsistent_bounds_are_rejected() {
        let err = Variable::new(VariableId(0), 5.0, 1.0, false).unwrap_err();
        assert!(matches!(
            err,
            BranchConeError::InconsistentVariableBounds { .. }
        ));
    }

    #[test]
    fn rounding_can_produce_inconsistent_integer_bounds() {
        let err = Variable::new(VariableId(0), 0.2, 0.8, true).unwrap_err();
        assert!(matches!(
            err,
            BranchConeError::InconsistentVariableBounds { .. }
        ));
    }
}
