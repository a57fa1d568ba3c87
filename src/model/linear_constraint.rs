use crate::basic_types::BranchConeError;
use crate::basic_types::LinearRowId;
use crate::basic_types::Result;
use crate::basic_types::StorageKey;
use crate::basic_types::VariableId;

/// A ranged linear row: `lower_bound <= sum(coefficients . x) <= upper_bound`.
///
/// Entries are stored sparse and sorted by variable index; both the cut engine and
/// the reference relaxation rely on that ordering to merge rows without re-sorting.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    pub id: LinearRowId,
    pub entries: Vec<(VariableId, f64)>,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl LinearConstraint {
    pub fn new(
        id: LinearRowId,
        entries: Vec<(VariableId, f64)>,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<Self> {
        if entries.is_empty() {
            return Err(BranchConeError::EmptyLinearRow);
        }
        if lower_bound > upper_bound {
            return Err(BranchConeError::InconsistentVariableBounds {
                lower: lower_bound,
                upper: upper_bound,
            });
        }
        for pair in entries.windows(2) {
            if pair[0].0.index() >= pair[1].0.index() {
                return Err(BranchConeError::UnsortedRow);
            }
        }
        Ok(LinearConstraint {
            id,
            entries,
            lower_bound,
            upper_bound,
        })
    }

    pub fn evaluate(&self, x: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|(variable, coefficient)| coefficient * x[variable.index()])
            .sum()
    }

    /// Positive if `x` violates the lower bound, negative if it violates the upper
    /// bound, zero if `x` is feasible for this row within `tolerance`.
    pub fn violation(&self, x: &[f64], tolerance: f64) -> f64 {
        let value = self.evaluate(x);
        if value < self.lower_bound - tolerance {
            self.lower_bound - value
        } else if value > self.upper_bound + tolerance {
            self.upper_bound - value
        } else {
            0.0
        }
    }

    pub fn is_satisfied(&self, x: &[f64], tolerance: f64) -> bool {
        self.violation(x, tolerance) == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_row() {
        let err = LinearConstraint::new(LinearRowId(0), vec![], 0.0, 1.0).unwrap_err();
        assert!(matches!(err, BranchConeError::EmptyLinearRow));
    }

    #[test]
    fn rejects_unsorted_entries() {
        let err = LinearConstraint::new(
            LinearRowId(0),
            vec![(VariableId(1), 1.0), (VariableId(0), 1.0)],
            0.0,
            1.0,
        )
        .unwrap_err();
        assert!(matches!(err, BranchConeError::UnsortedRow));
    }

    #[test]
    fn violation_reports_signed_excess() {
        let row = LinearConstraint::new(
            LinearRowId(0),
            vec![(VariableId(0), 1.0), (VariableId(1), 1.0)],
            0.0,
            1.0,
        )
        .unwrap();
        assert_eq!(row.violation(&[2.0, 2.0], 1e-9), 1.0 - 4.0);
        assert_eq!(row.violation(&[-1.0, 0.0], 1e-9), 0.0 - -1.0);
        assert_eq!(row.violation(&[0.3, 0.3], 1e-9), 0.0);
    }
}
