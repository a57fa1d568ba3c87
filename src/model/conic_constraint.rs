use crate::basic_types::BranchConeError;
use crate::basic_types::ConeId;
use crate::basic_types::ConeType;
use crate::basic_types::Result;
use crate::basic_types::StorageKey;
use crate::basic_types::VariableId;

/// A second-order cone constraint over an ordered list of member variables.
///
/// For [`ConeType::Lorentz`] the first member is the apex (`x_1 >= ||x_2..x_n||`);
/// for [`ConeType::RotatedLorentz`] the first two members are the apex pair
/// (`2 x_1 x_2 >= x_3^2 + .. + x_n^2`, `x_1, x_2 >= 0`).
#[derive(Debug, Clone)]
pub struct ConicConstraint {
    pub id: ConeId,
    pub cone_type: ConeType,
    pub members: Vec<VariableId>,
}

impl ConicConstraint {
    pub fn new(id: ConeId, cone_type: ConeType, members: Vec<VariableId>) -> Result<Self> {
        if members.len() < cone_type.minimum_size() {
            return Err(BranchConeError::ConeTooSmall {
                cone_type: cone_type.name(),
                size: members.len(),
            });
        }
        Ok(ConicConstraint {
            id,
            cone_type,
            members,
        })
    }

    /// `> 0` if `x` lies strictly inside the cone, `0` on the boundary, `< 0` outside.
    pub fn margin(&self, x: &[f64]) -> f64 {
        let values: Vec<f64> = self.members.iter().map(|v| x[v.index()]).collect();
        match self.cone_type {
            ConeType::Lorentz => {
                let apex = values[0];
                let radius = values[1..].iter().map(|v| v * v).sum::<f64>().sqrt();
                apex - radius
            }
            ConeType::RotatedLorentz => {
                let (a, b) = (values[0], values[1]);
                if a < 0.0 || b < 0.0 {
                    return a.min(b);
                }
                2.0 * a * b - values[2..].iter().map(|v| v * v).sum::<f64>()
            }
        }
    }

    pub fn is_satisfied(&self, x: &[f64], tolerance: f64) -> bool {
        self.margin(x) >= -tolerance
    }

    /// A subgradient of the cone's defining inequality at `x`, used by the outer
    /// approximation cut generator to build a supporting hyperplane. Returned in the
    /// same order as [`Self::members`].
    pub fn gradient(&self, x: &[f64]) -> Vec<f64> {
        let values: Vec<f64> = self.members.iter().map(|v| x[v.index()]).collect();
        match self.cone_type {
            ConeType::Lorentz => {
                let radius = values[1..].iter().map(|v| v * v).sum::<f64>().sqrt();
                let mut gradient = vec![1.0];
                if radius > 1e-12 {
                    gradient.extend(values[1..].iter().map(|v| -v / radius));
                } else {
                    gradient.extend(values[1..].iter().map(|_| 0.0));
                }
                gradient
            }
            ConeType::RotatedLorentz => {
                let mut gradient = vec![2.0 * values[1], 2.0 * values[0]];
                gradient.extend(values[2..].iter().map(|v| -2.0 * v));
                gradient
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lorentz_margin_matches_definition() {
        let cone = ConicConstraint::new(
            ConeId(0),
            ConeType::Lorentz,
            vec![VariableId(0), VariableId(1), VariableId(2)],
        )
        .unwrap();
        assert!(cone.margin(&[5.0, 3.0, 4.0]).abs() < 1e-9);
        assert!(cone.margin(&[10.0, 3.0, 4.0]) > 0.0);
        assert!(cone.margin(&[1.0, 3.0, 4.0]) < 0.0);
    }

    #[test]
    fn rotated_cone_requires_three_members() {
        let err =
            ConicConstraint::new(ConeId(0), ConeType::RotatedLorentz, vec![VariableId(0)])
                .unwrap_err();
        assert!(matches!(err, BranchConeError::ConeTooSmall { .. }));
    }

    #[test]
    fn rotated_margin_matches_definition() {
        let cone = ConicConstraint::new(
            ConeId(0),
            ConeType::RotatedLorentz,
            vec![VariableId(0), VariableId(1), VariableId(2)],
        )
        .unwrap();
        // 2*2*4 = 16 >= 3^2 = 9
        assert!(cone.margin(&[2.0, 4.0, 3.0]) > 0.0);
    }
}
