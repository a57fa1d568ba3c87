//! Binary encode/decode for the handful of types the external parallel broker
//! exchanges between workers: problems, nodes, individual rows, and incumbents.
//!
//! Every frame is `[4-byte tag][4-byte length][payload]`, little-endian
//! throughout; payloads are a flat sequence of fixed-width fields and
//! length-prefixed arrays/strings. The broker itself — dispatch, load balancing,
//! process topology — is out of scope here; this module only has to produce
//! bytes that round-trip.

mod cursor;

pub use cursor::Cursor;
pub use cursor::Writer;

use crate::basic_types::BranchConeError;
use crate::basic_types::ConeId;
use crate::basic_types::ConeType;
use crate::basic_types::LinearRowId;
use crate::basic_types::NodeId;
use crate::basic_types::ObjectRef;
use crate::basic_types::Result;
use crate::basic_types::Sense;
use crate::basic_types::VariableId;
use crate::driver::Incumbent;
use crate::model::conic_constraint::ConicConstraint;
use crate::model::linear_constraint::LinearConstraint;
use crate::model::variable::Variable;
use crate::model::Problem;

pub const TAG_PROBLEM: u32 = 0x01;
pub const TAG_NODE: u32 = 0x02;
pub const TAG_LINEAR_CONSTRAINT: u32 = 0x03;
pub const TAG_CONIC_CONSTRAINT: u32 = 0x04;
pub const TAG_INCUMBENT: u32 = 0x05;

/// A type that can be written as one tagged, length-prefixed frame.
pub trait Frame: Sized {
    const TAG: u32;

    fn encode_payload(&self, writer: &mut Writer);
    fn decode_payload(cursor: &mut Cursor) -> Result<Self>;
}

pub fn encode_frame<T: Frame>(value: &T) -> Vec<u8> {
    let mut payload = Vec::new();
    value.encode_payload(&mut Writer::new(&mut payload));
    let mut frame = Vec::with_capacity(8 + payload.len());
    frame.extend_from_slice(&T::TAG.to_le_bytes());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    frame
}

pub fn decode_frame<T: Frame>(buffer: &[u8]) -> Result<T> {
    if buffer.len() < 8 {
        return Err(BranchConeError::DecodeError("frame shorter than the 8-byte header".into()));
    }
    let tag = u32::from_le_bytes(buffer[0..4].try_into().unwrap());
    if tag != T::TAG {
        return Err(BranchConeError::DecodeError(format!(
            "expected frame tag {:#04x}, found {:#04x}",
            T::TAG,
            tag
        )));
    }
    let length = u32::from_le_bytes(buffer[4..8].try_into().unwrap()) as usize;
    let payload = buffer
        .get(8..8 + length)
        .ok_or_else(|| BranchConeError::DecodeError("declared length exceeds buffer".into()))?;
    let mut cursor = Cursor::new(payload);
    T::decode_payload(&mut cursor)
}

fn write_linear_constraint(row: &LinearConstraint, writer: &mut Writer) {
    writer.write_u32(row.id.0);
    writer.write_u32(row.entries.len() as u32);
    for (variable, coefficient) in &row.entries {
        writer.write_u32(variable.0);
        writer.write_f64(*coefficient);
    }
    writer.write_f64(row.lower_bound);
    writer.write_f64(row.upper_bound);
}

fn read_linear_constraint(cursor: &mut Cursor) -> Result<LinearConstraint> {
    let id = LinearRowId(cursor.read_u32()?);
    let count = cursor.read_u32()? as usize;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let variable = VariableId(cursor.read_u32()?);
        let coefficient = cursor.read_f64()?;
        entries.push((variable, coefficient));
    }
    let lower_bound = cursor.read_f64()?;
    let upper_bound = cursor.read_f64()?;
    LinearConstraint::new(id, entries, lower_bound, upper_bound)
}

impl Frame for LinearConstraint {
    const TAG: u32 = TAG_LINEAR_CONSTRAINT;

    fn encode_payload(&self, writer: &mut Writer) {
        write_linear_constraint(self, writer);
    }

    fn decode_payload(cursor: &mut Cursor) -> Result<Self> {
        read_linear_constraint(cursor)
    }
}

fn write_cone_type(cone_type: ConeType, writer: &mut Writer) {
    writer.write_u8(match cone_type {
        ConeType::Lorentz => 0,
        ConeType::RotatedLorentz => 1,
    });
}

fn read_cone_type(cursor: &mut Cursor) -> Result<ConeType> {
    match cursor.read_u8()? {
        0 => Ok(ConeType::Lorentz),
        1 => Ok(ConeType::RotatedLorentz),
        other => Err(BranchConeError::UnknownEnumValue {
            name: "coneType",
            value: other.to_string(),
        }),
    }
}

fn write_conic_constraint(cone: &ConicConstraint, writer: &mut Writer) {
    writer.write_u32(cone.id.0);
    write_cone_type(cone.cone_type, writer);
    writer.write_u32(cone.members.len() as u32);
    for member in &cone.members {
        writer.write_u32(member.0);
    }
}

fn read_conic_constraint(cursor: &mut Cursor) -> Result<ConicConstraint> {
    let id = ConeId(cursor.read_u32()?);
    let cone_type = read_cone_type(cursor)?;
    let count = cursor.read_u32()? as usize;
    let mut members = Vec::with_capacity(count);
    for _ in 0..count {
        members.push(VariableId(cursor.read_u32()?));
    }
    ConicConstraint::new(id, cone_type, members)
}

impl Frame for ConicConstraint {
    const TAG: u32 = TAG_CONIC_CONSTRAINT;

    fn encode_payload(&self, writer: &mut Writer) {
        write_conic_constraint(self, writer);
    }

    fn decode_payload(cursor: &mut Cursor) -> Result<Self> {
        read_conic_constraint(cursor)
    }
}

impl Frame for Problem {
    const TAG: u32 = TAG_PROBLEM;

    fn encode_payload(&self, writer: &mut Writer) {
        writer.write_u8(match self.sense {
            Sense::Minimize => 0,
            Sense::Maximize => 1,
        });
        writer.write_u32(self.variables.len() as u32);
        for variable in self.variables.iter() {
            writer.write_f64(variable.lower_bound);
            writer.write_f64(variable.upper_bound);
            writer.write_u8(variable.integer as u8);
        }
        writer.write_u32(self.objective.len() as u32);
        for coefficient in &self.objective {
            writer.write_f64(*coefficient);
        }
        writer.write_u32(self.linear_constraints.len() as u32);
        for row in self.linear_constraints.iter() {
            write_linear_constraint(row, writer);
        }
        writer.write_u32(self.conic_constraints.len() as u32);
        for cone in self.conic_constraints.iter() {
            write_conic_constraint(cone, writer);
        }
    }

    fn decode_payload(cursor: &mut Cursor) -> Result<Self> {
        use crate::model::ProblemBuilder;

        let sense = match cursor.read_u8()? {
            0 => Sense::Minimize,
            1 => Sense::Maximize,
            other => {
                return Err(BranchConeError::UnknownEnumValue {
                    name: "sense",
                    value: other.to_string(),
                })
            }
        };
        let mut builder = ProblemBuilder::new();
        builder.set_sense(sense);

        let num_variables = cursor.read_u32()? as usize;
        let mut variables = Vec::with_capacity(num_variables);
        for _ in 0..num_variables {
            let lower_bound = cursor.read_f64()?;
            let upper_bound = cursor.read_f64()?;
            let integer = cursor.read_u8()? != 0;
            variables.push(builder.add_variable(lower_bound, upper_bound, integer)?);
        }

        let num_objective = cursor.read_u32()? as usize;
        if num_objective != variables.len() {
            return Err(BranchConeError::ObjectiveLengthMismatch {
                given: num_objective,
                expected: variables.len(),
            });
        }
        for &variable in &variables {
            builder.set_objective_coefficient(variable, cursor.read_f64()?);
        }

        let num_rows = cursor.read_u32()? as usize;
        for _ in 0..num_rows {
            let row = read_linear_constraint(cursor)?;
            builder.add_linear_constraint(row.entries, row.lower_bound, row.upper_bound)?;
        }

        let num_cones = cursor.read_u32()? as usize;
        for _ in 0..num_cones {
            let cone = read_conic_constraint(cursor)?;
            builder.add_conic_constraint(cone.cone_type, cone.members)?;
        }

        builder.build()
    }
}

fn write_object_ref(object: ObjectRef, writer: &mut Writer) {
    match object {
        ObjectRef::Integer(variable) => {
            writer.write_u8(0);
            writer.write_u32(variable.0);
        }
        ObjectRef::Linear(row) => {
            writer.write_u8(1);
            writer.write_u32(row.0);
        }
        ObjectRef::Conic(cone) => {
            writer.write_u8(2);
            writer.write_u32(cone.0);
        }
    }
}

fn read_object_ref(cursor: &mut Cursor) -> Result<ObjectRef> {
    let kind = cursor.read_u8()?;
    let index = cursor.read_u32()?;
    match kind {
        0 => Ok(ObjectRef::Integer(VariableId(index))),
        1 => Ok(ObjectRef::Linear(LinearRowId(index))),
        2 => Ok(ObjectRef::Conic(ConeId(index))),
        other => Err(BranchConeError::UnknownEnumValue {
            name: "objectRefKind",
            value: other.to_string(),
        }),
    }
}

/// The subset of [`crate::node::Node`] state worth shipping across the wire: the
/// local bound tightenings and branching trail. Warm-start state is backend-specific
/// and not carried — a node received by another worker starts its relaxation cold.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub depth: u32,
    pub lower_bounds: Vec<f64>,
    pub upper_bounds: Vec<f64>,
    pub branched_on: Option<ObjectRef>,
    pub estimated_bound: f64,
}

impl Frame for EncodedNode {
    const TAG: u32 = TAG_NODE;

    fn encode_payload(&self, writer: &mut Writer) {
        writer.write_u64(self.id.0);
        writer.write_u8(self.parent.is_some() as u8);
        if let Some(parent) = self.parent {
            writer.write_u64(parent.0);
        }
        writer.write_u32(self.depth);
        writer.write_u32(self.lower_bounds.len() as u32);
        for value in &self.lower_bounds {
            writer.write_f64(*value);
        }
        writer.write_u32(self.upper_bounds.len() as u32);
        for value in &self.upper_bounds {
            writer.write_f64(*value);
        }
        writer.write_u8(self.branched_on.is_some() as u8);
        if let Some(object) = self.branched_on {
            write_object_ref(object, writer);
        }
        writer.write_f64(self.estimated_bound);
    }

    fn decode_payload(cursor: &mut Cursor) -> Result<Self> {
        let id = NodeId(cursor.read_u64()?);
        let parent = if cursor.read_u8()? != 0 {
            Some(NodeId(cursor.read_u64()?))
        } else {
            None
        };
        let depth = cursor.read_u32()?;
        let num_lower = cursor.read_u32()? as usize;
        let mut lower_bounds = Vec::with_capacity(num_lower);
        for _ in 0..num_lower {
            lower_bounds.push(cursor.read_f64()?);
        }
        let num_upper = cursor.read_u32()? as usize;
        let mut upper_bounds = Vec::with_capacity(num_upper);
        for _ in 0..num_upper {
            upper_bounds.push(cursor.read_f64()?);
        }
        let branched_on = if cursor.read_u8()? != 0 {
            Some(read_object_ref(cursor)?)
        } else {
            None
        };
        let estimated_bound = cursor.read_f64()?;
        Ok(EncodedNode {
            id,
            parent,
            depth,
            lower_bounds,
            upper_bounds,
            branched_on,
            estimated_bound,
        })
    }
}

impl Frame for Incumbent {
    const TAG: u32 = TAG_INCUMBENT;

    fn encode_payload(&self, writer: &mut Writer) {
        writer.write_u32(self.values.len() as u32);
        for value in &self.values {
            writer.write_f64(*value);
        }
        writer.write_f64(self.objective_value);
    }

    fn decode_payload(cursor: &mut Cursor) -> Result<Self> {
        let count = cursor.read_u32()? as usize;
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(cursor.read_f64()?);
        }
        let objective_value = cursor.read_f64()?;
        Ok(Incumbent {
            values,
            objective_value,
        })
    }
}

// Only reached through `Frame`, but kept around as the type checker's reminder that
// `Variable` fields feed the problem encoding above without a frame of its own.
#[allow(dead_code)]
fn _variable_fields_are_exhaustively_encoded(_: &Variable) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Sense;
    use crate::model::ProblemBuilder;

    #[test]
    fn linear_constraint_round_trips() {
        let row = LinearConstraint::new(
            LinearRowId(2),
            vec![(VariableId(0), 1.0), (VariableId(3), -2.5)],
            0.0,
            10.0,
        )
        .unwrap();
        let bytes = encode_frame(&row);
        let decoded: LinearConstraint = decode_frame(&bytes).unwrap();
        assert_eq!(decoded.entries, row.entries);
        assert_eq!(decoded.lower_bound, row.lower_bound);
        assert_eq!(decoded.upper_bound, row.upper_bound);
    }

    #[test]
    fn conic_constraint_round_trips() {
        let cone = ConicConstraint::new(
            ConeId(0),
            ConeType::RotatedLorentz,
            vec![VariableId(0), VariableId(1), VariableId(2)],
        )
        .unwrap();
        let bytes = encode_frame(&cone);
        let decoded: ConicConstraint = decode_frame(&bytes).unwrap();
        assert_eq!(decoded.cone_type, cone.cone_type);
        assert_eq!(decoded.members, cone.members);
    }

    #[test]
    fn problem_round_trips() {
        let mut builder = ProblemBuilder::new();
        builder.set_sense(Sense::Maximize);
        let x = builder.add_variable(0.0, 10.0, true).unwrap();
        let y = builder.add_variable(-5.0, 5.0, false).unwrap();
        builder.set_objective_coefficient(x, 1.0);
        builder.set_objective_coefficient(y, 2.0);
        builder
            .add_linear_constraint(vec![(x, 1.0), (y, 1.0)], 0.0, 8.0)
            .unwrap();
        builder
            .add_conic_constraint(ConeType::Lorentz, vec![x, y])
            .unwrap();
        let problem = builder.build().unwrap();

        let bytes = encode_frame(&problem);
        let decoded: Problem = decode_frame(&bytes).unwrap();
        assert_eq!(decoded.sense, problem.sense);
        assert_eq!(decoded.objective, problem.objective);
        assert_eq!(decoded.num_variables(), problem.num_variables());
        assert_eq!(decoded.linear_constraints.len(), problem.linear_constraints.len());
        assert_eq!(decoded.conic_constraints.len(), problem.conic_constraints.len());
    }

    #[test]
    fn node_round_trips_without_warm_start() {
        let node = EncodedNode {
            id: NodeId(7),
            parent: Some(NodeId(3)),
            depth: 2,
            lower_bounds: vec![0.0, 1.0],
            upper_bounds: vec![4.0, 9.0],
            branched_on: Some(ObjectRef::Integer(VariableId(1))),
            estimated_bound: -3.5,
        };
        let bytes = encode_frame(&node);
        let decoded: EncodedNode = decode_frame(&bytes).unwrap();
        assert_eq!(decoded, node);
    }

    #[test]
    fn incumbent_round_trips() {
        let incumbent = Incumbent {
            values: vec![1.0, 2.0, 3.0],
            objective_value: 42.0,
        };
        let bytes = encode_frame(&incumbent);
        let decoded: Incumbent = decode_frame(&bytes).unwrap();
        assert_eq!(decoded.values, incumbent.values);
        assert_eq!(decoded.objective_value, incumbent.objective_value);
    }

    #[test]
    fn decode_rejects_the_wrong_tag() {
        let row = LinearConstraint::new(LinearRowId(0), vec![(VariableId(0), 1.0)], 0.0, 1.0).unwrap();
        let bytes = encode_frame(&row);
        let err = decode_frame::<ConicConstraint>(&bytes).unwrap_err();
        assert!(matches!(err, BranchConeError::DecodeError(_)));
    }
}
