//! Error taxonomy for the engine.
//!
//! Only programmer-facing or fatal conditions are ever propagated as a [`Result`].
//! Anything that happens at the level of a single node or a single relaxation solve
//! (infeasibility, a stalled cut generator, a non-improving resolve) is folded into
//! node status and statistics instead, since in a branch-and-bound search those are
//! expected outcomes rather than failures; see [`crate::node`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BranchConeError>;

#[derive(Debug, Error)]
pub enum BranchConeError {
    #[error("variable bounds are inconsistent: lower {lower} > upper {upper}")]
    InconsistentVariableBounds { lower: f64, upper: f64 },

    #[error("linear constraint row is empty")]
    EmptyLinearRow,

    #[error("linear constraint references variable index out of range: {index}")]
    VariableIndexOutOfRange { index: u32 },

    #[error("linear constraint coefficients are not sorted by variable index")]
    UnsortedRow,

    #[error("conic constraint of type {cone_type} has {size} members, which is too few")]
    ConeTooSmall { cone_type: &'static str, size: usize },

    #[error("objective coefficients length {given} does not match variable count {expected}")]
    ObjectiveLengthMismatch { given: usize, expected: usize },

    #[error("unknown value {value} for enumerated option {name}")]
    UnknownEnumValue { name: &'static str, value: String },

    #[error("a cut generator's frequency is 0 while its strategy needs one: {0}")]
    InvalidCutFrequency(&'static str),

    #[error("relaxation backend reported a failure: {0}")]
    RelaxationFailure(String),

    #[error("resource budget exhausted: {0}")]
    ResourceExhausted(&'static str),

    #[error("failed to read instance file: {0}")]
    InstanceReadError(String),

    #[error("malformed encoded buffer: {0}")]
    DecodeError(String),
}

impl BranchConeError {
    /// The numbered catalog code associated with this error, for the message layer.
    pub fn code(&self) -> u32 {
        match self {
            BranchConeError::InstanceReadError(_) => 9001,
            BranchConeError::ConeTooSmall { .. } => 9002,
            BranchConeError::InconsistentVariableBounds { .. } => 9010,
            BranchConeError::EmptyLinearRow => 9011,
            BranchConeError::VariableIndexOutOfRange { .. } => 9012,
            BranchConeError::UnsortedRow => 9013,
            BranchConeError::ObjectiveLengthMismatch { .. } => 9014,
            BranchConeError::InvalidCutFrequency(_) => 9301,
            BranchConeError::RelaxationFailure(_) => 9402,
            BranchConeError::ResourceExhausted(_) => 9901,
            BranchConeError::UnknownEnumValue { name, .. } => match *name {
                "coneType" => 9903,
                "branchStrategy" => 9904,
                "cutStrategy" | "heurStrategy" => 9905,
                _ => 9906,
            },
            BranchConeError::DecodeError(_) => 9009,
        }
    }
}
