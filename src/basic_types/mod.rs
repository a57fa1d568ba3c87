//! Foundational types shared across the engine: id spaces, small enums, the error
//! taxonomy, statistics, and a seeded random source.

pub mod enums;
pub mod error;
pub mod ids;
pub mod keyed_vec;
pub mod random;
pub mod statistics;

pub use enums::*;
pub use error::BranchConeError;
pub use error::Result;
pub use ids::ConeId;
pub use ids::LinearRowId;
pub use ids::NodeId;
pub use ids::ObjectRef;
pub use ids::VariableId;
pub use keyed_vec::KeyedVec;
pub use keyed_vec::StorageKey;
pub use random::Random;
pub use statistics::Statistics;
