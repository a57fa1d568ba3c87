//! Strongly typed identifiers for the id spaces used throughout the engine.

use crate::basic_types::keyed_vec::StorageKey;

macro_rules! index_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl StorageKey for $name {
            fn index(&self) -> usize {
                self.0 as usize
            }

            fn create_from_index(index: usize) -> Self {
                $name(index as u32)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_id!(VariableId);
index_id!(LinearRowId);
index_id!(ConeId);

/// Identifies a search node. Unlike the other ids this is never reused and only ever
/// grows, since nodes are created throughout the whole search rather than up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Refers to one of the three kinds of object the branching and cut layers reason
/// about: an integer-constrained variable, a linear row, or a conic row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Integer(VariableId),
    Linear(LinearRowId),
    Conic(ConeId),
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectRef::Integer(id) => write!(f, "int({id})"),
            ObjectRef::Linear(id) => write!(f, "row({id})"),
            ObjectRef::Conic(id) => write!(f, "cone({id})"),
        }
    }
}
