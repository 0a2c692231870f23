//! Error types for the mutation engine

use boardwalk_parser::EntityKind;
use thiserror::Error;

/// A structural operation failed; the input tree is untouched by
/// construction (all operations are through-copy).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StructuralError {
    #[error("No entity at path {path:?}")]
    NotFound { path: Vec<usize> },

    #[error("A {parent} cannot contain a {child}")]
    InvalidChildType {
        parent: EntityKind,
        child: EntityKind,
    },

    #[error("Expected a {expected} at path {path:?}, found a {found}")]
    KindMismatch {
        path: Vec<usize>,
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("The root entity cannot be addressed by this operation")]
    EmptyPath,
}

impl StructuralError {
    pub fn not_found(path: &[usize]) -> Self {
        Self::NotFound {
            path: path.to_vec(),
        }
    }

    pub fn kind_mismatch(path: &[usize], expected: EntityKind, found: EntityKind) -> Self {
        Self::KindMismatch {
            path: path.to_vec(),
            expected,
            found,
        }
    }
}

/// A high-level mutation failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("Mutation target at {path:?} is not an item")]
    NotAnItem { path: Vec<usize> },

    #[error("Mutation target at {path:?} is not a lane")]
    NotALane { path: Vec<usize> },
}
