//! # Boardwalk Editor
//!
//! Pure mutation engine for board trees.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markdown text → board tree          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: path-addressed tree operations      │
//! │  - get/update/insert/remove/move/archive    │
//! │  - through-copy, Arc-shared subtrees        │
//! │  - static parent→child legality table       │
//! │  - semantic Mutation layer for UI actions   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ workspace: synchronizer + persistence       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is immutable**: operations return new trees; a failed
//!    operation cannot leave a half-applied state behind
//! 2. **Paths, not pointers**: nodes are addressed by child-index paths
//!    recomputed after each change; entities carry no parent references
//! 3. **Types before structure**: the Board→Lane→Item allow-list is
//!    checked before any write

pub mod errors;
pub mod mutations;
pub mod operations;
pub mod path;

pub use errors::{MutationError, StructuralError};
pub use mutations::{Mutation, MutationContext};
pub use operations::{
    append_entities, archive_item, get_entity, insert_entity, move_entity, prepend_entities,
    remove_entity, update_entity,
};
pub use path::{parent_and_index, same_parent};
