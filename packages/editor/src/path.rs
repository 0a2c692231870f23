//! Positional addressing.
//!
//! A path is the list of child indices from the root. Nodes carry no parent
//! back-references (that would cycle the tree); every address is recomputed
//! positionally after each structural change.
//!
//! Destination paths for moves are interpreted against the tree as it looks
//! after the source has been removed: removing index `i` shifts every
//! sibling index greater than `i` down by one before the destination index
//! is applied. Applying the index to the post-removal array directly is
//! what makes same-lane reordering land on the intended slot in both
//! directions, with no arithmetic on the index itself.

use crate::errors::StructuralError;

/// Split a path into its parent prefix and final index
pub fn parent_and_index(path: &[usize]) -> Result<(&[usize], usize), StructuralError> {
    match path.split_last() {
        Some((&index, parent)) => Ok((parent, index)),
        None => Err(StructuralError::EmptyPath),
    }
}

/// Whether two paths address siblings under the same parent
pub fn same_parent(a: &[usize], b: &[usize]) -> bool {
    a.len() == b.len() && !a.is_empty() && a[..a.len() - 1] == b[..b.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_and_index() {
        assert_eq!(parent_and_index(&[2, 5]).unwrap(), (&[2][..], 5));
        assert_eq!(parent_and_index(&[0]).unwrap(), (&[][..], 0));
        assert_eq!(parent_and_index(&[]), Err(StructuralError::EmptyPath));
    }

    #[test]
    fn test_same_parent() {
        assert!(same_parent(&[1, 0], &[1, 3]));
        assert!(same_parent(&[4], &[2]));
        assert!(!same_parent(&[1, 0], &[2, 0]));
        assert!(!same_parent(&[1, 0], &[1, 0, 2]));
        assert!(!same_parent(&[], &[]));
    }
}
