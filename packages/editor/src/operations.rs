//! # Path-Addressed Operations
//!
//! Pure structural operations over the board tree.
//!
//! ## Design Principles
//!
//! 1. **Through-copy**: every operation returns a new tree; the input is
//!    never touched. Children are `Arc`-shared, so only the spine from the
//!    root to the edited node is rebuilt.
//! 2. **All-or-nothing**: a failed operation returns a typed error and no
//!    partially-applied tree can exist.
//! 3. **Type-checked**: the static `EntityKind::accepts` table is consulted
//!    before any structural change. The three-level Board/Lane/Item shape
//!    also makes cycles unrepresentable, so no cycle check is needed.
//!
//! ## Move Semantics
//!
//! `move_entity` removes first; the destination's final index then lands in
//! the post-removal sibling array, which is what makes same-lane reordering
//! hit the intended slot in both directions. In a lane `[A,B,C,D]`, moving
//! index 0 to 3 yields `[B,C,D,A]` and moving 3 to 0 yields `[D,A,B,C]`.

use std::sync::Arc;

use boardwalk_parser::{Entity, EntityData, EntityKind, ItemData, ParserConfig};

use crate::errors::StructuralError;
use crate::path::parent_and_index;

/// Walk a path and return the addressed node.
///
/// Fails with `NotFound` carrying the offending prefix if any index is out
/// of range at any depth.
pub fn get_entity<'a>(root: &'a Entity, path: &[usize]) -> Result<&'a Entity, StructuralError> {
    let mut node = root;
    for depth in 0..path.len() {
        node = node
            .children
            .get(path[depth])
            .ok_or_else(|| StructuralError::not_found(&path[..depth + 1]))?;
    }
    Ok(node)
}

/// Replace the payload of the node at `path`, keeping its id and children.
///
/// The payload kind must not change; repurposing a node as a different
/// entity type would bypass the parent allow-list.
pub fn update_entity(
    root: &Entity,
    path: &[usize],
    data: EntityData,
) -> Result<Entity, StructuralError> {
    rebuild(root, path, 0, &mut |node| {
        if node.kind() != data.kind() {
            return Err(StructuralError::kind_mismatch(
                path,
                node.kind(),
                data.kind(),
            ));
        }
        let mut copy = node.clone();
        copy.data = data.clone();
        Ok(copy)
    })
}

/// Insert nodes at the position given by the path's final index, shifting
/// later siblings right. The final index may equal the current child count
/// (append position).
pub fn insert_entity(
    root: &Entity,
    path: &[usize],
    entities: Vec<Entity>,
) -> Result<Entity, StructuralError> {
    let arcs: Vec<Arc<Entity>> = entities.into_iter().map(Arc::new).collect();
    insert_arcs(root, path, arcs)
}

pub(crate) fn insert_arcs(
    root: &Entity,
    path: &[usize],
    entities: Vec<Arc<Entity>>,
) -> Result<Entity, StructuralError> {
    let (parent_path, index) = parent_and_index(path)?;

    rebuild(root, parent_path, 0, &mut |parent| {
        for entity in &entities {
            if !parent.kind().accepts(entity.kind()) {
                return Err(StructuralError::InvalidChildType {
                    parent: parent.kind(),
                    child: entity.kind(),
                });
            }
        }
        if index > parent.children.len() {
            return Err(StructuralError::not_found(path));
        }

        let mut copy = parent.clone();
        copy.children.splice(index..index, entities.iter().cloned());
        Ok(copy)
    })
}

/// Detach the node at `path`, returning the new tree and the detached node.
/// The caller owns reattachment (moving, archiving).
pub fn remove_entity(
    root: &Entity,
    path: &[usize],
) -> Result<(Entity, Arc<Entity>), StructuralError> {
    let (parent_path, index) = parent_and_index(path)?;
    let mut removed: Option<Arc<Entity>> = None;

    let tree = rebuild(root, parent_path, 0, &mut |parent| {
        if index >= parent.children.len() {
            return Err(StructuralError::not_found(path));
        }
        let mut copy = parent.clone();
        removed = Some(copy.children.remove(index));
        Ok(copy)
    })?;

    let removed = removed.expect("rebuild ran the edit closure");
    Ok((tree, removed))
}

/// Insert nodes at the end of a parent's children
pub fn append_entities(
    root: &Entity,
    parent_path: &[usize],
    entities: Vec<Entity>,
) -> Result<Entity, StructuralError> {
    let mut path = parent_path.to_vec();
    path.push(get_entity(root, parent_path)?.children.len());
    insert_entity(root, &path, entities)
}

/// Insert nodes at the start of a parent's children
pub fn prepend_entities(
    root: &Entity,
    parent_path: &[usize],
    entities: Vec<Entity>,
) -> Result<Entity, StructuralError> {
    let mut path = parent_path.to_vec();
    path.push(0);
    insert_entity(root, &path, entities)
}

/// Composite move: read, remove, insert at the destination as interpreted
/// against the post-removal tree. Fails without side effects if either
/// endpoint is invalid. Moving a node to its own path is a content-level
/// no-op.
pub fn move_entity(
    root: &Entity,
    source: &[usize],
    destination: &[usize],
) -> Result<Entity, StructuralError> {
    get_entity(root, source)?;

    let (tree, node) = remove_entity(root, source)?;
    insert_arcs(&tree, destination, vec![node])
}

/// Atomically remove an item from its lane and append it to the board
/// archive. When `stamp` is set (archive dating), the item's raw title is
/// prefixed with it and the derived projections recomputed; no intermediate
/// tree is ever observable with the item in neither or both places.
pub fn archive_item(
    root: &Entity,
    path: &[usize],
    stamp: Option<&str>,
    config: &ParserConfig,
) -> Result<Entity, StructuralError> {
    let node = get_entity(root, path)?;
    if node.kind() != EntityKind::Item {
        return Err(StructuralError::kind_mismatch(
            path,
            EntityKind::Item,
            node.kind(),
        ));
    }

    let (mut tree, node) = remove_entity(root, path)?;

    let archived = match (stamp, node.as_item()) {
        (Some(stamp), Some(item)) => {
            let raw = format!("{}{}", stamp, item.title_raw);
            Arc::new(Entity::new(
                node.id.clone(),
                EntityData::Item(ItemData::from_raw(raw, item.check_char, config)),
            ))
        }
        _ => node,
    };

    match &mut tree.data {
        EntityData::Board(board) => board.archive.push(archived),
        _ => {
            return Err(StructuralError::kind_mismatch(
                &[],
                EntityKind::Board,
                tree.kind(),
            ))
        }
    }

    Ok(tree)
}

/// Rebuild the spine from the root to the node at `path`, applying `edit`
/// to that node. Untouched subtrees are shared with the input tree.
fn rebuild<F>(
    node: &Entity,
    path: &[usize],
    depth: usize,
    edit: &mut F,
) -> Result<Entity, StructuralError>
where
    F: FnMut(&Entity) -> Result<Entity, StructuralError>,
{
    if depth == path.len() {
        return edit(node);
    }

    let index = path[depth];
    let child = node
        .children
        .get(index)
        .ok_or_else(|| StructuralError::not_found(&path[..depth + 1]))?;

    let rebuilt = rebuild(child, path, depth + 1, edit)?;

    let mut copy = node.clone();
    copy.children[index] = Arc::new(rebuilt);
    Ok(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardwalk_parser::parse;

    fn board() -> Entity {
        parse("## One\n\n- [ ] a\n- [ ] b\n\n## Two\n\n- [ ] c\n").unwrap()
    }

    fn item_raw(root: &Entity, path: &[usize]) -> String {
        get_entity(root, path)
            .unwrap()
            .as_item()
            .unwrap()
            .title_raw
            .clone()
    }

    #[test]
    fn test_get_entity() {
        let root = board();
        assert_eq!(item_raw(&root, &[0, 1]), "b");
        assert_eq!(
            get_entity(&root, &[0]).unwrap().as_lane().unwrap().title,
            "One"
        );
    }

    #[test]
    fn test_get_entity_reports_failing_prefix() {
        let root = board();
        let err = get_entity(&root, &[0, 9, 4]).unwrap_err();
        assert_eq!(err, StructuralError::NotFound { path: vec![0, 9] });
    }

    #[test]
    fn test_untouched_subtrees_are_shared() {
        let root = board();
        let updated = update_entity(
            &root,
            &[0],
            EntityData::Lane(boardwalk_parser::LaneData::new("Renamed")),
        )
        .unwrap();

        // lane Two was not on the edited spine
        assert!(Arc::ptr_eq(&root.children[1], &updated.children[1]));
        assert!(!Arc::ptr_eq(&root.children[0], &updated.children[0]));
    }

    #[test]
    fn test_insert_shifts_later_siblings() {
        let root = board();
        let config = ParserConfig::default();
        let item = Entity::new(
            "t-1".to_string(),
            EntityData::Item(ItemData::from_raw("inserted", ' ', &config)),
        );

        let updated = insert_entity(&root, &[0, 1], vec![item]).unwrap();
        assert_eq!(item_raw(&updated, &[0, 0]), "a");
        assert_eq!(item_raw(&updated, &[0, 1]), "inserted");
        assert_eq!(item_raw(&updated, &[0, 2]), "b");
    }

    #[test]
    fn test_insert_rejects_illegal_child_type() {
        let root = board();
        let lane = Entity::new(
            "t-2".to_string(),
            EntityData::Lane(boardwalk_parser::LaneData::new("Nested")),
        );

        // a lane under a lane
        let err = insert_entity(&root, &[0, 0], vec![lane.clone()]).unwrap_err();
        assert_eq!(
            err,
            StructuralError::InvalidChildType {
                parent: EntityKind::Lane,
                child: EntityKind::Lane,
            }
        );

        // a lane under an item
        let err = insert_entity(&root, &[0, 0, 0], vec![lane]).unwrap_err();
        assert_eq!(
            err,
            StructuralError::InvalidChildType {
                parent: EntityKind::Item,
                child: EntityKind::Lane,
            }
        );
    }

    #[test]
    fn test_failed_insert_leaves_tree_unchanged() {
        let root = board();
        let before = root.clone();
        let lane = Entity::new(
            "t-3".to_string(),
            EntityData::Lane(boardwalk_parser::LaneData::new("Nested")),
        );

        let _ = insert_entity(&root, &[0, 0], vec![lane]);
        assert_eq!(root, before);
    }

    #[test]
    fn test_remove_returns_detached_node() {
        let root = board();
        let (tree, node) = remove_entity(&root, &[0, 0]).unwrap();

        assert_eq!(node.as_item().unwrap().title_raw, "a");
        assert_eq!(tree.children[0].children.len(), 1);
        assert_eq!(item_raw(&tree, &[0, 0]), "b");
    }

    #[test]
    fn test_append_and_prepend() {
        let root = board();
        let config = ParserConfig::default();
        let make = |raw: &str| {
            Entity::new(
                format!("t-{raw}"),
                EntityData::Item(ItemData::from_raw(raw, ' ', &config)),
            )
        };

        let updated = append_entities(&root, &[0], vec![make("last")]).unwrap();
        let updated = prepend_entities(&updated, &[0], vec![make("first")]).unwrap();

        assert_eq!(item_raw(&updated, &[0, 0]), "first");
        assert_eq!(item_raw(&updated, &[0, 3]), "last");
    }

    #[test]
    fn test_archive_is_atomic() {
        let root = board();
        let config = ParserConfig::default();

        let updated = archive_item(&root, &[0, 1], None, &config).unwrap();
        let data = updated.as_board().unwrap();

        assert_eq!(updated.children[0].children.len(), 1);
        assert_eq!(data.archive.len(), 1);
        assert_eq!(data.archive[0].as_item().unwrap().title_raw, "b");
    }

    #[test]
    fn test_archive_with_stamp_rewrites_raw_title() {
        let root = board();
        let config = ParserConfig::default();

        let updated = archive_item(&root, &[0, 0], Some("2024-01-05 "), &config).unwrap();
        let data = updated.as_board().unwrap();
        assert_eq!(data.archive[0].as_item().unwrap().title_raw, "2024-01-05 a");
    }

    #[test]
    fn test_archive_rejects_non_item() {
        let root = board();
        let config = ParserConfig::default();
        let err = archive_item(&root, &[0], None, &config).unwrap_err();
        assert!(matches!(err, StructuralError::KindMismatch { .. }));
    }
}
