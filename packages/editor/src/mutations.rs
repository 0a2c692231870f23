//! # Board Mutations
//!
//! High-level semantic operations on a board, one per UI action.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each mutation is one user-visible action
//! 2. **Validated**: structural constraints are checked before any change
//! 3. **Pure**: `apply` returns a new board; on failure the previous board
//!    is still the caller's board
//!
//! ## Mutation Semantics
//!
//! ### MoveEntity
//! - Atomic relocation, destination interpreted post-removal
//! - Same-path moves are content-level no-ops
//!
//! ### ArchiveItem
//! - One transformation: the item leaves its lane and enters the archive
//! - With archive dating enabled, the raw title gains a timestamp prefix
//!
//! ### DuplicateEntity
//! - Deep copy with fresh ids, inserted directly after the source

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use boardwalk_parser::{Entity, EntityData, IdGenerator, ItemData, ParserConfig};

use crate::errors::MutationError;
use crate::operations;

/// Semantic mutations exposed to the UI layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Mutation {
    /// Append a new card to a lane. Lanes flagged to mark items complete
    /// produce an already-checked card.
    AddItem {
        lane_path: Vec<usize>,
        title_raw: String,
    },

    /// Insert freshly-created entities at a position
    InsertEntities {
        path: Vec<usize>,
        entities: Vec<EntityData>,
    },

    /// Replace the payload of the node at `path`. For items, derived
    /// projections are recomputed from the raw title.
    ReplaceEntity {
        path: Vec<usize>,
        data: EntityData,
    },

    /// Patch an item's raw title and/or check character
    UpdateItem {
        path: Vec<usize>,
        title_raw: Option<String>,
        check_char: Option<char>,
    },

    /// Relocate a node
    MoveEntity {
        source: Vec<usize>,
        destination: Vec<usize>,
    },

    /// Move an item from its lane into the board archive
    ArchiveItem { path: Vec<usize> },

    /// Deep-copy a node (fresh ids) next to itself
    DuplicateEntity { path: Vec<usize> },

    /// Remove a node and its descendants
    DeleteEntity { path: Vec<usize> },
}

/// Ambient inputs a mutation needs: the effective parser configuration,
/// the id generator of the owning document, and the wall-clock instant
/// supplied by the caller (kept out of this crate for purity).
pub struct MutationContext<'a> {
    pub config: &'a ParserConfig,
    pub ids: &'a mut IdGenerator,
    pub now: Option<NaiveDateTime>,
}

impl Mutation {
    /// Apply this mutation, returning the new board
    pub fn apply(&self, board: &Entity, ctx: &mut MutationContext) -> Result<Entity, MutationError> {
        match self {
            Mutation::AddItem {
                lane_path,
                title_raw,
            } => {
                let lane = operations::get_entity(board, lane_path)?;
                let lane_data = lane.as_lane().ok_or_else(|| MutationError::NotALane {
                    path: lane_path.clone(),
                })?;

                let check_char = if lane_data.should_mark_items_complete {
                    'x'
                } else {
                    ' '
                };
                let item = Entity::new(
                    ctx.ids.new_id(),
                    EntityData::Item(ItemData::from_raw(title_raw.clone(), check_char, ctx.config)),
                );

                Ok(operations::append_entities(board, lane_path, vec![item])?)
            }

            Mutation::InsertEntities { path, entities } => {
                let entities = entities
                    .iter()
                    .map(|data| Entity::new(ctx.ids.new_id(), normalize_data(data, ctx.config)))
                    .collect();
                Ok(operations::insert_entity(board, path, entities)?)
            }

            Mutation::ReplaceEntity { path, data } => {
                Ok(operations::update_entity(board, path, normalize_data(data, ctx.config))?)
            }

            Mutation::UpdateItem {
                path,
                title_raw,
                check_char,
            } => {
                let node = operations::get_entity(board, path)?;
                let item = node
                    .as_item()
                    .ok_or_else(|| MutationError::NotAnItem { path: path.clone() })?;

                let raw = title_raw.clone().unwrap_or_else(|| item.title_raw.clone());
                let check = check_char.unwrap_or(item.check_char);
                let data = EntityData::Item(ItemData::from_raw(raw, check, ctx.config));

                Ok(operations::update_entity(board, path, data)?)
            }

            Mutation::MoveEntity {
                source,
                destination,
            } => Ok(operations::move_entity(board, source, destination)?),

            Mutation::ArchiveItem { path } => {
                let stamp = match (ctx.config.archive_with_date, ctx.now) {
                    (true, Some(now)) => Some(format!(
                        "{}{}",
                        now.format(&ctx.config.archive_date_format),
                        ctx.config.archive_date_separator
                    )),
                    _ => None,
                };
                Ok(operations::archive_item(
                    board,
                    path,
                    stamp.as_deref(),
                    ctx.config,
                )?)
            }

            Mutation::DuplicateEntity { path } => {
                let node = operations::get_entity(board, path)?;
                let copy = clone_with_fresh_ids(node, ctx.ids);

                let mut dest = path.to_vec();
                if let Some(last) = dest.last_mut() {
                    *last += 1;
                }
                Ok(operations::insert_entity(board, &dest, vec![copy])?)
            }

            Mutation::DeleteEntity { path } => {
                let (tree, _) = operations::remove_entity(board, path)?;
                Ok(tree)
            }
        }
    }
}

/// Recompute an item payload's derived projections; other payloads pass
/// through unchanged.
fn normalize_data(data: &EntityData, config: &ParserConfig) -> EntityData {
    match data {
        EntityData::Item(item) => {
            EntityData::Item(ItemData::from_raw(item.title_raw.clone(), item.check_char, config))
        }
        other => other.clone(),
    }
}

/// Deep copy with fresh ids at every level
fn clone_with_fresh_ids(node: &Entity, ids: &mut IdGenerator) -> Entity {
    let mut copy = Entity::new(ids.new_id(), node.data.clone());
    copy.children = node
        .children
        .iter()
        .map(|child| std::sync::Arc::new(clone_with_fresh_ids(child, ids)))
        .collect();
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardwalk_parser::parse;

    fn ctx_parts() -> (ParserConfig, IdGenerator) {
        (ParserConfig::default(), IdGenerator::new("/test.md"))
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::MoveEntity {
            source: vec![0, 3],
            destination: vec![1, 0],
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();
        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_add_item_to_complete_lane_is_checked() {
        let board = parse("## Done\n\n**Complete**\n").unwrap();
        let (config, mut ids) = ctx_parts();
        let mut ctx = MutationContext {
            config: &config,
            ids: &mut ids,
            now: None,
        };

        let mutation = Mutation::AddItem {
            lane_path: vec![0],
            title_raw: "finished thing".to_string(),
        };
        let updated = mutation.apply(&board, &mut ctx).unwrap();

        let item = updated.children[0].children[0].as_item().unwrap();
        assert!(item.checked);
        assert_eq!(item.check_char, 'x');
    }

    #[test]
    fn test_add_item_to_plain_lane_is_unchecked() {
        let board = parse("## Todo\n").unwrap();
        let (config, mut ids) = ctx_parts();
        let mut ctx = MutationContext {
            config: &config,
            ids: &mut ids,
            now: None,
        };

        let mutation = Mutation::AddItem {
            lane_path: vec![0],
            title_raw: "new thing".to_string(),
        };
        let updated = mutation.apply(&board, &mut ctx).unwrap();

        let item = updated.children[0].children[0].as_item().unwrap();
        assert!(!item.checked);
        assert_eq!(item.check_char, ' ');
    }

    #[test]
    fn test_duplicate_gets_fresh_ids() {
        let board = parse("## Todo\n\n- [ ] original\n").unwrap();
        let (config, mut ids) = ctx_parts();
        let mut ctx = MutationContext {
            config: &config,
            ids: &mut ids,
            now: None,
        };

        let mutation = Mutation::DuplicateEntity { path: vec![0, 0] };
        let updated = mutation.apply(&board, &mut ctx).unwrap();

        let lane = &updated.children[0];
        assert_eq!(lane.children.len(), 2);
        assert!(lane.children[0].content_eq(&lane.children[1]));
        assert_ne!(lane.children[0].id, lane.children[1].id);
    }

    #[test]
    fn test_update_item_rederives_metadata() {
        let board = parse("## Todo\n\n- [ ] plain\n").unwrap();
        let (config, mut ids) = ctx_parts();
        let mut ctx = MutationContext {
            config: &config,
            ids: &mut ids,
            now: None,
        };

        let mutation = Mutation::UpdateItem {
            path: vec![0, 0],
            title_raw: Some("due soon @{2024-09-01}".to_string()),
            check_char: None,
        };
        let updated = mutation.apply(&board, &mut ctx).unwrap();

        let item = updated.children[0].children[0].as_item().unwrap();
        assert_eq!(
            item.metadata.date,
            chrono::NaiveDate::from_ymd_opt(2024, 9, 1)
        );
        assert_eq!(item.title, "due soon");
    }

    #[test]
    fn test_failed_mutation_keeps_previous_board() {
        let board = parse("## Todo\n\n- [ ] a\n").unwrap();
        let (config, mut ids) = ctx_parts();
        let mut ctx = MutationContext {
            config: &config,
            ids: &mut ids,
            now: None,
        };

        let mutation = Mutation::DeleteEntity { path: vec![4, 2] };
        let err = mutation.apply(&board, &mut ctx).unwrap_err();
        assert!(matches!(err, MutationError::Structural(_)));

        // the caller still holds the untouched board
        assert_eq!(board.children[0].children.len(), 1);
    }
}
