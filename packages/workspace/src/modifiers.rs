//! UI-facing modifier API.
//!
//! Each method is a thin wrapper that builds the corresponding semantic
//! mutation and hands it to the synchronizer's edit path; drag-and-drop and
//! menu actions call these and nothing else.

use std::sync::Arc;

use boardwalk_editor::Mutation;
use boardwalk_parser::EntityData;

use crate::state::{DocumentSynchronizer, StateError};

pub struct BoardModifiers {
    sync: Arc<DocumentSynchronizer>,
}

impl BoardModifiers {
    pub fn new(sync: Arc<DocumentSynchronizer>) -> Self {
        Self { sync }
    }

    pub fn add_item(&self, lane_path: Vec<usize>, title_raw: impl Into<String>) -> Result<(), StateError> {
        self.sync.apply(&Mutation::AddItem {
            lane_path,
            title_raw: title_raw.into(),
        })
    }

    pub fn insert_entities(
        &self,
        path: Vec<usize>,
        entities: Vec<EntityData>,
    ) -> Result<(), StateError> {
        self.sync.apply(&Mutation::InsertEntities { path, entities })
    }

    pub fn replace_entity(&self, path: Vec<usize>, data: EntityData) -> Result<(), StateError> {
        self.sync.apply(&Mutation::ReplaceEntity { path, data })
    }

    pub fn update_item(
        &self,
        path: Vec<usize>,
        title_raw: Option<String>,
        check_char: Option<char>,
    ) -> Result<(), StateError> {
        self.sync.apply(&Mutation::UpdateItem {
            path,
            title_raw,
            check_char,
        })
    }

    pub fn move_entity(&self, source: Vec<usize>, destination: Vec<usize>) -> Result<(), StateError> {
        self.sync.apply(&Mutation::MoveEntity {
            source,
            destination,
        })
    }

    pub fn archive_item(&self, path: Vec<usize>) -> Result<(), StateError> {
        self.sync.apply(&Mutation::ArchiveItem { path })
    }

    pub fn duplicate_entity(&self, path: Vec<usize>) -> Result<(), StateError> {
        self.sync.apply(&Mutation::DuplicateEntity { path })
    }

    pub fn delete_entity(&self, path: Vec<usize>) -> Result<(), StateError> {
        self.sync.apply(&Mutation::DeleteEntity { path })
    }
}
