use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::settings::BoardSettings;

/// Node type tags for the board tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Board,
    Lane,
    Item,
}

impl EntityKind {
    /// Static table of legal parent -> child pairs.
    ///
    /// Board holds lanes, lanes hold items, items are leaves. The mutation
    /// engine consults this before any structural change.
    pub fn accepts(self, child: EntityKind) -> bool {
        matches!(
            (self, child),
            (EntityKind::Board, EntityKind::Lane) | (EntityKind::Lane, EntityKind::Item)
        )
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Board => write!(f, "board"),
            EntityKind::Lane => write!(f, "lane"),
            EntityKind::Item => write!(f, "item"),
        }
    }
}

/// Type-specific payload of a tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityData {
    Board(BoardData),
    Lane(LaneData),
    Item(ItemData),
}

impl EntityData {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityData::Board(_) => EntityKind::Board,
            EntityData::Lane(_) => EntityKind::Lane,
            EntityData::Item(_) => EntityKind::Item,
        }
    }
}

/// Generic ordered tree node.
///
/// `id` is opaque and generated fresh at creation; it is never parsed from
/// text, so reparsing the same document yields structurally-equivalent but
/// id-distinct entities. Children are `Arc`-shared: through-copy operations
/// rebuild only the spine from root to the touched node and share every
/// untouched subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub data: EntityData,
    pub children: Vec<Arc<Entity>>,
}

impl Entity {
    pub fn new(id: String, data: EntityData) -> Self {
        Self {
            id,
            data,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.data.kind()
    }

    pub fn as_board(&self) -> Option<&BoardData> {
        match &self.data {
            EntityData::Board(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_lane(&self) -> Option<&LaneData> {
        match &self.data {
            EntityData::Lane(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&ItemData> {
        match &self.data {
            EntityData::Item(data) => Some(data),
            _ => None,
        }
    }

    /// Content equality: everything except ids and captured error reports.
    ///
    /// Reparsing regenerates ids, and error reports are session diagnostics
    /// that never reach the document, so the round-trip law and the move
    /// no-op law are stated over this relation rather than `==`.
    pub fn content_eq(&self, other: &Entity) -> bool {
        let data_eq = match (&self.data, &other.data) {
            (EntityData::Board(a), EntityData::Board(b)) => {
                a.settings == b.settings
                    && a.archive.len() == b.archive.len()
                    && a.archive
                        .iter()
                        .zip(b.archive.iter())
                        .all(|(x, y)| x.content_eq(y))
            }
            (EntityData::Lane(a), EntityData::Lane(b)) => a == b,
            (EntityData::Item(a), EntityData::Item(b)) => a == b,
            _ => false,
        };

        data_eq
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.content_eq(b))
    }
}

/// Root payload: persisted settings, the flat archive, and captured errors.
///
/// The archive is order-preserving and lives outside `children`; archived
/// items are not part of any lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardData {
    pub settings: BoardSettings,
    pub archive: Vec<Arc<Entity>>,
    pub errors: Vec<ErrorReport>,
}

impl Default for BoardData {
    fn default() -> Self {
        Self {
            settings: BoardSettings::default(),
            archive: Vec::new(),
            errors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneData {
    pub title: String,
    /// Soft cap on the number of items, surfaced by the UI
    pub max_items: Option<usize>,
    /// Cards added to this lane are auto-flagged complete
    pub should_mark_items_complete: bool,
}

impl LaneData {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            max_items: None,
            should_mark_items_complete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    /// Verbatim source text after the checkbox, the only persisted truth
    pub title_raw: String,
    /// Display projection: `title_raw` minus recognized date/time tokens.
    /// Derived, never persisted.
    pub title: String,
    /// Search projection: lowercased display title with tag markers dropped
    pub title_search: String,
    pub checked: bool,
    /// The literal character inside `[ ]`; non-`x` done markers are kept
    pub check_char: char,
    pub metadata: ItemMetadata,
}

impl ItemData {
    /// Build item data from raw title text, deriving all metadata and title
    /// projections. This is the single construction path for items, used by
    /// the parser on load and by the mutation layer for new cards.
    pub fn from_raw(
        title_raw: impl Into<String>,
        check_char: char,
        config: &crate::config::ParserConfig,
    ) -> Self {
        let title_raw = title_raw.into();
        let metadata = crate::metadata::extract_metadata(&title_raw, config);
        let (title, title_search) = crate::metadata::derived_titles(&title_raw, &metadata);

        Self {
            title_raw,
            title,
            title_search,
            checked: check_char != ' ',
            check_char,
            metadata,
        }
    }
}

/// Inline metadata derived from an item's raw title
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// Original date token text (trigger + wrapped value), for display-title
    /// stripping
    pub date_str: Option<String>,
    pub time_str: Option<String>,
    pub tags: Vec<String>,
    /// First referenced file, if any
    pub file_accessor: Option<FileAccessor>,
    pub inline_fields: Vec<InlineField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkStyle {
    /// `[[target]]` or `[[target|label]]`
    Wiki,
    /// `[label](target)`
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAccessor {
    pub target: String,
    pub label: Option<String>,
    pub style: LinkStyle,
}

/// Original wrapping convention of an inline field, retained so the field
/// can be reconstructed verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldWrap {
    /// `key:: value`
    DoubleColon,
    /// `<symbol>{value}` for keys that declare a shorthand symbol
    Shorthand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineField {
    pub key: String,
    pub value: String,
    pub wrap: FieldWrap,
}

/// Structured error captured on the board instead of thrown across the
/// mutation boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub description: String,
    pub stack: String,
}

impl ErrorReport {
    pub fn new(description: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            stack: stack.into(),
        }
    }
}
