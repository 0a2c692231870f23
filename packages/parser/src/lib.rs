pub mod board;
pub mod config;
pub mod error;
pub mod id_generator;
pub mod metadata;
pub mod parser;
pub mod serializer;
pub mod settings;

pub use board::{
    BoardData, Entity, EntityData, EntityKind, ErrorReport, FieldWrap, FileAccessor, InlineField,
    ItemData, ItemMetadata, LaneData, LinkStyle,
};
pub use config::{MetadataKeyDef, ParserConfig};
pub use error::{ParseError, ParseResult};
pub use id_generator::{document_seed, IdGenerator};
pub use parser::{parse, parse_with_path, Parser, ARCHIVE_HEADING};
pub use serializer::{serialize, Serializer};
pub use settings::{BoardSettings, BOARD_MARKER_KEY};
