use serde::{Deserialize, Serialize};

/// A recognized inline metadata key.
///
/// A field is matched either by the explicit `key:: value` convention or,
/// when a shorthand symbol is declared, by `<symbol>{value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataKeyDef {
    pub key: String,
    pub shorthand: Option<String>,
}

impl MetadataKeyDef {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shorthand: None,
        }
    }

    pub fn with_shorthand(key: impl Into<String>, shorthand: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            shorthand: Some(shorthand.into()),
        }
    }
}

/// Parser configuration supplied by the host configuration provider.
///
/// Per-document frontmatter settings override these via
/// `BoardSettings::apply_to`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    /// Marker sequence introducing a date token, e.g. `@{2024-01-05}`
    pub date_trigger: String,
    /// Marker sequence introducing a time token, e.g. `@@{10:30}`
    pub time_trigger: String,
    /// chrono format string for date values
    pub date_format: String,
    /// chrono format string for time values
    pub time_format: String,
    pub metadata_keys: Vec<MetadataKeyDef>,
    /// Prefix archived items with a formatted timestamp
    pub archive_with_date: bool,
    pub archive_date_format: String,
    pub archive_date_separator: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            date_trigger: "@".to_string(),
            time_trigger: "@@".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            time_format: "%H:%M".to_string(),
            metadata_keys: Vec::new(),
            archive_with_date: false,
            archive_date_format: "%Y-%m-%d %H:%M".to_string(),
            archive_date_separator: " ".to_string(),
        }
    }
}
