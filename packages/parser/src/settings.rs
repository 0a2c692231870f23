use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::config::ParserConfig;
use crate::error::{ParseError, ParseResult};

/// Frontmatter key identifying a document as board-typed
pub const BOARD_MARKER_KEY: &str = "board-plugin";

const ARCHIVE_WITH_DATE_KEY: &str = "archive-with-date";
const ARCHIVE_DATE_FORMAT_KEY: &str = "archive-date-format";
const ARCHIVE_DATE_SEPARATOR_KEY: &str = "archive-date-separator";
const DATE_TRIGGER_KEY: &str = "date-trigger";
const TIME_TRIGGER_KEY: &str = "time-trigger";
const DATE_FORMAT_KEY: &str = "date-format";
const TIME_FORMAT_KEY: &str = "time-format";

/// Persisted per-document configuration overrides.
///
/// Recognized keys are lifted into typed fields; everything else passes
/// through `extra` in document order so hand-written frontmatter survives a
/// save untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Value of the board marker key, when present
    pub board_marker: Option<String>,
    pub archive_with_date: Option<bool>,
    pub archive_date_format: Option<String>,
    pub archive_date_separator: Option<String>,
    pub date_trigger: Option<String>,
    pub time_trigger: Option<String>,
    pub date_format: Option<String>,
    pub time_format: Option<String>,
    /// Unrecognized frontmatter entries, order preserved
    pub extra: Vec<(String, Value)>,
}

impl BoardSettings {
    pub fn is_empty(&self) -> bool {
        self.board_marker.is_none()
            && self.archive_with_date.is_none()
            && self.archive_date_format.is_none()
            && self.archive_date_separator.is_none()
            && self.date_trigger.is_none()
            && self.time_trigger.is_none()
            && self.date_format.is_none()
            && self.time_format.is_none()
            && self.extra.is_empty()
    }

    /// Parse a frontmatter YAML block into settings
    pub fn from_yaml(source: &str) -> ParseResult<Self> {
        if source.trim().is_empty() {
            return Ok(BoardSettings::default());
        }

        let mapping: serde_yaml::Mapping = serde_yaml::from_str(source)
            .map_err(|e| ParseError::frontmatter(e.to_string()))?;

        let mut settings = BoardSettings::default();

        for (key, value) in mapping {
            let key = match key {
                Value::String(s) => s,
                other => {
                    return Err(ParseError::frontmatter(format!(
                        "non-string frontmatter key: {:?}",
                        other
                    )))
                }
            };

            match key.as_str() {
                BOARD_MARKER_KEY => settings.board_marker = as_string(&value),
                ARCHIVE_WITH_DATE_KEY => settings.archive_with_date = value.as_bool(),
                ARCHIVE_DATE_FORMAT_KEY => settings.archive_date_format = as_string(&value),
                ARCHIVE_DATE_SEPARATOR_KEY => settings.archive_date_separator = as_string(&value),
                DATE_TRIGGER_KEY => settings.date_trigger = as_string(&value),
                TIME_TRIGGER_KEY => settings.time_trigger = as_string(&value),
                DATE_FORMAT_KEY => settings.date_format = as_string(&value),
                TIME_FORMAT_KEY => settings.time_format = as_string(&value),
                _ => settings.extra.push((key, value)),
            }
        }

        Ok(settings)
    }

    /// Render the settings back to YAML with stable key ordering: the board
    /// marker first, recognized keys next, passthrough entries last in their
    /// original order.
    pub fn to_yaml(&self) -> String {
        let mut mapping = serde_yaml::Mapping::new();

        if let Some(marker) = &self.board_marker {
            mapping.insert(
                Value::String(BOARD_MARKER_KEY.to_string()),
                Value::String(marker.clone()),
            );
        }
        if let Some(v) = self.archive_with_date {
            mapping.insert(
                Value::String(ARCHIVE_WITH_DATE_KEY.to_string()),
                Value::Bool(v),
            );
        }
        if let Some(v) = &self.archive_date_format {
            mapping.insert(
                Value::String(ARCHIVE_DATE_FORMAT_KEY.to_string()),
                Value::String(v.clone()),
            );
        }
        if let Some(v) = &self.archive_date_separator {
            mapping.insert(
                Value::String(ARCHIVE_DATE_SEPARATOR_KEY.to_string()),
                Value::String(v.clone()),
            );
        }
        if let Some(v) = &self.date_trigger {
            mapping.insert(
                Value::String(DATE_TRIGGER_KEY.to_string()),
                Value::String(v.clone()),
            );
        }
        if let Some(v) = &self.time_trigger {
            mapping.insert(
                Value::String(TIME_TRIGGER_KEY.to_string()),
                Value::String(v.clone()),
            );
        }
        if let Some(v) = &self.date_format {
            mapping.insert(
                Value::String(DATE_FORMAT_KEY.to_string()),
                Value::String(v.clone()),
            );
        }
        if let Some(v) = &self.time_format {
            mapping.insert(
                Value::String(TIME_FORMAT_KEY.to_string()),
                Value::String(v.clone()),
            );
        }
        for (key, value) in &self.extra {
            mapping.insert(Value::String(key.clone()), value.clone());
        }

        // A mapping built above is always serializable
        serde_yaml::to_string(&mapping).unwrap_or_default()
    }

    /// Merge these overrides into a base parser configuration
    pub fn apply_to(&self, base: &ParserConfig) -> ParserConfig {
        let mut config = base.clone();

        if let Some(v) = self.archive_with_date {
            config.archive_with_date = v;
        }
        if let Some(v) = &self.archive_date_format {
            config.archive_date_format = v.clone();
        }
        if let Some(v) = &self.archive_date_separator {
            config.archive_date_separator = v.clone();
        }
        if let Some(v) = &self.date_trigger {
            config.date_trigger = v.clone();
        }
        if let Some(v) = &self.time_trigger {
            config.time_trigger = v.clone();
        }
        if let Some(v) = &self.date_format {
            config.date_format = v.clone();
        }
        if let Some(v) = &self.time_format {
            config.time_format = v.clone();
        }

        config
    }
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
