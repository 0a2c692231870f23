//! Document text -> board tree.
//!
//! The document is line-oriented: an optional frontmatter block, level-2
//! headings opening lanes, checkbox list lines as items, and a trailing
//! archive region. Unrecognized lines are ignored, and a malformed
//! frontmatter block degrades to a best-effort parse with the failure
//! recorded on the board.

use std::sync::Arc;

use crate::board::{BoardData, Entity, EntityData, ErrorReport, ItemData, LaneData};
use crate::config::ParserConfig;
use crate::error::ParseResult;
use crate::id_generator::IdGenerator;
use crate::settings::BoardSettings;

/// The distinguished heading opening the archive region
pub const ARCHIVE_HEADING: &str = "Archive";

const FRONTMATTER_FENCE: &str = "---";
const COMPLETE_MARKER: &str = "**Complete**";

/// Parse with the default configuration and an anonymous document seed
pub fn parse(source: &str) -> ParseResult<Entity> {
    parse_with_path(source, "", &ParserConfig::default())
}

/// Parse a document, seeding entity ids from the file path
pub fn parse_with_path(source: &str, path: &str, config: &ParserConfig) -> ParseResult<Entity> {
    Parser::new(config.clone(), IdGenerator::new(path)).parse_document(source)
}

/// Parser for board documents
pub struct Parser {
    config: ParserConfig,
    ids: IdGenerator,
}

struct LaneBuilder {
    title: String,
    max_items: Option<usize>,
    should_mark_items_complete: bool,
    items: Vec<Arc<Entity>>,
}

impl Parser {
    pub fn new(config: ParserConfig, ids: IdGenerator) -> Self {
        Self { config, ids }
    }

    /// Parse a complete document into a board tree
    pub fn parse_document(&mut self, source: &str) -> ParseResult<Entity> {
        let mut errors: Vec<ErrorReport> = Vec::new();
        let lines: Vec<&str> = source.lines().collect();

        let (settings, body_start) = self.parse_frontmatter(&lines, &mut errors);
        let effective = settings.apply_to(&self.config);

        let mut lanes: Vec<Arc<Entity>> = Vec::new();
        let mut archive: Vec<Arc<Entity>> = Vec::new();
        let mut current: Option<LaneBuilder> = None;
        let mut in_archive = false;

        for line in &lines[body_start..] {
            let trimmed = line.trim();

            if let Some(heading) = trimmed.strip_prefix("## ") {
                if let Some(lane) = current.take() {
                    lanes.push(Arc::new(self.build_lane(lane)));
                }

                let heading = heading.trim();
                if heading == ARCHIVE_HEADING {
                    in_archive = true;
                    continue;
                }

                in_archive = false;
                let (title, max_items) = split_max_suffix(heading);
                current = Some(LaneBuilder {
                    title,
                    max_items,
                    should_mark_items_complete: false,
                    items: Vec::new(),
                });
                continue;
            }

            if trimmed == COMPLETE_MARKER {
                if let Some(lane) = &mut current {
                    if lane.items.is_empty() {
                        lane.should_mark_items_complete = true;
                    }
                }
                continue;
            }

            if let Some((check_char, raw)) = parse_item_line(trimmed) {
                let item = Arc::new(self.build_item(raw, check_char, &effective));
                if in_archive {
                    archive.push(item);
                } else if let Some(lane) = &mut current {
                    lane.items.push(item);
                }
                // An item before any heading has no lane to live in; it is
                // ignored like any other unrecognized line.
                continue;
            }
        }

        if let Some(lane) = current.take() {
            lanes.push(Arc::new(self.build_lane(lane)));
        }

        let mut board = Entity::new(
            self.ids.new_id(),
            EntityData::Board(BoardData {
                settings,
                archive,
                errors,
            }),
        );
        board.children = lanes;

        Ok(board)
    }

    /// Split off a leading frontmatter block, returning the parsed settings
    /// and the index of the first body line. A malformed block is recorded
    /// as a recoverable error and the rest of the document still parses.
    fn parse_frontmatter(
        &mut self,
        lines: &[&str],
        errors: &mut Vec<ErrorReport>,
    ) -> (BoardSettings, usize) {
        if lines.first().map(|l| l.trim()) != Some(FRONTMATTER_FENCE) {
            return (BoardSettings::default(), 0);
        }

        let close = lines[1..]
            .iter()
            .position(|l| l.trim() == FRONTMATTER_FENCE)
            .map(|i| i + 1);

        let Some(close) = close else {
            errors.push(ErrorReport::new(
                "Malformed frontmatter: missing closing fence",
                "frontmatter".to_string(),
            ));
            return (BoardSettings::default(), 1);
        };

        let yaml = lines[1..close].join("\n");
        match BoardSettings::from_yaml(&yaml) {
            Ok(settings) => (settings, close + 1),
            Err(err) => {
                errors.push(ErrorReport::new(err.to_string(), format!("{:?}", err)));
                (BoardSettings::default(), close + 1)
            }
        }
    }

    fn build_lane(&mut self, builder: LaneBuilder) -> Entity {
        let mut lane = Entity::new(
            self.ids.new_id(),
            EntityData::Lane(LaneData {
                title: builder.title,
                max_items: builder.max_items,
                should_mark_items_complete: builder.should_mark_items_complete,
            }),
        );
        lane.children = builder.items;
        lane
    }

    fn build_item(&mut self, raw: &str, check_char: char, config: &ParserConfig) -> Entity {
        Entity::new(
            self.ids.new_id(),
            EntityData::Item(ItemData::from_raw(raw, check_char, config)),
        )
    }
}

/// Parse a checkbox list line into its check character and verbatim rest.
///
/// The bracket accepts any single character; `checked` is decided later by
/// comparing against blank. Returns `None` for anything that is not an item
/// line.
fn parse_item_line(line: &str) -> Option<(char, &str)> {
    let rest = line.strip_prefix("- [")?;
    let check_char = rest.chars().next()?;
    let after = rest[check_char.len_utf8()..].strip_prefix(']')?;
    let raw = after.strip_prefix(' ').unwrap_or(after);
    Some((check_char, raw))
}

/// Split a trailing `(N)` max-item-count suffix off a lane heading
fn split_max_suffix(heading: &str) -> (String, Option<usize>) {
    if let Some(stripped) = heading.strip_suffix(')') {
        if let Some(open) = stripped.rfind('(') {
            let digits = &stripped[open + 1..];
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                if let Ok(max) = digits.parse::<usize>() {
                    return (heading[..open].trim_end().to_string(), Some(max));
                }
            }
        }
    }
    (heading.to_string(), None)
}
