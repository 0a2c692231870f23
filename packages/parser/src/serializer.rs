//! Board tree -> document text.
//!
//! The inverse of the parser: lanes emit in child order, items use the
//! stored check character untouched, and the archive trails the body behind
//! its separator. Layout is canonical (single blank line between blocks),
//! so serializing a freshly-parsed board is byte-stable.

use crate::board::Entity;

/// Serialize a board tree to document text
pub fn serialize(board: &Entity) -> String {
    Serializer::new().serialize(board)
}

pub struct Serializer;

impl Serializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&mut self, board: &Entity) -> String {
        let mut output = String::new();
        let Some(data) = board.as_board() else {
            return output;
        };

        if !data.settings.is_empty() {
            output.push_str("---\n");
            output.push_str(&data.settings.to_yaml());
            output.push_str("---\n");
        }

        for lane in &board.children {
            if !output.is_empty() {
                output.push('\n');
            }
            self.serialize_lane(lane, &mut output);
        }

        if !data.archive.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str("***\n\n## Archive\n\n");
            for item in &data.archive {
                self.serialize_item(item, &mut output);
            }
        }

        output
    }

    fn serialize_lane(&mut self, lane: &Entity, output: &mut String) {
        let Some(data) = lane.as_lane() else {
            return;
        };

        output.push_str("## ");
        output.push_str(&data.title);
        if let Some(max) = data.max_items {
            output.push_str(&format!(" ({})", max));
        }
        output.push('\n');

        if data.should_mark_items_complete {
            output.push_str("\n**Complete**\n");
        }

        if !lane.children.is_empty() {
            output.push('\n');
            for item in &lane.children {
                self.serialize_item(item, output);
            }
        }
    }

    fn serialize_item(&mut self, item: &Entity, output: &mut String) {
        let Some(data) = item.as_item() else {
            return;
        };

        output.push_str("- [");
        output.push(data.check_char);
        output.push(']');
        if !data.title_raw.is_empty() {
            output.push(' ');
            output.push_str(&data.title_raw);
        }
        output.push('\n');
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_checkbox_fidelity() {
        let board = parse("## Todo\n\n- [/] Task\n").unwrap();
        let text = serialize(&board);
        assert!(text.contains("- [/] Task"), "got: {text}");
    }

    #[test]
    fn test_round_trip_content_equality() {
        let source = "\
---
board-plugin: basic
archive-with-date: true
---

## Todo (3)

- [ ] first @{2024-01-05}
- [x] second #tag

## Done

**Complete**

- [x] shipped [[notes/release]]

***

## Archive

- [x] old
";
        let board = parse(source).unwrap();
        let reparsed = parse(&serialize(&board)).unwrap();
        assert!(board.content_eq(&reparsed));
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let source = "## A\n\n\n- [ ]   spaced   raw  \n##B not a lane\n- [x] done\n";
        let board = parse(source).unwrap();
        let once = serialize(&board);
        let twice = serialize(&parse(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_frontmatter_key_order_is_stable() {
        let source = "---\ntheme: dark\nboard-plugin: basic\n---\n\n## A\n";
        let board = parse(source).unwrap();
        let text = serialize(&board);

        let marker = text.find("board-plugin").unwrap();
        let theme = text.find("theme").unwrap();
        assert!(marker < theme);
    }

    #[test]
    fn test_empty_board_serializes_to_empty_text() {
        let board = parse("").unwrap();
        assert_eq!(serialize(&board), "");
    }

    #[test]
    fn test_empty_raw_title_has_no_trailing_space() {
        let board = parse("## A\n\n- [x]\n").unwrap();
        let text = serialize(&board);
        assert!(text.contains("- [x]\n"));
        assert!(!text.contains("- [x] \n"));
    }
}
