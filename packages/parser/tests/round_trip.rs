//! Round-trip and idempotence laws over parser-producible boards

use boardwalk_parser::{parse, parse_with_path, serialize, MetadataKeyDef, ParserConfig};

const DOCUMENTS: &[&str] = &[
    "",
    "## Todo\n",
    "## Todo\n\n- [ ] one\n- [x] two\n",
    "---\nboard-plugin: basic\n---\n\n## A\n\n- [/] half done\n",
    "\
---
board-plugin: basic
archive-with-date: true
archive-date-format: '%Y-%m-%d'
theme: dark
---

## Backlog (10)

- [ ] research @{2024-05-01} #deep
- [ ] write up [[notes/draft|draft]]

## Doing

- [-] blocked on review

## Done

**Complete**

- [x] kickoff @{2024-04-01} @@{09:00}

***

## Archive

- [x] 2024-03-01 ancient task
",
];

#[test]
fn parse_serialize_round_trip_preserves_content() {
    for source in DOCUMENTS {
        let board = parse(source).unwrap();
        let reparsed = parse(&serialize(&board)).unwrap();
        assert!(
            board.content_eq(&reparsed),
            "round-trip changed content for:\n{source}"
        );
    }
}

#[test]
fn serialize_parse_serialize_is_identity() {
    for source in DOCUMENTS {
        let board = parse(source).unwrap();
        let once = serialize(&board);
        let twice = serialize(&parse(&once).unwrap());
        assert_eq!(once, twice, "serialization not idempotent for:\n{source}");
    }
}

#[test]
fn date_extraction_keeps_raw_title_intact() {
    let board = parse("## Todo\n\n- [ ] Buy milk @{2024-01-05}\n").unwrap();
    let item = board.children[0].children[0].as_item().unwrap();

    assert_eq!(
        item.metadata.date,
        chrono::NaiveDate::from_ymd_opt(2024, 1, 5)
    );
    assert_eq!(item.title, "Buy milk");
    assert_eq!(item.title_raw, "Buy milk @{2024-01-05}");

    // the token survives a save
    let text = serialize(&board);
    assert!(text.contains("- [ ] Buy milk @{2024-01-05}"));
}

#[test]
fn configured_metadata_keys_round_trip() {
    let config = ParserConfig {
        metadata_keys: vec![
            MetadataKeyDef::new("due"),
            MetadataKeyDef::with_shorthand("priority", "!"),
        ],
        ..Default::default()
    };

    let source = "## Todo\n\n- [ ] ship due:: friday !{high}\n";
    let board = parse_with_path(source, "/b.md", &config).unwrap();
    let item = board.children[0].children[0].as_item().unwrap();

    assert_eq!(item.metadata.inline_fields.len(), 2);

    let text = serialize(&board);
    assert!(text.contains("due:: friday"));
    assert!(text.contains("!{high}"));
}

#[test]
fn settings_overrides_change_parsing() {
    let source = "\
---
board-plugin: basic
date-trigger: '!'
---

## Todo

- [ ] pay rent !{2024-06-01}
";
    let board = parse(source).unwrap();
    let item = board.children[0].children[0].as_item().unwrap();
    assert_eq!(
        item.metadata.date,
        chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
    );
}
