//! Inline metadata extraction.
//!
//! Everything here derives from an item's raw title without mutating it:
//! the raw text is the persisted truth, and every projection (tags, dates,
//! fields, display title) is recomputed on parse.

use chrono::{NaiveDate, NaiveTime};
use std::ops::Range;

use crate::board::{FieldWrap, FileAccessor, InlineField, ItemMetadata, LinkStyle};
use crate::config::ParserConfig;

/// Extract all recognized metadata from a raw item title
pub fn extract_metadata(raw: &str, config: &ParserConfig) -> ItemMetadata {
    let masked = masked_regions(raw);

    let (date, date_str) = extract_stamp(raw, &config.date_trigger, &config.time_trigger, |v| {
        NaiveDate::parse_from_str(v, &config.date_format).ok()
    });
    let (time, time_str) = extract_stamp(raw, &config.time_trigger, "", |v| {
        NaiveTime::parse_from_str(v, &config.time_format).ok()
    });

    ItemMetadata {
        date,
        time,
        date_str,
        time_str,
        tags: extract_tags(raw, &masked),
        file_accessor: extract_file_accessor(raw),
        inline_fields: extract_inline_fields(raw, config),
    }
}

/// Derive the display and search titles from a raw title and its metadata.
///
/// Only the recognized date/time tokens are stripped; tags and fields stay
/// visible. The search title lowercases and drops tag markers.
pub fn derived_titles(raw: &str, metadata: &ItemMetadata) -> (String, String) {
    let mut title = raw.to_string();

    if let Some(token) = &metadata.time_str {
        title = strip_token(&title, token);
    }
    if let Some(token) = &metadata.date_str {
        title = strip_token(&title, token);
    }

    let title = title.trim().to_string();

    let mut search = title.to_lowercase();
    for tag in &metadata.tags {
        let marked = format!("#{}", tag.to_lowercase());
        search = search.replace(&marked, &tag.to_lowercase());
    }

    (title, search)
}

fn strip_token(text: &str, token: &str) -> String {
    match text.find(token) {
        Some(pos) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..pos]);
            out.push_str(&text[pos + token.len()..]);
            out.replace("  ", " ")
        }
        None => text.to_string(),
    }
}

/// Byte ranges covered by code spans and link syntax; tags inside these are
/// inert text.
fn masked_regions(raw: &str) -> Vec<Range<usize>> {
    let bytes = raw.as_bytes();
    let mut regions = Vec::new();

    // Code spans: between backtick pairs
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            if let Some(close) = raw[i + 1..].find('`') {
                regions.push(i..i + 1 + close + 1);
                i += close + 2;
                continue;
            }
        }
        i += 1;
    }

    // Wiki links [[...]] and markdown links [...](...)
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'[' {
            if raw[i..].starts_with("[[") {
                if let Some(close) = raw[i..].find("]]") {
                    regions.push(i..i + close + 2);
                    i += close + 2;
                    continue;
                }
            } else if let Some(close) = raw[i..].find(']') {
                let after = i + close + 1;
                if raw[after..].starts_with('(') {
                    if let Some(paren) = raw[after..].find(')') {
                        regions.push(i..after + paren + 1);
                        i = after + paren + 1;
                        continue;
                    }
                }
            }
        }
        i += 1;
    }

    regions
}

fn is_masked(pos: usize, masked: &[Range<usize>]) -> bool {
    masked.iter().any(|r| r.contains(&pos))
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '/' || c == '-'
}

fn extract_tags(raw: &str, masked: &[Range<usize>]) -> Vec<String> {
    let mut tags = Vec::new();

    for (pos, c) in raw.char_indices() {
        if c != '#' || is_masked(pos, masked) {
            continue;
        }
        let at_boundary = pos == 0
            || raw[..pos]
                .chars()
                .next_back()
                .map(|p| p.is_whitespace())
                .unwrap_or(true);
        if !at_boundary {
            continue;
        }

        let body: String = raw[pos + 1..].chars().take_while(|&c| is_tag_char(c)).collect();
        if !body.is_empty() && !tags.contains(&body) {
            tags.push(body);
        }
    }

    tags
}

fn extract_file_accessor(raw: &str) -> Option<FileAccessor> {
    let wiki = raw.find("[[");
    let markdown = find_markdown_link(raw);

    match (wiki, markdown) {
        (Some(w), Some((m, _, _))) if w < m => parse_wiki_link(raw, w),
        (Some(w), None) => parse_wiki_link(raw, w),
        (_, Some((_, label, target))) => Some(FileAccessor {
            target,
            label: Some(label),
            style: LinkStyle::Markdown,
        }),
        (None, None) => None,
    }
}

fn parse_wiki_link(raw: &str, start: usize) -> Option<FileAccessor> {
    let inner_start = start + 2;
    let close = raw[inner_start..].find("]]")?;
    let inner = &raw[inner_start..inner_start + close];

    let (target, label) = match inner.split_once('|') {
        Some((t, l)) => (t.to_string(), Some(l.to_string())),
        None => (inner.to_string(), None),
    };

    Some(FileAccessor {
        target,
        label,
        style: LinkStyle::Wiki,
    })
}

fn find_markdown_link(raw: &str) -> Option<(usize, String, String)> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'[' && !raw[i..].starts_with("[[") {
            if let Some(close) = raw[i..].find(']') {
                let after = i + close + 1;
                if raw[after..].starts_with('(') {
                    if let Some(paren) = raw[after..].find(')') {
                        let label = raw[i + 1..i + close].to_string();
                        let target = raw[after + 1..after + paren].to_string();
                        return Some((i, label, target));
                    }
                }
            }
        }
        i += 1;
    }
    None
}

/// Find the first valid `<trigger>{value}` or `<trigger>[[value]]` token.
///
/// `longer_trigger` guards against a trigger that is a prefix of another
/// (the default time trigger `@@` extends the date trigger `@`): positions
/// where the longer trigger matches are skipped. Invalid values are inert;
/// scanning continues, and only the first parseable token is promoted.
fn extract_stamp<T>(
    raw: &str,
    trigger: &str,
    longer_trigger: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> (Option<T>, Option<String>) {
    if trigger.is_empty() {
        return (None, None);
    }

    // Advance by one full character so overlapping trigger candidates
    // (e.g. the second `@` of `@@`) are still visited
    let step = trigger.chars().next().map(|c| c.len_utf8()).unwrap_or(1);

    let mut search_from = 0;
    while let Some(found) = raw[search_from..].find(trigger) {
        let pos = search_from + found;
        search_from = pos + step;

        if !longer_trigger.is_empty()
            && longer_trigger != trigger
            && raw[pos..].starts_with(longer_trigger)
        {
            continue;
        }

        let after = pos + trigger.len();
        let (value, token_end) = match wrapped_value(&raw[after..]) {
            Some((v, len)) => (v, after + len),
            None => continue,
        };

        if let Some(parsed) = parse(value) {
            return (Some(parsed), Some(raw[pos..token_end].to_string()));
        }
    }

    (None, None)
}

/// A braced `{value}` or linked `[[value]]` payload at the start of `rest`
fn wrapped_value(rest: &str) -> Option<(&str, usize)> {
    if let Some(stripped) = rest.strip_prefix('{') {
        let close = stripped.find('}')?;
        return Some((&stripped[..close], close + 2));
    }
    if let Some(stripped) = rest.strip_prefix("[[") {
        let close = stripped.find("]]")?;
        return Some((&stripped[..close], close + 4));
    }
    None
}

fn extract_inline_fields(raw: &str, config: &ParserConfig) -> Vec<InlineField> {
    let mut found: Vec<(usize, InlineField)> = Vec::new();

    // Explicit `key:: value` fields for recognized keys. A field's value
    // runs to the start of the next recognized field or the end of line.
    let mut starts: Vec<(usize, &str)> = Vec::new();
    for def in &config.metadata_keys {
        let pattern = format!("{}::", def.key);
        let mut search_from = 0;
        while let Some(offset) = raw[search_from..].find(&pattern) {
            let pos = search_from + offset;
            search_from = pos + pattern.len();

            let at_boundary = pos == 0
                || raw[..pos]
                    .chars()
                    .next_back()
                    .map(|p| p.is_whitespace())
                    .unwrap_or(true);
            if at_boundary {
                starts.push((pos, def.key.as_str()));
            }
        }
    }
    starts.sort_by_key(|(pos, _)| *pos);

    for (i, (pos, key)) in starts.iter().enumerate() {
        let value_start = pos + key.len() + 2;
        let value_end = starts
            .get(i + 1)
            .map(|(next, _)| *next)
            .unwrap_or(raw.len());
        let value = raw[value_start..value_end].trim().to_string();
        found.push((
            *pos,
            InlineField {
                key: key.to_string(),
                value,
                wrap: FieldWrap::DoubleColon,
            },
        ));
    }

    // Shorthand `<symbol>{value}` fields
    for def in &config.metadata_keys {
        let Some(symbol) = &def.shorthand else {
            continue;
        };
        let mut search_from = 0;
        while let Some(offset) = raw[search_from..].find(symbol.as_str()) {
            let pos = search_from + offset;
            search_from = pos + symbol.len();

            let rest = &raw[pos + symbol.len()..];
            if let Some(stripped) = rest.strip_prefix('{') {
                if let Some(close) = stripped.find('}') {
                    found.push((
                        pos,
                        InlineField {
                            key: def.key.clone(),
                            value: stripped[..close].to_string(),
                            wrap: FieldWrap::Shorthand,
                        },
                    ));
                    search_from = pos + symbol.len() + close + 2;
                }
            }
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, field)| field).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn test_date_extraction() {
        let meta = extract_metadata("Buy milk @{2024-01-05}", &config());
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(meta.date_str.as_deref(), Some("@{2024-01-05}"));
    }

    #[test]
    fn test_date_strips_only_display_title() {
        let raw = "Buy milk @{2024-01-05}";
        let meta = extract_metadata(raw, &config());
        let (title, _) = derived_titles(raw, &meta);
        assert_eq!(title, "Buy milk");
        // raw is untouched by derivation
        assert_eq!(raw, "Buy milk @{2024-01-05}");
    }

    #[test]
    fn test_linked_date_value() {
        let meta = extract_metadata("Ship @[[2024-03-01]]", &config());
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(meta.date_str.as_deref(), Some("@[[2024-03-01]]"));
    }

    #[test]
    fn test_invalid_date_is_inert() {
        let meta = extract_metadata("Call @{not-a-date}", &config());
        assert_eq!(meta.date, None);
        assert_eq!(meta.date_str, None);
    }

    #[test]
    fn test_only_first_date_promoted() {
        let meta = extract_metadata("a @{2024-01-05} b @{2024-02-06}", &config());
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn test_invalid_then_valid_date() {
        let meta = extract_metadata("a @{nope} b @{2024-02-06}", &config());
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 2, 6));
    }

    #[test]
    fn test_time_extraction_does_not_shadow_date() {
        let meta = extract_metadata("standup @{2024-01-05} @@{09:30}", &config());
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(meta.time, NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(meta.time_str.as_deref(), Some("@@{09:30}"));
    }

    #[test]
    fn test_tags() {
        let meta = extract_metadata("fix the #backend bug #p1", &config());
        assert_eq!(meta.tags, vec!["backend".to_string(), "p1".to_string()]);
    }

    #[test]
    fn test_tags_skip_code_spans_and_links() {
        let meta = extract_metadata("see `#fake` and [link](#anchor) but #real", &config());
        assert_eq!(meta.tags, vec!["real".to_string()]);
    }

    #[test]
    fn test_mid_word_hash_is_not_a_tag() {
        let meta = extract_metadata("issue#42", &config());
        assert!(meta.tags.is_empty());
    }

    #[test]
    fn test_wiki_file_accessor() {
        let meta = extract_metadata("read [[notes/rust|Rust notes]]", &config());
        let accessor = meta.file_accessor.unwrap();
        assert_eq!(accessor.target, "notes/rust");
        assert_eq!(accessor.label.as_deref(), Some("Rust notes"));
        assert_eq!(accessor.style, LinkStyle::Wiki);
    }

    #[test]
    fn test_markdown_file_accessor() {
        let meta = extract_metadata("read [notes](notes.md)", &config());
        let accessor = meta.file_accessor.unwrap();
        assert_eq!(accessor.target, "notes.md");
        assert_eq!(accessor.label.as_deref(), Some("notes"));
        assert_eq!(accessor.style, LinkStyle::Markdown);
    }

    #[test]
    fn test_double_colon_fields() {
        let mut cfg = config();
        cfg.metadata_keys = vec![
            crate::config::MetadataKeyDef::new("due"),
            crate::config::MetadataKeyDef::new("owner"),
        ];

        let meta = extract_metadata("task due:: friday owner:: ana", &cfg);
        assert_eq!(meta.inline_fields.len(), 2);
        assert_eq!(meta.inline_fields[0].key, "due");
        assert_eq!(meta.inline_fields[0].value, "friday");
        assert_eq!(meta.inline_fields[0].wrap, FieldWrap::DoubleColon);
        assert_eq!(meta.inline_fields[1].key, "owner");
        assert_eq!(meta.inline_fields[1].value, "ana");
    }

    #[test]
    fn test_shorthand_fields() {
        let mut cfg = config();
        cfg.metadata_keys = vec![crate::config::MetadataKeyDef::with_shorthand("priority", "!")];

        let meta = extract_metadata("ship it !{high}", &cfg);
        assert_eq!(meta.inline_fields.len(), 1);
        assert_eq!(meta.inline_fields[0].key, "priority");
        assert_eq!(meta.inline_fields[0].value, "high");
        assert_eq!(meta.inline_fields[0].wrap, FieldWrap::Shorthand);
    }

    #[test]
    fn test_unconfigured_key_is_ignored() {
        let meta = extract_metadata("task due:: friday", &config());
        assert!(meta.inline_fields.is_empty());
    }
}
