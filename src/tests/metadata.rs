use super::{lookup, parse_frontmatter, split_frontmatter, MetaValue};
use crate::error::ParseFailure;
use indoc::indoc;

#[test]
fn test_split_finds_closing_delimiter() {
    let source = "---\ntitle: Hi\n---\n# Body\n";
    let (yaml, body_start) = split_frontmatter(source).unwrap();
    assert_eq!(yaml, "title: Hi\n");
    assert_eq!(&source[body_start..], "\n# Body\n");
}

#[test]
fn test_split_requires_leading_delimiter_line() {
    assert_eq!(split_frontmatter("# Title\n---\n"), None);
    assert_eq!(split_frontmatter("----\na: 1\n---\n"), None);
    assert_eq!(split_frontmatter("---\nnever closed\n"), None);
}

#[test]
fn test_split_accepts_dots_and_crlf() {
    let source = "---\r\na: 1\r\n...\r\nrest";
    let (yaml, body_start) = split_frontmatter(source).unwrap();
    assert_eq!(yaml, "a: 1\r\n");
    assert_eq!(&source[body_start..], "\r\nrest");
}

#[test]
fn test_parse_keeps_field_order_and_types() {
    let source = indoc! {"
        ---
        title: Runbook
        owner: ops
        priority: high
        revision: 3
        ratio: 0.5
        draft: false
        tags: [infra, oncall]
        config:
          theme: dark
        ---
        # Runbook
    "};
    let fm = parse_frontmatter(source).unwrap().unwrap();
    let keys: Vec<_> = fm.metadata.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["title", "owner", "priority", "revision", "ratio", "draft", "tags", "config"]
    );
    assert_eq!(fm.metadata["revision"], MetaValue::Int(3));
    assert_eq!(fm.metadata["ratio"], MetaValue::Float(0.5));
    assert_eq!(fm.metadata["draft"], MetaValue::Bool(false));
    assert_eq!(fm.metadata["tags"].string_list(), vec!["infra", "oncall"]);
    assert!(fm.raw.starts_with("---\n") && fm.raw.ends_with("---"));
    assert_eq!(&source[fm.body_start..], "\n# Runbook\n");
}

#[test]
fn test_lookup_walks_maps_and_lists() {
    let source = "---\nconfig:\n  theme: dark\nauthors:\n  - ann\n  - bo\n---\n";
    let fm = parse_frontmatter(source).unwrap().unwrap();
    assert_eq!(
        lookup(&fm.metadata, "config.theme"),
        Some(&MetaValue::String("dark".to_string()))
    );
    assert_eq!(
        lookup(&fm.metadata, "authors.1"),
        Some(&MetaValue::String("bo".to_string()))
    );
    assert_eq!(lookup(&fm.metadata, "authors.9"), None);
    assert_eq!(lookup(&fm.metadata, "config.theme.deeper"), None);
    assert_eq!(lookup(&fm.metadata, "missing"), None);
}

#[test]
fn test_empty_block_gives_empty_metadata() {
    let fm = parse_frontmatter("---\n---\nbody\n").unwrap().unwrap();
    assert!(fm.metadata.is_empty());
}

#[test]
fn test_no_block_is_not_an_error() {
    assert!(parse_frontmatter("# Plain\n").unwrap().is_none());
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let err = parse_frontmatter("---\nkey: [unclosed\n---\n").unwrap_err();
    assert!(
        matches!(err, ParseFailure::Frontmatter(_)),
        "expected a frontmatter error, got {err:?}"
    );
}

#[test]
fn test_scalar_block_is_not_a_mapping() {
    let err = parse_frontmatter("---\njust a string\n---\n").unwrap_err();
    assert!(matches!(err, ParseFailure::FrontmatterNotMapping));
}
