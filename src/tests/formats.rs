use super::{detect, FormatKind, Registry};
use crate::error::ParseFailure;
use std::path::Path;

#[test]
fn test_extension_wins_over_content() {
    assert_eq!(detect(Path::new("a.md"), b"<html>"), FormatKind::Markdown);
    assert_eq!(detect(Path::new("a.JSON"), b""), FormatKind::Json);
    assert_eq!(detect(Path::new("a.ndjson"), b""), FormatKind::Jsonl);
    assert_eq!(detect(Path::new("a.yml"), b""), FormatKind::Yaml);
    assert_eq!(detect(Path::new("a.htm"), b""), FormatKind::Html);
}

#[test]
fn test_content_sniffing_without_extension() {
    assert_eq!(
        detect(Path::new("page"), b"  <!DOCTYPE html><html></html>"),
        FormatKind::Html
    );
    assert_eq!(detect(Path::new("doc"), b"%PDF-1.7"), FormatKind::Pdf);
    assert_eq!(detect(Path::new("README"), b"# Hello"), FormatKind::Markdown);
    assert_eq!(detect(Path::new("notes.txt"), b"plain"), FormatKind::Markdown);
}

#[test]
fn test_format_names() {
    assert_eq!(FormatKind::Jsonl.to_string(), "jsonl");
    assert_eq!(FormatKind::from_extension("Markdown"), Some(FormatKind::Markdown));
    assert_eq!(FormatKind::from_extension("txt"), None);
}

#[test]
fn test_default_registry_supports_markdown_and_data() {
    let registry = Registry::default();
    for kind in [
        FormatKind::Markdown,
        FormatKind::Json,
        FormatKind::Jsonl,
        FormatKind::Yaml,
    ] {
        assert!(registry.supports(kind), "{kind} should be registered");
    }
    assert!(!registry.supports(FormatKind::Html));
}

#[test]
fn test_parse_dispatches_on_detected_format() {
    let registry = Registry::default();
    let doc = registry
        .parse(br#"{"title": "Config"}"#, Path::new("conf.json"))
        .unwrap();
    assert_eq!(doc.format(), FormatKind::Json);
    assert_eq!(doc.title(), "Config");
}

#[test]
fn test_unsupported_format_falls_back_to_markdown() {
    let registry = Registry::default();
    let doc = registry
        .parse(b"# Page\n", Path::new("page.html"))
        .unwrap();
    assert_eq!(doc.format(), FormatKind::Markdown);
    assert_eq!(doc.title(), "Page");
}

#[test]
fn test_empty_registry_reports_unsupported() {
    let registry = Registry::new(FormatKind::Markdown);
    let err = registry.parse(b"# x", Path::new("x.md")).unwrap_err();
    assert!(matches!(err.failure, ParseFailure::Unsupported));
    assert_eq!(err.format, FormatKind::Markdown);
}

#[test]
fn test_parse_error_names_path_and_format() {
    let registry = Registry::default();
    let err = registry.parse(b"{", Path::new("broken.json")).unwrap_err();
    let message = err.to_string();
    assert!(
        message.starts_with("failed to parse broken.json as json"),
        "unexpected message: {message}"
    );
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let registry = Registry::default();
    let doc = registry
        .parse(b"# Caf\xff\n", Path::new("bad.md"))
        .unwrap();
    assert_eq!(doc.line_count(), 1);
    assert!(doc.source().contains('\u{fffd}'));
}
