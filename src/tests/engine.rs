use super::Engine;
use crate::builder::{Block, Extraction};
use crate::config::Config;
use crate::error::{Error, ParseFailure, QueryError};
use crate::formats::{Format, FormatKind};
use crate::query::Value;
use crate::section::Heading;
use crate::tree::TreeMode;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const SOURCE: &str = "# Title\n\n## A\n\nalpha beta gamma\n\n## B\n\ny\n";

fn parse(engine: &Engine) -> crate::Document {
    engine.parse(SOURCE.as_bytes(), Path::new("doc.md")).unwrap()
}

#[test]
fn test_plans_are_cached_by_text() {
    let engine = Engine::default();
    let first = engine.compile(".headings(2)").unwrap();
    let second = engine.compile(".headings(2)").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    engine.compile(".headings(1)").unwrap();
    assert_eq!(engine.cached_plans(), 2);
}

#[test]
fn test_failed_compiles_are_not_cached() {
    let engine = Engine::default();
    let err = engine.compile(".headings |").unwrap_err();
    assert!(matches!(err, QueryError::Syntax(_)));
    assert_eq!(engine.cached_plans(), 0);
}

#[test]
fn test_query_runs_against_document() {
    let engine = Engine::default();
    let doc = parse(&engine);
    let value = engine.query(&doc, ".headings(2) | map(.text)").unwrap();
    assert_eq!(value.to_string(), "[A, B]");

    let err = engine.query(&doc, ".section(\"Z\")").unwrap_err();
    assert_eq!(err.to_string(), "section not found: \"Z\"");
}

#[test]
fn test_config_drives_rendering() {
    let engine = Engine::with_config(Config {
        snippet_context: 2,
        preview_words: 1,
        ..Config::default()
    });
    let doc = parse(&engine);

    let Value::Search(results) = engine.query(&doc, ".search(\"beta\")").unwrap() else {
        panic!("expected search results");
    };
    assert_eq!(results.matches[0].snippet, "...a beta g...");

    let tree = engine.query(&doc, ".section(\"A\") | .tree(\"preview\")").unwrap();
    assert_eq!(
        tree.to_string(),
        "A (4 lines)\n└── ## A (3-6)\n         \"alpha...\"\n"
    );
}

#[test]
fn test_documents_serve_concurrent_queries() {
    let engine = Engine::default();
    let doc = parse(&engine);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.query(&doc, ".sections | .length").unwrap().to_string()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "3");
        }
    });
    assert_eq!(engine.cached_plans(), 1);
}

struct Outline;

impl Format for Outline {
    fn kind(&self) -> FormatKind {
        FormatKind::Html
    }

    fn extract(&self, source: String, path: &Path) -> Result<Extraction, ParseFailure> {
        Ok(Extraction {
            path: path.to_path_buf(),
            format: FormatKind::Html,
            source,
            title: Some("Page".to_string()),
            frontmatter: None,
            blocks: vec![Block::Heading(Heading {
                level: 1,
                text: "Outline".to_string(),
                anchor: None,
                line: 1,
            })],
            readable_text: String::new(),
        })
    }
}

#[test]
fn test_registered_adapter_replaces_fallback() {
    let mut engine = Engine::default();
    let before = engine.parse(b"<h1>x</h1>", Path::new("page.html")).unwrap();
    assert_eq!(before.format(), FormatKind::Markdown);

    engine.registry_mut().register(Box::new(Outline));
    let after = engine.parse(b"<h1>x</h1>", Path::new("page.html")).unwrap();
    assert_eq!(after.format(), FormatKind::Html);
    assert_eq!(after.title(), "Page");
    assert_eq!(engine.query(&after, ".headings | .text").unwrap().to_string(), "[Outline]");
}

#[test]
fn test_load_and_directory_operations() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("one.md"), "# One\n\nneedle\n").unwrap();
    fs::write(root.join("two.md"), "# Two\n").unwrap();
    let engine = Engine::default();

    let doc = engine.load(&root.join("one.md")).unwrap();
    assert_eq!(doc.title(), "One");

    let tree = engine.tree_dir(root, TreeMode::Compact).unwrap();
    assert_eq!(tree.total_files, 2);
    assert_eq!(tree.total_lines, 4);

    let results = engine.search_dir(root, "needle").unwrap();
    assert_eq!(results.matches.len(), 1);

    let err = engine.tree_dir(&root.join("one.md"), TreeMode::Default).unwrap_err();
    assert!(matches!(err, Error::NotADirectory(_)));
}
