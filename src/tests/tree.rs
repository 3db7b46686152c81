use super::{
    build_dir_tree, build_section_tree, build_tree, build_tree_with, preview_text, NodeKind,
    TreeMode,
};
use crate::builder::{build, Block, Extraction};
use crate::config::Config;
use crate::document::Document;
use crate::error::Error;
use crate::formats::{FormatKind, Registry};
use crate::section::Heading;
use indoc::{formatdoc, indoc};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const GUIDE: &str = indoc! {"
    # Guide

    ## Install

    ```bash
    make
    ```

    ```bash
    make install
    ```

    ```
    plain
    ```

    ## Usage

    | a | b |
    |---|---|
    | 1 | 2 |

    - x
    - y

    See [one](a) and [two](b) ![img](i.png).
"};

fn load(source: &str, name: &str) -> Document {
    Registry::default()
        .parse(source.as_bytes(), Path::new(name))
        .unwrap()
}

fn heading(level: u8, text: &str, line: usize) -> Block {
    Block::Heading(Heading {
        level,
        text: text.to_string(),
        anchor: None,
        line,
    })
}

fn notes() -> Document {
    build(Extraction {
        path: "notes.md".into(),
        format: FormatKind::Markdown,
        source: "# Notes\nalpha beta gamma delta\n## Sub\none two\n".to_string(),
        title: None,
        frontmatter: None,
        blocks: vec![
            heading(1, "Notes", 1),
            Block::Text("alpha beta gamma delta".to_string()),
            heading(2, "Sub", 3),
            Block::Text("one two".to_string()),
        ],
        readable_text: String::new(),
    })
}

#[test]
fn test_mode_names() {
    assert_eq!("".parse::<TreeMode>().unwrap(), TreeMode::Default);
    assert_eq!("default".parse::<TreeMode>().unwrap(), TreeMode::Default);
    assert_eq!("compact".parse::<TreeMode>().unwrap(), TreeMode::Compact);
    assert_eq!("expand".parse::<TreeMode>().unwrap(), TreeMode::Preview);
    assert_eq!("full".parse::<TreeMode>().unwrap(), TreeMode::Full);
    let err = "verbose".parse::<TreeMode>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown tree mode \"verbose\", expected default, compact, preview or full"
    );
}

#[test]
fn test_node_labels() {
    let code = NodeKind::Code {
        language: String::new(),
        count: 3,
    };
    assert_eq!(code.to_string(), "[code: plain, 3 blocks]");
    let table = NodeKind::Table {
        rows: 1,
        columns: 1,
    };
    assert_eq!(table.to_string(), "[table: 1 row, 1 column]");
    let empty = NodeKind::File {
        name: "empty.md".to_string(),
        lines: 2,
        sections: 0,
    };
    assert_eq!(empty.to_string(), "empty.md (2 lines, no sections)");
    assert_eq!(
        NodeKind::FileError("bad.md".to_string()).to_string(),
        "bad.md (parse error)"
    );
}

#[test]
fn test_default_tree_annotates_sections() {
    let doc = load(GUIDE, "guide.md");
    let tree = build_tree(&doc, TreeMode::Default);
    let expected = indoc! {"
        guide.md (26 lines)
        └── # Guide (1-26)
            ├── ## Install (3-16)
            │   ├── [code: bash, 2 blocks]
            │   └── [code: plain, 1 block]
            └── ## Usage (17-26)
                ├── [table: 1 row, 2 columns]
                ├── [list: 2 items]
                ├── [link: 2 links]
                └── [image: 1 image]
    "};
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn test_compact_tree_has_sections_only() {
    let doc = load(GUIDE, "guide.md");
    let tree = build_tree(&doc, TreeMode::Compact);
    let expected = indoc! {"
        guide.md (26 lines)
        └── # Guide (1-26)
            ├── ## Install (3-16)
            └── ## Usage (17-26)
    "};
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn test_preview_tree_shows_snippets() {
    let tree = build_tree_with(&notes(), TreeMode::Preview, 3);
    let expected = indoc! {r#"
        notes.md (4 lines)
        └── # Notes (1-4)
                 "alpha beta gamma..."
            └── ## Sub (3-4)
                     "one two"
    "#};
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn test_full_mode_on_a_document_matches_preview() {
    let doc = notes();
    let full = build_tree(&doc, TreeMode::Full);
    let preview = build_tree(&doc, TreeMode::Preview);
    assert_eq!(full.roots, preview.roots);
}

#[test]
fn test_frontmatter_node_comes_first() {
    let doc = load("---\nowner: a\ntags: [x]\n---\n# T\n", "fm.md");
    let expected = indoc! {"
        fm.md (5 lines)
        ├── [frontmatter: owner, tags]
        └── # T (5-5)
    "};
    assert_eq!(build_tree(&doc, TreeMode::Default).to_string(), expected);
    assert_eq!(build_tree(&doc, TreeMode::Compact).to_string(), expected);
}

#[test]
fn test_section_tree_is_rooted_at_section() {
    let doc = load(GUIDE, "guide.md");
    let usage = doc.section("Usage").unwrap();
    let tree = build_section_tree(&doc, usage, TreeMode::Default, 50);
    let expected = indoc! {"
        Usage (10 lines)
        └── ## Usage (17-26)
            ├── [table: 1 row, 2 columns]
            ├── [list: 2 items]
            ├── [link: 2 links]
            └── [image: 1 image]
    "};
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn test_empty_document_tree() {
    let doc = load("", "empty.md");
    assert_eq!(build_tree(&doc, TreeMode::Default).to_string(), "empty.md (0 lines)\n");
}

#[test]
fn test_trailing_newline_does_not_add_a_line() {
    let doc = load("# T\n", "t.md");
    assert_eq!(doc.line_count(), 1);
    assert_eq!(build_tree(&doc, TreeMode::Compact).to_string(), "t.md (1 lines)\n└── # T (1-1)\n");

    let doc = load("# T\n\n", "t.md");
    assert_eq!(doc.line_count(), 2);
}

#[test]
fn test_preview_text() {
    assert_eq!(preview_text("a  b\n c", 5), "a b c");
    assert_eq!(preview_text("a b c d", 2), "a b...");
    assert_eq!(preview_text("", 5), "");
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("a.md"), "# A\n\nalpha\n").unwrap();
    fs::write(root.join("b.md"), "# B\n\n## B1\n\nbeta\n").unwrap();
    dir
}

#[test]
fn test_directory_tree_lists_files_alphabetically() {
    let dir = fixture();
    let tree = build_dir_tree(
        &Registry::default(),
        dir.path(),
        TreeMode::Default,
        &Config::default(),
    )
    .unwrap();
    let expected = formatdoc! {"
        {} (2 files, 8 lines total)
        ├── a.md (3 lines, 1 sections)
        └── b.md (5 lines, 2 sections)
        ",
        dir.path().display()
    };
    assert_eq!(tree.to_string(), expected);
    assert_eq!(tree.total_files, 2);
    assert!(tree.skipped.is_empty());
}

#[test]
fn test_directory_tree_ordering_and_pruning() {
    let dir = fixture();
    let root = dir.path();
    fs::write(root.join(".hidden.md"), "# Hidden\n").unwrap();
    fs::write(root.join("notes.txt"), "# Not markdown\n").unwrap();
    fs::create_dir(root.join("empty")).unwrap();
    fs::write(root.join("empty").join("skip.txt"), "x").unwrap();
    fs::create_dir(root.join("docs")).unwrap();
    fs::write(root.join("docs").join("c.md"), "# C\n").unwrap();

    let tree = build_dir_tree(&Registry::default(), root, TreeMode::Compact, &Config::default())
        .unwrap();
    let expected = formatdoc! {"
        {} (3 files, 9 lines total)
        ├── docs/
        │   └── c.md (1 lines, 1 sections)
        ├── a.md (3 lines, 1 sections)
        └── b.md (5 lines, 2 sections)
        ",
        root.display()
    };
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn test_directory_preview_lists_top_headings() {
    let dir = fixture();
    fs::write(dir.path().join("b.md"), "# B\n\n## B1\n\n### Deep\n").unwrap();
    let tree = build_dir_tree(
        &Registry::default(),
        dir.path(),
        TreeMode::Preview,
        &Config::default(),
    )
    .unwrap();
    let expected = formatdoc! {"
        {} (2 files, 8 lines total)
        ├── a.md (3 lines, 1 sections)
        │   └── # A
        └── b.md (5 lines, 3 sections)
            ├── # B
            └── ## B1
        ",
        dir.path().display()
    };
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn test_directory_preview_lists_level_one_before_level_two() {
    let dir = fixture();
    fs::write(dir.path().join("b.md"), "## Pre\n\n# Main\n\n## Post\n").unwrap();
    let tree = build_dir_tree(
        &Registry::default(),
        dir.path(),
        TreeMode::Preview,
        &Config::default(),
    )
    .unwrap();
    let expected = formatdoc! {"
        {} (2 files, 8 lines total)
        ├── a.md (3 lines, 1 sections)
        │   └── # A
        └── b.md (5 lines, 3 sections)
            ├── # Main
            ├── ## Pre
            └── ## Post
        ",
        dir.path().display()
    };
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn test_directory_full_mode_includes_sections_with_previews() {
    let dir = fixture();
    let tree = build_dir_tree(
        &Registry::default(),
        dir.path(),
        TreeMode::Full,
        &Config::default(),
    )
    .unwrap();
    let expected = formatdoc! {r#"
        {} (2 files, 8 lines total)
        ├── a.md (3 lines, 1 sections)
        │   └── # A (1-3)
        │            "alpha"
        └── b.md (5 lines, 2 sections)
            └── # B (1-5)
                └── ## B1 (3-5)
                         "beta"
        "#,
        dir.path().display()
    };
    assert_eq!(tree.to_string(), expected);
}

#[test]
fn test_directory_tree_skips_unparseable_files() {
    let dir = fixture();
    fs::write(dir.path().join("broken.json"), "{").unwrap();
    let config = Config {
        file_extensions: vec!["md".to_string(), "json".to_string()],
        ..Config::default()
    };
    let tree =
        build_dir_tree(&Registry::default(), dir.path(), TreeMode::Default, &config).unwrap();
    assert_eq!(tree.total_files, 2);
    assert_eq!(tree.skipped.len(), 1);
    assert!(tree.skipped[0].path.ends_with("broken.json"));
    assert!(tree.to_string().contains("└── broken.json (parse error)"));
}

#[test]
fn test_directory_tree_requires_directory() {
    let dir = fixture();
    let err = build_dir_tree(
        &Registry::default(),
        &dir.path().join("a.md"),
        TreeMode::Default,
        &Config::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NotADirectory(_)), "got {err:?}");
}
