use super::{build, line_count, Block, Extraction};
use crate::elements::{CodeBlock, Link, List, ListItem, Table};
use crate::formats::FormatKind;
use crate::section::Heading;

fn heading(level: u8, text: &str, line: usize) -> Block {
    Block::Heading(Heading {
        level,
        text: text.to_string(),
        anchor: None,
        line,
    })
}

fn extraction(source: &str, blocks: Vec<Block>) -> Extraction {
    Extraction {
        path: "notes/guide.md".into(),
        format: FormatKind::Markdown,
        source: source.to_string(),
        title: None,
        frontmatter: None,
        blocks,
        readable_text: String::new(),
    }
}

fn scenario() -> Extraction {
    extraction(
        "# Title\n\n## A\n\nx\n\n## B\n\ny\n",
        vec![
            heading(1, "Title", 1),
            heading(2, "A", 3),
            Block::Text("x".to_string()),
            heading(2, "B", 7),
            Block::Text("y".to_string()),
        ],
    )
}

#[test]
fn test_line_count_ignores_trailing_newline() {
    assert_eq!(line_count(""), 0);
    assert_eq!(line_count("one"), 1);
    assert_eq!(line_count("one\ntwo\n"), 2);
    assert_eq!(line_count("one\n\nthree"), 3);
}

#[test]
fn test_section_ranges_close_before_next_sibling() {
    let doc = build(scenario());
    assert_eq!(doc.line_count(), 9);

    let ranges: Vec<_> = doc
        .sections()
        .iter()
        .map(|s| (s.title(), s.line_start, s.line_end))
        .collect();
    assert_eq!(ranges, vec![("Title", 1, 9), ("A", 3, 6), ("B", 7, 9)]);

    let a = doc.section("A").unwrap();
    assert!(a.line_end < 7, "section A must not include the ## B line");
    assert_eq!(a.line_count(), 4);
}

#[test]
fn test_hierarchy_links_parents_and_children() {
    let doc = build(scenario());
    let title = doc.section("Title").unwrap();
    assert_eq!(title.parent_index, None);
    assert_eq!(title.children_indices, vec![1, 2]);

    let b = doc.section("B").unwrap();
    assert_eq!(doc.parent(b).map(|p| p.title()), Some("Title"));
    assert_eq!(doc.children(title).count(), 2);
    assert_eq!(doc.table_of_contents().len(), 1);
}

#[test]
fn test_text_belongs_to_innermost_open_section() {
    let doc = build(scenario());
    assert_eq!(doc.section("Title").unwrap().text, "");
    assert_eq!(doc.section("A").unwrap().text, "x");
    assert_eq!(doc.section("B").unwrap().text, "y");
}

#[test]
fn test_deeper_sections_close_with_their_ancestor() {
    let source = "## A\n\n### A1\n\n## B\n";
    let doc = build(extraction(
        source,
        vec![heading(2, "A", 1), heading(3, "A1", 3), heading(2, "B", 5)],
    ));
    let ranges: Vec<_> = doc
        .sections()
        .iter()
        .map(|s| (s.title(), s.line_start, s.line_end, s.parent_index))
        .collect();
    assert_eq!(
        ranges,
        vec![("A", 1, 4, None), ("A1", 3, 4, Some(0)), ("B", 5, 5, None)]
    );
}

#[test]
fn test_skipped_levels_still_nest() {
    let source = "# Top\n#### Deep\n## Mid\n";
    let doc = build(extraction(
        source,
        vec![heading(1, "Top", 1), heading(4, "Deep", 2), heading(2, "Mid", 3)],
    ));
    let deep = doc.section("Deep").unwrap();
    assert_eq!(deep.parent_index, Some(0));
    assert_eq!((deep.line_start, deep.line_end), (2, 2));
    assert_eq!(doc.section("Mid").unwrap().parent_index, Some(0));
}

#[test]
fn test_blocks_before_first_heading_stay_unowned() {
    let source = "intro\n\n```sh\nls\n```\n\n# Only\n\nbody\n";
    let doc = build(extraction(
        source,
        vec![
            Block::Text("intro".to_string()),
            Block::Code(CodeBlock::new("sh", "ls\n", 3)),
            heading(1, "Only", 7),
            Block::Text("body".to_string()),
        ],
    ));
    assert_eq!(doc.code_blocks(&[]).len(), 1);
    let only = doc.section("Only").unwrap();
    assert!(only.code_block_indices.is_empty());
    assert_eq!(only.text, "body");
}

#[test]
fn test_code_content_joins_section_text() {
    let source = "# Run\n\nThen:\n\n```bash\ncargo run\n```\n";
    let doc = build(extraction(
        source,
        vec![
            heading(1, "Run", 1),
            Block::Text("Then:".to_string()),
            Block::Code(CodeBlock::new("bash", "cargo run\n", 5)),
        ],
    ));
    let run = doc.section("Run").unwrap();
    assert_eq!(run.text, "Then:\ncargo run");
    assert_eq!(run.code_block_indices, vec![0]);
    assert_eq!(doc.code_blocks(&["bash"])[0].lines, 1);
}

#[test]
fn test_elements_are_indexed_per_section() {
    let table = Table {
        headers: vec!["a".to_string(), "b".to_string()],
        rows: vec![vec!["1".to_string(), "2".to_string()]],
    };
    let list = List {
        ordered: false,
        items: vec![ListItem {
            text: "item".to_string(),
            checked: None,
            children: Vec::new(),
        }],
    };
    let link = Link {
        text: "docs".to_string(),
        url: "https://example.com".to_string(),
    };
    let doc = build(extraction(
        "# One\n# Two\n",
        vec![
            heading(1, "One", 1),
            Block::Table(table.clone()),
            heading(1, "Two", 2),
            Block::List(list.clone()),
            Block::Link(link.clone()),
        ],
    ));
    let one = doc.section("One").unwrap();
    let two = doc.section("Two").unwrap();
    assert_eq!(one.table_indices, vec![0]);
    assert!(one.list_indices.is_empty());
    assert_eq!(two.list_indices, vec![0]);
    assert_eq!(two.link_indices, vec![0]);
    assert_eq!(doc.tables(), &[table]);
    assert_eq!(doc.lists(None), vec![&list]);
    assert_eq!(doc.links(), &[link]);
}

#[test]
fn test_duplicate_titles_resolve_to_last_section() {
    let doc = build(extraction(
        "## Notes\n\nfirst\n\n## Notes\n\nsecond\n",
        vec![
            heading(2, "Notes", 1),
            Block::Text("first".to_string()),
            heading(2, "Notes", 5),
            Block::Text("second".to_string()),
        ],
    ));
    assert_eq!(doc.sections().len(), 2);
    assert_eq!(doc.section("Notes").unwrap().text, "second");
    assert_eq!(doc.heading("Notes").unwrap().line, 5);
}

#[test]
fn test_out_of_range_levels_are_dropped() {
    let doc = build(extraction(
        "# A\n####### B\n",
        vec![heading(1, "A", 1), heading(7, "B", 2)],
    ));
    assert_eq!(doc.headings(&[]).len(), 1);
    assert_eq!(doc.sections().len(), 1);
}

#[test]
fn test_title_fallbacks() {
    let doc = build(extraction(
        "## Sub\n# Main\n",
        vec![heading(2, "Sub", 1), heading(1, "Main", 2)],
    ));
    assert_eq!(doc.title(), "Main", "first H1 wins over earlier headings");

    let doc = build(extraction("### Only\n", vec![heading(3, "Only", 1)]));
    assert_eq!(doc.title(), "Only");

    let doc = build(extraction("plain text\n", vec![Block::Text("plain text".to_string())]));
    assert_eq!(doc.title(), "guide", "falls back to the file stem");

    let mut explicit = extraction("# Heading\n", vec![heading(1, "Heading", 1)]);
    explicit.title = Some("Given".to_string());
    assert_eq!(build(explicit).title(), "Given");
}

#[test]
fn test_headings_past_last_line_extend_final_section() {
    // Synthetic data-format line numbers can exceed the source line count.
    let doc = build(extraction(
        "{}",
        vec![heading(1, "a", 1), heading(1, "b", 2), heading(1, "c", 3)],
    ));
    let c = doc.section("c").unwrap();
    assert_eq!((c.line_start, c.line_end), (3, 3));
}
