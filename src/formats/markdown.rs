//! Markdown format implementation using tree-sitter-md.
//!
//! The block grammar gives headings, paragraphs, fenced code, pipe tables and
//! lists. Each inline span (heading content, paragraph, table cell) is parsed
//! again with the inline grammar to strip markup and pick out links and
//! images. A leading frontmatter block is blanked out before parsing so line
//! numbers stay aligned with the source.

use std::collections::HashMap;
use std::path::Path;

use tree_sitter::{Node, Parser};

use crate::builder::{Block, Extraction};
use crate::elements::{CodeBlock, Image, Link, List, ListItem, Table};
use crate::error::ParseFailure;
use crate::formats::{Format, FormatKind};
use crate::metadata;
use crate::section::Heading;

/// Tree-sitter backed CommonMark adapter.
pub struct MarkdownFormat;

impl MarkdownFormat {
    /// Block-level grammar.
    #[must_use]
    pub fn language() -> tree_sitter::Language {
        tree_sitter_md::LANGUAGE.into()
    }

    /// Inline grammar for the content of headings, paragraphs and cells.
    #[must_use]
    pub fn inline_language() -> tree_sitter::Language {
        tree_sitter_md::INLINE_LANGUAGE.into()
    }
}

impl Format for MarkdownFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Markdown
    }

    fn extract(&self, source: String, path: &Path) -> Result<Extraction, ParseFailure> {
        let frontmatter = metadata::parse_frontmatter(&source)?;
        let text = match &frontmatter {
            Some(fm) => blank_out(&source, fm.body_start),
            None => source.clone(),
        };

        let mut parser = Parser::new();
        parser.set_language(&Self::language())?;
        let tree = parser.parse(&text, None).ok_or(ParseFailure::NoTree)?;
        let mut inline = Parser::new();
        inline.set_language(&Self::inline_language())?;

        let mut walker = Walker {
            text: &text,
            inline,
            blocks: Vec::new(),
            readable: Vec::new(),
            anchors: HashMap::new(),
            quote_depth: 0,
        };
        walker.visit(tree.root_node());
        let Walker {
            blocks, readable, ..
        } = walker;

        Ok(Extraction {
            path: path.to_path_buf(),
            format: FormatKind::Markdown,
            source,
            title: None,
            frontmatter,
            blocks,
            readable_text: readable.join("\n"),
        })
    }
}

/// Replaces everything before `end` with spaces, keeping newlines and byte offsets.
fn blank_out(source: &str, end: usize) -> String {
    let mut out = String::with_capacity(source.len());
    for c in source[..end].chars() {
        if c == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat_n(' ', c.len_utf8()));
        }
    }
    out.push_str(&source[end..]);
    out
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn first_named<'a>(node: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    named_children(node)
        .into_iter()
        .find(|child| kinds.contains(&child.kind()))
}

fn atx_level(kind: &str) -> Option<u8> {
    kind.strip_prefix("atx_h")?.strip_suffix("_marker")?.parse().ok()
}

/// Drops an ATX closing sequence (`## Title ##`), leaving `C#` alone.
fn strip_closing_hashes(raw: &str) -> &str {
    let trimmed = raw.trim_end();
    let without = trimmed.trim_end_matches('#');
    if without.len() < trimmed.len() && (without.is_empty() || without.ends_with([' ', '\t'])) {
        without.trim_end()
    } else {
        trimmed
    }
}

fn strip_quote_markers(raw: &str) -> String {
    raw.lines()
        .map(|line| {
            let mut line = line.trim_start();
            while let Some(rest) = line.strip_prefix('>') {
                line = rest.strip_prefix(' ').unwrap_or(rest);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn task_prefix(text: &str) -> (Option<bool>, &str) {
    if let Some(rest) = text.strip_prefix("[ ] ") {
        (Some(false), rest)
    } else if let Some(rest) = text.strip_prefix("[x] ").or_else(|| text.strip_prefix("[X] ")) {
        (Some(true), rest)
    } else {
        (None, text)
    }
}

fn append_item_text(text: &mut String, more: &str) {
    if more.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(more);
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Inline content with markup removed.
struct Inline {
    plain: String,
    links: Vec<Link>,
    images: Vec<Image>,
}

struct Walker<'t> {
    text: &'t str,
    inline: Parser,
    blocks: Vec<Block>,
    readable: Vec<String>,
    anchors: HashMap<String, usize>,
    quote_depth: usize,
}

impl<'t> Walker<'t> {
    fn slice(&self, node: Node<'_>) -> &'t str {
        self.text.get(node.byte_range()).unwrap_or("")
    }

    fn visit(&mut self, node: Node<'_>) {
        match node.kind() {
            "atx_heading" => self.atx_heading(node),
            "setext_heading" => self.setext_heading(node),
            "paragraph" => self.paragraph(node),
            "fenced_code_block" => self.code_block(node),
            "pipe_table" => self.table(node),
            "list" => {
                let list = self.list(node);
                self.blocks.push(Block::List(list));
            }
            "block_quote" => {
                self.quote_depth += 1;
                for child in named_children(node) {
                    self.visit(child);
                }
                self.quote_depth -= 1;
            }
            "indented_code_block"
            | "html_block"
            | "thematic_break"
            | "link_reference_definition"
            | "minus_metadata"
            | "plus_metadata"
            | "block_continuation" => {}
            _ => {
                for child in named_children(node) {
                    self.visit(child);
                }
            }
        }
    }

    fn atx_heading(&mut self, node: Node<'_>) {
        let children = named_children(node);
        let level = children
            .iter()
            .find_map(|child| atx_level(child.kind()))
            .unwrap_or(1);
        let content = node
            .child_by_field_name("heading_content")
            .or_else(|| children.iter().copied().find(|c| c.kind() == "inline"))
            .map_or("", |c| self.slice(c));
        self.heading(level, strip_closing_hashes(content), node);
    }

    fn setext_heading(&mut self, node: Node<'_>) {
        let children = named_children(node);
        let level = if children.iter().any(|c| c.kind() == "setext_h1_underline") {
            1
        } else {
            2
        };
        let content = children
            .iter()
            .find(|c| c.kind() == "paragraph")
            .map_or("", |c| self.slice(*c));
        self.heading(level, content, node);
    }

    fn heading(&mut self, level: u8, raw: &str, node: Node<'_>) {
        let inline = self.parse_inline(raw);
        let anchor = self.anchor(&inline.plain);
        self.readable.push(inline.plain.clone());
        self.blocks.push(Block::Heading(Heading {
            level,
            text: inline.plain,
            anchor: Some(anchor),
            line: node.start_position().row + 1,
        }));
        self.push_refs(inline.links, inline.images);
    }

    /// Lowercase slug, deduplicated with `-1`, `-2`, ... suffixes.
    fn anchor(&mut self, text: &str) -> String {
        let mut slug = String::new();
        for c in text.chars() {
            if c.is_alphanumeric() || c == '_' {
                slug.extend(c.to_lowercase());
            } else if c.is_whitespace() || c == '-' {
                slug.push('-');
            }
        }
        if slug.is_empty() {
            slug.push_str("heading");
        }
        let seen = self.anchors.entry(slug.clone()).or_insert(0);
        let id = if *seen == 0 {
            slug
        } else {
            format!("{slug}-{seen}")
        };
        *seen += 1;
        id
    }

    fn paragraph_text(&mut self, node: Node<'_>) -> Inline {
        let raw = self.slice(node);
        if self.quote_depth > 0 {
            let cleaned = strip_quote_markers(raw);
            self.parse_inline(&cleaned)
        } else {
            self.parse_inline(raw)
        }
    }

    fn paragraph(&mut self, node: Node<'_>) {
        let inline = self.paragraph_text(node);
        if !inline.plain.is_empty() {
            self.readable.push(inline.plain.clone());
            self.blocks.push(Block::Text(inline.plain));
        }
        self.push_refs(inline.links, inline.images);
    }

    fn code_block(&mut self, node: Node<'_>) {
        let mut language = String::new();
        let mut content = "";
        for child in named_children(node) {
            match child.kind() {
                "info_string" => {
                    language = match first_named(child, &["language"]) {
                        Some(lang) => self.slice(lang).to_string(),
                        None => self
                            .slice(child)
                            .split_whitespace()
                            .next()
                            .unwrap_or_default()
                            .to_string(),
                    };
                }
                "code_fence_content" => content = self.slice(child),
                _ => {}
            }
        }
        self.blocks.push(Block::Code(CodeBlock::new(
            language,
            content,
            node.start_position().row + 1,
        )));
    }

    fn cells(&mut self, row: Node<'_>) -> Vec<String> {
        let mut cells = Vec::new();
        for cell in named_children(row) {
            if cell.kind() != "pipe_table_cell" {
                continue;
            }
            let inline = self.parse_inline(self.slice(cell));
            self.push_refs(inline.links, inline.images);
            cells.push(inline.plain);
        }
        cells
    }

    fn table(&mut self, node: Node<'_>) {
        let mut headers = Vec::new();
        let mut rows = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "pipe_table_header" => headers = self.cells(child),
                "pipe_table_row" => rows.push(self.cells(child)),
                _ => {}
            }
        }
        for row in std::iter::once(&headers).chain(&rows) {
            let line = row.join(" | ");
            self.readable.push(line.clone());
            self.blocks.push(Block::Text(line));
        }
        self.blocks.push(Block::Table(Table { headers, rows }));
    }

    fn list(&mut self, node: Node<'_>) -> List {
        let mut ordered = false;
        let mut items = Vec::new();
        for (i, child) in named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "list_item")
            .enumerate()
        {
            let (item, numbered) = self.list_item(child);
            if i == 0 {
                ordered = numbered;
            }
            items.push(item);
        }
        List { ordered, items }
    }

    fn list_item(&mut self, node: Node<'_>) -> (ListItem, bool) {
        let mut numbered = false;
        let mut checked = None;
        let mut parts = Vec::new();
        // Set once the item's leading text is emitted; nested blocks follow it.
        let mut text: Option<String> = None;
        let mut children = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "list_marker_dot" | "list_marker_parenthesis" => numbered = true,
                "task_list_marker_checked" => checked = Some(true),
                "task_list_marker_unchecked" => checked = Some(false),
                kind if kind.starts_with("list_marker") || kind == "block_continuation" => {}
                "paragraph" => {
                    let inline = self.paragraph_text(child);
                    let plain = collapse_whitespace(&inline.plain);
                    match &mut text {
                        None => parts.push(plain),
                        Some(done) => {
                            self.emit_text(&plain);
                            append_item_text(done, &plain);
                        }
                    }
                    self.push_refs(inline.links, inline.images);
                }
                kind => {
                    if text.is_none() {
                        text = Some(self.item_text(&parts, &mut checked));
                    }
                    if kind == "list" {
                        children.extend(self.list(child).items);
                    } else {
                        self.visit(child);
                    }
                }
            }
        }
        let text = match text {
            Some(text) => text,
            None => self.item_text(&parts, &mut checked),
        };
        (
            ListItem {
                text,
                checked,
                children,
            },
            numbered,
        )
    }

    /// Joins the item's leading paragraphs, strips a `[ ]`/`[x]` prefix and emits the text.
    fn item_text(&mut self, parts: &[String], checked: &mut Option<bool>) -> String {
        let joined = parts.join(" ");
        let text = if checked.is_none() {
            let (task, rest) = task_prefix(&joined);
            *checked = task;
            rest.to_string()
        } else {
            joined
        };
        self.emit_text(&text);
        text
    }

    fn emit_text(&mut self, text: &str) {
        if !text.is_empty() {
            self.readable.push(text.to_string());
            self.blocks.push(Block::Text(text.to_string()));
        }
    }

    fn push_refs(&mut self, links: Vec<Link>, images: Vec<Image>) {
        self.blocks.extend(links.into_iter().map(Block::Link));
        self.blocks.extend(images.into_iter().map(Block::Image));
    }

    fn parse_inline(&mut self, raw: &str) -> Inline {
        let Some(tree) = self.inline.parse(raw, None) else {
            return Inline {
                plain: raw.trim().to_string(),
                links: Vec::new(),
                images: Vec::new(),
            };
        };
        let root = tree.root_node();
        let mut plain = String::new();
        collect_plain(root, raw, &mut plain);
        let mut links = Vec::new();
        let mut images = Vec::new();
        collect_refs(root, raw, &mut links, &mut images);
        Inline {
            plain: plain.trim().to_string(),
            links,
            images,
        }
    }
}

/// Appends the visible text of an inline node, dropping delimiters and destinations.
fn collect_plain(node: Node<'_>, src: &str, out: &mut String) {
    let mut pos = node.start_byte();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        out.push_str(src.get(pos..child.start_byte()).unwrap_or_default());
        pos = child.end_byte();
        let text = src.get(child.byte_range()).unwrap_or_default();
        match child.kind() {
            "inline_link" | "full_reference_link" | "collapsed_reference_link"
            | "shortcut_link" | "image" => {
                if let Some(label) = first_named(child, &["link_text", "image_description"]) {
                    collect_plain(label, src, out);
                }
            }
            "emphasis" | "strong_emphasis" | "strikethrough" | "code_span" | "link_text"
            | "image_description" => collect_plain(child, src, out),
            "backslash_escape" => out.push_str(text.get(1..).unwrap_or_default()),
            "uri_autolink" | "email_autolink" => {
                out.push_str(text.trim_start_matches('<').trim_end_matches('>'));
            }
            "hard_line_break" => out.push('\n'),
            "emphasis_delimiter" | "code_span_delimiter" | "link_destination" | "link_title"
            | "link_label" | "html_tag" => {}
            _ => out.push_str(text),
        }
    }
    out.push_str(src.get(pos..node.end_byte()).unwrap_or_default());
}

fn destination(node: Option<Node<'_>>, src: &str) -> String {
    node.and_then(|n| src.get(n.byte_range()))
        .map(|d| d.trim_start_matches('<').trim_end_matches('>').to_string())
        .unwrap_or_default()
}

fn label_text(node: Option<Node<'_>>, src: &str) -> String {
    let mut text = String::new();
    if let Some(node) = node {
        collect_plain(node, src, &mut text);
    }
    text.trim().to_string()
}

fn collect_refs(node: Node<'_>, src: &str, links: &mut Vec<Link>, images: &mut Vec<Image>) {
    for child in named_children(node) {
        match child.kind() {
            "inline_link" => {
                let label = first_named(child, &["link_text"]);
                links.push(Link {
                    text: label_text(label, src),
                    url: destination(first_named(child, &["link_destination"]), src),
                });
                if let Some(label) = label {
                    collect_refs(label, src, links, images);
                }
            }
            "uri_autolink" | "email_autolink" => {
                let url = src
                    .get(child.byte_range())
                    .unwrap_or_default()
                    .trim_start_matches('<')
                    .trim_end_matches('>')
                    .to_string();
                links.push(Link {
                    text: url.clone(),
                    url,
                });
            }
            "image" => {
                let title = first_named(child, &["link_title"])
                    .and_then(|t| src.get(t.byte_range()))
                    .map(|t| t.trim_matches(['"', '\'', '(', ')']).to_string())
                    .filter(|t| !t.is_empty());
                images.push(Image {
                    alt: label_text(first_named(child, &["image_description"]), src),
                    url: destination(first_named(child, &["link_destination"]), src),
                    title,
                });
            }
            _ => collect_refs(child, src, links, images),
        }
    }
}

#[cfg(test)]
#[path = "../tests/markdown.rs"]
mod tests;
