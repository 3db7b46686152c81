//! Builds a [`Document`] from the flat block stream an adapter extracts.
//!
//! Adapters walk their native parse tree (or their data) and emit blocks in
//! document order. The builder reconstructs the section hierarchy from the
//! heading stream with a stack of open sections, assigns every other block to
//! the innermost open section, and fills the lookup indexes.

use std::path::PathBuf;

use crate::document::{Document, Indexes};
use crate::elements::{CodeBlock, Image, Link, List, Table};
use crate::formats::FormatKind;
use crate::metadata::Frontmatter;
use crate::section::{Heading, Section};

/// One extracted piece of a document, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A heading; opens a section.
    Heading(Heading),
    /// Flattened prose owned by the current section.
    Text(String),
    /// A fenced code block.
    Code(CodeBlock),
    /// A table.
    Table(Table),
    /// A list not nested inside another list.
    List(List),
    /// An inline link.
    Link(Link),
    /// An inline image.
    Image(Image),
}

/// Everything an adapter extracts from one source.
#[derive(Debug)]
pub struct Extraction {
    /// Source path.
    pub path: PathBuf,
    /// Format the adapter parsed.
    pub format: FormatKind,
    /// Full source text.
    pub source: String,
    /// Title supplied by the format, if it has a notion of one.
    pub title: Option<String>,
    /// Leading metadata block.
    pub frontmatter: Option<Frontmatter>,
    /// Extracted blocks in document order.
    pub blocks: Vec<Block>,
    /// Plain text of the whole document.
    pub readable_text: String,
}

/// Number of lines in `source`; a trailing newline does not open another line.
#[must_use]
pub fn line_count(source: &str) -> usize {
    source.lines().count()
}

/// Assembles the document: hierarchy, ownership, indexes.
#[must_use]
pub fn build(extraction: Extraction) -> Document {
    let Extraction {
        path,
        format,
        source,
        title,
        frontmatter,
        blocks,
        readable_text,
    } = extraction;

    let mut headings = Vec::new();
    let mut sections: Vec<Section> = Vec::new();
    let mut code_blocks = Vec::new();
    let mut links = Vec::new();
    let mut images = Vec::new();
    let mut tables = Vec::new();
    let mut lists = Vec::new();
    // Innermost open section last.
    let mut open: Vec<usize> = Vec::new();

    for block in blocks {
        let current = open.last().copied();
        match block {
            Block::Heading(heading) => {
                if !(1..=6).contains(&heading.level) {
                    log::debug!("ignoring heading with level {}", heading.level);
                    continue;
                }
                while let Some(&top) = open.last() {
                    if sections[top].heading.level < heading.level {
                        break;
                    }
                    let closed = &mut sections[top];
                    closed.line_end = heading.line.saturating_sub(1).max(closed.line_start);
                    open.pop();
                }
                let parent = open.last().copied();
                let index = sections.len();
                if let Some(parent) = parent {
                    sections[parent].children_indices.push(index);
                }
                headings.push(heading.clone());
                sections.push(Section::open(heading, parent));
                open.push(index);
            }
            Block::Text(text) => {
                if let Some(current) = current {
                    append_text(&mut sections[current].text, &text);
                }
            }
            Block::Code(code) => {
                if let Some(current) = current {
                    let section = &mut sections[current];
                    section.code_block_indices.push(code_blocks.len());
                    append_text(&mut section.text, &code.content);
                }
                code_blocks.push(code);
            }
            Block::Table(table) => {
                if let Some(current) = current {
                    sections[current].table_indices.push(tables.len());
                }
                tables.push(table);
            }
            Block::List(list) => {
                if let Some(current) = current {
                    sections[current].list_indices.push(lists.len());
                }
                lists.push(list);
            }
            Block::Link(link) => {
                if let Some(current) = current {
                    sections[current].link_indices.push(links.len());
                }
                links.push(link);
            }
            Block::Image(image) => {
                if let Some(current) = current {
                    sections[current].image_indices.push(images.len());
                }
                images.push(image);
            }
        }
    }

    let lines = line_count(&source);
    let final_line = headings.last().map_or(lines, |h: &Heading| lines.max(h.line));
    for index in open {
        let section = &mut sections[index];
        section.line_end = final_line.max(section.line_start);
    }

    let title = title
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headings
                .iter()
                .find(|h| h.level == 1)
                .or_else(|| headings.first())
                .map(|h| h.text.clone())
        })
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

    let indexes = index(&headings, &sections, &code_blocks);
    log::debug!(
        "built {}: {} headings, {} code blocks",
        path.display(),
        headings.len(),
        code_blocks.len()
    );

    Document {
        source,
        path,
        format,
        title,
        frontmatter,
        readable_text,
        line_count: lines,
        headings,
        sections,
        code_blocks,
        links,
        images,
        tables,
        lists,
        indexes,
    }
}

fn append_text(buf: &mut String, text: &str) {
    let text = text.trim_end();
    if text.is_empty() {
        return;
    }
    if !buf.is_empty() {
        buf.push('\n');
    }
    buf.push_str(text);
}

fn index(headings: &[Heading], sections: &[Section], code_blocks: &[CodeBlock]) -> Indexes {
    let mut indexes = Indexes::default();
    for (i, heading) in headings.iter().enumerate() {
        indexes.heading_by_text.insert(heading.text.clone(), i);
        indexes.headings_by_level[usize::from(heading.level - 1)].push(i);
    }
    for (i, section) in sections.iter().enumerate() {
        indexes.section_by_title.insert(section.heading.text.clone(), i);
    }
    for (i, block) in code_blocks.iter().enumerate() {
        indexes
            .code_by_language
            .entry(block.language.clone())
            .or_default()
            .push(i);
    }
    indexes
}

#[cfg(test)]
#[path = "tests/builder.rs"]
mod tests;
