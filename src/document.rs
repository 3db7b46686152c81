//! The document aggregate and its lookup operations.
//!
//! A `Document` owns every extracted entity in flat, document-ordered lists
//! plus four lookup indexes (heading-by-text, headings-by-level,
//! section-by-title, code-by-language). It is built once by
//! [`crate::builder::build`] and never mutated afterwards, so shared
//! references can be handed to any number of concurrent queries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::elements::{CodeBlock, Image, Link, List, Table};
use crate::formats::FormatKind;
use crate::metadata::{self, Frontmatter, MetaValue, Metadata};
use crate::section::{Heading, Section};

/// Pre-computed lookup tables, consistent with the document's flat lists.
#[derive(Debug, Default)]
pub(crate) struct Indexes {
    /// Heading text to heading index; later duplicates overwrite earlier ones.
    pub(crate) heading_by_text: HashMap<String, usize>,
    /// Heading indices per level, slot 0 holding level 1.
    pub(crate) headings_by_level: [Vec<usize>; 6],
    /// Section title to section index; later duplicates overwrite earlier ones.
    pub(crate) section_by_title: HashMap<String, usize>,
    /// Code block indices per language, empty string for untagged blocks.
    pub(crate) code_by_language: HashMap<String, Vec<usize>>,
}

/// A parsed, indexed document.
#[derive(Debug)]
pub struct Document {
    pub(crate) source: String,
    pub(crate) path: PathBuf,
    pub(crate) format: FormatKind,
    pub(crate) title: String,
    pub(crate) frontmatter: Option<Frontmatter>,
    pub(crate) readable_text: String,
    pub(crate) line_count: usize,
    pub(crate) headings: Vec<Heading>,
    pub(crate) sections: Vec<Section>,
    pub(crate) code_blocks: Vec<CodeBlock>,
    pub(crate) links: Vec<Link>,
    pub(crate) images: Vec<Image>,
    pub(crate) tables: Vec<Table>,
    pub(crate) lists: Vec<List>,
    pub(crate) indexes: Indexes,
}

impl Document {
    /// Source path the document was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format the source was parsed as.
    #[must_use]
    pub fn format(&self) -> FormatKind {
        self.format
    }

    /// Full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Document title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of source lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Plain text of the document with markup and code removed.
    #[must_use]
    pub fn readable_text(&self) -> &str {
        &self.readable_text
    }

    /// Frontmatter fields, absent when the source has no leading metadata block.
    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.frontmatter.as_ref().map(|fm| &fm.metadata)
    }

    /// The raw frontmatter block, delimiters included.
    #[must_use]
    pub fn frontmatter_raw(&self) -> Option<&str> {
        self.frontmatter.as_ref().map(|fm| fm.raw.as_str())
    }

    /// Source text after the frontmatter block.
    #[must_use]
    pub fn body(&self) -> &str {
        let start = self.frontmatter.as_ref().map_or(0, |fm| fm.body_start);
        &self.source[start..]
    }

    /// A top-level frontmatter field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&MetaValue> {
        self.metadata()?.get(key)
    }

    /// A frontmatter field addressed by dotted path, e.g. `config.theme`.
    #[must_use]
    pub fn nested_field(&self, path: &str) -> Option<&MetaValue> {
        metadata::lookup(self.metadata()?, path)
    }

    /// The `owner` frontmatter field.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.field("owner").and_then(MetaValue::as_str)
    }

    /// Whether the document is owned by `owner`.
    #[must_use]
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner() == Some(owner)
    }

    /// The `tags` frontmatter field.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.field("tags").map(MetaValue::string_list).unwrap_or_default()
    }

    /// The `priority` frontmatter field.
    #[must_use]
    pub fn priority(&self) -> Option<&str> {
        self.field("priority").and_then(MetaValue::as_str)
    }

    /// Headings of the given levels.
    ///
    /// With no levels, every heading in document order. Otherwise the union of
    /// the requested levels, level by level in the order given.
    #[must_use]
    pub fn headings(&self, levels: &[u8]) -> Vec<&Heading> {
        if levels.is_empty() {
            return self.headings.iter().collect();
        }
        levels
            .iter()
            .filter(|level| (1..=6).contains(*level))
            .flat_map(|level| &self.indexes.headings_by_level[usize::from(level - 1)])
            .map(|&i| &self.headings[i])
            .collect()
    }

    /// The heading with exactly this text; the last one wins on duplicates.
    #[must_use]
    pub fn heading(&self, text: &str) -> Option<&Heading> {
        self.indexes
            .heading_by_text
            .get(text)
            .map(|&i| &self.headings[i])
    }

    /// The section whose title matches exactly; the last one wins on duplicates.
    #[must_use]
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.indexes
            .section_by_title
            .get(title)
            .map(|&i| &self.sections[i])
    }

    /// Every section in document order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Direct subsections of `section`.
    pub fn children<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = &'a Section> + 'a {
        section
            .children_indices
            .iter()
            .map(move |&i| &self.sections[i])
    }

    /// The section containing `section`, if any.
    #[must_use]
    pub fn parent(&self, section: &Section) -> Option<&Section> {
        section.parent_index.map(|i| &self.sections[i])
    }

    /// Sections with no parent, in document order.
    #[must_use]
    pub fn table_of_contents(&self) -> Vec<&Section> {
        self.sections
            .iter()
            .filter(|s| s.parent_index.is_none())
            .collect()
    }

    /// Code blocks in the given languages.
    ///
    /// With no languages, every block. Otherwise the per-language buckets
    /// concatenated in the order requested.
    #[must_use]
    pub fn code_blocks(&self, languages: &[&str]) -> Vec<&CodeBlock> {
        if languages.is_empty() {
            return self.code_blocks.iter().collect();
        }
        languages
            .iter()
            .filter_map(|lang| self.indexes.code_by_language.get(*lang))
            .flatten()
            .map(|&i| &self.code_blocks[i])
            .collect()
    }

    /// Code blocks owned by `section`, optionally restricted to some languages.
    #[must_use]
    pub fn section_code_blocks(&self, section: &Section, languages: &[&str]) -> Vec<&CodeBlock> {
        section
            .code_block_indices
            .iter()
            .map(|&i| &self.code_blocks[i])
            .filter(|block| languages.is_empty() || languages.contains(&block.language.as_str()))
            .collect()
    }

    /// Every link.
    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Every image.
    #[must_use]
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Every table.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Top-level lists, optionally only ordered or only bulleted ones.
    #[must_use]
    pub fn lists(&self, ordered: Option<bool>) -> Vec<&List> {
        self.lists
            .iter()
            .filter(|list| ordered.is_none_or(|o| list.ordered == o))
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/document.rs"]
mod tests;
