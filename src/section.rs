//! Heading and section records for indexed documents.
//!
//! A section represents the content span owned by one heading, extending to
//! the line before the next heading of equal or shallower level. Sections
//! live in a flat arena on the [`crate::Document`] and track their position in
//! the hierarchy through parent/child indices, so navigation is O(1) both
//! ways without ownership cycles.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A heading as it appears in the source, markup stripped.
pub struct Heading {
    /// Depth from 1 (outermost) to 6.
    pub level: u8,
    /// Heading text without markup symbols.
    pub text: String,
    /// Anchor id derived from the text, unique within the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    /// 1-based line of the heading.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Hierarchical document division spanning its heading through its last owned line.
pub struct Section {
    /// The heading that opens this section.
    pub heading: Heading,
    /// First line of the section (the heading line).
    pub line_start: usize,
    /// Last line before the next heading of equal or shallower level, or the final line.
    pub line_end: usize,
    /// Flattened text of the content directly owned by this section, subsections excluded.
    pub text: String,
    /// Index of the containing section in the hierarchy.
    pub parent_index: Option<usize>,
    /// Indices of directly nested subsections, in document order.
    pub children_indices: Vec<usize>,
    /// Indices into the document's code blocks owned by this section.
    pub code_block_indices: Vec<usize>,
    /// Indices into the document's tables owned by this section.
    pub table_indices: Vec<usize>,
    /// Indices into the document's lists owned by this section.
    pub list_indices: Vec<usize>,
    /// Indices into the document's links owned by this section.
    pub link_indices: Vec<usize>,
    /// Indices into the document's images owned by this section.
    pub image_indices: Vec<usize>,
}

impl Section {
    /// Opens a section at its heading line; the end is fixed once a closing heading is seen.
    #[must_use]
    pub fn open(heading: Heading, parent_index: Option<usize>) -> Self {
        let line = heading.line;
        Self {
            heading,
            line_start: line,
            line_end: line,
            text: String::new(),
            parent_index,
            children_indices: Vec::new(),
            code_block_indices: Vec::new(),
            table_indices: Vec::new(),
            list_indices: Vec::new(),
            link_indices: Vec::new(),
            image_indices: Vec::new(),
        }
    }

    /// Heading text.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.heading.text
    }

    /// Heading level.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.heading.level
    }

    /// Number of lines in the inclusive range.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_end - self.line_start + 1
    }
}
