//! Content records extracted alongside headings: code, links, images, tables and lists.

use serde::Serialize;

/// A fenced code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    /// Info-string language, empty when untagged.
    pub language: String,
    /// Raw content between the fences.
    pub content: String,
    /// Line count of `content`.
    pub lines: usize,
    /// 1-based line of the opening fence.
    pub line: usize,
}

impl CodeBlock {
    /// Builds a block, deriving the line count from the content.
    #[must_use]
    pub fn new(language: impl Into<String>, content: impl Into<String>, line: usize) -> Self {
        let content = content.into();
        Self {
            language: language.into(),
            lines: content.lines().count(),
            content,
            line,
        }
    }
}

/// An inline link or autolink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Link text, markup stripped.
    pub text: String,
    /// Destination.
    pub url: String,
}

/// An inline image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Alt text, markup stripped.
    pub alt: String,
    /// Source url.
    pub url: String,
    /// Optional title attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A table with a header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Column headers, in order.
    pub headers: Vec<String>,
    /// Body rows, each an ordered list of cell values.
    pub rows: Vec<Vec<String>>,
}

/// An ordered or bulleted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    /// Numbered (`1.` / `1)`) rather than bulleted.
    pub ordered: bool,
    /// Top-level items.
    pub items: Vec<ListItem>,
}

/// A single list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    /// Item text, markup stripped.
    pub text: String,
    /// Task state: `Some(true)` for `[x]`, `Some(false)` for `[ ]`, `None` for plain items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    /// Items of a list nested under this one.
    pub children: Vec<ListItem>,
}
