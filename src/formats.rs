//! Format adapters and the registry that dispatches to them.
//!
//! This module defines the `Format` trait, which abstracts over source
//! formats (markdown, JSON, YAML, ...) by turning raw text into the shared
//! block stream consumed by [`crate::builder`]. Format detection looks at the
//! file extension first and sniffs the content second.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::builder::{self, Extraction};
use crate::config::Config;
use crate::document::Document;
use crate::error::{ParseError, ParseFailure};

pub mod data;
pub mod markdown;

/// Source format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// CommonMark with GFM tables and task lists.
    Markdown,
    /// HTML pages.
    Html,
    /// PDF files.
    Pdf,
    /// A single JSON value.
    Json,
    /// Newline-delimited JSON records.
    Jsonl,
    /// A YAML document.
    Yaml,
}

impl FormatKind {
    /// Lowercase name used in output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
            Self::Yaml => "yaml",
        }
    }

    /// Format implied by a file extension, compared case-insensitively.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "md" | "markdown" | "mdown" | "mkd" => Some(Self::Markdown),
            "html" | "htm" | "xhtml" => Some(Self::Html),
            "pdf" => Some(Self::Pdf),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::Jsonl),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detects the format from the path extension, then from leading content, defaulting to markdown.
#[must_use]
pub fn detect(path: &Path, content: &[u8]) -> FormatKind {
    if let Some(kind) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(FormatKind::from_extension)
    {
        return kind;
    }
    let head = String::from_utf8_lossy(&content[..content.len().min(512)]);
    let head = head.trim_start();
    let lower = head.to_ascii_lowercase();
    if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        FormatKind::Html
    } else if head.starts_with("%PDF") {
        FormatKind::Pdf
    } else {
        FormatKind::Markdown
    }
}

/// A source format adapter.
pub trait Format: Send + Sync {
    /// The format this adapter handles.
    fn kind(&self) -> FormatKind;

    /// Extracts the block stream and document-level attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is malformed for this format.
    fn extract(&self, source: String, path: &Path) -> Result<Extraction, ParseFailure>;
}

/// Adapters keyed by format, with a fallback for formats that have none.
pub struct Registry {
    formats: HashMap<FormatKind, Box<dyn Format>>,
    fallback: FormatKind,
}

impl Registry {
    /// An empty registry falling back to `fallback`.
    #[must_use]
    pub fn new(fallback: FormatKind) -> Self {
        Self {
            formats: HashMap::new(),
            fallback,
        }
    }

    /// Markdown plus the JSON, JSONL and YAML data adapters.
    #[must_use]
    pub fn with_defaults(config: &Config) -> Self {
        let mut registry = Self::new(FormatKind::Markdown);
        registry.register(Box::new(markdown::MarkdownFormat));
        for kind in [FormatKind::Json, FormatKind::Jsonl, FormatKind::Yaml] {
            registry.register(Box::new(data::DataFormat::new(
                kind,
                config.max_array_sections,
            )));
        }
        registry
    }

    /// Adds or replaces the adapter for its format.
    pub fn register(&mut self, format: Box<dyn Format>) {
        self.formats.insert(format.kind(), format);
    }

    /// Whether an adapter is registered for `kind`.
    #[must_use]
    pub fn supports(&self, kind: FormatKind) -> bool {
        self.formats.contains_key(&kind)
    }

    /// Detects the format and parses `content` into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the adapter rejects the content.
    pub fn parse(&self, content: &[u8], path: &Path) -> Result<Document, ParseError> {
        self.parse_as(detect(path, content), content, path)
    }

    /// Parses `content` as `kind`, using the fallback adapter if `kind` has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the adapter rejects the content or no adapter is available.
    pub fn parse_as(
        &self,
        kind: FormatKind,
        content: &[u8],
        path: &Path,
    ) -> Result<Document, ParseError> {
        let adapter = match self.formats.get(&kind) {
            Some(adapter) => adapter,
            None => {
                log::debug!("no {kind} adapter, parsing {} as {}", path.display(), self.fallback);
                self.formats.get(&self.fallback).ok_or(ParseError {
                    path: path.to_path_buf(),
                    format: kind,
                    failure: ParseFailure::Unsupported,
                })?
            }
        };
        let source = String::from_utf8_lossy(content).into_owned();
        adapter
            .extract(source, path)
            .map(builder::build)
            .map_err(|failure| ParseError {
                path: path.to_path_buf(),
                format: adapter.kind(),
                failure,
            })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults(&Config::default())
    }
}

#[cfg(test)]
#[path = "tests/formats.rs"]
mod tests;
