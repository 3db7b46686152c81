//! Case-insensitive substring search over section text.

use std::fmt;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::config::Config;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::formats::Registry;
use crate::input::{self, Skipped};

/// Characters of context kept on each side of a hit.
pub const DEFAULT_CONTEXT: usize = 60;

/// A section whose text contains the search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// Document the section belongs to.
    pub file: PathBuf,
    /// Section heading text.
    pub heading: String,
    /// Section heading level.
    pub level: u8,
    /// First line of the section.
    pub start: usize,
    /// Last line of the section.
    pub end: usize,
    /// Text around the first occurrence, whitespace collapsed.
    pub snippet: String,
}

/// All matches for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    /// The term as given.
    pub query: String,
    /// Matches in document order, files in traversal order.
    pub matches: Vec<SearchMatch>,
    /// Files a directory search could not load.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<Skipped>,
}

impl fmt::Display for SearchResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matches.is_empty() {
            return writeln!(f, "No matches for {:?}", self.query);
        }
        writeln!(
            f,
            "Found {} matches for {:?}:",
            self.matches.len(),
            self.query
        )?;
        writeln!(f)?;
        let mut current: Option<&Path> = None;
        for m in &self.matches {
            if current != Some(m.file.as_path()) {
                if current.is_some() {
                    writeln!(f)?;
                }
                writeln!(f, "{}:", m.file.display())?;
                current = Some(m.file.as_path());
            }
            writeln!(f, "  ## {} (lines {}-{})", m.heading, m.start, m.end)?;
            if !m.snippet.is_empty() {
                writeln!(f, "     {:?}", m.snippet)?;
            }
        }
        Ok(())
    }
}

/// Searches `doc` with the default snippet context.
#[must_use]
pub fn search(doc: &Document, term: &str) -> SearchResults {
    search_with(doc, term, DEFAULT_CONTEXT)
}

/// Every section whose own text contains `term`, ignoring case.
///
/// An empty term matches nothing.
#[must_use]
pub fn search_with(doc: &Document, term: &str, context: usize) -> SearchResults {
    let matches = doc
        .sections()
        .iter()
        .filter_map(|section| {
            let snippet = snippet(&section.text, term, context)?;
            Some(SearchMatch {
                file: doc.path().to_path_buf(),
                heading: section.title().to_string(),
                level: section.level(),
                start: section.line_start,
                end: section.line_end,
                snippet,
            })
        })
        .collect();
    SearchResults {
        query: term.to_string(),
        matches,
        skipped: Vec::new(),
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Window of `context` characters either side of the first case-insensitive
/// occurrence of `term`, with `...` marking each truncated end.
#[must_use]
pub fn snippet(text: &str, term: &str, context: usize) -> Option<String> {
    let needle: Vec<char> = term.chars().map(fold).collect();
    if needle.is_empty() {
        return None;
    }
    let chars: Vec<char> = text.chars().collect();
    let folded: Vec<char> = chars.iter().copied().map(fold).collect();
    let at = folded.windows(needle.len()).position(|w| w == needle.as_slice())?;

    let start = at.saturating_sub(context);
    let end = (at + needle.len() + context).min(chars.len());
    let window: String = chars[start..end].iter().collect();
    let mut snippet = window.split_whitespace().collect::<Vec<_>>().join(" ");
    if start > 0 {
        snippet.insert_str(0, "...");
    }
    if end < chars.len() {
        snippet.push_str("...");
    }
    Some(snippet)
}

/// Searches every eligible file under `root`, in traversal order.
///
/// # Errors
///
/// Returns an error if `root` is not a readable directory. Files that fail to
/// load are listed in `skipped`.
pub fn search_directory(
    registry: &Registry,
    root: &Path,
    term: &str,
    config: &Config,
) -> Result<SearchResults> {
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    let entries = input::scan(root, &config.file_extensions)?;
    let paths = input::files(&entries);
    let per_file: Vec<_> = paths
        .par_iter()
        .map(|path| {
            input::load(registry, path)
                .map(|doc| search_with(&doc, term, config.snippet_context).matches)
        })
        .collect();

    let mut results = SearchResults {
        query: term.to_string(),
        matches: Vec::new(),
        skipped: Vec::new(),
    };
    for (path, outcome) in paths.iter().zip(per_file) {
        match outcome {
            Ok(matches) => results.matches.extend(matches),
            Err(err) => {
                log::warn!("skipping {}: {err}", path.display());
                results.skipped.push(Skipped {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(results)
}

#[cfg(test)]
#[path = "tests/search.rs"]
mod tests;
