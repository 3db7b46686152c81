//! Reading sources and enumerating documents on disk.
//!
//! Directory scans skip hidden entries, keep only files with a configured
//! extension, drop directories that end up empty, and order each level
//! directories first, then alphabetically.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::formats::Registry;

/// A scanned directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A directory holding at least one eligible file somewhere below it.
    Dir {
        /// Directory name.
        name: String,
        /// Entries in canonical order.
        children: Vec<Entry>,
    },
    /// An eligible file.
    File {
        /// File name.
        name: String,
        /// Full path.
        path: PathBuf,
    },
}

/// A file left out of a directory-wide operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    /// The file.
    pub path: PathBuf,
    /// Why it was left out.
    pub reason: String,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn is_eligible(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

/// Scans `root` recursively.
///
/// # Errors
///
/// Returns an error if `root` itself cannot be read. Unreadable
/// subdirectories are logged and left out.
pub fn scan(root: &Path, extensions: &[String]) -> Result<Vec<Entry>> {
    let mut listed: Vec<(bool, String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(root).map_err(io_error(root))? {
        let entry = entry.map_err(io_error(root))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        // Symlinked directories are not entered.
        let is_dir = entry.file_type().map_err(io_error(&path))?.is_dir();
        listed.push((is_dir, name, path));
    }
    listed.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut entries = Vec::new();
    for (is_dir, name, path) in listed {
        if is_dir {
            match scan(&path, extensions) {
                Ok(children) if children.is_empty() => {}
                Ok(children) => entries.push(Entry::Dir { name, children }),
                Err(err) => log::warn!("skipping directory: {err}"),
            }
        } else if is_eligible(&path, extensions) {
            entries.push(Entry::File { name, path });
        }
    }
    Ok(entries)
}

/// File paths of `entries`, depth-first in canonical order.
#[must_use]
pub fn files(entries: &[Entry]) -> Vec<&Path> {
    let mut out = Vec::new();
    collect_files(entries, &mut out);
    out
}

fn collect_files<'a>(entries: &'a [Entry], out: &mut Vec<&'a Path>) {
    for entry in entries {
        match entry {
            Entry::Dir { children, .. } => collect_files(children, out),
            Entry::File { path, .. } => out.push(path),
        }
    }
}

/// Reads the raw bytes of `path`.
///
/// # Errors
///
/// Returns an IO error naming the path.
pub fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(io_error(path))
}

/// Reads and parses one file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(registry: &Registry, path: &Path) -> Result<Document> {
    let content = read_source(path)?;
    Ok(registry.parse(&content, path)?)
}

/// Loads every path in parallel; results line up with `paths`.
#[must_use]
pub fn load_all(registry: &Registry, paths: &[&Path]) -> Vec<Result<Document>> {
    paths.par_iter().map(|path| load(registry, path)).collect()
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
