//! Structural trees of documents, sections and directories.
//!
//! Trees are materialised into [`TreeNode`]s first and rendered afterwards,
//! so the same structure backs the text output and any programmatic use.
//! Rendering is depth-first pre-order with box-drawing connectors:
//!
//! ```text
//! guide.md (12 lines)
//! ├── # Guide (1-12)
//! │   ├── ## Install (3-7)
//! │   │   └── [code: bash, 1 block]
//! │   └── ## Usage (8-12)
//! ```
//!
//! Line counts follow [`str::lines`]: a trailing newline ends the last line
//! rather than opening an empty one, so `"# T\n"` counts as one line.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::Config;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::formats::Registry;
use crate::input::{self, Entry, Skipped};
use crate::section::Section;

/// Words kept in a section preview unless configured otherwise.
pub const DEFAULT_PREVIEW_WORDS: usize = 50;

/// Verbosity of a rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeMode {
    /// Sections plus code, table, list, link and image annotations.
    #[default]
    Default,
    /// Sections only.
    Compact,
    /// Sections with a short text preview each.
    Preview,
    /// Directory scope: every file's section tree with previews.
    Full,
}

/// A tree mode name that is not one of the four known modes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tree mode {0:?}, expected default, compact, preview or full")]
pub struct UnknownMode(pub String);

impl FromStr for TreeMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "" | "default" => Ok(Self::Default),
            "compact" => Ok(Self::Compact),
            "preview" | "expand" => Ok(Self::Preview),
            "full" => Ok(Self::Full),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

/// What a tree node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A section with its inclusive line range.
    Section {
        /// Heading level.
        level: u8,
        /// Heading text.
        text: String,
        /// First line.
        start: usize,
        /// Last line.
        end: usize,
    },
    /// A bare heading, as listed under files in directory preview mode.
    Heading {
        /// Heading level.
        level: u8,
        /// Heading text.
        text: String,
    },
    /// Code blocks of one language owned by a section.
    Code {
        /// Language, empty for untagged blocks.
        language: String,
        /// Number of blocks.
        count: usize,
    },
    /// A table owned by a section.
    Table {
        /// Body rows.
        rows: usize,
        /// Header columns.
        columns: usize,
    },
    /// A list owned by a section.
    List {
        /// Top-level items.
        items: usize,
    },
    /// Links owned by a section.
    Links(usize),
    /// Images owned by a section.
    Images(usize),
    /// Frontmatter field names.
    Frontmatter(Vec<String>),
    /// A directory.
    Directory(String),
    /// A parsed file.
    File {
        /// File name.
        name: String,
        /// Line count.
        lines: usize,
        /// Section count.
        sections: usize,
    },
    /// A file that failed to load or parse.
    FileError(String),
}

fn plural(n: usize, one: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {one}s")
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section {
                level,
                text,
                start,
                end,
            } => write!(
                f,
                "{} {text} ({start}-{end})",
                "#".repeat(usize::from(*level))
            ),
            Self::Heading { level, text } => {
                write!(f, "{} {text}", "#".repeat(usize::from(*level)))
            }
            Self::Code { language, count } => {
                let language = if language.is_empty() { "plain" } else { language.as_str() };
                write!(f, "[code: {language}, {}]", plural(*count, "block"))
            }
            Self::Table { rows, columns } => write!(
                f,
                "[table: {}, {}]",
                plural(*rows, "row"),
                plural(*columns, "column")
            ),
            Self::List { items } => write!(f, "[list: {}]", plural(*items, "item")),
            Self::Links(n) => write!(f, "[link: {}]", plural(*n, "link")),
            Self::Images(n) => write!(f, "[image: {}]", plural(*n, "image")),
            Self::Frontmatter(keys) => write!(f, "[frontmatter: {}]", keys.join(", ")),
            Self::Directory(name) => write!(f, "{name}/"),
            Self::File {
                name,
                lines,
                sections: 0,
            } => write!(f, "{name} ({lines} lines, no sections)"),
            Self::File {
                name,
                lines,
                sections,
            } => write!(f, "{name} ({lines} lines, {sections} sections)"),
            Self::FileError(name) => write!(f, "{name} (parse error)"),
        }
    }
}

/// One node of a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// What the node stands for.
    pub kind: NodeKind,
    /// Text preview, in preview and full modes.
    pub preview: Option<String>,
    /// Child nodes in render order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// A leaf node.
    #[must_use]
    pub fn leaf(kind: NodeKind) -> Self {
        Self {
            kind,
            preview: None,
            children: Vec::new(),
        }
    }
}

/// Writes `nodes` one per line, with previews under the nodes that have them.
///
/// # Errors
///
/// Propagates errors from the writer.
pub fn render_nodes<W: fmt::Write>(out: &mut W, nodes: &[TreeNode], prefix: &str) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let connector = if last { "└── " } else { "├── " };
        writeln!(out, "{prefix}{connector}{}", node.kind)?;
        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        if let Some(preview) = &node.preview {
            writeln!(out, "{child_prefix}     {preview:?}")?;
        }
        render_nodes(out, &node.children, &child_prefix)?;
    }
    Ok(())
}

/// Tree of one document or one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeResult {
    /// Document path, or the heading text for a section tree.
    pub path: String,
    /// Lines covered.
    pub lines: usize,
    /// Mode the tree was built in.
    pub mode: TreeMode,
    /// Top-level nodes.
    pub roots: Vec<TreeNode>,
}

impl fmt::Display for TreeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} lines)", self.path, self.lines)?;
        render_nodes(f, &self.roots, "")
    }
}

/// Document tree with the default preview length.
#[must_use]
pub fn build_tree(doc: &Document, mode: TreeMode) -> TreeResult {
    build_tree_with(doc, mode, DEFAULT_PREVIEW_WORDS)
}

/// Document tree: a frontmatter node when metadata exists, then each top-level section.
#[must_use]
pub fn build_tree_with(doc: &Document, mode: TreeMode, preview_words: usize) -> TreeResult {
    let mut roots = Vec::new();
    if let Some(metadata) = doc.metadata().filter(|m| !m.is_empty()) {
        roots.push(TreeNode::leaf(NodeKind::Frontmatter(
            metadata.keys().cloned().collect(),
        )));
    }
    roots.extend(
        doc.table_of_contents()
            .into_iter()
            .map(|section| section_node(doc, section, mode, preview_words)),
    );
    TreeResult {
        path: doc.path().display().to_string(),
        lines: doc.line_count(),
        mode,
        roots,
    }
}

/// Tree rooted at one section, titled by its heading.
#[must_use]
pub fn build_section_tree(
    doc: &Document,
    section: &Section,
    mode: TreeMode,
    preview_words: usize,
) -> TreeResult {
    TreeResult {
        path: section.title().to_string(),
        lines: section.line_count(),
        mode,
        roots: vec![section_node(doc, section, mode, preview_words)],
    }
}

fn section_node(doc: &Document, section: &Section, mode: TreeMode, preview_words: usize) -> TreeNode {
    let preview = matches!(mode, TreeMode::Preview | TreeMode::Full)
        .then(|| preview_text(&section.text, preview_words))
        .filter(|p| !p.is_empty());
    let mut children: Vec<TreeNode> = doc
        .children(section)
        .map(|child| section_node(doc, child, mode, preview_words))
        .collect();
    if mode == TreeMode::Default {
        children.extend(annotations(doc, section));
    }
    TreeNode {
        kind: NodeKind::Section {
            level: section.level(),
            text: section.title().to_string(),
            start: section.line_start,
            end: section.line_end,
        },
        preview,
        children,
    }
}

fn annotations(doc: &Document, section: &Section) -> Vec<TreeNode> {
    let mut groups: Vec<(&str, usize)> = Vec::new();
    for block in doc.section_code_blocks(section, &[]) {
        match groups.iter_mut().find(|(lang, _)| *lang == block.language) {
            Some((_, count)) => *count += 1,
            None => groups.push((block.language.as_str(), 1)),
        }
    }
    let mut nodes: Vec<TreeNode> = groups
        .into_iter()
        .map(|(language, count)| {
            TreeNode::leaf(NodeKind::Code {
                language: language.to_string(),
                count,
            })
        })
        .collect();
    nodes.extend(section.table_indices.iter().map(|&i| {
        let table = &doc.tables()[i];
        TreeNode::leaf(NodeKind::Table {
            rows: table.rows.len(),
            columns: table.headers.len(),
        })
    }));
    nodes.extend(section.list_indices.iter().map(|&i| {
        TreeNode::leaf(NodeKind::List {
            items: doc.lists[i].items.len(),
        })
    }));
    if !section.link_indices.is_empty() {
        nodes.push(TreeNode::leaf(NodeKind::Links(section.link_indices.len())));
    }
    if !section.image_indices.is_empty() {
        nodes.push(TreeNode::leaf(NodeKind::Images(section.image_indices.len())));
    }
    nodes
}

/// The first `words` whitespace-separated words of `text`, with `...` when cut.
#[must_use]
pub fn preview_text(text: &str, words: usize) -> String {
    let mut iter = text.split_whitespace();
    let head: Vec<&str> = iter.by_ref().take(words).collect();
    let mut preview = head.join(" ");
    if iter.next().is_some() {
        preview.push_str("...");
    }
    preview
}

// ---------------------------------------------------------------------------
// Directory trees
// ---------------------------------------------------------------------------

/// Tree of every eligible file under a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirTree {
    /// Root directory as given.
    pub path: PathBuf,
    /// Mode the tree was built in.
    pub mode: TreeMode,
    /// Files parsed successfully.
    pub total_files: usize,
    /// Lines across the files parsed successfully.
    pub total_lines: usize,
    /// Top-level entries.
    pub entries: Vec<TreeNode>,
    /// Files that could not be loaded, with the reason.
    pub skipped: Vec<Skipped>,
}

impl fmt::Display for DirTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} files, {} lines total)",
            self.path.display(),
            self.total_files,
            self.total_lines
        )?;
        render_nodes(f, &self.entries, "")
    }
}

/// Scans `root`, parses every eligible file in parallel and assembles the tree.
///
/// # Errors
///
/// Returns an error if `root` is not a readable directory. Individual files
/// that fail are rendered as parse errors and listed in `skipped`.
pub fn build_dir_tree(
    registry: &Registry,
    root: &Path,
    mode: TreeMode,
    config: &Config,
) -> Result<DirTree> {
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    let entries = input::scan(root, &config.file_extensions)?;
    let paths = input::files(&entries);
    let mut loaded = input::load_all(registry, &paths).into_iter();

    let mut tree = DirTree {
        path: root.to_path_buf(),
        mode,
        total_files: 0,
        total_lines: 0,
        entries: Vec::new(),
        skipped: Vec::new(),
    };
    let mut builder = DirBuilder {
        tree: &mut tree,
        loaded: &mut loaded,
        preview_words: config.preview_words,
    };
    let nodes = builder.nodes(&entries);
    tree.entries = nodes;
    Ok(tree)
}

struct DirBuilder<'a, I> {
    tree: &'a mut DirTree,
    loaded: &'a mut I,
    preview_words: usize,
}

impl<I: Iterator<Item = Result<Document>>> DirBuilder<'_, I> {
    fn nodes(&mut self, entries: &[Entry]) -> Vec<TreeNode> {
        entries.iter().filter_map(|entry| self.node(entry)).collect()
    }

    fn node(&mut self, entry: &Entry) -> Option<TreeNode> {
        match entry {
            Entry::Dir { name, children } => Some(TreeNode {
                kind: NodeKind::Directory(name.clone()),
                preview: None,
                children: self.nodes(children),
            }),
            Entry::File { name, path } => match self.loaded.next()? {
                Ok(doc) => Some(self.file_node(name, &doc)),
                Err(err) => {
                    log::warn!("skipping {}: {err}", path.display());
                    self.tree.skipped.push(Skipped {
                        path: path.clone(),
                        reason: err.to_string(),
                    });
                    Some(TreeNode::leaf(NodeKind::FileError(name.clone())))
                }
            },
        }
    }

    fn file_node(&mut self, name: &str, doc: &Document) -> TreeNode {
        self.tree.total_files += 1;
        self.tree.total_lines += doc.line_count();
        let children = match self.tree.mode {
            // Level 1 headings, then level 2, each in document order.
            TreeMode::Preview => doc
                .headings(&[1, 2])
                .into_iter()
                .map(|h| {
                    TreeNode::leaf(NodeKind::Heading {
                        level: h.level,
                        text: h.text.clone(),
                    })
                })
                .collect(),
            TreeMode::Full => doc
                .table_of_contents()
                .into_iter()
                .map(|section| section_node(doc, section, TreeMode::Full, self.preview_words))
                .collect(),
            TreeMode::Default | TreeMode::Compact => Vec::new(),
        };
        TreeNode {
            kind: NodeKind::File {
                name: name.to_string(),
                lines: doc.line_count(),
                sections: doc.sections().len(),
            },
            preview: None,
            children,
        }
    }
}

#[cfg(test)]
#[path = "tests/tree.rs"]
mod tests;
