//! Structured data adapter for JSON, JSONL and YAML.
//!
//! Data has no headings of its own, so the adapter synthesises an outline:
//! object keys (sorted) become headings nested up to four levels deep, scalar
//! values become section text, and an array of uniform objects becomes a
//! table. Headings are numbered by their position in the outline.

use std::path::Path;

use crate::builder::{Block, Extraction};
use crate::elements::Table;
use crate::error::ParseFailure;
use crate::formats::{Format, FormatKind};
use crate::metadata::{MetaValue, Metadata};
use crate::section::Heading;

const MAX_DEPTH: u8 = 4;
const MAX_TABLE_COLUMNS: usize = 20;
const MAX_CELL_CHARS: usize = 50;
const MAX_READABLE_CHARS: usize = 50_000;
const TITLE_KEYS: [&str; 5] = ["title", "name", "id", "type", "role"];

/// Adapter for one of the data formats.
pub struct DataFormat {
    kind: FormatKind,
    max_array_sections: usize,
}

impl DataFormat {
    /// An adapter decoding `kind`, emitting at most `max_array_sections` item headings.
    #[must_use]
    pub fn new(kind: FormatKind, max_array_sections: usize) -> Self {
        Self {
            kind,
            max_array_sections,
        }
    }

    fn decode(&self, source: &str) -> Result<MetaValue, ParseFailure> {
        match self.kind {
            FormatKind::Json => {
                let value: serde_json::Value = serde_json::from_str(source)?;
                Ok(MetaValue::from(&value))
            }
            FormatKind::Jsonl => {
                let mut records = Vec::new();
                for (i, line) in source.lines().enumerate() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<serde_json::Value>(line) {
                        Ok(value) => records.push(MetaValue::from(&value)),
                        Err(e) => log::debug!("skipping malformed record on line {}: {e}", i + 1),
                    }
                }
                Ok(MetaValue::List(records))
            }
            _ => {
                let value: serde_yaml::Value = serde_yaml::from_str(source)?;
                Ok(MetaValue::from(&value))
            }
        }
    }
}

impl Format for DataFormat {
    fn kind(&self) -> FormatKind {
        self.kind
    }

    fn extract(&self, source: String, path: &Path) -> Result<Extraction, ParseFailure> {
        let value = self.decode(&source)?;
        let mut outline = Outline {
            blocks: Vec::new(),
            line: 0,
            max_items: self.max_array_sections,
        };
        outline.root(&value);
        Ok(Extraction {
            path: path.to_path_buf(),
            format: self.kind,
            title: Some(infer_title(&value)),
            readable_text: readable_text(&value),
            source,
            frontmatter: None,
            blocks: outline.blocks,
        })
    }
}

struct Outline {
    blocks: Vec<Block>,
    line: usize,
    max_items: usize,
}

impl Outline {
    fn heading(&mut self, level: u8, text: String) {
        self.line += 1;
        self.blocks.push(Block::Heading(Heading {
            level,
            text,
            anchor: None,
            line: self.line,
        }));
    }

    fn root(&mut self, value: &MetaValue) {
        match value {
            MetaValue::Map(map) => self.object(map, 1),
            MetaValue::List(items) => {
                if let Some(table) = uniform_table(items) {
                    self.blocks.push(Block::Table(table));
                } else {
                    for (i, item) in items.iter().take(self.max_items).enumerate() {
                        self.heading(1, format!("Item {}", i + 1));
                        self.value(item, 2);
                    }
                }
            }
            scalar => self.blocks.push(Block::Text(format_value(scalar))),
        }
    }

    fn object(&mut self, map: &Metadata, level: u8) {
        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            self.heading(level, key.clone());
            self.value(value, level + 1);
        }
    }

    fn value(&mut self, value: &MetaValue, level: u8) {
        match value {
            MetaValue::Map(map) if level <= MAX_DEPTH => self.object(map, level),
            MetaValue::List(items) => {
                if let Some(table) = uniform_table(items) {
                    self.blocks.push(Block::Table(table));
                } else if items.iter().all(is_scalar) {
                    let joined: Vec<_> = items.iter().map(format_value).collect();
                    self.blocks.push(Block::Text(joined.join(", ")));
                } else {
                    self.blocks.push(Block::Text(format_value(value)));
                }
            }
            other => self.blocks.push(Block::Text(format_value(other))),
        }
    }
}

fn is_scalar(value: &MetaValue) -> bool {
    !matches!(value, MetaValue::List(_) | MetaValue::Map(_))
}

/// A table when every item is an object with the same (small) key set.
fn uniform_table(items: &[MetaValue]) -> Option<Table> {
    let MetaValue::Map(first) = items.first()? else {
        return None;
    };
    let mut headers: Vec<String> = first.keys().cloned().collect();
    headers.sort();
    if headers.is_empty() || headers.len() > MAX_TABLE_COLUMNS {
        return None;
    }
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let MetaValue::Map(map) = item else {
            return None;
        };
        if map.len() != headers.len() {
            return None;
        }
        let row = headers
            .iter()
            .map(|h| map.get(h).map(format_value))
            .collect::<Option<Vec<_>>>()?;
        rows.push(row);
    }
    Some(Table { headers, rows })
}

/// Short display form of a value for cells and section text.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn format_value(value: &MetaValue) -> String {
    match value {
        MetaValue::Null => "null".to_string(),
        MetaValue::Bool(b) => b.to_string(),
        MetaValue::Int(i) => i.to_string(),
        MetaValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        MetaValue::Float(f) => format!("{f:.2}"),
        MetaValue::String(s) if s.chars().count() > MAX_CELL_CHARS => {
            let head: String = s.chars().take(MAX_CELL_CHARS - 3).collect();
            format!("{head}...")
        }
        MetaValue::String(s) => s.clone(),
        MetaValue::List(items) => format!("[{} items]", items.len()),
        MetaValue::Map(map) => format!("{{{} keys}}", map.len()),
    }
}

fn infer_title(value: &MetaValue) -> String {
    match value {
        MetaValue::Map(map) => TITLE_KEYS
            .iter()
            .find_map(|key| {
                map.get(*key)
                    .and_then(MetaValue::as_str)
                    .filter(|s| !s.is_empty() && s.len() < 100)
            })
            .map_or_else(|| format!("Object ({} keys)", map.len()), str::to_string),
        MetaValue::List(items) => format!("Array ({} items)", items.len()),
        _ => "Value".to_string(),
    }
}

fn readable_text(value: &MetaValue) -> String {
    let text = serde_json::to_string_pretty(value).unwrap_or_default();
    if text.chars().count() <= MAX_READABLE_CHARS {
        return text;
    }
    let mut head: String = text.chars().take(MAX_READABLE_CHARS).collect();
    head.push_str("\n... (truncated)");
    head
}

#[cfg(test)]
#[path = "../tests/data.rs"]
mod tests;
