//! Frontmatter metadata: loosely typed values keyed by field name.
//!
//! A document may open with a `---` delimited YAML block. The block is split
//! off before the markup is parsed; its fields are kept in insertion order.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ParseFailure;

/// Field name to value mapping, in source order.
pub type Metadata = IndexMap<String, MetaValue>;

/// A loosely typed metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    /// Explicit null or empty value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Non-integral or out-of-range number.
    Float(f64),
    /// String.
    String(String),
    /// Sequence.
    List(Vec<MetaValue>),
    /// Nested mapping.
    Map(Metadata),
}

impl MetaValue {
    /// The string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// String items of a list, or the single string itself.
    #[must_use]
    pub fn string_list(&self) -> Vec<&str> {
        match self {
            Self::String(s) => vec![s.as_str()],
            Self::List(items) => items.iter().filter_map(Self::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<&serde_yaml::Value> for MetaValue {
    fn from(value: &serde_yaml::Value) -> Self {
        use serde_yaml::Value as Y;
        match value {
            Y::Null => Self::Null,
            Y::Bool(b) => Self::Bool(*b),
            Y::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Y::String(s) => Self::String(s.clone()),
            Y::Sequence(items) => Self::List(items.iter().map(Self::from).collect()),
            Y::Mapping(mapping) => Self::Map(from_mapping(mapping)),
            Y::Tagged(tagged) => Self::from(&tagged.value),
        }
    }
}

impl From<&serde_json::Value> for MetaValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value as J;
        match value {
            J::Null => Self::Null,
            J::Bool(b) => Self::Bool(*b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            J::String(s) => Self::String(s.clone()),
            J::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            J::Object(map) => Self::Map(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Converts a YAML mapping, dropping keys that are not scalars.
pub(crate) fn from_mapping(mapping: &serde_yaml::Mapping) -> Metadata {
    mapping
        .iter()
        .filter_map(|(key, value)| {
            let key = match key {
                serde_yaml::Value::String(s) => s.clone(),
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key, MetaValue::from(value)))
        })
        .collect()
}

/// Resolves a dotted path such as `config.theme` or `authors.0`.
#[must_use]
pub fn lookup<'a>(metadata: &'a Metadata, path: &str) -> Option<&'a MetaValue> {
    let mut keys = path.split('.');
    let first = metadata.get(keys.next()?)?;
    keys.try_fold(first, |value, key| match value {
        MetaValue::Map(map) => map.get(key),
        MetaValue::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// A leading metadata block split from its document.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    /// The block exactly as written, delimiters included.
    pub raw: String,
    /// Byte offset where the body begins (just past the closing delimiter).
    pub body_start: usize,
    /// Parsed fields.
    pub metadata: Metadata,
}

/// Locates a frontmatter block, returning the YAML between the delimiters and the
/// byte offset just past the closing delimiter.
#[must_use]
pub fn split_frontmatter(source: &str) -> Option<(&str, usize)> {
    let rest = source.strip_prefix("---")?;
    let yaml_start = if rest.starts_with("\r\n") {
        5
    } else if rest.starts_with('\n') {
        4
    } else {
        return None;
    };
    let mut offset = yaml_start;
    for line in source[yaml_start..].split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']);
        if trimmed == "---" || trimmed == "..." {
            return Some((&source[yaml_start..offset], offset + trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// Splits and parses the frontmatter block, if the source has one.
///
/// # Errors
///
/// Returns an error if the block is not valid YAML or is not a mapping.
pub fn parse_frontmatter(source: &str) -> Result<Option<Frontmatter>, ParseFailure> {
    let Some((yaml, body_start)) = split_frontmatter(source) else {
        return Ok(None);
    };
    let value = if yaml.trim().is_empty() {
        serde_yaml::Value::Null
    } else {
        serde_yaml::from_str(yaml).map_err(ParseFailure::Frontmatter)?
    };
    let metadata = match &value {
        serde_yaml::Value::Null => Metadata::new(),
        serde_yaml::Value::Mapping(mapping) => from_mapping(mapping),
        _ => return Err(ParseFailure::FrontmatterNotMapping),
    };
    Ok(Some(Frontmatter {
        raw: source[..body_start].to_string(),
        body_start,
        metadata,
    }))
}

#[cfg(test)]
#[path = "tests/metadata.rs"]
mod tests;
