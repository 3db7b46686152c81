//! Runtime values produced by query evaluation.
//!
//! `Value` is a closed union over scalars, sequences, mappings and borrowed
//! document entities, so property resolution is an exhaustive match per
//! variant. Entity variants borrow from the [`Document`] being queried.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::document::Document;
use crate::elements::{CodeBlock, Image, Link, List, ListItem, Table};
use crate::metadata::MetaValue;
use crate::search::SearchResults;
use crate::section::{Heading, Section};
use crate::tree::TreeResult;

use super::ast::Literal;

/// A dynamically typed query result.
#[derive(Debug, Clone)]
pub enum Value<'d> {
    /// Absent or explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// String.
    String(String),
    /// Ordered sequence.
    Array(Vec<Value<'d>>),
    /// Key-value mapping, in insertion order.
    Object(IndexMap<String, Value<'d>>),
    /// The queried document itself.
    Document(&'d Document),
    /// A heading.
    Heading(&'d Heading),
    /// A section.
    Section(&'d Section),
    /// A code block.
    CodeBlock(&'d CodeBlock),
    /// A link.
    Link(&'d Link),
    /// An image.
    Image(&'d Image),
    /// A table.
    Table(&'d Table),
    /// A list.
    List(&'d List),
    /// A list item.
    ListItem(&'d ListItem),
    /// A rendered structural tree.
    Tree(Box<TreeResult>),
    /// Search matches.
    Search(Box<SearchResults>),
}

impl<'d> Value<'d> {
    /// Name of the runtime type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Document(_) => "document",
            Self::Heading(_) => "heading",
            Self::Section(_) => "section",
            Self::CodeBlock(_) => "code block",
            Self::Link(_) => "link",
            Self::Image(_) => "image",
            Self::Table(_) => "table",
            Self::List(_) => "list",
            Self::ListItem(_) => "list item",
            Self::Tree(_) => "tree",
            Self::Search(_) => "search results",
        }
    }

    /// Truthiness: null is false, numbers are nonzero, strings and collections are non-empty.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !s.is_empty(),
            Self::Array(items) => !items.is_empty(),
            Self::Object(map) => !map.is_empty(),
            _ => true,
        }
    }

    /// Numeric view of integers and floats.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Element count of sequences, mappings and search results, character count of strings, else 0.
    #[must_use]
    pub fn length(&self) -> usize {
        match self {
            Self::Array(items) => items.len(),
            Self::Object(map) => map.len(),
            Self::String(s) => s.chars().count(),
            Self::Search(results) => results.matches.len(),
            _ => 0,
        }
    }

    /// Integer value from a count.
    #[must_use]
    pub fn count(n: usize) -> Self {
        Self::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }

    /// Equality with int/float normalised, structural otherwise.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn equals(&self, other: &Value<'_>) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a == b;
        }
        match (self, other) {
            (Self::Null, Value::Null) => true,
            (Self::Bool(a), Value::Bool(b)) => a == b,
            (Self::String(a), Value::String(b)) => a == b,
            (Self::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
            }
            (Self::Object(a), Value::Object(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v.equals(w)))
            }
            (Self::Document(a), Value::Document(b)) => std::ptr::eq(*a, *b),
            (Self::Heading(a), Value::Heading(b)) => a == b,
            (Self::Section(a), Value::Section(b)) => a == b,
            (Self::CodeBlock(a), Value::CodeBlock(b)) => a == b,
            (Self::Link(a), Value::Link(b)) => a == b,
            (Self::Image(a), Value::Image(b)) => a == b,
            (Self::Table(a), Value::Table(b)) => a == b,
            (Self::List(a), Value::List(b)) => a == b,
            (Self::ListItem(a), Value::ListItem(b)) => a == b,
            (Self::Tree(a), Value::Tree(b)) => a == b,
            (Self::Search(a), Value::Search(b)) => a == b,
            _ => false,
        }
    }

    /// Ordering between two numbers or two strings; `None` for any other pairing.
    #[must_use]
    pub fn compare(&self, other: &Value<'_>) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.partial_cmp(&b);
        }
        match (self, other) {
            (Self::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&Literal> for Value<'_> {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Null => Self::Null,
            Literal::Bool(b) => Self::Bool(*b),
            Literal::Int(i) => Self::Int(*i),
            Literal::Float(f) => Self::Float(*f),
            Literal::String(s) => Self::String(s.clone()),
        }
    }
}

impl From<&MetaValue> for Value<'_> {
    fn from(value: &MetaValue) -> Self {
        match value {
            MetaValue::Null => Self::Null,
            MetaValue::Bool(b) => Self::Bool(*b),
            MetaValue::Int(i) => Self::Int(*i),
            MetaValue::Float(f) => Self::Float(*f),
            MetaValue::String(s) => Self::String(s.clone()),
            MetaValue::List(items) => Self::Array(items.iter().map(Self::from).collect()),
            MetaValue::Map(map) => Self::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

fn join<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Textual form used by the string functions and `.text` on arbitrary values.
impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::Array(items) => {
                f.write_str("[")?;
                join(f, items, ", ")?;
                f.write_str("]")
            }
            Self::Object(map) => {
                f.write_str("{")?;
                join(f, map.iter().map(|(k, v)| format!("{k}: {v}")), ", ")?;
                f.write_str("}")
            }
            Self::Document(doc) => f.write_str(doc.title()),
            Self::Heading(heading) => f.write_str(&heading.text),
            Self::Section(section) => f.write_str(section.title()),
            Self::CodeBlock(block) => f.write_str(&block.content),
            Self::Link(link) => f.write_str(&link.text),
            Self::Image(image) => f.write_str(&image.alt),
            Self::Table(table) => join(f, &table.headers, " | "),
            Self::List(list) => join(f, list.items.iter().map(|item| &item.text), "\n"),
            Self::ListItem(item) => f.write_str(&item.text),
            Self::Tree(tree) => write!(f, "{tree}"),
            Self::Search(results) => write!(f, "{results}"),
        }
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => items.serialize(serializer),
            Self::Object(map) => map.serialize(serializer),
            Self::Document(doc) => {
                let mut state = serializer.serialize_struct("Document", 4)?;
                state.serialize_field("path", &doc.path().display().to_string())?;
                state.serialize_field("format", &doc.format())?;
                state.serialize_field("title", doc.title())?;
                state.serialize_field("lines", &doc.line_count())?;
                state.end()
            }
            Self::Heading(heading) => heading.serialize(serializer),
            Self::Section(section) => section.serialize(serializer),
            Self::CodeBlock(block) => block.serialize(serializer),
            Self::Link(link) => link.serialize(serializer),
            Self::Image(image) => image.serialize(serializer),
            Self::Table(table) => table.serialize(serializer),
            Self::List(list) => list.serialize(serializer),
            Self::ListItem(item) => item.serialize(serializer),
            Self::Tree(tree) => serializer.serialize_str(&tree.to_string()),
            Self::Search(results) => results.serialize(serializer),
        }
    }
}
