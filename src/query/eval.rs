//! Query evaluation.
//!
//! A compiled [`Plan`] walks the AST against a [`Document`]. Each step sees a
//! [`Scope`]: the document, the current value (initially the document
//! itself), and the variable bindings. Pipes, filters and `map` evaluate
//! their inner expression in a scope whose current value is swapped, so the
//! outer scope is restored simply by returning.

use std::collections::HashMap;

use crate::config::Config;
use crate::document::Document;
use crate::error::EvalError;
use crate::metadata::Metadata;
use crate::search;
use crate::section::Section;
use crate::tree::{self, TreeMode};

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::value::Value;

/// Named values visible to bare identifiers.
pub type Bindings<'d> = HashMap<String, Value<'d>>;

/// Rendering knobs for the selectors that produce trees and snippets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Characters of context on each side of a search hit.
    pub snippet_context: usize,
    /// Words shown per section in preview trees.
    pub preview_words: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            snippet_context: search::DEFAULT_CONTEXT,
            preview_words: tree::DEFAULT_PREVIEW_WORDS,
        }
    }
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            snippet_context: config.snippet_context,
            preview_words: config.preview_words,
        }
    }
}

/// A query ready to run against any number of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    expr: Expr,
    options: RunOptions,
}

/// Wraps a parsed expression into an executable plan.
#[must_use]
pub fn compile(expr: Expr) -> Plan {
    Plan {
        expr,
        options: RunOptions::default(),
    }
}

impl Plan {
    /// Replaces the rendering options.
    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// The expression this plan evaluates.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Runs the plan with no variables bound.
    ///
    /// # Errors
    ///
    /// Returns the first evaluation error encountered.
    pub fn run<'d>(&self, doc: &'d Document) -> Result<Value<'d>, EvalError> {
        self.run_with(doc, &Bindings::new())
    }

    /// Runs the plan with `vars` resolvable as bare identifiers.
    ///
    /// # Errors
    ///
    /// Returns the first evaluation error encountered.
    pub fn run_with<'d>(
        &self,
        doc: &'d Document,
        vars: &Bindings<'d>,
    ) -> Result<Value<'d>, EvalError> {
        let root = Value::Document(doc);
        let scope = Scope {
            doc,
            current: &root,
            vars,
            options: self.options,
        };
        eval(&self.expr, scope)
    }
}

#[derive(Clone, Copy)]
struct Scope<'a, 'd> {
    doc: &'d Document,
    current: &'a Value<'d>,
    vars: &'a Bindings<'d>,
    options: RunOptions,
}

impl<'a, 'd> Scope<'a, 'd> {
    fn with<'b>(self, current: &'b Value<'d>) -> Scope<'b, 'd>
    where
        'a: 'b,
    {
        Scope {
            doc: self.doc,
            current,
            vars: self.vars,
            options: self.options,
        }
    }
}

fn eval<'d>(expr: &Expr, scope: Scope<'_, 'd>) -> Result<Value<'d>, EvalError> {
    match expr {
        Expr::Pipe(left, right) => {
            let value = eval(left, scope)?;
            eval(right, scope.with(&value))
        }
        Expr::Selector { name, args } => selector(name, args, scope),
        Expr::Filter(predicate) => filter(predicate, scope),
        Expr::Function { name, args } => function(name, args, scope),
        Expr::Binary { op, left, right } => binary(*op, left, right, scope),
        Expr::Unary { op, operand } => {
            let value = eval(operand, scope)?;
            unary(*op, &value)
        }
        Expr::Literal(literal) => Ok(Value::from(literal)),
        Expr::Identifier(name) => {
            if let Some(value) = scope.vars.get(name) {
                return Ok(value.clone());
            }
            property(scope.current, name, scope.doc).ok_or_else(|| EvalError::NoProperty {
                name: name.clone(),
                found: scope.current.type_name(),
            })
        }
        Expr::Index { target, index } => {
            let target = eval(target, scope)?;
            let index = eval(index, scope)?;
            index_value(target, &index)
        }
        Expr::Slice { target, start, end } => {
            let target = eval(target, scope)?;
            let start = start.as_deref().map(|e| eval(e, scope)).transpose()?;
            let end = end.as_deref().map(|e| eval(e, scope)).transpose()?;
            slice_value(target, start.as_ref(), end.as_ref())
        }
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

fn selector<'d>(name: &str, args: &[Expr], scope: Scope<'_, 'd>) -> Result<Value<'d>, EvalError> {
    let current = scope.current;
    if !matches!(current, Value::Document(_)) {
        if args.is_empty() {
            if let Some(value) = property(current, name, scope.doc) {
                return Ok(value);
            }
            if let Value::Array(items) = current {
                if let Some(value) = project(items, name, scope.doc) {
                    return Ok(value);
                }
            }
        }
        if let Value::Section(section) = current {
            if let Some(value) = section_selector(*section, name, args, scope)? {
                return Ok(value);
            }
        }
    }
    document_selector(name, args, scope)
}

/// Selectors that take arguments while a section is current.
fn section_selector<'d>(
    section: &'d Section,
    name: &str,
    args: &[Expr],
    scope: Scope<'_, 'd>,
) -> Result<Option<Value<'d>>, EvalError> {
    let value = match name {
        "code" => {
            let values = eval_args(args, scope)?;
            let languages = string_args(name, &values)?;
            sequence(
                scope.doc.section_code_blocks(section, &languages),
                Value::CodeBlock,
            )
        }
        "tree" => {
            let values = eval_args(args, scope)?;
            let mode = tree_mode(&values)?;
            Value::Tree(Box::new(tree::build_section_tree(
                scope.doc,
                section,
                mode,
                scope.options.preview_words,
            )))
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

#[allow(clippy::too_many_lines)]
fn document_selector<'d>(
    name: &str,
    args: &[Expr],
    scope: Scope<'_, 'd>,
) -> Result<Value<'d>, EvalError> {
    let doc = scope.doc;
    let values = eval_args(args, scope)?;
    let value = match name {
        "headings" => {
            let levels = values
                .iter()
                .map(heading_level)
                .collect::<Result<Vec<_>, _>>()?;
            sequence(doc.headings(&levels), Value::Heading)
        }
        "section" => {
            arity(name, &values, 1, 1, "1")?;
            let title = string_arg(name, &values[0])?;
            doc.section(title)
                .map(Value::Section)
                .ok_or_else(|| EvalError::SectionNotFound(title.to_string()))?
        }
        "heading" => {
            arity(name, &values, 1, 1, "1")?;
            let text = string_arg(name, &values[0])?;
            doc.heading(text).map_or(Value::Null, Value::Heading)
        }
        "sections" => {
            arity(name, &values, 0, 0, "0")?;
            sequence(doc.sections(), Value::Section)
        }
        "toc" => {
            arity(name, &values, 0, 0, "0")?;
            sequence(doc.table_of_contents(), Value::Section)
        }
        "code" => {
            let languages = string_args(name, &values)?;
            sequence(doc.code_blocks(&languages), Value::CodeBlock)
        }
        "links" => {
            arity(name, &values, 0, 0, "0")?;
            sequence(doc.links(), Value::Link)
        }
        "images" => {
            arity(name, &values, 0, 0, "0")?;
            sequence(doc.images(), Value::Image)
        }
        "tables" => {
            arity(name, &values, 0, 0, "0")?;
            sequence(doc.tables(), Value::Table)
        }
        "lists" => {
            arity(name, &values, 0, 1, "0 or 1")?;
            let ordered = match values.first() {
                None => None,
                Some(Value::Bool(ordered)) => Some(*ordered),
                Some(other) => {
                    return Err(mismatch(name, "boolean", other));
                }
            };
            sequence(doc.lists(ordered), Value::List)
        }
        "metadata" => {
            arity(name, &values, 0, 1, "0 or 1")?;
            match values.first() {
                None => doc.metadata().map_or(Value::Null, metadata_object),
                Some(path) => doc
                    .nested_field(string_arg(name, path)?)
                    .map_or(Value::Null, Value::from),
            }
        }
        "owner" => optional_string(doc.owner()),
        "tags" => Value::Array(
            doc.tags()
                .into_iter()
                .map(|tag| Value::String(tag.to_string()))
                .collect(),
        ),
        "priority" => optional_string(doc.priority()),
        "title" => Value::String(doc.title().to_string()),
        "text" => match scope.current {
            Value::Document(doc) => Value::String(doc.readable_text().to_string()),
            current => Value::String(current.to_string()),
        },
        "length" => Value::count(scope.current.length()),
        "source" => Value::String(doc.source().to_string()),
        "body" => Value::String(doc.body().to_string()),
        "frontmatter" => optional_string(doc.frontmatter_raw()),
        "path" => Value::String(doc.path().display().to_string()),
        "format" => Value::String(doc.format().name().to_string()),
        "tree" => {
            let mode = tree_mode(&values)?;
            Value::Tree(Box::new(tree::build_tree_with(
                doc,
                mode,
                scope.options.preview_words,
            )))
        }
        "search" => {
            arity(name, &values, 1, 1, "1")?;
            let term = string_arg(name, &values[0])?;
            Value::Search(Box::new(search::search_with(
                doc,
                term,
                scope.options.snippet_context,
            )))
        }
        _ => {
            // Structural names above shadow frontmatter keys of the same name.
            if values.is_empty() {
                if let Some(field) = doc.field(name) {
                    return Ok(Value::from(field));
                }
            }
            return Err(EvalError::UnknownSelector(name.to_string()));
        }
    };
    Ok(value)
}

fn filter<'d>(predicate: &Expr, scope: Scope<'_, 'd>) -> Result<Value<'d>, EvalError> {
    let Value::Array(items) = scope.current else {
        return Err(EvalError::NotACollection {
            op: "select",
            found: scope.current.type_name(),
        });
    };
    let mut kept = Vec::new();
    for item in items {
        if eval(predicate, scope.with(item))?.is_truthy() {
            kept.push(item.clone());
        }
    }
    Ok(Value::Array(kept))
}

fn function<'d>(name: &str, args: &[Expr], scope: Scope<'_, 'd>) -> Result<Value<'d>, EvalError> {
    match name {
        "map" => {
            let [transform] = args else {
                return Err(EvalError::Arity {
                    name: name.to_string(),
                    expected: "1",
                    got: args.len(),
                });
            };
            let Value::Array(items) = scope.current else {
                return Err(EvalError::NotACollection {
                    op: "map",
                    found: scope.current.type_name(),
                });
            };
            items
                .iter()
                .map(|item| eval(transform, scope.with(item)))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "contains" | "startswith" | "endswith" => {
            let values = eval_args(args, scope)?;
            let (subject, needle) = match values.as_slice() {
                [needle] => (scope.current.to_string(), needle.to_string()),
                [subject, needle] => (subject.to_string(), needle.to_string()),
                _ => {
                    return Err(EvalError::Arity {
                        name: name.to_string(),
                        expected: "1 or 2",
                        got: values.len(),
                    })
                }
            };
            let hit = match name {
                "contains" => subject.contains(needle.as_str()),
                "startswith" => subject.starts_with(needle.as_str()),
                _ => subject.ends_with(needle.as_str()),
            };
            Ok(Value::Bool(hit))
        }
        "length" => {
            let values = eval_args(args, scope)?;
            arity(name, &values, 0, 1, "0 or 1")?;
            Ok(Value::count(values.first().unwrap_or(scope.current).length()))
        }
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

fn binary<'d>(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    scope: Scope<'_, 'd>,
) -> Result<Value<'d>, EvalError> {
    let left = eval(left, scope)?;
    match op {
        BinaryOp::And if !left.is_truthy() => return Ok(Value::Bool(false)),
        BinaryOp::Or if left.is_truthy() => return Ok(Value::Bool(true)),
        _ => {}
    }
    let right = eval(right, scope)?;
    let result = match op {
        BinaryOp::And | BinaryOp::Or => right.is_truthy(),
        BinaryOp::Eq => left.equals(&right),
        BinaryOp::NotEq => !left.equals(&right),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = left.compare(&right).ok_or_else(|| {
                let offender = if matches!(left, Value::String(_)) || left.as_number().is_some() {
                    &right
                } else {
                    &left
                };
                mismatch(op.symbol(), "two numbers or two strings", offender)
            })?;
            match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::LtEq => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }
        }
    };
    Ok(Value::Bool(result))
}

fn unary<'d>(op: UnaryOp, value: &Value<'d>) -> Result<Value<'d>, EvalError> {
    match (op, value) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalError::Overflow("negation")),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, other) => Err(mismatch("-", "number", other)),
    }
}

fn index_value<'d>(target: Value<'d>, index: &Value<'_>) -> Result<Value<'d>, EvalError> {
    match target {
        Value::Array(mut items) => {
            let i = integer_arg("index", index)?;
            let len = items.len();
            match usize::try_from(i) {
                Ok(position) if position < len => Ok(items.swap_remove(position)),
                _ => Err(EvalError::IndexOutOfRange { index: i, len }),
            }
        }
        Value::Object(mut map) => {
            let key = string_arg("index", index)?;
            Ok(map.shift_remove(key).unwrap_or(Value::Null))
        }
        other => Err(mismatch("index", "array", &other)),
    }
}

fn slice_value<'d>(
    target: Value<'d>,
    start: Option<&Value<'_>>,
    end: Option<&Value<'_>>,
) -> Result<Value<'d>, EvalError> {
    let Value::Array(items) = target else {
        return Err(mismatch("slice", "array", &target));
    };
    let len = items.len();
    let clamp = |bound: Option<&Value<'_>>, default: usize| -> Result<usize, EvalError> {
        match bound {
            None => Ok(default),
            Some(value) => {
                let i = integer_arg("slice", value)?;
                Ok(usize::try_from(i).unwrap_or(0).min(len))
            }
        }
    };
    let start = clamp(start, 0)?;
    let end = clamp(end, len)?;
    if start >= end {
        return Ok(Value::Array(Vec::new()));
    }
    Ok(Value::Array(
        items.into_iter().skip(start).take(end - start).collect(),
    ))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Every name [`property`] resolves on some entity, for projecting empty sequences.
const PROPERTY_NAMES: [&str; 29] = [
    "text", "level", "id", "anchor", "line", "heading", "title", "start", "end", "lines",
    "children", "parent", "tables", "lists", "links", "images", "content", "language", "lang",
    "url", "alt", "alttext", "headers", "rows", "ordered", "items", "checked", "matches", "query",
];

fn project<'d>(items: &[Value<'d>], name: &str, doc: &'d Document) -> Option<Value<'d>> {
    if items.is_empty() {
        return PROPERTY_NAMES
            .contains(&name)
            .then(|| Value::Array(Vec::new()));
    }
    items
        .iter()
        .map(|item| property(item, name, doc))
        .collect::<Option<Vec<_>>>()
        .map(Value::Array)
}

fn property<'d>(value: &Value<'d>, name: &str, doc: &'d Document) -> Option<Value<'d>> {
    let resolved = match value {
        Value::Heading(heading) => match name {
            "text" => Value::String(heading.text.clone()),
            "level" => Value::Int(i64::from(heading.level)),
            "id" | "anchor" => optional_string(heading.anchor.as_deref()),
            "line" => Value::count(heading.line),
            _ => return None,
        },
        Value::Section(section) => return section_property(*section, name, doc),
        Value::CodeBlock(block) => match name {
            "content" | "text" => Value::String(block.content.clone()),
            "language" | "lang" => Value::String(block.language.clone()),
            "lines" => Value::count(block.lines),
            "line" => Value::count(block.line),
            _ => return None,
        },
        Value::Link(link) => match name {
            "text" => Value::String(link.text.clone()),
            "url" => Value::String(link.url.clone()),
            _ => return None,
        },
        Value::Image(image) => match name {
            "alt" | "alttext" | "text" => Value::String(image.alt.clone()),
            "url" => Value::String(image.url.clone()),
            "title" => optional_string(image.title.as_deref()),
            _ => return None,
        },
        Value::Table(table) => match name {
            "headers" => strings(&table.headers),
            "rows" => Value::Array(table.rows.iter().map(|row| strings(row)).collect()),
            _ => return None,
        },
        Value::List(list) => match name {
            "ordered" => Value::Bool(list.ordered),
            "items" => sequence(&list.items, Value::ListItem),
            _ => return None,
        },
        Value::ListItem(item) => match name {
            "text" => Value::String(item.text.clone()),
            "checked" => item.checked.map_or(Value::Null, Value::Bool),
            "children" => sequence(&item.children, Value::ListItem),
            _ => return None,
        },
        // `length` and `text` stay generic so they keep working on mappings.
        Value::Object(map) if !matches!(name, "length" | "text") => {
            map.get(name).cloned().unwrap_or(Value::Null)
        }
        Value::String(text) if name == "text" => Value::String(text.clone()),
        Value::Search(results) => match name {
            "matches" => Value::Array(
                results
                    .matches
                    .iter()
                    .map(|m| {
                        Value::Object(
                            [
                                ("file", Value::String(m.file.display().to_string())),
                                ("heading", Value::String(m.heading.clone())),
                                ("level", Value::Int(i64::from(m.level))),
                                ("start", Value::count(m.start)),
                                ("end", Value::count(m.end)),
                                ("snippet", Value::String(m.snippet.clone())),
                            ]
                            .into_iter()
                            .map(|(key, value)| (key.to_string(), value))
                            .collect(),
                        )
                    })
                    .collect(),
            ),
            "query" => Value::String(results.query.clone()),
            _ => return None,
        },
        _ => return None,
    };
    Some(resolved)
}

fn section_property<'d>(section: &'d Section, name: &str, doc: &'d Document) -> Option<Value<'d>> {
    let value = match name {
        "text" => Value::String(section.text.clone()),
        "heading" => Value::Heading(&section.heading),
        "title" => Value::String(section.title().to_string()),
        "level" => Value::Int(i64::from(section.level())),
        "start" => Value::count(section.line_start),
        "end" => Value::count(section.line_end),
        "lines" => Value::count(section.line_count()),
        "children" => Value::Array(doc.children(section).map(Value::Section).collect()),
        "parent" => doc.parent(section).map_or(Value::Null, Value::Section),
        "tables" => indexed(&section.table_indices, doc.tables(), Value::Table),
        "lists" => indexed(&section.list_indices, &doc.lists, Value::List),
        "links" => indexed(&section.link_indices, doc.links(), Value::Link),
        "images" => indexed(&section.image_indices, doc.images(), Value::Image),
        _ => return None,
    };
    Some(value)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sequence<'d, T: 'd>(
    items: impl IntoIterator<Item = &'d T>,
    wrap: fn(&'d T) -> Value<'d>,
) -> Value<'d> {
    Value::Array(items.into_iter().map(wrap).collect())
}

fn indexed<'d, T>(indices: &[usize], pool: &'d [T], wrap: fn(&'d T) -> Value<'d>) -> Value<'d> {
    Value::Array(indices.iter().filter_map(|&i| pool.get(i)).map(wrap).collect())
}

fn strings<'d>(items: &[String]) -> Value<'d> {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

fn optional_string<'d>(text: Option<&str>) -> Value<'d> {
    text.map_or(Value::Null, |s| Value::String(s.to_string()))
}

fn metadata_object<'d>(metadata: &Metadata) -> Value<'d> {
    Value::Object(
        metadata
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value)))
            .collect(),
    )
}

fn eval_args<'d>(args: &[Expr], scope: Scope<'_, 'd>) -> Result<Vec<Value<'d>>, EvalError> {
    args.iter().map(|arg| eval(arg, scope)).collect()
}

fn arity(
    name: &str,
    values: &[Value<'_>],
    min: usize,
    max: usize,
    expected: &'static str,
) -> Result<(), EvalError> {
    if (min..=max).contains(&values.len()) {
        Ok(())
    } else {
        Err(EvalError::Arity {
            name: name.to_string(),
            expected,
            got: values.len(),
        })
    }
}

fn mismatch(op: &str, expected: &'static str, found: &Value<'_>) -> EvalError {
    EvalError::TypeMismatch {
        op: op.to_string(),
        expected,
        found: found.type_name(),
    }
}

fn string_arg<'v>(name: &str, value: &'v Value<'_>) -> Result<&'v str, EvalError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(mismatch(name, "string", other)),
    }
}

fn string_args<'v>(name: &str, values: &'v [Value<'_>]) -> Result<Vec<&'v str>, EvalError> {
    values.iter().map(|value| string_arg(name, value)).collect()
}

fn integer_arg(name: &str, value: &Value<'_>) -> Result<i64, EvalError> {
    match value {
        Value::Int(i) => Ok(*i),
        other => Err(mismatch(name, "integer", other)),
    }
}

fn heading_level(value: &Value<'_>) -> Result<u8, EvalError> {
    let level = integer_arg("headings", value)?;
    u8::try_from(level)
        .ok()
        .filter(|l| (1..=6).contains(l))
        .ok_or_else(|| EvalError::InvalidArgument {
            name: "headings".to_string(),
            message: format!("level {level} is outside 1-6"),
        })
}

fn tree_mode(values: &[Value<'_>]) -> Result<TreeMode, EvalError> {
    arity("tree", values, 0, 1, "0 or 1")?;
    match values.first() {
        None => Ok(TreeMode::Default),
        Some(value) => string_arg("tree", value)?
            .parse()
            .map_err(|err: tree::UnknownMode| EvalError::InvalidArgument {
                name: "tree".to_string(),
                message: err.to_string(),
            }),
    }
}

#[cfg(test)]
#[path = "../tests/eval.rs"]
mod tests;
