//! Error taxonomy for document construction and query execution.
//!
//! Lexing, parsing and evaluation errors are fatal to one query only. Parse
//! errors are fatal to one document; directory-wide operations downgrade them
//! to skips.

use std::path::PathBuf;

use crate::formats::FormatKind;

/// Failure while tokenizing a query string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("lexer error at line {line}, column {column}: {message}")]
pub struct LexError {
    /// What went wrong.
    pub message: String,
    /// 1-based line of the offending character.
    pub line: usize,
    /// 1-based column of the offending character.
    pub column: usize,
}

/// Failure while building an AST from tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at line {line}, column {column} near {token}: {message}")]
pub struct SyntaxError {
    /// What the parser expected or rejected.
    pub message: String,
    /// Rendering of the offending token.
    pub token: String,
    /// Byte offset of the offending token in the query.
    pub offset: usize,
    /// 1-based line of the offending token.
    pub line: usize,
    /// 1-based column of the offending token.
    pub column: usize,
}

/// Failure while running a compiled query against a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The selector name is neither structural nor a frontmatter field.
    #[error("unknown selector: .{0}")]
    UnknownSelector(String),
    /// The function name is not one of the built-ins.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// `.section(title)` found no section with that exact title.
    #[error("section not found: {0:?}")]
    SectionNotFound(String),
    /// An operand had the wrong runtime type.
    #[error("{op}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Operation that rejected the operand.
        op: String,
        /// Type description the operation accepts.
        expected: &'static str,
        /// Type name of the value actually supplied.
        found: &'static str,
    },
    /// Filter or map was applied to something that is not a sequence.
    #[error("{op} requires a collection, found {found}")]
    NotACollection {
        /// `select` or `map`.
        op: &'static str,
        /// Type name of the value actually supplied.
        found: &'static str,
    },
    /// Index past either end of a sequence.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: i64,
        /// Length of the indexed sequence.
        len: usize,
    },
    /// A selector or function was given the wrong number of arguments.
    #[error("{name} expects {expected} argument(s), got {got}")]
    Arity {
        /// Selector or function name.
        name: String,
        /// Accepted argument count description.
        expected: &'static str,
        /// Arguments supplied.
        got: usize,
    },
    /// Bare identifier that is neither bound nor a property of the current value.
    #[error("{found} has no property {name:?}")]
    NoProperty {
        /// Identifier name.
        name: String,
        /// Type name of the current value.
        found: &'static str,
    },
    /// Integer arithmetic left the representable range.
    #[error("integer overflow in {0}")]
    Overflow(&'static str),
    /// An argument had the right type but an unusable value.
    #[error("invalid argument to {name}: {message}")]
    InvalidArgument {
        /// Selector or function name.
        name: String,
        /// What was wrong with the value.
        message: String,
    },
}

/// Any failure surfaced by [`crate::query`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Tokenizing failed.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// Parsing failed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// Evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Reason a source document could not be turned into a [`crate::Document`].
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    /// Frontmatter block was not valid YAML.
    #[error("invalid frontmatter: {0}")]
    Frontmatter(#[source] serde_yaml::Error),
    /// Frontmatter block parsed but was not a key-value mapping.
    #[error("frontmatter must be a mapping")]
    FrontmatterNotMapping,
    /// JSON or JSONL content was malformed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML content was malformed.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The tree-sitter grammar could not be loaded.
    #[error("grammar unavailable: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    /// The tree-sitter parser produced no tree.
    #[error("parser produced no syntax tree")]
    NoTree,
    /// No adapter is registered for the format or the fallback.
    #[error("no adapter registered")]
    Unsupported,
}

/// A document failed to parse.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse {} as {format}: {failure}", .path.display())]
pub struct ParseError {
    /// Source path of the failing document.
    pub path: PathBuf,
    /// Format the adapter was parsing as.
    pub format: FormatKind,
    /// Underlying cause.
    #[source]
    pub failure: ParseFailure,
}

/// Top-level error for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading a file or directory failed.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A document failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A query failed to lex, parse, or run.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// A directory operation was given a file path.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        Self::Query(err.into())
    }
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
