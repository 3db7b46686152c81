//! The query language: lexer, parser, AST and evaluator.
//!
//! Queries are jq-like pipelines over a document:
//!
//! ```text
//! .headings(2) | select(.text | contains("API")) | map(.text)
//! .section("Install") | .code("bash")
//! .sections | select(.level == 2 and .lines > 10) | .heading
//! ```

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::Expr;
pub use eval::{compile, Bindings, Plan, RunOptions};
pub use value::Value;

use crate::document::Document;
use crate::error::QueryError;

/// Tokenizes and parses `query`.
///
/// # Errors
///
/// Returns the first lexical or syntax error.
pub fn parse(query: &str) -> Result<Expr, QueryError> {
    let tokens = lexer::tokenize(query)?;
    Ok(parser::parse(&tokens)?)
}

/// Parses, compiles and runs `query` against `doc` in one step.
///
/// # Errors
///
/// Returns the first lexical, syntax or evaluation error.
pub fn execute<'d>(doc: &'d Document, query: &str) -> Result<Value<'d>, QueryError> {
    let plan = compile(parse(query)?);
    Ok(plan.run(doc)?)
}
