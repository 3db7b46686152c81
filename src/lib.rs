//! folio: structural queries over markdown and data documents.
//!
//! A source is parsed once into a [`Document`], an immutable model of its
//! headings, section hierarchy, code blocks, links, images, tables, lists and
//! frontmatter, with lookup indexes built up front. Queries written in a small
//! jq-like language then select and transform fragments of that model:
//!
//! ```text
//! .headings(2) | map(.text)
//! .section("Install") | .code("bash")
//! .sections | select(.text | contains("TODO")) | .heading
//! .tree("preview")
//! .search("retry")
//! ```
//!
//! [`Engine`] bundles the format registry, the configuration and a cache of
//! compiled queries.
#![allow(clippy::multiple_crate_versions)]

pub mod builder;
pub mod config;
pub mod document;
pub mod elements;
pub mod engine;
pub mod error;
pub mod formats;
pub mod input;
pub mod metadata;
pub mod query;
pub mod search;
pub mod section;
pub mod tree;

pub use document::Document;
pub use engine::Engine;
pub use error::{Error, Result};
pub use query::Value;
