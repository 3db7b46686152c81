//! The engine ties the format registry, configuration and query plans together.
//!
//! Compiled plans are cached by query text, so running the same query over
//! many documents lexes and parses it once.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::Config;
use crate::document::Document;
use crate::error::{QueryError, Result};
use crate::formats::Registry;
use crate::input;
use crate::query::{self, Plan, RunOptions, Value};
use crate::search::{self, SearchResults};
use crate::tree::{self, DirTree, TreeMode};

/// Loads documents and runs queries against them.
pub struct Engine {
    config: Config,
    registry: Registry,
    plans: Mutex<HashMap<String, Arc<Plan>>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Engine {
    /// An engine configured from folio.toml, or defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::load())
    }

    /// An engine with the default adapters and `config`.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            registry: Registry::with_defaults(&config),
            config,
            plans: Mutex::new(HashMap::new()),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The format registry, for registering further adapters.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Reads and parses the file at `path`, detecting its format.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self, path: &Path) -> Result<Document> {
        input::load(&self.registry, path)
    }

    /// Parses in-memory `content` as if it were read from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be parsed.
    pub fn parse(&self, content: &[u8], path: &Path) -> Result<Document> {
        Ok(self.registry.parse(content, path)?)
    }

    /// Compiles `query`, reusing a cached plan for identical text.
    ///
    /// # Errors
    ///
    /// Returns the first lexical or syntax error.
    pub fn compile(&self, query: &str) -> std::result::Result<Arc<Plan>, QueryError> {
        if let Some(plan) = self.plans.lock().get(query) {
            return Ok(Arc::clone(plan));
        }
        let plan = Arc::new(
            query::compile(query::parse(query)?).with_options(RunOptions::from(&self.config)),
        );
        log::debug!("compiled query {query:?} as {}", plan.expr());
        self.plans
            .lock()
            .insert(query.to_string(), Arc::clone(&plan));
        Ok(plan)
    }

    /// Compiles (or reuses) and runs `query` against `doc`.
    ///
    /// # Errors
    ///
    /// Returns the first lexical, syntax or evaluation error.
    pub fn query<'d>(&self, doc: &'d Document, query: &str) -> Result<Value<'d>> {
        let plan = self.compile(query)?;
        Ok(plan.run(doc)?)
    }

    /// Tree of every eligible file under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a readable directory.
    pub fn tree_dir(&self, root: &Path, mode: TreeMode) -> Result<DirTree> {
        tree::build_dir_tree(&self.registry, root, mode, &self.config)
    }

    /// Searches every eligible file under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a readable directory.
    pub fn search_dir(&self, root: &Path, term: &str) -> Result<SearchResults> {
        search::search_directory(&self.registry, root, term, &self.config)
    }

    /// Number of distinct queries compiled so far.
    #[must_use]
    pub fn cached_plans(&self) -> usize {
        self.plans.lock().len()
    }
}

#[cfg(test)]
#[path = "tests/engine.rs"]
mod tests;
