//! Configuration to acknowledge user preferences as well as set defaults.
//!
//! We look for a folio.toml in the working directory and, if present, load
//! settings from there: eligible file extensions, search snippet width,
//! preview length and the data adapter's array cap.

use facet::Facet;
use std::fs;
use std::path::Path;

/// Name of the configuration file looked up by [`Config::load`].
pub const CONFIG_FILE: &str = "folio.toml";

#[derive(Facet, Debug, Clone, PartialEq)]
/// User preferences loaded from folio.toml or falling back to defaults.
pub struct Config {
    #[facet(default = vec!["md".to_string()])]
    /// File suffixes to match when scanning directories.
    pub file_extensions: Vec<String>,
    #[facet(default = 60)]
    /// Characters of context on each side of a search hit.
    pub snippet_context: usize,
    #[facet(default = 50)]
    /// Words shown per section in preview trees.
    pub preview_words: usize,
    #[facet(default = 100)]
    /// Most `Item N` sections the data adapter emits for a top-level array.
    pub max_array_sections: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_extensions: vec!["md".to_string()],
            snippet_context: 60,
            preview_words: 50,
            max_array_sections: 100,
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from folio.toml if present.
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    #[must_use]
    /// Load configuration from `path`, falling back to defaults if it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::default(),
        }
    }

    #[must_use]
    /// Parse TOML settings; unset keys take their defaults.
    pub fn parse(contents: &str) -> Self {
        match facet_toml::from_str::<Self>(contents) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed {CONFIG_FILE}: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
