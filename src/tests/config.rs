use super::{Config, CONFIG_FILE};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_empty_file_gives_defaults() {
    assert_eq!(Config::parse(""), Config::default());
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.file_extensions, vec!["md"]);
    assert_eq!(config.snippet_context, 60);
    assert_eq!(config.preview_words, 50);
    assert_eq!(config.max_array_sections, 100);
}

#[test]
fn test_partial_file_overrides_some_fields() {
    let config = Config::parse("file_extensions = [\"md\", \"yaml\"]\nsnippet_context = 20\n");
    assert_eq!(config.file_extensions, vec!["md", "yaml"]);
    assert_eq!(config.snippet_context, 20);
    assert_eq!(config.preview_words, 50);
}

#[test]
fn test_malformed_file_falls_back() {
    assert_eq!(Config::parse("snippet_context = "), Config::default());
    assert_eq!(
        Config::parse("preview_words = \"many\""),
        Config::default()
    );
}

#[test]
fn test_load_from_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    assert_eq!(Config::load_from(&path), Config::default());

    fs::write(&path, "preview_words = 5\nmax_array_sections = 2\n").unwrap();
    let config = Config::load_from(&path);
    assert_eq!(config.preview_words, 5);
    assert_eq!(config.max_array_sections, 2);
    assert_eq!(config.file_extensions, vec!["md"]);
}
