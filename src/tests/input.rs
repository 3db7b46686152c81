use super::{files, load, load_all, scan, Entry};
use crate::error::Error;
use crate::formats::Registry;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn names(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| match entry {
            Entry::Dir { name, .. } => format!("{name}/"),
            Entry::File { name, .. } => name.clone(),
        })
        .collect()
}

fn md() -> Vec<String> {
    vec!["md".to_string()]
}

#[test]
fn test_scan_orders_directories_first() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join("zeta.md"), "# Z\n").unwrap();
    fs::write(root.join("alpha.md"), "# A\n").unwrap();
    fs::create_dir(root.join("guides")).unwrap();
    fs::write(root.join("guides").join("intro.md"), "# I\n").unwrap();
    fs::create_dir(root.join("api")).unwrap();
    fs::write(root.join("api").join("ref.md"), "# R\n").unwrap();

    let entries = scan(root, &md()).unwrap();
    assert_eq!(names(&entries), vec!["api/", "guides/", "alpha.md", "zeta.md"]);
}

#[test]
fn test_scan_skips_hidden_and_ineligible() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::write(root.join(".draft.md"), "# D\n").unwrap();
    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join(".git").join("notes.md"), "# G\n").unwrap();
    fs::write(root.join("data.json"), "{}").unwrap();
    fs::write(root.join("README"), "# R\n").unwrap();
    fs::write(root.join("UPPER.MD"), "# U\n").unwrap();

    let entries = scan(root, &md()).unwrap();
    assert_eq!(names(&entries), vec!["UPPER.MD"]);

    let entries = scan(root, &["md".to_string(), ".json".to_string()]).unwrap();
    assert_eq!(names(&entries), vec!["UPPER.MD", "data.json"]);
}

#[test]
fn test_scan_prunes_empty_directories() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("a").join("b").join("c")).unwrap();
    fs::write(root.join("a").join("b").join("c").join("skip.txt"), "x").unwrap();
    fs::create_dir(root.join("keep")).unwrap();
    fs::write(root.join("keep").join("doc.md"), "# K\n").unwrap();

    let entries = scan(root, &md()).unwrap();
    assert_eq!(names(&entries), vec!["keep/"]);
}

#[test]
fn test_files_are_depth_first() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("inner.md"), "# I\n").unwrap();
    fs::write(root.join("outer.md"), "# O\n").unwrap();

    let entries = scan(root, &md()).unwrap();
    let paths: Vec<PathBuf> = files(&entries)
        .into_iter()
        .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        paths,
        vec![Path::new("sub").join("inner.md"), PathBuf::from("outer.md")]
    );
}

#[cfg(unix)]
#[test]
fn test_scan_does_not_follow_symlinked_directories() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("a.md"), "# A\n").unwrap();
    fs::write(root.join("sub").join("b.md"), "# B\n").unwrap();
    std::os::unix::fs::symlink(root, root.join("sub").join("loop")).unwrap();

    let entries = scan(root, &md()).unwrap();
    assert_eq!(files(&entries).len(), 2, "the cycle back to root is not walked");
    assert_eq!(names(&entries), vec!["sub/", "a.md"]);
}

#[test]
fn test_scan_missing_root_is_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let err = scan(&missing, &md()).unwrap_err();
    assert!(
        matches!(&err, Error::Io { path, .. } if *path == missing),
        "got {err:?}"
    );
}

#[test]
fn test_load_reports_missing_file() {
    let err = load(&Registry::default(), Path::new("no/such/file.md")).unwrap_err();
    assert!(err.to_string().starts_with("IO error at no/such/file.md"), "{err}");
}

#[test]
fn test_load_all_keeps_input_order() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut paths = Vec::new();
    for i in 0..8 {
        let path = root.join(format!("doc{i}.md"));
        fs::write(&path, format!("# Doc {i}\n")).unwrap();
        paths.push(path);
    }
    paths.push(root.join("missing.md"));
    let refs: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();

    let loaded = load_all(&Registry::default(), &refs);
    assert_eq!(loaded.len(), 9);
    for (i, result) in loaded.iter().take(8).enumerate() {
        assert_eq!(result.as_ref().unwrap().title(), format!("Doc {i}"));
    }
    assert!(loaded[8].is_err());
}
