//! `LocalFs` walks over a real temporary directory, including symlink
//! behavior that the in-memory tests can only approximate.

use std::fs;
use std::path::Path;

use convoy_resolve::{FileWalker, GlobPattern, LocalFs, WalkerFs};
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"x").unwrap();
}

#[test]
fn walk_is_sorted_and_complete() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "charlie.txt");
    touch(dir.path(), "alpha.txt");
    touch(dir.path(), "bravo/nested.txt");

    let found = FileWalker::new(&LocalFs, dir.path()).collect();
    let names: Vec<String> = found
        .iter()
        .map(|c| {
            c.path
                .strip_prefix(dir.path())
                .unwrap()
                .display()
                .to_string()
        })
        .collect();

    assert_eq!(names, vec!["alpha.txt", "bravo/nested.txt", "charlie.txt"]);
}

#[test]
fn walk_reports_modification_times() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.txt");

    let found = FileWalker::new(&LocalFs, dir.path()).collect();
    assert_eq!(found.len(), 1);
    assert!(found[0].modified.is_some());
}

#[test]
fn pattern_filters_by_full_path() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.pdf");
    touch(dir.path(), "b.txt");
    touch(dir.path(), "sub/c.pdf");

    let pattern = GlobPattern::compile(&format!("{}/**/*.pdf", dir.path().display())).unwrap();
    let found = FileWalker::new(&LocalFs, dir.path())
        .with_pattern(pattern)
        .collect();

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|c| c.path.extension().unwrap() == "pdf"));
}

#[test]
fn missing_root_yields_nothing() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("not-here");

    let found = FileWalker::new(&LocalFs, &missing).collect();
    assert!(found.is_empty());
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_followed_once() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "data/a.txt");
    std::os::unix::fs::symlink(dir.path().join("data"), dir.path().join("alias")).unwrap();

    let found = FileWalker::new(&LocalFs, dir.path()).collect();
    // The file is reachable both directly and through the alias, but
    // the canonical target directory is visited only once.
    assert_eq!(found.len(), 1);
}

#[cfg(unix)]
#[test]
fn symlink_cycles_terminate() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "data/a.txt");
    std::os::unix::fs::symlink(dir.path(), dir.path().join("data/loop")).unwrap();

    let found = FileWalker::new(&LocalFs, dir.path()).collect();
    assert_eq!(found.len(), 1);
}

#[test]
fn metadata_classifies_files_and_directories() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.txt");

    let file_meta = LocalFs.metadata(&dir.path().join("a.txt")).unwrap();
    assert!(!file_meta.is_dir);
    assert!(file_meta.modified.is_some());

    let dir_meta = LocalFs.metadata(dir.path()).unwrap();
    assert!(dir_meta.is_dir);

    assert!(LocalFs.metadata(&dir.path().join("nope")).is_err());
}
