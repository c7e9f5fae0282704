//! End-to-end `convoy resolve` runs against a real temporary directory.

use std::fs;
use std::path::Path;

use convoy_cli::{run_resolve, ResolveArgs};
use convoy_resolve::DEFAULT_MAX_EXPANSIONS;
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"x").unwrap();
}

fn args(inputs: Vec<String>) -> ResolveArgs {
    ResolveArgs {
        inputs,
        recursive: false,
        exclude: Vec::new(),
        modified_since: None,
        max_expansions: DEFAULT_MAX_EXPANSIONS,
        file_list: None,
        print0: false,
    }
}

fn output_lines(out: Vec<u8>) -> Vec<String> {
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn resolves_an_absolute_glob() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.txt");
    touch(dir.path(), "b.txt");
    touch(dir.path(), "c.pdf");

    let pattern = format!("{}/*.txt", dir.path().display());
    let mut out = Vec::new();
    let count = run_resolve(args(vec![pattern]), &mut out).unwrap();

    let lines = output_lines(out);
    assert_eq!(count, 2);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("a.txt"));
    assert!(lines[1].ends_with("b.txt"));
}

#[test]
fn recursive_flag_descends_into_subdirectories() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "top.txt");
    touch(dir.path(), "nested/deep.txt");

    let mut shallow = args(vec![dir.path().display().to_string()]);
    let mut out = Vec::new();
    let count = run_resolve(shallow, &mut out).unwrap();
    assert_eq!(count, 1);

    shallow = args(vec![dir.path().display().to_string()]);
    shallow.recursive = true;
    let mut out = Vec::new();
    let count = run_resolve(shallow, &mut out).unwrap();
    assert_eq!(count, 2);
}

#[test]
fn brace_expansion_against_real_files() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "report1.txt");
    touch(dir.path(), "report2.txt");
    touch(dir.path(), "report3.txt");

    let pattern = format!("{}/report{{1..2}}.txt", dir.path().display());
    let mut out = Vec::new();
    let count = run_resolve(args(vec![pattern]), &mut out).unwrap();
    assert_eq!(count, 2);
}

#[test]
fn exclude_rules_drop_matches() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "keep.txt");
    touch(dir.path(), "drop.bak");

    let mut a = args(vec![dir.path().display().to_string()]);
    a.exclude = vec!["*.bak".to_string()];
    let mut out = Vec::new();
    let count = run_resolve(a, &mut out).unwrap();

    let lines = output_lines(out);
    assert_eq!(count, 1);
    assert!(lines[0].ends_with("keep.txt"));
}

#[test]
fn missing_literal_input_is_an_error() {
    let dir = TempDir::new().unwrap();

    let missing = dir.path().join("nope.txt").display().to_string();
    let mut out = Vec::new();
    assert!(run_resolve(args(vec![missing]), &mut out).is_err());
}

#[test]
fn duplicate_spellings_collapse() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.txt");

    let literal = dir.path().join("a.txt").display().to_string();
    let glob = format!("{}/*.txt", dir.path().display());
    let mut out = Vec::new();
    let count = run_resolve(args(vec![literal, glob]), &mut out).unwrap();
    assert_eq!(count, 1);
}

#[test]
fn file_list_supplies_extra_inputs() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.txt");
    touch(dir.path(), "b.txt");

    let list_path = dir.path().join("inputs.lst");
    let contents = format!(
        "# comment\n\n{}\n{}\n",
        dir.path().join("a.txt").display(),
        dir.path().join("b.txt").display()
    );
    fs::write(&list_path, contents).unwrap();

    let mut a = args(Vec::new());
    a.file_list = Some(list_path);
    let mut out = Vec::new();
    let count = run_resolve(a, &mut out).unwrap();
    assert_eq!(count, 2);
}

#[test]
fn print0_uses_nul_separators() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.txt");
    touch(dir.path(), "b.txt");

    let mut a = args(vec![format!("{}/*.txt", dir.path().display())]);
    a.print0 = true;
    let mut out = Vec::new();
    run_resolve(a, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches('\0').count(), 2);
    assert!(!text.contains('\n'));
}

#[test]
fn no_inputs_at_all_is_an_error() {
    let mut out = Vec::new();
    assert!(run_resolve(args(Vec::new()), &mut out).is_err());
}

#[test]
fn stdin_marker_is_passed_through() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.txt");

    let literal = dir.path().join("a.txt").display().to_string();
    let mut out = Vec::new();
    let count = run_resolve(args(vec!["-".to_string(), literal]), &mut out).unwrap();

    let lines = output_lines(out);
    assert_eq!(count, 2);
    assert_eq!(lines[0], "-");
}
