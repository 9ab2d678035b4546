//! Tests for FileWalker

use super::*;
use std::fs;
use tempfile::TempDir;

fn relative_paths(walker: &FileWalker) -> Vec<String> {
    walker
        .walk()
        .map(|p| crate::paths::relative_name(walker.root(), &p))
        .collect()
}

#[test]
fn test_new() {
    let walker = FileWalker::new("/tmp");
    assert_eq!(walker.root, PathBuf::from("/tmp"));
    assert!(walker.exclude_patterns.is_empty());
}

#[test]
fn test_with_exclude_patterns() {
    let walker = FileWalker::new("/tmp").with_exclude_patterns(vec!["**/.git/**".to_string()]);
    assert_eq!(walker.exclude_patterns, vec!["**/.git/**"]);
}

#[test]
fn test_walk_nonexistent_directory() {
    let walker = FileWalker::new("/nonexistent/path/12345");
    assert_eq!(walker.walk().count(), 0);
}

#[test]
fn test_walk_not_a_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("notadir.txt");
    fs::write(&file_path, "test").unwrap();

    let walker = FileWalker::new(&file_path);
    assert_eq!(walker.walk().count(), 0);
}

#[test]
fn test_walk_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let walker = FileWalker::new(temp_dir.path());
    assert_eq!(walker.walk().count(), 0);
}

#[test]
fn test_walk_yields_nested_files_only() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("src/nested/deeper")).unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::write(root.join("README.md"), "readme").unwrap();
    fs::write(root.join("src/lib.rs"), "pub fn a() {}").unwrap();
    fs::write(root.join("src/nested/deeper/mod.rs"), "mod x;").unwrap();

    let walker = FileWalker::new(root);
    let paths = relative_paths(&walker);

    assert_eq!(paths.len(), 3);
    assert!(paths.contains(&"README.md".to_string()));
    assert!(paths.contains(&"src/lib.rs".to_string()));
    assert!(paths.contains(&"src/nested/deeper/mod.rs".to_string()));
}

#[test]
fn test_walk_order_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("b")).unwrap();
    fs::write(root.join("c.txt"), "c").unwrap();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("b/z.txt"), "z").unwrap();
    fs::write(root.join("b/y.txt"), "y").unwrap();

    let walker = FileWalker::new(root);
    let first = relative_paths(&walker);
    let second = relative_paths(&walker);

    assert_eq!(first, vec!["a.txt", "b/y.txt", "b/z.txt", "c.txt"]);
    assert_eq!(first, second);
}

#[test]
fn test_walk_default_git_exclusion() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join(".git/objects")).unwrap();
    fs::write(root.join(".git/config"), "[core]").unwrap();
    fs::write(root.join(".git/objects/ab"), "blob").unwrap();
    fs::write(root.join("main.rs"), "fn main() {}").unwrap();

    let walker = FileWalker::new(root).with_exclude_patterns(vec!["**/.git/**".to_string()]);
    assert_eq!(relative_paths(&walker), vec!["main.rs"]);
}

#[test]
fn test_walk_exclude_is_relative_to_root() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("target-like");
    fs::create_dir_all(root.join("target")).unwrap();
    fs::write(root.join("target/out.txt"), "built").unwrap();
    fs::write(root.join("kept.txt"), "kept").unwrap();

    let walker = FileWalker::new(&root).with_exclude_patterns(vec!["target/**".to_string()]);
    assert_eq!(relative_paths(&walker), vec!["kept.txt"]);
}

#[test]
fn test_walk_invalid_pattern_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.txt"), "a").unwrap();

    let walker = FileWalker::new(temp_dir.path()).with_exclude_patterns(vec!["[bad".to_string()]);
    assert_eq!(walker.walk().count(), 1);
}

#[test]
fn test_walk_is_lazy() {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..5 {
        fs::write(temp_dir.path().join(format!("{}.txt", i)), "x").unwrap();
    }

    let walker = FileWalker::new(temp_dir.path());
    let mut iter = walker.walk();
    assert!(iter.next().is_some());
    assert_eq!(iter.count(), 4);
}

#[cfg(unix)]
#[test]
fn test_walk_includes_symlink_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("target.txt"), "content").unwrap();
    std::os::unix::fs::symlink(root.join("target.txt"), root.join("link.txt")).unwrap();
    std::os::unix::fs::symlink(root.join("missing.txt"), root.join("dangling.txt")).unwrap();

    let walker = FileWalker::new(root);
    assert_eq!(relative_paths(&walker), vec!["link.txt", "target.txt"]);
}

#[cfg(unix)]
#[test]
fn test_walk_does_not_follow_directory_symlinks() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("dir")).unwrap();
    fs::write(root.join("dir/file.txt"), "x").unwrap();
    // A cycle back to the root must not loop
    std::os::unix::fs::symlink(root, root.join("dir/loop")).unwrap();

    let walker = FileWalker::new(root);
    assert_eq!(relative_paths(&walker), vec!["dir/file.txt"]);
}
