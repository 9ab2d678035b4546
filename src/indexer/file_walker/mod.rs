//! File walking functionality for directory traversal

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Lazily enumerates the regular files below a root directory
///
/// Entries are sorted by file name at every level, so two walks of an
/// unchanged tree yield the same sequence.
pub struct FileWalker {
    pub(crate) root: PathBuf,
    pub(crate) exclude_patterns: Vec<String>,
    excludes: GlobSet,
}

impl FileWalker {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            exclude_patterns: vec![],
            excludes: GlobSet::empty(),
        }
    }

    /// Skip files whose path relative to the root matches any of these globs
    ///
    /// Patterns that fail to compile are logged and ignored.
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => tracing::warn!("Ignoring invalid exclude pattern '{}': {}", pattern, e),
            }
        }
        self.excludes = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Failed to compile exclude patterns: {}", e);
            GlobSet::empty()
        });
        self.exclude_patterns = patterns;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory, yielding file paths one at a time
    ///
    /// A missing root, or a root that is not a directory, yields nothing.
    pub fn walk(&self) -> impl Iterator<Item = PathBuf> + use<> {
        let root = self.root.clone();
        let excludes = self.excludes.clone();
        let root_is_dir = root.is_dir();

        if !root_is_dir {
            tracing::debug!("Walk root is not a directory: {:?}", root);
        }

        WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter(move |_| root_is_dir)
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(is_file_like)
            .filter(move |entry| {
                let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                if excludes.is_match(relative) {
                    tracing::debug!("Excluded by pattern: {:?}", entry.path());
                    return false;
                }
                true
            })
            .map(DirEntry::into_path)
    }
}

// Regular files, plus symlinks that resolve to regular files
fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if file_type.is_symlink() {
        return std::fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false);
    }
    false
}

#[cfg(test)]
mod tests;
