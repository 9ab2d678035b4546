use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Produces a textual description of a repository's layout
///
/// Implementations write the description into the repository root and return
/// the path of the written file so it can be indexed like any other document.
pub trait StructureDescriber: Send + Sync {
    fn generate(&self, repo_root: &Path) -> Result<PathBuf>;
}

/// Writes an indented directory tree of `<root>/repo`
#[derive(Debug, Clone)]
pub struct DirectoryTreeDescriber {
    file_name: String,
    max_depth: usize,
}

impl DirectoryTreeDescriber {
    pub fn new(file_name: impl Into<String>, max_depth: usize) -> Self {
        Self {
            file_name: file_name.into(),
            max_depth,
        }
    }

    /// Render the tree below `source_dir` without writing it
    pub fn render(&self, source_dir: &Path) -> Result<String> {
        if !source_dir.is_dir() {
            anyhow::bail!("Source directory does not exist: {}", source_dir.display());
        }

        let name = source_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "repo".to_string());

        let mut out = format!("{}/\n", name);
        let mut files = 0usize;
        let mut dirs = 0usize;

        let walker = WalkDir::new(source_dir)
            .min_depth(1)
            .max_depth(self.max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git");

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Leaving unreadable entry out of the tree: {}", e);
                    continue;
                }
            };
            let indent = "  ".repeat(entry.depth());
            let entry_name = entry.file_name().to_string_lossy();

            if entry.file_type().is_dir() {
                dirs += 1;
                writeln!(out, "{}{}/", indent, entry_name)?;
            } else {
                files += 1;
                writeln!(out, "{}{}", indent, entry_name)?;
            }
        }

        writeln!(out, "\n{} directories, {} files", dirs, files)?;
        Ok(out)
    }
}

impl StructureDescriber for DirectoryTreeDescriber {
    fn generate(&self, repo_root: &Path) -> Result<PathBuf> {
        let tree = self.render(&repo_root.join("repo"))?;
        let output = repo_root.join(&self.file_name);

        std::fs::write(&output, tree)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        tracing::info!("Wrote structure description to {}", output.display());
        Ok(output)
    }
}
