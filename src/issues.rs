//! Issue-tracker documents
//!
//! Issues are fetched by the caller; this module only renders them into the
//! Markdown files that an index build picks up from `issues/`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub user: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Issue {
    /// Render the issue as a Markdown document
    ///
    /// ```text
    /// # issue "<title>" (<number>)
    ///
    /// Labels: bug (Something is broken), ui
    ///
    /// <body>
    ///
    /// ## Comments:
    /// - alice: first comment
    /// ```
    ///
    /// Empty sections are omitted.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# issue \"{}\" ({})", self.title, self.number);

        if !self.labels.is_empty() {
            let labels: Vec<String> = self
                .labels
                .iter()
                .map(|label| match &label.description {
                    Some(description) => format!("{} ({})", label.name, description),
                    None => label.name.clone(),
                })
                .collect();
            out.push_str("\n\nLabels: ");
            out.push_str(&labels.join(", "));
        }

        if !self.body.is_empty() {
            out.push_str("\n\n");
            out.push_str(&self.body);
        }

        if !self.comments.is_empty() {
            let comments: Vec<String> = self
                .comments
                .iter()
                .map(|c| format!("- {}: {}", c.user, c.body))
                .collect();
            out.push_str("\n\n## Comments:\n");
            out.push_str(&comments.join("\n"));
        }

        out
    }

    pub fn file_name(&self) -> String {
        format!("{}.md", self.number)
    }
}

/// Replace the contents of `issues_dir` with one `<number>.md` per issue
///
/// Returns the written paths in input order.
pub fn write_issue_documents(issues_dir: &Path, issues: &[Issue]) -> Result<Vec<PathBuf>> {
    if issues_dir.exists() {
        std::fs::remove_dir_all(issues_dir)
            .with_context(|| format!("Failed to clear {}", issues_dir.display()))?;
    }
    std::fs::create_dir_all(issues_dir)
        .with_context(|| format!("Failed to create {}", issues_dir.display()))?;

    let mut written = Vec::with_capacity(issues.len());
    for issue in issues {
        let path = issues_dir.join(issue.file_name());
        std::fs::write(&path, issue.to_markdown())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    tracing::info!("Wrote {} issues to {}", written.len(), issues_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_issue() -> Issue {
        Issue {
            number: 42,
            title: "Crash on startup".to_string(),
            labels: vec![
                Label {
                    name: "bug".to_string(),
                    description: Some("Something isn't working".to_string()),
                },
                Label {
                    name: "p1".to_string(),
                    description: None,
                },
            ],
            body: "It crashes when the config is empty.".to_string(),
            comments: vec![
                Comment {
                    user: "alice".to_string(),
                    body: "Can reproduce.".to_string(),
                },
                Comment {
                    user: "bob".to_string(),
                    body: "Fixed in #43".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_to_markdown_full() {
        assert_eq!(
            sample_issue().to_markdown(),
            "# issue \"Crash on startup\" (42)\n\n\
             Labels: bug (Something isn't working), p1\n\n\
             It crashes when the config is empty.\n\n\
             ## Comments:\n\
             - alice: Can reproduce.\n\
             - bob: Fixed in #43"
        );
    }

    #[test]
    fn test_to_markdown_minimal() {
        let issue = Issue {
            number: 7,
            title: "Empty".to_string(),
            labels: vec![],
            body: String::new(),
            comments: vec![],
        };
        assert_eq!(issue.to_markdown(), "# issue \"Empty\" (7)");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let issue: Issue = serde_json::from_str(r#"{"number": 3, "title": "t"}"#).unwrap();
        assert!(issue.labels.is_empty());
        assert!(issue.body.is_empty());
        assert_eq!(issue.file_name(), "3.md");
    }

    #[test]
    fn test_write_issue_documents_replaces_directory() {
        let dir = TempDir::new().unwrap();
        let issues_dir = dir.path().join("issues");
        std::fs::create_dir_all(&issues_dir).unwrap();
        std::fs::write(issues_dir.join("stale.md"), "old").unwrap();

        let written = write_issue_documents(&issues_dir, &[sample_issue()]).unwrap();

        assert_eq!(written, vec![issues_dir.join("42.md")]);
        assert!(!issues_dir.join("stale.md").exists());
        let content = std::fs::read_to_string(issues_dir.join("42.md")).unwrap();
        assert!(content.starts_with("# issue \"Crash on startup\" (42)"));
    }
}
