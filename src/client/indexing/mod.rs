//! Document collection for an index build
//!
//! Gathers the structure description, the source tree and the issue
//! documents of one repository into a single batch of [`Document`]s.

use crate::config::{Config, StructureFailurePolicy};
use crate::error::{IndexError, IndexingError};
use crate::indexer::{FileWalker, StructureDescriber, TextExtractor};
use crate::paths::{RepoLayout, is_single_segment};
use crate::types::{Document, IssuesSource};
use std::path::Path;
use std::sync::Arc;

/// Documents gathered for one build, with counts for the report
#[derive(Debug, Default)]
pub struct CollectedDocuments {
    pub documents: Vec<Document>,
    /// How many of `documents` came from `issues/`
    pub issue_documents: usize,
    /// Files that produced nothing because extraction was skipped
    pub skipped_files: usize,
}

impl CollectedDocuments {
    /// Extract `path` and append its documents, counting a skip instead of failing
    fn extract_into(&mut self, extractor: &TextExtractor, path: &Path, relative: &str) -> usize {
        match extractor.extract(path, relative) {
            Ok(docs) => {
                let added = docs.len();
                self.documents.extend(docs);
                added
            }
            Err(skip) => {
                tracing::debug!("Skipping {}: {}", relative, skip);
                self.skipped_files += 1;
                0
            }
        }
    }
}

/// Synchronous half of an index build
#[derive(Clone)]
pub(crate) struct DocumentCollector {
    config: Arc<Config>,
    describer: Arc<dyn StructureDescriber>,
    extractor: TextExtractor,
}

impl DocumentCollector {
    pub(crate) fn new(config: Arc<Config>, describer: Arc<dyn StructureDescriber>) -> Self {
        let extractor = TextExtractor::new(config.indexing.max_file_size);
        Self {
            config,
            describer,
            extractor,
        }
    }

    pub(crate) fn with_describer(mut self, describer: Arc<dyn StructureDescriber>) -> Self {
        self.describer = describer;
        self
    }

    fn walker(&self, root: &Path) -> FileWalker {
        FileWalker::new(root).with_exclude_patterns(self.config.indexing.exclude_patterns.clone())
    }

    /// Structure description, then `repo/`, then issues
    pub(crate) fn collect(
        &self,
        layout: &RepoLayout,
        issues: &IssuesSource,
    ) -> Result<CollectedDocuments, IndexError> {
        let mut collected = CollectedDocuments::default();

        self.collect_structure(layout, &mut collected)?;

        let before = collected.documents.len();
        for path in self.walker(&layout.source_dir).walk() {
            let relative = layout.relative_name(&path);
            collected.extract_into(&self.extractor, &path, &relative);
        }
        tracing::info!(
            "Extracted {} documents from {}",
            collected.documents.len() - before,
            layout.source_dir.display()
        );

        self.collect_issues(layout, issues, &mut collected)?;
        Ok(collected)
    }

    /// Only the issue documents
    pub(crate) fn collect_issues_only(
        &self,
        layout: &RepoLayout,
        issues: &IssuesSource,
    ) -> Result<CollectedDocuments, IndexError> {
        let mut collected = CollectedDocuments::default();
        self.collect_issues(layout, issues, &mut collected)?;
        Ok(collected)
    }

    fn collect_structure(
        &self,
        layout: &RepoLayout,
        collected: &mut CollectedDocuments,
    ) -> Result<(), IndexError> {
        let outcome = self
            .describer
            .generate(&layout.root)
            .map_err(|e| format!("{:#}", e))
            .and_then(|path| {
                let relative = layout.relative_name(&path);
                self.extractor
                    .extract(&path, &relative)
                    .map_err(|skip| format!("{}: {}", relative, skip))
            });

        match (outcome, self.config.indexing.structure_failure) {
            (Ok(docs), _) => {
                tracing::info!("Added structure description ({} documents)", docs.len());
                collected.documents.extend(docs);
                Ok(())
            }
            (Err(reason), StructureFailurePolicy::Fatal) => {
                Err(IndexingError::StructureDescriptionFailed(reason).into())
            }
            (Err(reason), StructureFailurePolicy::Skip) => {
                tracing::warn!(
                    "Structure description failed, continuing without it: {}",
                    reason
                );
                Ok(())
            }
        }
    }

    fn collect_issues(
        &self,
        layout: &RepoLayout,
        issues: &IssuesSource,
        collected: &mut CollectedDocuments,
    ) -> Result<(), IndexError> {
        let before = collected.documents.len();

        match issues {
            IssuesSource::Scan => {
                if !layout.issues_dir.is_dir() {
                    tracing::info!(
                        "No issues directory at {}, indexing without issues",
                        layout.issues_dir.display()
                    );
                }
                for path in self.walker(&layout.issues_dir).walk() {
                    let relative = layout.relative_name(&path);
                    collected.extract_into(&self.extractor, &path, &relative);
                }
            }
            IssuesSource::Explicit(names) => {
                if !layout.issues_dir.is_dir() {
                    return Err(IndexingError::IssuesDirectoryMissing(
                        layout.issues_dir.display().to_string(),
                    )
                    .into());
                }
                for name in names {
                    if !is_single_segment(name) {
                        tracing::warn!("Ignoring issue file outside issues/: {}", name);
                        collected.skipped_files += 1;
                        continue;
                    }
                    let path = layout.issues_dir.join(name);
                    let relative = layout.relative_name(&path);
                    collected.extract_into(&self.extractor, &path, &relative);
                }
            }
        }

        collected.issue_documents = collected.documents.len() - before;
        tracing::info!("Collected {} issue documents", collected.issue_documents);
        Ok(())
    }
}
