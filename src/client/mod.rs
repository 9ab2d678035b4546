//! Index builder
//!
//! [`IndexBuilder`] runs a full, create-or-overwrite build of one
//! repository's semantic index. Every step is awaited before the next one
//! starts; nothing is retried.

mod indexing;

pub use indexing::CollectedDocuments;

use crate::config::Config;
use crate::embedding::{EmbeddingProvider, FastEmbedManager};
use crate::error::IndexError;
use crate::indexer::{DirectoryTreeDescriber, StructureDescriber, TextChunker};
use crate::paths::RepoLayout;
use crate::types::{IndexReport, IssuesSource, RepoTarget};
use crate::vector_db::open_store;
use indexing::DocumentCollector;
use std::sync::Arc;
use std::time::Instant;

/// Builds and rebuilds repository indexes
///
/// # Example
///
/// ```no_run
/// use repo_index::{Config, IndexBuilder, RepoTarget};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = Config::new(None)?;
///     let builder = IndexBuilder::from_config(config)?;
///
///     let report = builder.build(&"my-repo".parse::<RepoTarget>()?).await?;
///     println!("Indexed {} chunks", report.entries_written);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct IndexBuilder {
    config: Arc<Config>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunker: TextChunker,
    collector: DocumentCollector,
}

impl IndexBuilder {
    /// Create a builder around an existing embedding provider
    ///
    /// The configuration is validated here; nothing reads the process
    /// environment afterwards.
    pub fn new(config: Config, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self, IndexError> {
        config.validate()?;

        let chunker = TextChunker::new(config.indexing.chunk_size, config.indexing.chunk_overlap)?;
        let describer: Arc<dyn StructureDescriber> = Arc::new(DirectoryTreeDescriber::new(
            config.indexing.structure_file.clone(),
            config.indexing.structure_max_depth,
        ));

        let config = Arc::new(config);
        let collector = DocumentCollector::new(Arc::clone(&config), describer);

        Ok(Self {
            config,
            embedder,
            chunker,
            collector,
        })
    }

    /// Create a builder with the FastEmbed model named in the configuration
    pub fn from_config(config: Config) -> Result<Self, IndexError> {
        tracing::info!("Loading embedding model: {}", config.embedding.model_name);
        let embedder = FastEmbedManager::from_config(&config.embedding)?;
        Self::new(config, Arc::new(embedder))
    }

    /// Replace the default directory-tree structure describer
    pub fn with_describer(mut self, describer: Arc<dyn StructureDescriber>) -> Self {
        self.collector = self.collector.with_describer(describer);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Build the index using the configured issues source
    pub async fn build(&self, target: &RepoTarget) -> Result<IndexReport, IndexError> {
        let issues = self.config.issues.source();
        self.build_with_issues(target, &issues).await
    }

    /// Build the index from the structure description, `repo/` and issues
    pub async fn build_with_issues(
        &self,
        target: &RepoTarget,
        issues: &IssuesSource,
    ) -> Result<IndexReport, IndexError> {
        let start = Instant::now();
        let layout = RepoLayout::resolve(&self.config, target)?;
        tracing::info!("Building index for {} at {}", target, layout.root.display());

        let collected = self
            .collect_documents(&layout, issues.clone(), false)
            .await?;
        self.write_index(target, &layout, collected, start).await
    }

    /// Overwrite the index with the named issue files only
    ///
    /// No structure description is generated and `repo/` is not read.
    pub async fn rebuild_issues_index(
        &self,
        target: &RepoTarget,
        names: &[String],
    ) -> Result<IndexReport, IndexError> {
        let start = Instant::now();
        let layout = RepoLayout::resolve(&self.config, target)?;
        tracing::info!(
            "Rebuilding issues index for {} from {} files",
            target,
            names.len()
        );

        let issues = IssuesSource::Explicit(names.to_vec());
        let collected = self.collect_documents(&layout, issues, true).await?;
        self.write_index(target, &layout, collected, start).await
    }

    /// Gather documents for a build without touching the store
    pub async fn collect(
        &self,
        target: &RepoTarget,
        issues: &IssuesSource,
    ) -> Result<CollectedDocuments, IndexError> {
        let layout = RepoLayout::resolve(&self.config, target)?;
        self.collect_documents(&layout, issues.clone(), false).await
    }

    async fn collect_documents(
        &self,
        layout: &RepoLayout,
        issues: IssuesSource,
        issues_only: bool,
    ) -> Result<CollectedDocuments, IndexError> {
        let collector = self.collector.clone();
        let layout = layout.clone();

        tokio::task::spawn_blocking(move || {
            if issues_only {
                collector.collect_issues_only(&layout, &issues)
            } else {
                collector.collect(&layout, &issues)
            }
        })
        .await
        .map_err(|e| IndexError::other(format!("Document collection task failed: {}", e)))?
    }

    async fn write_index(
        &self,
        target: &RepoTarget,
        layout: &RepoLayout,
        collected: CollectedDocuments,
        start: Instant,
    ) -> Result<IndexReport, IndexError> {
        let chunks = self.chunker.chunk_documents(&collected.documents);
        tracing::info!(
            "Created {} chunks from {} documents ({} files skipped)",
            chunks.len(),
            collected.documents.len(),
            collected.skipped_files
        );

        let mut store = open_store(
            &self.config,
            &layout.store_location,
            Arc::clone(&self.embedder),
            true,
        )
        .await?;

        let entries_written = store.add_documents(&chunks).await?;
        store.flush().await?;

        let report = IndexReport {
            target: target.to_string(),
            store_location: store.location().to_string(),
            backend: store.backend().to_string(),
            documents: collected.documents.len(),
            issue_documents: collected.issue_documents,
            skipped_files: collected.skipped_files,
            chunks_created: chunks.len(),
            entries_written,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Indexed {} entries into {} ({}) in {} ms",
            report.entries_written,
            report.store_location,
            report.backend,
            report.duration_ms
        );
        Ok(report)
    }
}
