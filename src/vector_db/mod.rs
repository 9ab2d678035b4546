//! Vector stores that persist (text, embedding) pairs
//!
//! Two backends implement [`VectorStore`]: a LanceDB dataset, addressable by
//! local path or object-store URI, and a self-contained local directory that
//! is written by an explicit save step.

pub mod lance_client;
pub mod local_store;

pub use lance_client::LanceVectorStore;
pub use local_store::LocalVectorStore;

use crate::config::{Config, StoreBackend};
use crate::embedding::EmbeddingProvider;
use crate::error::{EmbeddingError, IndexError, VectorDbError};
use crate::types::{Chunk, IndexEntry};
use std::sync::Arc;

/// Trait for vector store operations
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Embed every chunk and persist the resulting entries
    ///
    /// Returns the number of entries written. An empty slice is a no-op.
    async fn add_documents(&mut self, chunks: &[Chunk]) -> Result<usize, IndexError>;

    /// Make everything added so far durable
    async fn flush(&mut self) -> Result<(), IndexError>;

    /// Number of stored entries
    async fn count(&self) -> Result<usize, IndexError>;

    /// Read back every stored entry
    async fn entries(&self) -> Result<Vec<IndexEntry>, IndexError>;

    /// Path or URI the store lives at
    fn location(&self) -> &str;

    fn backend(&self) -> StoreBackend;
}

/// Open the configured backend at `location`
///
/// With `overwrite` any previous contents are discarded first.
pub async fn open_store(
    config: &Config,
    location: &str,
    embedder: Arc<dyn EmbeddingProvider>,
    overwrite: bool,
) -> Result<Box<dyn VectorStore>, VectorDbError> {
    let batch_size = config.embedding.batch_size;

    match config.vector_db.backend {
        StoreBackend::LanceDb => {
            let store = LanceVectorStore::open_or_create(
                location,
                &config.vector_db.table_name,
                embedder,
                batch_size,
                overwrite,
            )
            .await?;
            Ok(Box::new(store))
        }
        StoreBackend::Local => {
            let store = LocalVectorStore::open_or_create(location, embedder, batch_size, overwrite)?;
            Ok(Box::new(store))
        }
    }
}

/// Embed chunk texts in batches on the blocking pool
///
/// Every batch must come back with one vector per text, each of the
/// provider's dimension.
pub(crate) async fn embed_chunks(
    embedder: &Arc<dyn EmbeddingProvider>,
    chunks: &[Chunk],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, IndexError> {
    let dimension = embedder.dimension();
    let batch_size = batch_size.max(1);
    let total_batches = chunks.len().div_ceil(batch_size);
    let mut all_embeddings = Vec::with_capacity(chunks.len());

    for (batch_idx, chunk_batch) in chunks.chunks(batch_size).enumerate() {
        let texts: Vec<String> = chunk_batch.iter().map(|c| c.text.clone()).collect();
        let expected = texts.len();

        let provider = Arc::clone(embedder);
        let embeddings = tokio::task::spawn_blocking(move || provider.embed_batch(texts))
            .await
            .map_err(|e| EmbeddingError::GenerationFailed(format!("embedding task panicked: {}", e)))?
            .map_err(|e| EmbeddingError::GenerationFailed(format!("{:#}", e)))?;

        if embeddings.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: embeddings.len(),
            }
            .into());
        }
        if let Some(bad) = embeddings.iter().find(|v| v.len() != dimension) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            }
            .into());
        }

        tracing::debug!("Embedded batch {}/{}", batch_idx + 1, total_batches);
        all_embeddings.extend(embeddings);
    }

    Ok(all_embeddings)
}
