use crate::config::StoreBackend;
use crate::embedding::EmbeddingProvider;
use crate::error::{IndexError, VectorDbError};
use crate::types::{Chunk, IndexEntry};
use crate::vector_db::{VectorStore, embed_chunks};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const INDEX_FILE: &str = "index.json";
const FORMAT_VERSION: u32 = 1;

/// On-disk layout of `index.json`
#[derive(Debug, Serialize, Deserialize)]
struct StoredIndex {
    version: u32,
    dimension: usize,
    model: String,
    entries: Vec<IndexEntry>,
}

/// Self-contained vector store kept in memory and saved as one JSON file
///
/// Every change is persisted by [`LocalVectorStore::save`], which writes to a
/// temporary file and renames it over `index.json`.
pub struct LocalVectorStore {
    dir: PathBuf,
    location: String,
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    entries: Vec<IndexEntry>,
}

impl LocalVectorStore {
    /// Open the store directory, creating it if needed
    ///
    /// With `overwrite` the directory is removed and recreated empty;
    /// otherwise an existing `index.json` is loaded.
    pub fn open_or_create(
        location: &str,
        embedder: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
        overwrite: bool,
    ) -> Result<Self, VectorDbError> {
        let dir = PathBuf::from(location);
        let init_err = |reason: String| VectorDbError::InitializationFailed {
            location: location.to_string(),
            reason,
        };

        if overwrite && dir.exists() {
            tracing::info!("Clearing previous vector store at {}", dir.display());
            std::fs::remove_dir_all(&dir).map_err(|e| init_err(e.to_string()))?;
        }
        std::fs::create_dir_all(&dir).map_err(|e| init_err(e.to_string()))?;

        let entries = if overwrite {
            Vec::new()
        } else {
            Self::load(&dir, embedder.dimension())?
        };

        tracing::info!(
            "Opened local vector store at {} with {} entries",
            dir.display(),
            entries.len()
        );

        Ok(Self {
            dir,
            location: location.to_string(),
            embedder,
            batch_size,
            entries,
        })
    }

    fn index_path(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE)
    }

    /// Read `index.json` from `dir`; a missing file means an empty store
    fn load(dir: &Path, dimension: usize) -> Result<Vec<IndexEntry>, VectorDbError> {
        let path = Self::index_path(dir);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| VectorDbError::ReadFailed(format!("{}: {}", path.display(), e)))?;
        let stored: StoredIndex = serde_json::from_str(&content)
            .map_err(|e| VectorDbError::Corrupted(format!("{}: {}", path.display(), e)))?;

        if stored.version != FORMAT_VERSION {
            return Err(VectorDbError::Corrupted(format!(
                "unsupported format version {}",
                stored.version
            )));
        }
        if stored.dimension != dimension {
            return Err(VectorDbError::Corrupted(format!(
                "stored dimension {} does not match embedder dimension {}",
                stored.dimension, dimension
            )));
        }

        Ok(stored.entries)
    }

    /// Serialize every entry to `index.json`
    pub fn save(&self) -> Result<(), VectorDbError> {
        let stored = StoredIndex {
            version: FORMAT_VERSION,
            dimension: self.embedder.dimension(),
            model: self.embedder.model_name().to_string(),
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string(&stored)
            .map_err(|e| VectorDbError::SaveFailed(format!("Failed to serialize index: {}", e)))?;

        let path = Self::index_path(&self.dir);
        let tmp_path = self.dir.join(format!("{}.tmp", INDEX_FILE));

        std::fs::write(&tmp_path, json).map_err(|e| {
            VectorDbError::SaveFailed(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            VectorDbError::SaveFailed(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        tracing::debug!("Saved {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorStore for LocalVectorStore {
    async fn add_documents(&mut self, chunks: &[Chunk]) -> Result<usize, IndexError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let embeddings = embed_chunks(&self.embedder, chunks, self.batch_size).await?;

        let before = self.entries.len();
        self.entries.extend(
            chunks
                .iter()
                .zip(embeddings)
                .map(|(chunk, vector)| IndexEntry::from_chunk(chunk, vector)),
        );

        if let Err(e) = self.save() {
            self.entries.truncate(before);
            return Err(e.into());
        }

        let count = self.entries.len() - before;
        tracing::info!("Stored {} entries in {}", count, self.location);
        Ok(count)
    }

    async fn flush(&mut self) -> Result<(), IndexError> {
        self.save()?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, IndexError> {
        Ok(self.entries.len())
    }

    async fn entries(&self) -> Result<Vec<IndexEntry>, IndexError> {
        Ok(self.entries.clone())
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Local
    }
}
