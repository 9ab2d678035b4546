//! LanceDB vector store
//!
//! The dataset is addressed by a local directory or an object-store URI
//! (`s3://`, `gs://`, `az://`); LanceDB persists every append immediately.

use crate::config::StoreBackend;
use crate::embedding::EmbeddingProvider;
use crate::error::{IndexError, VectorDbError};
use crate::types::{Chunk, IndexEntry};
use crate::vector_db::{VectorStore, embed_chunks};
use anyhow::{Context, Result};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
    UInt32Array, types::Float32Type,
};
use arrow_schema::{DataType, Field, Schema};
use futures::stream::TryStreamExt;
use lancedb::Table;
use lancedb::connection::Connection;
use lancedb::query::{ExecutableQuery, QueryBase};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// LanceDB-backed store holding one repository's entries
pub struct LanceVectorStore {
    connection: Connection,
    table: Table,
    table_name: String,
    location: String,
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl LanceVectorStore {
    /// Connect to `location` and open or (re)create the table
    ///
    /// With `overwrite` an existing table is dropped and recreated empty.
    pub async fn open_or_create(
        location: &str,
        table_name: &str,
        embedder: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
        overwrite: bool,
    ) -> Result<Self, VectorDbError> {
        let init_err = |reason: String| VectorDbError::InitializationFailed {
            location: location.to_string(),
            reason,
        };

        if !is_remote_uri(location) {
            std::fs::create_dir_all(location).map_err(|e| init_err(e.to_string()))?;
        }

        tracing::info!("Connecting to LanceDB at: {}", location);
        let connection = lancedb::connect(location)
            .execute()
            .await
            .map_err(|e| init_err(e.to_string()))?;

        let table = Self::prepare_table(&connection, table_name, embedder.dimension(), overwrite)
            .await
            .map_err(|e| init_err(format!("{:#}", e)))?;

        Ok(Self {
            connection,
            table,
            table_name: table_name.to_string(),
            location: location.to_string(),
            embedder,
            batch_size,
        })
    }

    async fn prepare_table(
        connection: &Connection,
        table_name: &str,
        dimension: usize,
        overwrite: bool,
    ) -> Result<Table> {
        let table_names = connection
            .table_names()
            .execute()
            .await
            .context("Failed to list tables")?;
        let exists = table_names.iter().any(|name| name == table_name);

        if exists && !overwrite {
            tracing::info!("Reusing existing table '{}'", table_name);
            return connection
                .open_table(table_name)
                .execute()
                .await
                .context("Failed to open table");
        }

        if exists {
            tracing::info!("Dropping existing table '{}'", table_name);
            connection
                .drop_table(table_name, &[])
                .await
                .context("Failed to drop table")?;
        }

        let schema = Self::create_schema(dimension);
        let empty_batch = RecordBatch::new_empty(schema.clone());
        let batches = RecordBatchIterator::new(vec![empty_batch].into_iter().map(Ok), schema);

        let table = connection
            .create_table(table_name, Box::new(batches))
            .execute()
            .await
            .context("Failed to create table")?;

        tracing::info!("Created table '{}' with dimension {}", table_name, dimension);
        Ok(table)
    }

    /// Create schema for the entries table
    fn create_schema(dimension: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    dimension as i32,
                ),
                false,
            ),
            Field::new("id", DataType::Utf8, false),
            Field::new("source_path", DataType::Utf8, true),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("content_hash", DataType::Utf8, false),
            Field::new("indexed_at", DataType::Utf8, false),
        ]))
    }

    /// Convert chunks and their embeddings to a RecordBatch
    fn create_record_batch(
        chunks: &[Chunk],
        embeddings: Vec<Vec<f32>>,
        dimension: usize,
    ) -> Result<RecordBatch> {
        let schema = Self::create_schema(dimension);
        let indexed_at = chrono::Utc::now().to_rfc3339();

        let vector_array = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
            embeddings
                .into_iter()
                .map(|v| Some(v.into_iter().map(Some))),
            dimension as i32,
        );
        let id_array = StringArray::from(
            chunks
                .iter()
                .map(|c| format!("{}:{}", c.origin.source_path, c.origin.index))
                .collect::<Vec<_>>(),
        );
        let source_path_array = StringArray::from(
            chunks
                .iter()
                .map(|c| Some(c.origin.source_path.as_ref()))
                .collect::<Vec<_>>(),
        );
        let chunk_index_array = UInt32Array::from(
            chunks
                .iter()
                .map(|c| c.origin.index as u32)
                .collect::<Vec<_>>(),
        );
        let content_array =
            StringArray::from(chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>());
        let hash_array = StringArray::from(
            chunks
                .iter()
                .map(|c| content_hash(&c.text))
                .collect::<Vec<_>>(),
        );
        let indexed_at_array = StringArray::from(vec![indexed_at.as_str(); chunks.len()]);

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(vector_array),
                Arc::new(id_array),
                Arc::new(source_path_array),
                Arc::new(chunk_index_array),
                Arc::new(content_array),
                Arc::new(hash_array),
                Arc::new(indexed_at_array),
            ],
        )
        .context("Failed to create RecordBatch")
    }

    fn entries_from_batch(batch: &RecordBatch) -> Result<Vec<IndexEntry>> {
        let vectors = batch
            .column_by_name("vector")
            .context("Missing vector column")?
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .context("Invalid vector type")?;
        let contents = string_column(batch, "content")?;
        let sources = string_column(batch, "source_path")?;
        let indexes = batch
            .column_by_name("chunk_index")
            .context("Missing chunk_index column")?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .context("Invalid chunk_index type")?;

        let mut entries = Vec::with_capacity(batch.num_rows());
        for i in 0..batch.num_rows() {
            let values = vectors.value(i);
            let vector = values
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("Invalid vector item type")?
                .values()
                .to_vec();

            entries.push(IndexEntry {
                text: contents.value(i).to_string(),
                vector,
                source_path: (!sources.is_null(i)).then(|| sources.value(i).to_string()),
                chunk_index: indexes.value(i) as usize,
            });
        }
        Ok(entries)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Whether the connection still lists this store's table
    pub async fn table_exists(&self) -> Result<bool> {
        let names = self
            .connection
            .table_names()
            .execute()
            .await
            .context("Failed to list tables")?;
        Ok(names.iter().any(|name| name == &self.table_name))
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .with_context(|| format!("Missing {} column", name))?
        .as_any()
        .downcast_ref::<StringArray>()
        .with_context(|| format!("Invalid {} type", name))
}

fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn is_remote_uri(location: &str) -> bool {
    location.contains("://")
}

#[async_trait::async_trait]
impl VectorStore for LanceVectorStore {
    async fn add_documents(&mut self, chunks: &[Chunk]) -> Result<usize, IndexError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let embeddings = embed_chunks(&self.embedder, chunks, self.batch_size).await?;
        let dimension = self.embedder.dimension();

        let batch = Self::create_record_batch(chunks, embeddings, dimension)
            .map_err(|e| VectorDbError::StoreFailed(format!("{:#}", e)))?;
        let count = batch.num_rows();
        let schema = batch.schema();
        let batches = RecordBatchIterator::new(vec![batch].into_iter().map(Ok), schema);

        self.table
            .add(Box::new(batches))
            .execute()
            .await
            .map_err(|e| VectorDbError::StoreFailed(e.to_string()))?;

        tracing::info!("Stored {} entries in LanceDB at {}", count, self.location);
        Ok(count)
    }

    async fn flush(&mut self) -> Result<(), IndexError> {
        // Appends are committed as they happen
        tracing::debug!("LanceDB flush is a no-op for {}", self.location);
        Ok(())
    }

    async fn count(&self) -> Result<usize, IndexError> {
        let count = self
            .table
            .count_rows(None)
            .await
            .map_err(|e| VectorDbError::ReadFailed(e.to_string()))?;
        Ok(count)
    }

    async fn entries(&self) -> Result<Vec<IndexEntry>, IndexError> {
        let total = self.count().await?;
        if total == 0 {
            return Ok(vec![]);
        }

        let stream = self
            .table
            .query()
            .limit(total)
            .execute()
            .await
            .map_err(|e| VectorDbError::ReadFailed(e.to_string()))?;
        let batches: Vec<RecordBatch> = stream
            .try_collect()
            .await
            .map_err(|e| VectorDbError::ReadFailed(e.to_string()))?;

        let mut entries = Vec::with_capacity(total);
        for batch in &batches {
            entries.extend(
                Self::entries_from_batch(batch)
                    .map_err(|e| VectorDbError::Corrupted(format!("{:#}", e)))?,
            );
        }
        Ok(entries)
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::LanceDb
    }
}
