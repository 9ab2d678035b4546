use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ValidationError;

/// Text loaded from one file (or one part of a file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the repository root, `/`-separated
    pub source_path: String,
    /// Decoded text content
    pub raw_text: String,
}

impl Document {
    pub fn new(source_path: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOrigin {
    /// Source path shared by every chunk of the same document
    pub source_path: Arc<str>,
    /// Position of the source document within the chunked batch
    pub document: usize,
    /// Ordinal of this chunk within its document
    pub index: usize,
}

/// A bounded slice of a document's text, the unit that gets embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub origin: ChunkOrigin,
}

/// A persisted (text, embedding) pair as read back from a vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub text: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub source_path: Option<String>,
    #[serde(default)]
    pub chunk_index: usize,
}

impl IndexEntry {
    pub fn from_chunk(chunk: &Chunk, vector: Vec<f32>) -> Self {
        Self {
            text: chunk.text.clone(),
            vector,
            source_path: Some(chunk.origin.source_path.to_string()),
            chunk_index: chunk.origin.index,
        }
    }
}

/// The repository an index build is scoped to
///
/// A purely numeric argument is treated as a repository identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoTarget {
    Name(String),
    Id(u64),
}

impl RepoTarget {
    /// Path segment used under `<data_path>/data/`
    pub fn as_path_segment(&self) -> String {
        match self {
            RepoTarget::Name(name) => name.clone(),
            RepoTarget::Id(id) => id.to_string(),
        }
    }
}

impl FromStr for RepoTarget {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty("repository target".to_string()));
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return trimmed
                .parse::<u64>()
                .map(RepoTarget::Id)
                .map_err(|e| ValidationError::InvalidTarget(format!("{}: {}", trimmed, e)));
        }
        Ok(RepoTarget::Name(trimmed.to_string()))
    }
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoTarget::Name(name) => write!(f, "{}", name),
            RepoTarget::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// How issue documents are gathered for a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuesSource {
    /// Walk `issues/`; a missing directory contributes nothing
    Scan,
    /// Load exactly these file names from `issues/`, which must exist
    Explicit(Vec<String>),
}

/// Summary of a completed index build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexReport {
    /// Repository target as given on the command line
    pub target: String,
    /// Where the index was written
    pub store_location: String,
    /// Backend that holds the index
    pub backend: String,
    /// Documents extracted (structure description, sources and issues)
    pub documents: usize,
    /// Documents that came from the issues directory
    pub issue_documents: usize,
    /// Files that contributed nothing because extraction failed
    pub skipped_files: usize,
    /// Chunks produced by the chunker
    pub chunks_created: usize,
    /// Entries persisted in the store
    pub entries_written: usize,
    /// Time taken in milliseconds
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests;
