//! # repo-index - Semantic indexing of repositories and their issues
//!
//! Builds a vector index over three inputs of one repository: its source
//! files, a generated description of its directory structure, and its
//! issue-tracker documents. The index can then back retrieval queries such
//! as "find code relevant to this issue".
//!
//! ## Overview
//!
//! A build walks `<data_path>/data/<target>/repo`, extracts text, splits it
//! into bounded chunks, embeds every chunk and writes the pairs into a vector
//! store. Each build fully replaces the previous index.
//!
//! ## Architecture
//!
//! ```text
//! FileWalker ──▶ TextExtractor ──▶ TextChunker ──▶ VectorStore
//!      ▲              ▲                               │
//!  repo/, issues/  StructureDescriber          EmbeddingProvider
//! ```
//!
//! ## Modules
//!
//! - [`client`]: The [`IndexBuilder`] that runs a build end to end
//! - [`indexer`]: File walking, text extraction, structure description and chunking
//! - [`embedding`]: Embedding provider trait and the FastEmbed implementation
//! - [`vector_db`]: LanceDB and local on-disk vector stores
//! - [`issues`]: Rendering issues into Markdown documents
//! - [`config`]: Configuration management with environment variable support
//! - [`types`]: Documents, chunks, entries and build reports
//! - [`error`]: Error types
//! - [`paths`]: Platform directories and repository layout resolution
//!
//! ## Usage Example
//!
//! ```no_run
//! use repo_index::{Config, IndexBuilder, RepoTarget};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let builder = IndexBuilder::from_config(Config::new(None)?)?;
//!     let report = builder.build(&RepoTarget::Id(42)).await?;
//!     println!("{} entries in {}", report.entries_written, report.store_location);
//!     Ok(())
//! }
//! ```

/// Index builder orchestrating a full build
pub mod client;

/// Configuration management with environment variable overrides
pub mod config;

/// Embedding generation using FastEmbed (all-MiniLM-L6-v2)
pub mod embedding;

/// Error types and utilities
pub mod error;

/// File walking, extraction, structure description and chunking
pub mod indexer;

/// Issue documents
pub mod issues;

/// Platform directories and repository layout
pub mod paths;

/// Core data types
pub mod types;

/// Vector store abstraction supporting LanceDB and a local directory store
pub mod vector_db;

pub use client::IndexBuilder;
pub use config::{Config, StoreBackend};
pub use error::IndexError;
pub use types::{Chunk, Document, IndexEntry, IndexReport, IssuesSource, RepoTarget};
