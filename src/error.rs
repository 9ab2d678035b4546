/// Centralized error types for repo-index using thiserror
///
/// Every fatal condition of an index build surfaces as an [`IndexError`].
/// Per-file extraction problems are modelled separately as [`ExtractionSkip`]
/// and never abort a build.
use thiserror::Error;

/// Main error type for the indexing pipeline
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector store error: {0}")]
    VectorDb(#[from] VectorDbError),

    #[error("Indexing error: {0}")]
    Indexing(#[from] IndexingError),

    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors related to embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    InitializationFailed(String),

    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),

    #[error("Unknown embedding model: {0}")]
    UnknownModel(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Model lock was poisoned: {0}")]
    LockPoisoned(String),
}

/// Errors related to vector store operations
#[derive(Error, Debug)]
pub enum VectorDbError {
    /// The store location could not be created, opened or overwritten
    #[error("Failed to initialize vector store at '{location}': {reason}")]
    InitializationFailed { location: String, reason: String },

    #[error("Failed to store embeddings: {0}")]
    StoreFailed(String),

    #[error("Failed to save vector store: {0}")]
    SaveFailed(String),

    #[error("Failed to read vector store: {0}")]
    ReadFailed(String),

    #[error("Vector store file is corrupted: {0}")]
    Corrupted(String),
}

/// Errors related to collecting documents for an index build
#[derive(Error, Debug)]
pub enum IndexingError {
    #[error("Failed to generate structure description: {0}")]
    StructureDescriptionFailed(String),

    #[error("Issues directory not found: {0}")]
    IssuesDirectoryMissing(String),
}

/// Errors related to chunking configuration
#[derive(Error, Debug)]
pub enum ChunkingError {
    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(String),

    #[error("Chunk overlap {overlap} must be smaller than chunk size {size}")]
    OverlapTooLarge { overlap: usize, size: usize },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to input validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Repository root does not exist: {0}")]
    RepositoryNotFound(String),

    #[error("Repository root is not a directory: {0}")]
    NotADirectory(String),

    #[error("Invalid repository target: {0}")]
    InvalidTarget(String),

    #[error("Empty {0}")]
    Empty(String),
}

/// Why a single file contributed no documents
///
/// Skips are absorbed by the index builder and only ever logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionSkip {
    #[error("file could not be read: {0}")]
    Unreadable(String),

    #[error("file size exceeds maximum: {size} > {max}")]
    TooLarge { size: u64, max: u64 },

    #[error("file is not valid UTF-8")]
    InvalidUtf8,

    #[error("file looks binary")]
    Binary,

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),
}

// Conversion from anyhow::Error to IndexError
impl From<anyhow::Error> for IndexError {
    fn from(err: anyhow::Error) -> Self {
        IndexError::Other(format!("{:#}", err))
    }
}

impl IndexError {
    /// Create a new error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        IndexError::Other(msg.into())
    }

    /// Convert to a user-facing error string
    pub fn to_user_string(&self) -> String {
        format!("{}", self)
    }

    /// Check if this is a user error (bad target, bad config) vs system error
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            IndexError::Validation(_)
                | IndexError::Chunking(_)
                | IndexError::Config(ConfigError::InvalidValue { .. })
                | IndexError::Indexing(IndexingError::IssuesDirectoryMissing(_))
        )
    }
}
