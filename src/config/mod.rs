/// Configuration system for repo-index
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
///
/// The resolved [`Config`] is handed to the index builder explicitly; nothing
/// downstream reads process environment on its own.
use crate::error::{ConfigError, IndexError};
use crate::paths::{ISSUES_DIR, SOURCE_DIR, is_single_segment};
use crate::types::IssuesSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base data directory; repositories live under `<data_path>/data/<target>`
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Vector store configuration
    #[serde(default)]
    pub vector_db: VectorDbConfig,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Extraction and chunking configuration
    #[serde(default)]
    pub indexing: IndexingConfig,

    /// Issue document collection
    #[serde(default)]
    pub issues: IssuesConfig,
}

/// Which vector store implementation holds the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// LanceDB dataset addressed by path or object-store URI
    #[value(name = "lancedb")]
    LanceDb,
    /// Self-contained directory written with an explicit save step
    #[value(name = "local")]
    Local,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::LanceDb => write!(f, "lancedb"),
            StoreBackend::Local => write!(f, "local"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lancedb" | "lance" => Ok(StoreBackend::LanceDb),
            "local" => Ok(StoreBackend::Local),
            other => Err(ConfigError::InvalidValue {
                key: "vector_db.backend".to_string(),
                reason: format!("must be 'lancedb' or 'local', got '{}'", other),
            }),
        }
    }
}

/// What to do when the structure description cannot be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFailurePolicy {
    /// Abort the build
    Fatal,
    /// Log and index without the description
    Skip,
}

/// How issue documents are selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuesMode {
    /// Walk the issues directory, tolerating its absence
    Scan,
    /// Load only `issues.files`; the issues directory must exist
    Explicit,
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDbConfig {
    /// Store backend: "lancedb" or "local"
    #[serde(default = "default_db_backend")]
    pub backend: StoreBackend,

    /// Directory name under the repository root holding the store
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Optional base URI for LanceDB datasets (e.g. "s3://bucket/indexes")
    #[serde(default)]
    pub lancedb_uri: Option<String>,

    /// LanceDB table name
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name (e.g., "all-MiniLM-L6-v2", "BAAI/bge-small-en-v1.5")
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Batch size for embedding generation
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Special-token literals embedded as plain text rather than interpreted
    #[serde(default = "default_plain_text_tokens")]
    pub plain_text_tokens: Vec<String>,

    /// Where downloaded models are cached
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

/// Extraction and chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingConfig {
    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks of one document
    #[serde(default)]
    pub chunk_overlap: usize,

    /// Maximum file size to extract (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Glob patterns (relative to the walked directory) that are never extracted
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// File name of the structure description under the repository root
    #[serde(default = "default_structure_file")]
    pub structure_file: String,

    /// Whether a failing structure description aborts the build
    #[serde(default = "default_structure_failure")]
    pub structure_failure: StructureFailurePolicy,

    /// Maximum directory depth listed in the structure description
    #[serde(default = "default_structure_max_depth")]
    pub structure_max_depth: usize,
}

/// Issue document collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuesConfig {
    #[serde(default = "default_issues_mode")]
    pub mode: IssuesMode,

    /// File names under `issues/`, used in explicit mode
    #[serde(default)]
    pub files: Vec<String>,
}

impl IssuesConfig {
    pub fn source(&self) -> IssuesSource {
        match self.mode {
            IssuesMode::Scan => IssuesSource::Scan,
            IssuesMode::Explicit => IssuesSource::Explicit(self.files.clone()),
        }
    }
}

// Default value functions
fn default_data_path() -> PathBuf {
    crate::paths::PlatformPaths::project_data_dir()
}

fn default_db_backend() -> StoreBackend {
    StoreBackend::LanceDb
}

fn default_store_dir() -> String {
    "vector_store".to_string()
}

fn default_table_name() -> String {
    "repo_chunks".to_string()
}

fn default_model_name() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_plain_text_tokens() -> Vec<String> {
    ["[CLS]", "[SEP]", "[PAD]", "[MASK]", "[UNK]", "<s>", "</s>", "<|endoftext|>"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_max_file_size() -> u64 {
    10 * 1_048_576 // 10 MB
}

fn default_exclude_patterns() -> Vec<String> {
    vec!["**/.git/**".to_string()]
}

fn default_structure_file() -> String {
    "project-structure.txt".to_string()
}

fn default_structure_failure() -> StructureFailurePolicy {
    StructureFailurePolicy::Fatal
}

fn default_structure_max_depth() -> usize {
    8
}

fn default_issues_mode() -> IssuesMode {
    IssuesMode::Scan
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            vector_db: VectorDbConfig::default(),
            embedding: EmbeddingConfig::default(),
            indexing: IndexingConfig::default(),
            issues: IssuesConfig::default(),
        }
    }
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            backend: default_db_backend(),
            store_dir: default_store_dir(),
            lancedb_uri: None,
            table_name: default_table_name(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
            batch_size: default_batch_size(),
            plain_text_tokens: default_plain_text_tokens(),
            cache_dir: None,
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: 0,
            max_file_size: default_max_file_size(),
            exclude_patterns: default_exclude_patterns(),
            structure_file: default_structure_file(),
            structure_failure: default_structure_failure(),
            structure_max_depth: default_structure_max_depth(),
        }
    }
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            mode: default_issues_mode(),
            files: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, IndexError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the given path, `REPO_INDEX_CONFIG`, or the
    /// platform default location; fall back to defaults when none exists
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, IndexError> {
        if let Some(path) = explicit {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let config_path = std::env::var("REPO_INDEX_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::paths::PlatformPaths::default_config_path());

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), IndexError> {
        // The store directory is cleared on every build
        let store_dir = self.vector_db.store_dir.as_str();
        if !is_single_segment(store_dir) {
            return Err(invalid(
                "vector_db.store_dir",
                &format!("must be a single directory name, got '{}'", store_dir),
            ));
        }
        if [SOURCE_DIR, ISSUES_DIR, self.indexing.structure_file.as_str()].contains(&store_dir) {
            return Err(invalid(
                "vector_db.store_dir",
                &format!("'{}' is already used by the repository layout", store_dir),
            ));
        }

        if self.vector_db.table_name.trim().is_empty() {
            return Err(invalid("vector_db.table_name", "must not be empty"));
        }

        if self.embedding.batch_size == 0 {
            return Err(invalid("embedding.batch_size", "must be greater than 0"));
        }

        if self.indexing.chunk_size == 0 {
            return Err(invalid("indexing.chunk_size", "must be greater than 0"));
        }

        if self.indexing.chunk_overlap >= self.indexing.chunk_size {
            return Err(invalid(
                "indexing.chunk_overlap",
                &format!(
                    "must be smaller than chunk_size ({}), got {}",
                    self.indexing.chunk_size, self.indexing.chunk_overlap
                ),
            ));
        }

        if self.indexing.max_file_size == 0 {
            return Err(invalid("indexing.max_file_size", "must be greater than 0"));
        }

        let structure_file = self.indexing.structure_file.as_str();
        if !is_single_segment(structure_file) || [SOURCE_DIR, ISSUES_DIR].contains(&structure_file)
        {
            return Err(invalid(
                "indexing.structure_file",
                &format!("must be a plain file name, got '{}'", structure_file),
            ));
        }

        for pattern in &self.indexing.exclude_patterns {
            if let Err(e) = globset::Glob::new(pattern) {
                return Err(invalid(
                    "indexing.exclude_patterns",
                    &format!("invalid glob '{}': {}", pattern, e),
                ));
            }
        }

        if let Some(name) = self.issues.files.iter().find(|f| !is_single_segment(f)) {
            return Err(invalid(
                "issues.files",
                &format!("'{}' is not a file name inside issues/", name),
            ));
        }

        if self.issues.mode == IssuesMode::Explicit && self.issues.files.is_empty() {
            return Err(invalid(
                "issues.files",
                "must list at least one file in explicit mode",
            ));
        }

        Ok(())
    }

    /// Apply environment variable overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Base data directory (DATA_PATH kept for existing deployments)
        if let Some(path) = lookup("REPO_INDEX_DATA_PATH").or_else(|| lookup("DATA_PATH")) {
            self.data_path = PathBuf::from(path);
        }

        if let Some(backend) = lookup("REPO_INDEX_DB_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.vector_db.backend = backend,
                Err(e) => tracing::warn!("Ignoring REPO_INDEX_DB_BACKEND: {}", e),
            }
        }

        if let Some(uri) = lookup("REPO_INDEX_LANCEDB_URI") {
            self.vector_db.lancedb_uri = Some(uri);
        }

        if let Some(model) = lookup("REPO_INDEX_MODEL") {
            self.embedding.model_name = model;
        }

        if let Some(batch_size) = lookup("REPO_INDEX_BATCH_SIZE") {
            match batch_size.parse() {
                Ok(size) => self.embedding.batch_size = size,
                Err(e) => tracing::warn!("Ignoring REPO_INDEX_BATCH_SIZE={}: {}", batch_size, e),
            }
        }

        if let Some(chunk_size) = lookup("REPO_INDEX_CHUNK_SIZE") {
            match chunk_size.parse() {
                Ok(size) => self.indexing.chunk_size = size,
                Err(e) => tracing::warn!("Ignoring REPO_INDEX_CHUNK_SIZE={}: {}", chunk_size, e),
            }
        }

        if let Some(overlap) = lookup("REPO_INDEX_CHUNK_OVERLAP") {
            match overlap.parse() {
                Ok(value) => self.indexing.chunk_overlap = value,
                Err(e) => tracing::warn!("Ignoring REPO_INDEX_CHUNK_OVERLAP={}: {}", overlap, e),
            }
        }
    }

    /// Load from file (or defaults), apply environment overrides and validate
    pub fn new(explicit: Option<&Path>) -> Result<Self, IndexError> {
        let mut config = Self::load_or_default(explicit)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn invalid(key: &str, reason: &str) -> IndexError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
