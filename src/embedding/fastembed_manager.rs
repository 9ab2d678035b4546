use super::{EmbeddingProvider, SpecialTokenFilter};
use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;
use anyhow::{Context, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Mutex;

/// FastEmbed-based embedding provider (all-MiniLM-L6-v2 by default)
pub struct FastEmbedManager {
    model: Mutex<TextEmbedding>,
    dimension: usize,
    model_name: String,
    filter: SpecialTokenFilter,
}

impl FastEmbedManager {
    /// Create a new FastEmbedManager with the default model (all-MiniLM-L6-v2)
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::AllMiniLML6V2, "all-MiniLM-L6-v2", None)
    }

    /// Create a provider from the embedding section of the configuration
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let model = model_from_name(&config.model_name)?;
        let cache_dir = config
            .cache_dir
            .clone()
            .unwrap_or_else(crate::paths::PlatformPaths::default_model_cache_dir);
        let manager = Self::with_model(model, &config.model_name, Some(cache_dir))?;
        Ok(manager.with_token_filter(SpecialTokenFilter::new(
            config.plain_text_tokens.iter().cloned(),
        )))
    }

    /// Create a new FastEmbedManager with a specific model
    pub fn with_model(
        model: EmbeddingModel,
        model_name: &str,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self> {
        tracing::info!("Initializing FastEmbed model: {:?}", model);

        let dimension = dimension_for(&model);

        let mut options = InitOptions::default();
        options.model_name = model;
        options.show_download_progress = true;
        if let Some(dir) = cache_dir {
            options.cache_dir = dir;
        }

        let embedding_model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::InitializationFailed(format!("{:#}", e)))
            .context("Failed to initialize FastEmbed model")?;

        Ok(Self {
            model: Mutex::new(embedding_model),
            dimension,
            model_name: model_name.to_string(),
            filter: SpecialTokenFilter::default(),
        })
    }

    /// Treat these special-token literals as plain text when embedding
    pub fn with_token_filter(mut self, filter: SpecialTokenFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Map a configured model name onto a FastEmbed model
pub fn model_from_name(name: &str) -> Result<EmbeddingModel, EmbeddingError> {
    match name {
        "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
            Ok(EmbeddingModel::AllMiniLML6V2)
        }
        "all-MiniLM-L12-v2" | "sentence-transformers/all-MiniLM-L12-v2" => {
            Ok(EmbeddingModel::AllMiniLML12V2)
        }
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
        other => Err(EmbeddingError::UnknownModel(other.to_string())),
    }
}

fn dimension_for(model: &EmbeddingModel) -> usize {
    match model {
        EmbeddingModel::AllMiniLML6V2 => 384,
        EmbeddingModel::AllMiniLML12V2 => 384,
        EmbeddingModel::BGEBaseENV15 => 768,
        EmbeddingModel::BGESmallENV15 => 384,
        _ => 384,
    }
}

impl EmbeddingProvider for FastEmbedManager {
    fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!("Generating embeddings for {} texts", texts.len());

        let texts: Vec<String> = texts
            .iter()
            .map(|t| self.filter.apply(t).into_owned())
            .collect();

        let mut model = self
            .model
            .lock()
            .map_err(|e| EmbeddingError::LockPoisoned(e.to_string()))?;
        let embeddings = model
            .embed(texts, None)
            .context("Failed to generate embeddings")?;

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_from_name_known() {
        assert!(matches!(
            model_from_name("all-MiniLM-L6-v2"),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(
            model_from_name("BAAI/bge-base-en-v1.5"),
            Ok(EmbeddingModel::BGEBaseENV15)
        ));
    }

    #[test]
    fn test_model_from_name_unknown() {
        let err = model_from_name("text-embedding-ada-002").unwrap_err();
        assert!(matches!(err, EmbeddingError::UnknownModel(_)));
    }

    #[test]
    fn test_dimension_for_models() {
        assert_eq!(dimension_for(&EmbeddingModel::AllMiniLML6V2), 384);
        assert_eq!(dimension_for(&EmbeddingModel::BGEBaseENV15), 768);
        assert_eq!(dimension_for(&EmbeddingModel::BGESmallENV15), 384);
    }

    // The tests below download the model on first run.

    #[test]
    #[ignore = "downloads the embedding model"]
    fn test_embedding_generation() {
        let manager = FastEmbedManager::new().unwrap();
        let texts = vec![
            "fn main() { println!(\"Hello, world!\"); }".to_string(),
            "issue: crash on [SEP] in input".to_string(),
        ];

        let embeddings = manager.embed_batch(texts).unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 384);
        assert_eq!(embeddings[1].len(), 384);
    }

    #[test]
    #[ignore = "downloads the embedding model"]
    fn test_empty_batch() {
        let manager = FastEmbedManager::new().unwrap();
        let embeddings = manager.embed_batch(vec![]).unwrap();
        assert!(embeddings.is_empty());
        assert_eq!(manager.model_name(), "all-MiniLM-L6-v2");
    }
}
