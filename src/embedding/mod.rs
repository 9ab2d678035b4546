mod fastembed_manager;

pub use fastembed_manager::FastEmbedManager;

use anyhow::Result;
use std::borrow::Cow;

/// Trait for embedding generation
///
/// Implementations are opaque to the indexing pipeline: authentication,
/// model downloads and network behavior stay behind this boundary.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of text
    fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Generate the embedding for a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(vec![text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Embedding provider returned no vector"))
    }

    /// Get the dimension of the embeddings
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Special-token literals that must be embedded as ordinary text
///
/// Tokenizers match added special tokens such as `[SEP]` inside raw input.
/// Source files and issues mention these literals often, so each occurrence
/// is broken with a zero-width space before tokenization.
#[derive(Debug, Clone, Default)]
pub struct SpecialTokenFilter {
    tokens: Vec<String>,
}

const ZERO_WIDTH_SPACE: char = '\u{200B}';

impl SpecialTokenFilter {
    pub fn new(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut tokens: Vec<String> = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| t.chars().count() > 1)
            .collect();
        // Longest first so "<|endoftext|>" is handled before any shorter token inside it
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        tokens.dedup();
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Neutralize every configured token in `text`
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !self.tokens.iter().any(|t| text.contains(t.as_str())) {
            return Cow::Borrowed(text);
        }

        let mut out = text.to_string();
        for token in &self.tokens {
            if out.contains(token.as_str()) {
                out = out.replace(token.as_str(), &neutralized(token));
            }
        }
        Cow::Owned(out)
    }
}

fn neutralized(token: &str) -> String {
    let mut chars = token.chars();
    let mut out = String::with_capacity(token.len() + ZERO_WIDTH_SPACE.len_utf8());
    if let Some(first) = chars.next() {
        out.push(first);
        out.push(ZERO_WIDTH_SPACE);
    }
    out.extend(chars);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider;

    impl EmbeddingProvider for FixedProvider {
        fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_embed_single_uses_batch() {
        let vector = FixedProvider.embed("abc").unwrap();
        assert_eq!(vector, vec![3.0, 1.0]);
    }

    #[test]
    fn test_filter_leaves_plain_text_borrowed() {
        let filter = SpecialTokenFilter::new(["[SEP]", "[CLS]"]);
        let out = filter.apply("fn main() {}");
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_filter_neutralizes_tokens() {
        let filter = SpecialTokenFilter::new(["[SEP]"]);
        let out = filter.apply("a [SEP] b [SEP]");
        assert_eq!(out, "a [\u{200B}SEP] b [\u{200B}SEP]");
        assert!(!out.contains("[SEP]"));
    }

    #[test]
    fn test_filter_longest_token_first() {
        let filter = SpecialTokenFilter::new(["</s>", "<|endoftext|>"]);
        assert_eq!(filter.tokens()[0], "<|endoftext|>");
        let out = filter.apply("end<|endoftext|>");
        assert_eq!(out, "end<\u{200B}|endoftext|>");
    }

    #[test]
    fn test_filter_ignores_single_char_tokens() {
        let filter = SpecialTokenFilter::new(["x", "[PAD]"]);
        assert_eq!(filter.tokens(), &["[PAD]".to_string()]);
        assert_eq!(filter.apply("x y"), "x y");
    }

    #[test]
    fn test_empty_filter() {
        let filter = SpecialTokenFilter::default();
        assert_eq!(filter.apply("[SEP]"), "[SEP]");
    }
}
