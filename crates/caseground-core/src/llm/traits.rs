//! LLM trait definitions

use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait.
///
/// Vectors from different models are not comparable; the index must be
/// queried with the same model it was built with.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Get model name
    fn model_name(&self) -> &str;
}
