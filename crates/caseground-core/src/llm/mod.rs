//! LLM integration
//!
//! Provides:
//! - The [`Embedder`] trait and its Ollama implementation
//! - Streaming chat against a local Ollama model
//! - Streaming messages against the hosted Anthropic API
//! - Wire framing for both response formats

mod anthropic;
mod cache;
mod client;
mod ollama;
pub mod stream;
mod traits;

pub use anthropic::AnthropicClient;
pub use cache::{embedding_cache_key, CacheStats, EmbeddingCache};
pub use client::ChatMessage;
pub use ollama::OllamaClient;
pub use traits::*;
