//! Ollama client: embeddings and local streaming chat

use super::cache::EmbeddingCache;
use super::client::{build_http_client, check_status, unreachable, ChatMessage};
use super::stream::{lines, ndjson_deltas};
use super::Embedder;
use crate::config::LocalServiceConfig;
use crate::error::{CasegroundError, Result};
use async_stream::stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{pin_mut, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const SERVICE: &str = "Ollama";

/// Client for a locally hosted Ollama service
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    config: LocalServiceConfig,
    cache: Arc<EmbeddingCache>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

impl OllamaClient {
    pub fn new(config: LocalServiceConfig) -> Result<Self> {
        let http = build_http_client(config.connect_timeout_secs)?;
        Ok(Self {
            http,
            config,
            cache: Arc::new(EmbeddingCache::new()),
        })
    }

    pub fn config(&self) -> &LocalServiceConfig {
        &self.config
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Stream a chat completion as text deltas.
    ///
    /// Connection and HTTP failures are delivered as the single error item
    /// of the stream. Dropping the stream closes the connection.
    pub fn chat_stream(&self, messages: Vec<ChatMessage>) -> BoxStream<'static, Result<String>> {
        let http = self.http.clone();
        let url = self.endpoint("chat");
        let request = ChatRequest {
            model: self.config.generation_model.clone(),
            messages,
            stream: true,
        };

        Box::pin(stream! {
            tracing::debug!("Streaming chat from {} with {}", url, request.model);

            let response = match http.post(&url).json(&request).send().await {
                Ok(response) => response,
                Err(e) => {
                    yield Err::<String, CasegroundError>(unreachable(SERVICE, &url, e));
                    return;
                }
            };
            let response = match check_status(SERVICE, response).await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let deltas = ndjson_deltas(lines(response.bytes_stream()));
            pin_mut!(deltas);
            while let Some(delta) = deltas.next().await {
                yield delta;
            }
        })
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.config.embedding_model.as_str();
        if let Some(cached) = self.cache.get(model, text) {
            return Ok(cached);
        }

        let url = self.endpoint("embeddings");
        let response = self
            .http
            .post(&url)
            .timeout(Duration::from_secs(self.config.embed_timeout_secs))
            .json(&EmbedRequest {
                model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| unreachable(SERVICE, &url, e))?;

        let response = check_status(SERVICE, response).await?;
        let body: EmbedResponse = response.json().await?;

        if body.embedding.is_empty() {
            return Err(CasegroundError::ProviderUnavailable(format!(
                "{} returned no embedding for model {}",
                SERVICE, model
            )));
        }

        self.cache.set(model, text, body.embedding.clone());
        Ok(body.embedding)
    }

    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }
}
