//! Hosted generation through the Anthropic Messages API

use super::client::{build_http_client, check_status, unreachable, ChatMessage};
use super::stream::{message_deltas, sse_events};
use crate::config::CloudServiceConfig;
use crate::error::{CasegroundError, Result};
use async_stream::stream;
use futures::stream::BoxStream;
use futures::{pin_mut, StreamExt};
use serde::Serialize;

const SERVICE: &str = "Anthropic API";

/// Streaming client for the hosted model
#[derive(Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    config: CloudServiceConfig,
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    system: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    stream: bool,
}

impl AnthropicClient {
    pub fn new(config: CloudServiceConfig) -> Result<Self> {
        let http = build_http_client(config.connect_timeout_secs)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CloudServiceConfig {
        &self.config
    }

    /// Stream a single-turn message as text deltas.
    ///
    /// A missing API key, connection failure, non-success status or an
    /// `error` event is delivered as the single error item of the stream.
    pub fn stream_message(&self, system: &str, user: &str) -> BoxStream<'static, Result<String>> {
        let http = self.http.clone();
        let url = format!("{}/v1/messages", self.config.url.trim_end_matches('/'));
        let api_key = self.config.api_key.clone();
        let api_version = self.config.api_version.clone();
        let request = MessagesRequest {
            model: self.config.model.clone(),
            system: system.to_string(),
            messages: vec![ChatMessage::user(user)],
            max_tokens: self.config.max_tokens,
            stream: true,
        };

        Box::pin(stream! {
            let Some(api_key) = api_key else {
                yield Err::<String, CasegroundError>(CasegroundError::Config(
                    "ANTHROPIC_API_KEY is not set".to_string(),
                ));
                return;
            };

            tracing::debug!("Streaming message from {} with {}", url, request.model);

            let sent = http
                .post(&url)
                .header("x-api-key", api_key)
                .header("anthropic-version", api_version)
                .json(&request)
                .send()
                .await;
            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    yield Err(unreachable(SERVICE, &url, e));
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

            let deltas = message_deltas(sse_events(response.bytes_stream()));
            pin_mut!(deltas);
            while let Some(delta) = deltas.next().await {
                yield delta;
            }
        })
    }
}
