//! Backend dispatch and cumulative output

use super::{Backend, GenerationRequest};
use crate::config::Config;
use crate::error::{CasegroundError, Result};
use crate::llm::{AnthropicClient, ChatMessage, OllamaClient};
use async_stream::stream;
use futures::stream::BoxStream;
use futures::{pin_mut, Stream, StreamExt};

/// Prefix of the terminal item emitted when generation fails
pub const GENERATION_ERROR_PREFIX: &str = "生成時發生錯誤";

/// Human-readable terminal message for a failed generation
pub fn generation_error_message(error: &CasegroundError) -> String {
    format!("{}: {}", GENERATION_ERROR_PREFIX, error)
}

/// Routes generation requests to the local or hosted backend
#[derive(Clone)]
pub struct Dispatcher {
    local: OllamaClient,
    cloud: AnthropicClient,
}

impl Dispatcher {
    pub fn new(local: OllamaClient, cloud: AnthropicClient) -> Self {
        Self { local, cloud }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            OllamaClient::new(config.local.clone())?,
            AnthropicClient::new(config.cloud.clone())?,
        ))
    }

    pub fn local(&self) -> &OllamaClient {
        &self.local
    }

    /// Raw text deltas from the selected backend
    pub fn deltas(&self, request: &GenerationRequest) -> BoxStream<'static, Result<String>> {
        let user = request.user_prompt();
        tracing::debug!("Dispatching generation to {} backend", request.backend);

        match request.backend {
            Backend::Local => self.local.chat_stream(vec![
                ChatMessage::system(&request.system_instructions),
                ChatMessage::user(user),
            ]),
            Backend::Cloud => self
                .cloud
                .stream_message(&request.system_instructions, &user),
        }
    }

    /// Cumulative report text; a failure ends the stream with one error string
    pub fn generate(&self, request: &GenerationRequest) -> BoxStream<'static, String> {
        Box::pin(cumulative(self.deltas(request)))
    }
}

/// Turn a delta stream into cumulative prefixes.
///
/// Each item is the full text received so far. The first error ends the
/// stream with [`generation_error_message`] in place of report text.
pub fn cumulative<S>(deltas: S) -> impl Stream<Item = String>
where
    S: Stream<Item = Result<String>>,
{
    stream! {
        pin_mut!(deltas);
        let mut full = String::new();
        while let Some(delta) = deltas.next().await {
            match delta {
                Ok(text) => {
                    if text.is_empty() {
                        continue;
                    }
                    full.push_str(&text);
                    yield full.clone();
                }
                Err(e) => {
                    tracing::warn!("Generation failed after {} bytes: {}", full.len(), e);
                    yield generation_error_message(&e);
                    return;
                }
            }
        }
    }
}
