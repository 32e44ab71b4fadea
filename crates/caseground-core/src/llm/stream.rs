//! Wire framing for streamed generation responses
//!
//! Both backends deliver a byte stream. Ollama frames it as one JSON object
//! per line; Anthropic uses server-sent events. The adapters here reduce
//! either to a stream of text deltas.

use crate::error::{CasegroundError, Result};
use async_stream::stream;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::{pin_mut, Stream, StreamExt};
use serde::Deserialize;

/// Split a byte stream into lines.
///
/// Bytes are buffered until a newline arrives, so multi-byte characters
/// split across network chunks decode correctly. A trailing line without a
/// newline is emitted at the end.
pub fn lines<S, B, E>(bytes: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<CasegroundError>,
{
    stream! {
        pin_mut!(bytes);
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => buffer.extend_from_slice(chunk.as_ref()),
                Err(e) => {
                    yield Err::<String, CasegroundError>(e.into());
                    return;
                }
            }

            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                if let Some(line) = decode_line(line) {
                    yield Ok(line);
                }
            }
        }

        if !buffer.is_empty() {
            if let Some(line) = decode_line(buffer) {
                yield Ok(line);
            }
        }
    }
}

/// Lines that are not valid UTF-8 are logged and dropped
fn decode_line(raw: Vec<u8>) -> Option<String> {
    match String::from_utf8(raw) {
        Ok(line) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        Err(e) => {
            tracing::warn!("Skipping stream line with invalid UTF-8: {}", e);
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatFrame {
    #[serde(default)]
    message: Option<FrameMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FrameMessage {
    #[serde(default)]
    content: String,
}

/// Text deltas from newline-delimited Ollama chat frames.
///
/// Lines that are not valid JSON are logged and skipped. A frame with
/// `done: true` ends the stream; an `error` frame ends it with an error.
pub fn ndjson_deltas<S>(lines: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = Result<String>>,
{
    stream! {
        pin_mut!(lines);

        while let Some(line) = lines.next().await {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let frame: ChatFrame = match serde_json::from_str(&line) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!("Skipping malformed stream frame: {}", e);
                    continue;
                }
            };

            if let Some(error) = frame.error {
                yield Err(CasegroundError::Llm(error));
                return;
            }
            if let Some(message) = frame.message {
                if !message.content.is_empty() {
                    yield Ok(message.content);
                }
            }
            if frame.done {
                return;
            }
        }
    }
}

/// Decode a byte stream as server-sent events.
///
/// Transport errors keep their own kind; a stream that cannot be decoded
/// as UTF-8 or as event syntax becomes [`CasegroundError::Llm`].
pub fn sse_events<S, B, E>(bytes: S) -> impl Stream<Item = Result<Event>>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<CasegroundError> + std::fmt::Display,
{
    bytes.eventsource().map(|event| event.map_err(event_stream_error))
}

fn event_stream_error<E>(error: EventStreamError<E>) -> CasegroundError
where
    E: Into<CasegroundError> + std::fmt::Display,
{
    match error {
        EventStreamError::Transport(e) => e.into(),
        other => CasegroundError::Llm(format!("invalid event stream: {}", other)),
    }
}

#[derive(Debug, Deserialize)]
struct MessageEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    delta: Option<TextDelta>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct TextDelta {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Text deltas from Anthropic Messages API events.
///
/// `content_block_delta` events carry text, `message_stop` ends the stream
/// and an `error` event ends it with an error. Other event types (`ping`,
/// `message_start`, ...) carry no text and are ignored.
pub fn message_deltas<S>(events: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = Result<Event>>,
{
    stream! {
        pin_mut!(events);

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            if event.data.is_empty() {
                continue;
            }

            let parsed: MessageEvent = match serde_json::from_str(&event.data) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Skipping malformed stream event: {}", e);
                    continue;
                }
            };

            match parsed.kind.as_str() {
                "content_block_delta" => {
                    if let Some(text) = parsed.delta.and_then(|d| d.text) {
                        if !text.is_empty() {
                            yield Ok(text);
                        }
                    }
                }
                "message_stop" => return,
                "error" => {
                    let error = parsed.error.unwrap_or(ApiError {
                        kind: "unknown_error".to_string(),
                        message: String::new(),
                    });
                    yield Err(CasegroundError::ExternalError(format!(
                        "{}: {}",
                        error.kind, error.message
                    )));
                    return;
                }
                _ => {}
            }
        }
    }
}
