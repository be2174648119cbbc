//! LLM client: the single point of entry for all Claude API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! All LLM interactions MUST go through this module.
//!
//! Model: claude-sonnet-4-5 (hardcoded, not configurable)

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod sse;

use sse::{SseDecoder, StreamEvent};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Stream terminated abnormally: {0}")]
    Stream(String),
}

/// Lazy, finite, non-restartable sequence of text fragments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API in streaming mode.
/// Single attempt per call: failures surface to the caller unchanged.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            endpoint: ANTHROPIC_API_URL.to_string(),
        })
    }

    /// Opens a streaming completion and returns its text deltas.
    ///
    /// Fails up front when the request cannot be sent or the API rejects it.
    /// Once streaming, an `error` event, a transport error, or the body ending
    /// before `message_stop` is yielded as the final `Err` item.
    pub async fn stream(&self, prompt: &str, system: &str) -> Result<TextStream, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        };

        let response = self
            .client
            .post(self.endpoint.as_str())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            // Try to parse error message
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("LLM stream opened (model: {MODEL})");
        Ok(decode_stream(response.bytes_stream().boxed()))
    }
}

struct DecodeState {
    bytes: BoxStream<'static, Result<Bytes, reqwest::Error>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, LlmError>>,
    stopped: bool,
    finished: bool,
}

/// Turns a raw SSE byte stream into text fragments, enforcing that the
/// stream ends with `message_stop`.
fn decode_stream(bytes: BoxStream<'static, Result<Bytes, reqwest::Error>>) -> TextStream {
    let state = DecodeState {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        stopped: false,
        finished: false,
    };

    let fragments = stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.finished {
                return None;
            }

            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    for event in st.decoder.push(&chunk) {
                        match event {
                            StreamEvent::TextDelta(text) => st.pending.push_back(Ok(text)),
                            StreamEvent::MessageStop => {
                                st.stopped = true;
                                st.finished = true;
                                break;
                            }
                            StreamEvent::Error(message) => {
                                st.pending.push_back(Err(LlmError::Stream(message)));
                                st.finished = true;
                                break;
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    st.finished = true;
                    st.pending.push_back(Err(LlmError::Http(e)));
                }
                None => {
                    st.finished = true;
                    if !st.stopped {
                        st.pending.push_back(Err(LlmError::Stream(
                            "connection closed before message_stop".to_string(),
                        )));
                    }
                }
            }
        }
    });

    Box::pin(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Router};
    use tokio::net::TcpListener;

    fn byte_stream(chunks: Vec<String>) -> BoxStream<'static, Result<Bytes, reqwest::Error>> {
        stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c)))).boxed()
    }

    fn delta(text: &str) -> String {
        format!(
            "data: {{\"type\":\"content_block_delta\",\"index\":0,\"delta\":{{\"type\":\"text_delta\",\"text\":\"{text}\"}}}}\n\n"
        )
    }

    #[tokio::test]
    async fn test_decode_stream_yields_fragments_in_order() {
        let chunks = vec![
            delta("Dear "),
            delta("Team,"),
            "data: {\"type\":\"message_stop\"}\n\n".to_string(),
        ];

        let items: Vec<_> = decode_stream(byte_stream(chunks)).collect().await;
        let texts: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(texts, vec!["Dear ".to_string(), "Team,".to_string()]);
    }

    #[tokio::test]
    async fn test_decode_stream_missing_stop_is_error() {
        let items: Vec<_> = decode_stream(byte_stream(vec![delta("partial")]))
            .collect()
            .await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(LlmError::Stream(_))));
    }

    #[tokio::test]
    async fn test_decode_stream_error_event_ends_stream() {
        let chunks = vec![
            delta("a"),
            "data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n".to_string(),
            "data: {\"type\":\"message_stop\"}\n".to_string(),
        ];
        let items: Vec<_> = decode_stream(byte_stream(chunks)).collect().await;
        assert_eq!(items.len(), 2);
        match &items[1] {
            Err(LlmError::Stream(msg)) => assert!(msg.contains("Overloaded")),
            other => panic!("expected stream error, got {other:?}"),
        }
    }

    /// Serves a fixed status and body on `/v1/messages` and returns its URL.
    async fn serve_fixed(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route("/v1/messages", post(move || async move { (status, body) }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/messages")
    }

    fn client_for(endpoint: String) -> LlmClient {
        LlmClient {
            client: Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
            api_key: "sk-test".to_string(),
            endpoint,
        }
    }

    #[tokio::test]
    async fn test_stream_surfaces_api_error_message() {
        let endpoint = serve_fixed(
            StatusCode::from_u16(529).unwrap(),
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        )
        .await;

        match client_for(endpoint).stream("prompt", "system").await.err() {
            Some(LlmError::Api { status, message }) => {
                assert_eq!(status, 529);
                assert_eq!(message, "Overloaded");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_falls_back_to_raw_error_body() {
        let endpoint = serve_fixed(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").await;

        match client_for(endpoint).stream("prompt", "system").await.err() {
            Some(LlmError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_connect_failure_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(format!("http://{addr}/v1/messages"))
            .stream("prompt", "system")
            .await
            .err();
        assert!(matches!(err, Some(LlmError::Http(_))), "got {err:?}");
    }

    #[tokio::test]
    async fn test_stream_reads_text_from_local_server() {
        let body = concat!(
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Dear \"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Team,\"}}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        let endpoint = serve_fixed(StatusCode::OK, body).await;

        let fragments = match client_for(endpoint).stream("prompt", "system").await {
            Ok(fragments) => fragments,
            Err(e) => panic!("stream failed to open: {e}"),
        };
        let texts: Vec<String> = fragments.map(|r| r.unwrap()).collect().await;
        assert_eq!(texts.concat(), "Dear Team,");
    }

    #[test]
    fn test_stream_error_display() {
        let err = LlmError::Stream("boom".to_string());
        assert_eq!(err.to_string(), "Stream terminated abnormally: boom");
    }
}
