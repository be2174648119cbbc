//! Incremental decoder for the Anthropic Messages streaming format.
//!
//! Network chunks do not respect line or UTF-8 boundaries, so raw bytes are
//! buffered until a full `\n`-terminated line is available.

use serde::Deserialize;
use tracing::debug;

/// A decoded event relevant to text assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    TextDelta(String),
    MessageStop,
    Error(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<RawDelta>,
    error: Option<RawError>,
}

#[derive(Debug, Deserialize)]
struct RawDelta {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk of bytes and returns every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = parse_line(line.trim()) {
                events.push(event);
            }
        }
        events
    }
}

fn parse_line(line: &str) -> Option<StreamEvent> {
    // `event:` lines duplicate the `type` field carried in the data payload.
    let json = line.strip_prefix("data:")?.trim_start();
    if json.is_empty() || json == "[DONE]" {
        return None;
    }

    let event: RawEvent = match serde_json::from_str(json) {
        Ok(e) => e,
        Err(e) => {
            debug!("Skipping unparseable stream line: {e} - {json}");
            return None;
        }
    };

    match event.event_type.as_str() {
        "content_block_delta" => event
            .delta
            .and_then(|d| d.text)
            .map(StreamEvent::TextDelta),
        "message_stop" => Some(StreamEvent::MessageStop),
        "error" => {
            let message = event
                .error
                .map(|e| match e.error_type {
                    Some(kind) => format!("{kind}: {}", e.message),
                    None => e.message,
                })
                .unwrap_or_else(|| "unknown stream error".to_string());
            Some(StreamEvent::Error(message))
        }
        _ => None,
    }
}
