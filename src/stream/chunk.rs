//! UI message stream chunks.
//!
//! Each SSE `data:` payload from the agent endpoint is one JSON chunk with a
//! `type` tag. `data-<name>` chunks carry custom payloads (the backend uses
//! `data-reasoning` for status events); the literal `[DONE]` ends the
//! stream.

use serde::Deserialize;
use serde_json::Value;

/// Payload that terminates the stream.
pub const DONE_MARKER: &str = "[DONE]";
const DATA_PREFIX: &str = "data-";

/// One decoded stream chunk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum StreamChunk {
    Start {
        message_id: Option<String>,
    },
    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },
    ReasoningStart {
        id: String,
    },
    ReasoningDelta {
        id: String,
        delta: String,
    },
    ReasoningEnd {
        id: String,
    },
    ToolInputStart {
        tool_call_id: String,
        tool_name: String,
    },
    ToolInputDelta {
        tool_call_id: String,
        input_text_delta: String,
    },
    ToolInputAvailable {
        tool_call_id: String,
        tool_name: String,
        #[serde(default)]
        input: Value,
    },
    ToolOutputAvailable {
        tool_call_id: String,
        #[serde(default)]
        output: Value,
    },
    ToolOutputError {
        tool_call_id: String,
        #[serde(default)]
        error_text: String,
    },
    StartStep,
    FinishStep,
    Finish,
    Error {
        #[serde(default)]
        error_text: String,
    },
    /// `data-<name>` chunk.
    #[serde(skip)]
    Data {
        name: String,
        id: Option<String>,
        data: Value,
    },
    /// `[DONE]` marker.
    #[serde(skip)]
    Done,
    /// Anything unparseable or with a tag we do not handle.
    #[serde(skip)]
    Unknown(Value),
}

impl StreamChunk {
    /// Decode one SSE data payload. Never fails; odd payloads become
    /// [`StreamChunk::Unknown`].
    pub fn parse(payload: &str) -> Self {
        let payload = payload.trim();
        if payload == DONE_MARKER {
            return StreamChunk::Done;
        }

        let value: Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(_) => return StreamChunk::Unknown(Value::String(payload.to_string())),
        };

        if let Some(name) = value
            .get("type")
            .and_then(Value::as_str)
            .and_then(|tag| tag.strip_prefix(DATA_PREFIX))
        {
            return StreamChunk::Data {
                name: name.to_string(),
                id: value.get("id").and_then(Value::as_str).map(str::to_string),
                data: value.get("data").cloned().unwrap_or(Value::Null),
            };
        }

        serde_json::from_value(value.clone()).unwrap_or(StreamChunk::Unknown(value))
    }

    /// Whether this chunk ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamChunk::Finish | StreamChunk::Done | StreamChunk::Error { .. }
        )
    }
}
