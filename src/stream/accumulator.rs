//! Folding stream chunks into the agent message's parts.
//!
//! Tool parts are revised in place by `toolCallId` and text parts by block
//! id, so the parts array only ever grows while individual entries move
//! through their lifecycle states.

use std::collections::HashMap;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::chunk::StreamChunk;
use crate::transcript::{Message, Part, TOOL_PREFIX};

/// Effect of one chunk on the accumulated message.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// The parts changed; publish a new snapshot.
    Updated,
    Unchanged,
    /// The stream completed normally.
    Finished,
    /// The stream reported an error.
    Failed(String),
}

#[derive(Debug)]
struct ToolSlot {
    index: usize,
    input_buffer: String,
}

/// Builds the agent message for one request from its chunk stream.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    message_id: Option<String>,
    parts: Vec<Value>,
    text_blocks: HashMap<String, usize>,
    reasoning_blocks: HashMap<String, usize>,
    tool_calls: HashMap<String, ToolSlot>,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The agent message as it stands.
    pub fn message(&self) -> Message {
        let mut message = Message::agent(self.message_id.clone());
        message.parts = self.parts.iter().cloned().map(Part::from).collect();
        message
    }

    /// Apply one chunk.
    pub fn apply(&mut self, chunk: StreamChunk) -> ChunkOutcome {
        match chunk {
            StreamChunk::Start { message_id } => {
                self.message_id = message_id;
                ChunkOutcome::Unchanged
            }

            StreamChunk::TextStart { id } => {
                self.open_block(BlockKind::Text, id);
                ChunkOutcome::Updated
            }
            StreamChunk::TextDelta { id, delta } => self.append_block(BlockKind::Text, id, &delta),
            StreamChunk::TextEnd { id } => self.close_block(BlockKind::Text, &id),

            StreamChunk::ReasoningStart { id } => {
                self.open_block(BlockKind::Reasoning, id);
                ChunkOutcome::Updated
            }
            StreamChunk::ReasoningDelta { id, delta } => {
                self.append_block(BlockKind::Reasoning, id, &delta)
            }
            StreamChunk::ReasoningEnd { id } => self.close_block(BlockKind::Reasoning, &id),

            StreamChunk::ToolInputStart {
                tool_call_id,
                tool_name,
            } => {
                if self.tool_calls.contains_key(&tool_call_id) {
                    debug!(%tool_call_id, "Tool input restarted, keeping existing part");
                    return ChunkOutcome::Unchanged;
                }
                self.push_tool(
                    tool_call_id.clone(),
                    json!({
                        "type": format!("{TOOL_PREFIX}{tool_name}"),
                        "toolCallId": tool_call_id,
                        "state": "input-streaming",
                    }),
                );
                ChunkOutcome::Updated
            }

            StreamChunk::ToolInputDelta {
                tool_call_id,
                input_text_delta,
            } => {
                let Some(slot) = self.tool_calls.get_mut(&tool_call_id) else {
                    warn!(%tool_call_id, "Input delta for unknown tool call");
                    return ChunkOutcome::Unchanged;
                };
                slot.input_buffer.push_str(&input_text_delta);
                // Input only becomes visible once the buffered text is valid JSON.
                let Ok(input) = serde_json::from_str::<Value>(&slot.input_buffer) else {
                    return ChunkOutcome::Unchanged;
                };
                let index = slot.index;
                self.update_part(index, |part| {
                    part.insert("input".into(), input);
                })
            }

            StreamChunk::ToolInputAvailable {
                tool_call_id,
                tool_name,
                input,
            } => {
                if !self.tool_calls.contains_key(&tool_call_id) {
                    self.push_tool(
                        tool_call_id.clone(),
                        json!({
                            "type": format!("{TOOL_PREFIX}{tool_name}"),
                            "toolCallId": tool_call_id,
                        }),
                    );
                }
                let index = self.tool_calls[&tool_call_id].index;
                self.update_part(index, |part| {
                    part.insert("state".into(), json!("input-available"));
                    part.insert("input".into(), input);
                })
            }

            StreamChunk::ToolOutputAvailable {
                tool_call_id,
                output,
            } => self.update_tool(&tool_call_id, |part| {
                part.insert("state".into(), json!("output-available"));
                part.insert("output".into(), output);
                part.remove("errorText");
            }),

            StreamChunk::ToolOutputError {
                tool_call_id,
                error_text,
            } => self.update_tool(&tool_call_id, |part| {
                part.insert("state".into(), json!("output-error"));
                part.insert("errorText".into(), json!(error_text));
            }),

            StreamChunk::Data { name, id, data } => {
                self.apply_data(format!("data-{name}"), id, data);
                ChunkOutcome::Updated
            }

            StreamChunk::StartStep | StreamChunk::FinishStep => ChunkOutcome::Unchanged,

            StreamChunk::Finish | StreamChunk::Done => ChunkOutcome::Finished,

            StreamChunk::Error { error_text } => {
                let message = if error_text.is_empty() {
                    "Stream reported an error".to_string()
                } else {
                    error_text
                };
                ChunkOutcome::Failed(message)
            }

            StreamChunk::Unknown(payload) => {
                warn!(%payload, "Ignoring unrecognized stream chunk");
                ChunkOutcome::Unchanged
            }
        }
    }

    fn blocks(&mut self, kind: BlockKind) -> &mut HashMap<String, usize> {
        match kind {
            BlockKind::Text => &mut self.text_blocks,
            BlockKind::Reasoning => &mut self.reasoning_blocks,
        }
    }

    fn open_block(&mut self, kind: BlockKind, id: String) -> usize {
        let index = self.parts.len();
        self.parts.push(json!({
            "type": kind.part_type(),
            "text": "",
            "state": "streaming",
        }));
        self.blocks(kind).insert(id, index);
        index
    }

    fn append_block(&mut self, kind: BlockKind, id: String, delta: &str) -> ChunkOutcome {
        let existing = self.blocks(kind).get(&id).copied();
        let index = match existing {
            Some(index) => index,
            None => {
                warn!(%id, "Delta for unopened block, opening it");
                self.open_block(kind, id)
            }
        };
        self.update_part(index, |part| {
            let mut text = part
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            text.push_str(delta);
            part.insert("text".into(), Value::String(text));
        })
    }

    fn close_block(&mut self, kind: BlockKind, id: &str) -> ChunkOutcome {
        match self.blocks(kind).get(id).copied() {
            Some(index) => self.update_part(index, |part| {
                part.insert("state".into(), json!("done"));
            }),
            None => {
                warn!(%id, "End for unopened block");
                ChunkOutcome::Unchanged
            }
        }
    }

    fn push_tool(&mut self, tool_call_id: String, part: Value) {
        let index = self.parts.len();
        self.parts.push(part);
        self.tool_calls.insert(
            tool_call_id,
            ToolSlot {
                index,
                input_buffer: String::new(),
            },
        );
    }

    fn update_tool(
        &mut self,
        tool_call_id: &str,
        edit: impl FnOnce(&mut Map<String, Value>),
    ) -> ChunkOutcome {
        match self.tool_calls.get(tool_call_id) {
            Some(slot) => {
                let index = slot.index;
                self.update_part(index, edit)
            }
            None => {
                warn!(%tool_call_id, "Result for unknown tool call");
                ChunkOutcome::Unchanged
            }
        }
    }

    fn apply_data(&mut self, part_type: String, id: Option<String>, data: Value) {
        if let Some(id) = &id {
            let existing = self.parts.iter_mut().find(|part| {
                part.get("type").and_then(Value::as_str) == Some(part_type.as_str())
                    && part.get("id").and_then(Value::as_str) == Some(id.as_str())
            });
            if let Some(part) = existing {
                part["data"] = data;
                return;
            }
        }

        let mut part = Map::new();
        part.insert("type".into(), Value::String(part_type));
        if let Some(id) = id {
            part.insert("id".into(), Value::String(id));
        }
        part.insert("data".into(), data);
        self.parts.push(Value::Object(part));
    }

    fn update_part(
        &mut self,
        index: usize,
        edit: impl FnOnce(&mut Map<String, Value>),
    ) -> ChunkOutcome {
        match self.parts.get_mut(index).and_then(Value::as_object_mut) {
            Some(part) => {
                edit(part);
                ChunkOutcome::Updated
            }
            None => ChunkOutcome::Unchanged,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum BlockKind {
    Text,
    Reasoning,
}

impl BlockKind {
    fn part_type(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Reasoning => "reasoning",
        }
    }
}
