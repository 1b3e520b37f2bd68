//! Reasoning status events.
//!
//! The backend reports agent progress as `data-reasoning` parts carrying a
//! free-form `status` code and, for tool events, a `toolName`.

use serde_json::{Map, Value};

use super::part::ReasoningPart;

/// What to show for one reasoning event.
#[derive(Debug, Clone, PartialEq)]
pub enum ReasoningView {
    Thinking,
    DoneThinking,
    CallingTool { tool_name: Option<String> },
    ToolComplete { tool_name: Option<String> },
    /// Status missing or not one we know; the whole `data` object is shown.
    Unrecognized { status: Option<String>, data: Value },
    /// The part had no structured `data`. Renders nothing.
    Omitted,
}

/// Map a reasoning `data` object to its view.
pub fn interpret_reasoning(data: &Map<String, Value>) -> ReasoningView {
    let tool_name = || {
        data.get("toolName")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    };

    match data.get("status").and_then(Value::as_str) {
        Some("thinking") => ReasoningView::Thinking,
        Some("done_thinking") => ReasoningView::DoneThinking,
        Some("calling_tool") => ReasoningView::CallingTool {
            tool_name: tool_name(),
        },
        Some("tool_complete") => ReasoningView::ToolComplete {
            tool_name: tool_name(),
        },
        status => ReasoningView::Unrecognized {
            status: status.map(str::to_string),
            data: Value::Object(data.clone()),
        },
    }
}

/// View for a classified reasoning part.
pub fn reasoning_view(part: &ReasoningPart) -> ReasoningView {
    match &part.data {
        Some(data) => interpret_reasoning(data),
        None => ReasoningView::Omitted,
    }
}
