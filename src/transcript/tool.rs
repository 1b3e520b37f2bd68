//! Tool invocation state tracking.
//!
//! The tracker keeps no state of its own. Every render reclassifies the
//! latest snapshot of a tool part from its `state` field, so out-of-order or
//! repeated deliveries always settle on whatever the newest snapshot says.

use std::fmt;

use serde_json::Value;

use super::fallback::{render_unknown, DebugView};
use super::part::ToolPart;

/// Lifecycle state carried in a tool part's `state` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolState {
    InputStreaming,
    InputAvailable,
    OutputAvailable,
    OutputError,
    Streaming,
    Done,
    /// Present but not one of the states above; holds the raw value.
    Other(String),
}

impl ToolState {
    pub fn parse(state: &str) -> Self {
        match state {
            "input-streaming" => ToolState::InputStreaming,
            "input-available" => ToolState::InputAvailable,
            "output-available" => ToolState::OutputAvailable,
            "output-error" => ToolState::OutputError,
            "streaming" => ToolState::Streaming,
            "done" => ToolState::Done,
            other => ToolState::Other(other.to_string()),
        }
    }

    /// Read a `state` field that may not even be a string.
    pub fn from_value(value: &Value) -> Self {
        match value.as_str() {
            Some(state) => Self::parse(state),
            None => ToolState::Other(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ToolState::InputStreaming => "input-streaming",
            ToolState::InputAvailable => "input-available",
            ToolState::OutputAvailable => "output-available",
            ToolState::OutputError => "output-error",
            ToolState::Streaming => "streaming",
            ToolState::Done => "done",
            ToolState::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ToolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to show for one tool part.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolView {
    /// In flight with its input known.
    Invoking { name: String, input: Value },
    /// In the input phase but `input` has not arrived yet. Renders nothing.
    Pending { name: String, state: ToolState },
    /// Resolved: the call and its result shown together.
    Completed {
        name: String,
        input: Option<Value>,
        output: Option<Value>,
    },
    Errored {
        name: String,
        error_text: Option<String>,
    },
    /// Progress signal without output or error.
    Intermediate { name: String, state: ToolState },
    /// The part has no `state` field at all.
    NoState { raw_type: String, raw_data: Value },
    /// A `state` value nobody handles.
    Unrecognized(DebugView),
}

impl ToolView {
    /// Tool name, when the view carries one.
    pub fn name(&self) -> Option<&str> {
        match self {
            ToolView::Invoking { name, .. }
            | ToolView::Pending { name, .. }
            | ToolView::Completed { name, .. }
            | ToolView::Errored { name, .. }
            | ToolView::Intermediate { name, .. } => Some(name),
            ToolView::NoState { .. } | ToolView::Unrecognized(_) => None,
        }
    }
}

/// Resolve the view for a tool part from its latest snapshot.
///
/// Terminal states win over residual fields: an `output-available` part is
/// always `Completed`, whatever `input` it still carries.
pub fn resolve_tool_state(part: &ToolPart) -> ToolView {
    let name = part.name.clone();

    let Some(state) = &part.state else {
        return ToolView::NoState {
            raw_type: part.type_tag(),
            raw_data: part.raw().clone(),
        };
    };

    match state {
        ToolState::OutputAvailable => ToolView::Completed {
            name,
            input: part.input.clone(),
            output: part.output.clone(),
        },
        ToolState::OutputError => ToolView::Errored {
            name,
            error_text: part.error_text.clone(),
        },
        ToolState::Streaming | ToolState::Done => ToolView::Intermediate {
            name,
            state: state.clone(),
        },
        ToolState::InputStreaming | ToolState::InputAvailable => match &part.input {
            Some(input) => ToolView::Invoking {
                name,
                input: input.clone(),
            },
            None => ToolView::Pending {
                name,
                state: state.clone(),
            },
        },
        ToolState::Other(_) => {
            ToolView::Unrecognized(render_unknown(Some(&part.type_tag()), part.raw()))
        }
    }
}
