//! Incremental agent transcript.
//!
//! Turns conversation snapshots (messages made of typed parts) into a
//! positionally keyed view:
//!
//! - [`classify`] sorts a raw part into text, tool, reasoning or unknown
//! - [`resolve_tool_state`] picks the view for a tool invocation
//! - [`interpret_reasoning`] maps reasoning status codes to phases
//! - [`render_unknown`] dumps anything else without failing
//! - [`render`] assembles the whole transcript
//!
//! Nothing in here returns an error: malformed input degrades to a debug
//! dump instead.

mod assembler;
mod fallback;
mod model;
mod part;
mod reasoning;
mod tool;

pub use assembler::{
    render, render_part, MessageView, PartBody, PartKey, PartView, Transcript, TranscriptView,
};
pub use fallback::{render_unknown, DebugView};
pub use model::{Conversation, Message, Role};
pub use part::{
    classify, tool_name, type_tag, Category, Part, ReasoningPart, TextPart, ToolPart, UnknownPart,
    REASONING_TYPE, TEXT_TYPE, TOOL_PREFIX,
};
pub use reasoning::{interpret_reasoning, reasoning_view, ReasoningView};
pub use tool::{resolve_tool_state, ToolState, ToolView};
