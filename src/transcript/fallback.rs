//! Debug rendering for parts nothing else understands.

use serde_json::Value;

/// Inert structured dump of a part.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugView {
    /// The literal `type` tag, if the part had a string one.
    pub type_tag: Option<String>,
    /// The payload exactly as received.
    pub payload: Value,
}

impl DebugView {
    /// Label for the dump header.
    pub fn label(&self) -> &str {
        self.type_tag.as_deref().unwrap_or("<untyped>")
    }

    /// Pretty-printed payload.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.payload).unwrap_or_else(|_| self.payload.to_string())
    }
}

/// Build the debug view for a part. Never fails.
pub fn render_unknown(type_tag: Option<&str>, payload: &Value) -> DebugView {
    DebugView {
        type_tag: type_tag.map(str::to_string),
        payload: payload.clone(),
    }
}
