//! Message parts and the part classifier.
//!
//! Parts arrive as loosely shaped JSON records keyed by a `type` tag. The
//! tag namespace is open, so classification is total: anything that is not
//! a well-formed text, tool or reasoning record lands in [`Part::Unknown`]
//! with its payload kept verbatim.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::tool::ToolState;

/// Prefix that marks a tool invocation part; the remainder is the tool name.
pub const TOOL_PREFIX: &str = "tool-";
/// Tag of a reasoning status event.
pub const REASONING_TYPE: &str = "data-reasoning";
/// Tag of a text part.
pub const TEXT_TYPE: &str = "text";

/// Broad category of a raw part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Text,
    Tool,
    Reasoning,
    Unknown,
}

/// The `type` tag of a raw part, if it has a string one.
pub fn type_tag(part: &Value) -> Option<&str> {
    part.get("type").and_then(Value::as_str)
}

/// Tool name embedded in a `tool-<name>` tag. `None` for other tags and for
/// a bare `tool-`.
pub fn tool_name(tag: &str) -> Option<&str> {
    tag.strip_prefix(TOOL_PREFIX).filter(|name| !name.is_empty())
}

/// Classify one raw part.
pub fn classify(part: &Value) -> Category {
    let Some(tag) = type_tag(part) else {
        return Category::Unknown;
    };

    match tag {
        TEXT_TYPE if part.get("text").is_some_and(Value::is_string) => Category::Text,
        REASONING_TYPE => Category::Reasoning,
        _ if tool_name(tag).is_some() => Category::Tool,
        _ => Category::Unknown,
    }
}

/// A `text` part.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPart {
    pub text: String,
    raw: Value,
}

/// A `tool-<name>` part. Which optional fields are set depends on where the
/// invocation stands in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPart {
    pub name: String,
    pub state: Option<ToolState>,
    pub input: Option<Value>,
    pub output: Option<Value>,
    /// Error message; an empty string is stored as `None`.
    pub error_text: Option<String>,
    raw: Value,
}

impl ToolPart {
    /// The full `type` tag, e.g. `tool-search`.
    pub fn type_tag(&self) -> String {
        format!("{TOOL_PREFIX}{}", self.name)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// A `data-reasoning` part. `data` is `None` when the record has no
/// structured `data` object.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningPart {
    pub data: Option<Map<String, Value>>,
    raw: Value,
}

/// Anything the classifier did not recognise.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownPart {
    pub type_tag: Option<String>,
    raw: Value,
}

impl UnknownPart {
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// One unit of message content.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(TextPart),
    Tool(ToolPart),
    Reasoning(ReasoningPart),
    Unknown(UnknownPart),
}

impl Part {
    /// A plain text part.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Part::Text(TextPart {
            raw: json!({ "type": TEXT_TYPE, "text": text }),
            text,
        })
    }

    pub fn category(&self) -> Category {
        match self {
            Part::Text(_) => Category::Text,
            Part::Tool(_) => Category::Tool,
            Part::Reasoning(_) => Category::Reasoning,
            Part::Unknown(_) => Category::Unknown,
        }
    }

    /// The record exactly as it was received.
    pub fn raw(&self) -> &Value {
        match self {
            Part::Text(p) => &p.raw,
            Part::Tool(p) => &p.raw,
            Part::Reasoning(p) => &p.raw,
            Part::Unknown(p) => &p.raw,
        }
    }
}

impl From<Value> for Part {
    fn from(raw: Value) -> Self {
        match classify(&raw) {
            Category::Text => Part::Text(TextPart {
                text: raw
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                raw,
            }),
            Category::Tool => {
                let name = type_tag(&raw)
                    .and_then(tool_name)
                    .unwrap_or_default()
                    .to_string();
                let state = raw.get("state").map(ToolState::from_value);
                let input = raw.get("input").cloned();
                let output = raw.get("output").cloned();
                let error_text = raw
                    .get("errorText")
                    .and_then(Value::as_str)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string);
                Part::Tool(ToolPart {
                    name,
                    state,
                    input,
                    output,
                    error_text,
                    raw,
                })
            }
            Category::Reasoning => Part::Reasoning(ReasoningPart {
                data: raw.get("data").and_then(Value::as_object).cloned(),
                raw,
            }),
            Category::Unknown => Part::Unknown(UnknownPart {
                type_tag: type_tag(&raw).map(str::to_string),
                raw,
            }),
        }
    }
}

impl Serialize for Part {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Part::from)
    }
}
