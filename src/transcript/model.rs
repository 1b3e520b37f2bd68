//! Conversation and message types.
//!
//! A conversation is what the transport delivers on every update: the full
//! ordered list of messages, each with its full ordered list of parts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::part::Part;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Agent,
}

impl Role {
    /// Role name used on the wire.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "assistant",
        }
    }

    /// Label shown above a message block.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Agent => "Agent",
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Anything that is not the user speaks for the agent side.
        Ok(if raw == "user" { Role::User } else { Role::Agent })
    }
}

/// One message: a role and its parts in render order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Message {
    /// A user message holding a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// An agent message with no parts yet.
    pub fn agent(id: Option<String>) -> Self {
        Self {
            id,
            role: Role::Agent,
            parts: Vec::new(),
        }
    }
}

/// Ordered list of messages. Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Parse a snapshot document: either a bare array of messages or an
    /// object with a `messages` array.
    pub fn from_snapshot_json(text: &str) -> serde_json::Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Snapshot {
            Bare(Vec<Message>),
            Wrapped { messages: Vec<Message> },
        }

        Ok(match serde_json::from_str::<Snapshot>(text)? {
            Snapshot::Bare(messages) | Snapshot::Wrapped { messages } => Self { messages },
        })
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}
