//! Transcript assembly.
//!
//! Every snapshot from the transport replaces the whole conversation; the
//! view is re-derived from scratch each time. Views are keyed by position
//! (message index, part index) so a part revised in place keeps its key and
//! only that unit counts as changed.

use tracing::trace;

use super::fallback::{render_unknown, DebugView};
use super::model::{Conversation, Message, Role};
use super::part::Part;
use super::reasoning::{reasoning_view, ReasoningView};
use super::tool::{resolve_tool_state, ToolView};

/// Positional identity of a rendered part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartKey {
    pub message: usize,
    pub part: usize,
}

impl PartKey {
    pub fn new(message: usize, part: usize) -> Self {
        Self { message, part }
    }
}

/// Rendered content of one part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartBody {
    Text(String),
    Tool(ToolView),
    Reasoning(ReasoningView),
    Debug(DebugView),
}

impl PartBody {
    /// Whether the unit draws anything at all.
    pub fn is_visible(&self) -> bool {
        !matches!(
            self,
            PartBody::Tool(ToolView::Pending { .. }) | PartBody::Reasoning(ReasoningView::Omitted)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartView {
    pub key: PartKey,
    pub body: PartBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub key: usize,
    pub role: Role,
    pub parts: Vec<PartView>,
}

/// The whole visual transcript for one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptView {
    pub messages: Vec<MessageView>,
    /// "Agent is working" indicator.
    pub working: bool,
    /// Top-level notice, e.g. a transport failure.
    pub notice: Option<String>,
}

impl TranscriptView {
    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    pub fn part(&self, key: PartKey) -> Option<&PartView> {
        self.messages
            .get(key.message)
            .and_then(|message| message.parts.get(key.part))
    }

    pub fn parts(&self) -> impl Iterator<Item = &PartView> {
        self.messages.iter().flat_map(|message| message.parts.iter())
    }

    /// Keys whose unit was added, removed or revised relative to `previous`.
    pub fn changed_keys(&self, previous: &TranscriptView) -> Vec<PartKey> {
        let mut changed: Vec<PartKey> = self
            .parts()
            .filter(|view| previous.part(view.key).map(|old| &old.body) != Some(&view.body))
            .map(|view| view.key)
            .collect();

        changed.extend(
            previous
                .parts()
                .filter(|old| self.part(old.key).is_none())
                .map(|old| old.key),
        );

        changed.sort();
        changed
    }
}

/// Classify one part and hand it to the matching interpreter.
pub fn render_part(key: PartKey, part: &Part) -> PartView {
    let body = match part {
        Part::Text(text) => PartBody::Text(text.text.clone()),
        Part::Tool(tool) => PartBody::Tool(resolve_tool_state(tool)),
        Part::Reasoning(reasoning) => PartBody::Reasoning(reasoning_view(reasoning)),
        Part::Unknown(unknown) => {
            PartBody::Debug(render_unknown(unknown.type_tag.as_deref(), unknown.raw()))
        }
    };
    PartView { key, body }
}

fn render_message(index: usize, message: &Message) -> MessageView {
    MessageView {
        key: index,
        role: message.role,
        parts: message
            .parts
            .iter()
            .enumerate()
            .map(|(part, p)| render_part(PartKey::new(index, part), p))
            .collect(),
    }
}

/// Derive the view of a conversation snapshot.
pub fn render(conversation: &Conversation, is_loading: bool) -> TranscriptView {
    TranscriptView {
        messages: conversation
            .messages
            .iter()
            .enumerate()
            .map(|(index, message)| render_message(index, message))
            .collect(),
        working: is_loading,
        notice: None,
    }
}

/// Owner of the current conversation snapshot.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    conversation: Conversation,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Replace the conversation with a newer snapshot.
    pub fn apply_snapshot(&mut self, snapshot: Conversation) {
        trace!(
            messages = snapshot.len(),
            "Applying conversation snapshot"
        );
        self.conversation = snapshot;
    }

    pub fn push(&mut self, message: Message) {
        self.conversation.push(message);
    }

    pub fn view(&self, is_loading: bool) -> TranscriptView {
        render(&self.conversation, is_loading)
    }
}
