//! Chat session state.
//!
//! One request may be outstanding at a time. The busy flag is set by
//! [`ChatSession::submit`] and cleared by the first terminal signal of that
//! request ([`ChatSession::finish`] or [`ChatSession::fail`]); repeated
//! terminal signals are ignored.

use tracing::debug;

use crate::transcript::{Conversation, Message, Transcript, TranscriptView};

/// Session state shared by the submit action and the transport handlers.
#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
    input: String,
    busy: bool,
    notice: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn conversation(&self) -> &Conversation {
        self.transcript.conversation()
    }

    /// Submit the current input.
    ///
    /// Returns the messages to send, or `None` (changing nothing) when the
    /// input is blank or a request is already in flight.
    pub fn submit(&mut self) -> Option<Vec<Message>> {
        if self.busy {
            debug!("Submit ignored: request in flight");
            return None;
        }
        if self.input.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        self.transcript.push(Message::user(text));
        self.notice = None;
        self.busy = true;

        Some(self.transcript.conversation().messages.clone())
    }

    /// Take a newer snapshot from the transport.
    pub fn apply_snapshot(&mut self, snapshot: Conversation) {
        self.transcript.apply_snapshot(snapshot);
    }

    /// Stream completed. Returns whether this signal cleared the busy flag.
    pub fn finish(&mut self) -> bool {
        if !self.busy {
            debug!("Duplicate terminal signal ignored (finish)");
            return false;
        }
        self.busy = false;
        true
    }

    /// Stream failed. The transcript is left as it was; the error becomes
    /// the notice. Returns whether this signal cleared the busy flag.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.busy {
            debug!("Duplicate terminal signal ignored (fail)");
            return false;
        }
        self.busy = false;
        self.notice = Some(message.into());
        true
    }

    pub fn view(&self) -> TranscriptView {
        self.transcript
            .view(self.busy)
            .with_notice(self.notice.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{PartBody, Role, ToolView};
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Conversation {
        serde_json::from_value(value).unwrap()
    }

    // =========================================================================
    // submit
    // =========================================================================

    #[test]
    fn test_submit_appends_user_message_and_sets_busy() {
        let mut session = ChatSession::new();
        session.set_input("ping");

        let outbound = session.submit().expect("accepted");
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].role, Role::User);
        assert!(session.is_busy());
        assert_eq!(session.input(), "");
        assert!(session.view().working);
    }

    #[test]
    fn test_submit_blank_is_noop() {
        let mut session = ChatSession::new();
        for blank in ["", "   ", "\n\t "] {
            session.set_input(blank);
            assert!(session.submit().is_none());
            assert_eq!(session.input(), blank);
            assert!(!session.is_busy());
            assert!(session.conversation().is_empty());
        }
    }

    #[test]
    fn test_submit_while_busy_is_noop() {
        let mut session = ChatSession::new();
        session.set_input("first");
        session.submit().expect("accepted");

        session.set_input("second");
        let before = session.conversation().clone();
        assert!(session.submit().is_none());
        assert_eq!(session.conversation(), &before);
        assert_eq!(session.input(), "second");
        assert!(session.is_busy());
    }

    #[test]
    fn test_submit_keeps_text_verbatim() {
        let mut session = ChatSession::new();
        session.set_input("  padded question  ");
        let outbound = session.submit().unwrap();
        assert_eq!(
            serde_json::to_value(&outbound[0].parts[0]).unwrap(),
            json!({"type": "text", "text": "  padded question  "})
        );
    }

    // =========================================================================
    // Terminal signals
    // =========================================================================

    #[test]
    fn test_finish_is_idempotent() {
        let mut session = ChatSession::new();
        session.set_input("q");
        session.submit();

        assert!(session.finish());
        assert!(!session.finish());
        assert!(!session.fail("late error"));
        assert!(!session.is_busy());
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_fail_sets_notice_and_keeps_transcript() {
        let mut session = ChatSession::new();
        session.set_input("q");
        session.submit();
        session.apply_snapshot(snapshot(json!([
            {"role": "user", "parts": [{"type": "text", "text": "q"}]},
            {"role": "assistant", "parts": [{"type": "text", "text": "partial"}]}
        ])));

        assert!(session.fail("connection reset"));
        assert!(!session.finish());

        let view = session.view();
        assert!(!view.working);
        assert_eq!(view.notice.as_deref(), Some("connection reset"));
        assert_eq!(view.messages.len(), 2);
        assert_eq!(view.messages[1].parts[0].body, PartBody::Text("partial".into()));
    }

    #[test]
    fn test_new_submit_clears_notice() {
        let mut session = ChatSession::new();
        session.set_input("q");
        session.submit();
        session.fail("boom");

        session.set_input("again");
        session.submit().expect("accepted");
        assert!(session.notice().is_none());
        assert_eq!(session.conversation().len(), 2);
    }

    // =========================================================================
    // End to end over snapshots
    // =========================================================================

    #[test]
    fn test_tool_call_lifecycle_over_snapshots() {
        let mut session = ChatSession::new();
        session.set_input("ping");
        session.submit().unwrap();

        session.apply_snapshot(snapshot(json!([
            {"role": "user", "parts": [{"type": "text", "text": "ping"}]},
            {"role": "assistant", "parts": [
                {"type": "tool-search", "state": "input-streaming", "input": {"q": "x"}}
            ]}
        ])));
        let view = session.view();
        assert_eq!(view.messages[0].parts[0].body, PartBody::Text("ping".into()));
        assert_eq!(
            view.messages[1].parts[0].body,
            PartBody::Tool(ToolView::Invoking {
                name: "search".into(),
                input: json!({"q": "x"})
            })
        );

        session.apply_snapshot(snapshot(json!([
            {"role": "user", "parts": [{"type": "text", "text": "ping"}]},
            {"role": "assistant", "parts": [
                {"type": "tool-search", "state": "output-available", "input": {"q": "x"}, "output": {"hits": 1}}
            ]}
        ])));
        let view = session.view();
        assert_eq!(view.messages[1].parts.len(), 1);
        assert_eq!(
            view.messages[1].parts[0].body,
            PartBody::Tool(ToolView::Completed {
                name: "search".into(),
                input: Some(json!({"q": "x"})),
                output: Some(json!({"hits": 1}))
            })
        );
        assert!(view.working);

        assert!(session.finish());
        assert!(!session.view().working);
    }
}
