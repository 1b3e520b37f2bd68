//! Signals from the transport to the UI.

use crate::transcript::Conversation;

/// What the transport reports about the outstanding request.
///
/// A request yields zero or more snapshots followed by exactly one terminal
/// signal.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    /// Full conversation as it stands now.
    Snapshot(Conversation),
    /// Stream completed.
    Finished,
    /// Stream failed; the message is shown as a notice.
    Failed(String),
}

impl TransportSignal {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransportSignal::Snapshot(_))
    }

    pub fn failed(message: impl Into<String>) -> Self {
        TransportSignal::Failed(message.into())
    }
}
