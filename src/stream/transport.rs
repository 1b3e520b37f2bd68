//! Transport seam and the pump that turns chunks into snapshots.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::accumulator::{ChunkOutcome, MessageAccumulator};
use super::chunk::StreamChunk;
use super::sse::SseDecoder;
use crate::messaging::SignalSender;
use crate::transcript::{Conversation, Message};

/// Transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Expected an event stream, endpoint sent {0}")]
    ContentType(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stream closed")]
    Closed,
}

pub type ChunkResult = Result<StreamChunk, TransportError>;

/// Receiving end of an open chunk stream.
pub struct ChunkReceiver {
    rx: mpsc::Receiver<ChunkResult>,
}

impl ChunkReceiver {
    pub fn new(rx: mpsc::Receiver<ChunkResult>) -> Self {
        Self { rx }
    }

    /// Next chunk; `None` once the stream is exhausted.
    pub async fn next(&mut self) -> Option<ChunkResult> {
        self.rx.recv().await
    }
}

/// Something that can stream an agent reply for a conversation.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Start a request with the full message history.
    async fn open(&self, messages: &[Message]) -> Result<ChunkReceiver, TransportError>;
}

/// Decode body text and forward the chunks. Returns `false` once the
/// receiver is gone.
pub(crate) async fn forward_payloads(
    payloads: Vec<String>,
    tx: &mpsc::Sender<ChunkResult>,
) -> bool {
    for payload in payloads {
        if tx.send(Ok(StreamChunk::parse(&payload))).await.is_err() {
            return false;
        }
    }
    true
}

/// Flush whatever the decoder still holds at end of body.
pub(crate) async fn forward_tail(decoder: &mut SseDecoder, tx: &mpsc::Sender<ChunkResult>) {
    if let Some(payload) = decoder.finish() {
        forward_payloads(vec![payload], tx).await;
    }
}

/// Drive one request: fold chunks into the agent message and publish a
/// snapshot after every change, then exactly one terminal signal.
///
/// `history` is the conversation sent with the request; the agent message
/// is appended after it.
pub async fn pump(mut chunks: ChunkReceiver, history: Vec<Message>, signals: SignalSender) {
    let mut accumulator = MessageAccumulator::new();

    loop {
        let chunk = match chunks.next().await {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                warn!("Transport failed: {}", e);
                signals.failed(e.to_string());
                return;
            }
            None => {
                debug!("Stream ended without a finish chunk");
                signals.finished();
                return;
            }
        };

        match accumulator.apply(chunk) {
            ChunkOutcome::Updated => {
                let mut messages = history.clone();
                messages.push(accumulator.message());
                signals.snapshot(Conversation::from(messages));
            }
            ChunkOutcome::Unchanged => {}
            ChunkOutcome::Finished => {
                debug!(parts = accumulator.message().parts.len(), "Stream finished");
                signals.finished();
                return;
            }
            ChunkOutcome::Failed(message) => {
                warn!("Stream reported error: {}", message);
                signals.failed(message);
                return;
            }
        }
    }
}
