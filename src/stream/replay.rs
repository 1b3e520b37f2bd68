//! Replays a recorded SSE body instead of calling an endpoint.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::sse::SseDecoder;
use super::transport::{forward_payloads, forward_tail, ChatTransport, ChunkReceiver, TransportError};
use crate::transcript::Message;

/// Serves the same recorded stream for every request.
#[derive(Debug, Clone)]
pub struct ReplayTransport {
    body: String,
    delay: Duration,
}

impl ReplayTransport {
    pub fn from_text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let body = std::fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), bytes = body.len(), "Loaded replay body");
        Ok(Self::from_text(body))
    }

    /// Pause between chunks.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ChatTransport for ReplayTransport {
    async fn open(&self, messages: &[Message]) -> Result<ChunkReceiver, TransportError> {
        debug!(messages = messages.len(), "Replaying recorded stream");

        let mut decoder = SseDecoder::new();
        let payloads = decoder.push(&self.body);
        let delay = self.delay;
        let (tx, rx) = mpsc::channel(payloads.len().max(1) + 1);

        tokio::spawn(async move {
            for payload in payloads {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if !forward_payloads(vec![payload], &tx).await {
                    return;
                }
            }
            forward_tail(&mut decoder, &tx).await;
        });

        Ok(ChunkReceiver::new(rx))
    }
}
