//! HTTP transport speaking the UI message stream over SSE.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::sse::SseDecoder;
use super::transport::{
    forward_payloads, forward_tail, ChatTransport, ChunkReceiver, ChunkResult, TransportError,
};
use crate::transcript::Message;

const CHANNEL_CAPACITY: usize = 100;
const EVENT_STREAM: &str = "text/event-stream";

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
}

/// POSTs the conversation to a chat endpoint and streams the reply.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    protocol: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            protocol: "data".to_string(),
        }
    }

    /// Value of the `protocol` query parameter.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, messages: &[Message]) -> Result<ChunkReceiver, TransportError> {
        debug!(endpoint = %self.endpoint, messages = messages.len(), "Opening chat stream");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("protocol", self.protocol.as_str())])
            .json(&ChatRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Chat endpoint rejected request");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        check_content_type(response.headers())?;

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let stream = response.bytes_stream();
        tokio::spawn(async move {
            process_stream(stream, tx).await;
        });

        Ok(ChunkReceiver::new(rx))
    }
}

/// Only SSE bodies can be decoded. A missing header is let through.
fn check_content_type(headers: &HeaderMap) -> Result<(), TransportError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(());
    };
    let content_type = value.to_str().unwrap_or_default();
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    if media_type.eq_ignore_ascii_case(EVENT_STREAM) {
        Ok(())
    } else {
        warn!(content_type, "Chat endpoint did not answer with an event stream");
        Err(TransportError::ContentType(content_type.to_string()))
    }
}

/// Feed a byte stream through the SSE decoder into the chunk channel.
async fn process_stream<S, B>(stream: S, tx: mpsc::Sender<ChunkResult>)
where
    S: Stream<Item = Result<B, reqwest::Error>>,
    B: AsRef<[u8]>,
{
    let mut stream = Box::pin(stream);
    let mut decoder = SseDecoder::new();

    while let Some(item) = stream.next().await {
        match item {
            Ok(bytes) => {
                let payloads = decoder.push_bytes(bytes.as_ref());
                if !forward_payloads(payloads, &tx).await {
                    debug!("Chunk receiver dropped, abandoning stream");
                    return;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(TransportError::Http(e))).await;
                return;
            }
        }
    }

    forward_tail(&mut decoder, &tx).await;
}
