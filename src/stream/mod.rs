//! Streaming transport.
//!
//! The agent endpoint answers a POST with a Server-Sent Events body of UI
//! message stream chunks. This module decodes that body, folds the chunks
//! into the growing agent message and publishes whole-conversation
//! snapshots on the signal bus:
//!
//! ```text
//! bytes ─► SseDecoder ─► StreamChunk ─► MessageAccumulator ─► TransportSignal
//! ```

mod accumulator;
mod chunk;
mod http;
mod replay;
mod sse;
mod transport;

pub use accumulator::{ChunkOutcome, MessageAccumulator};
pub use chunk::{StreamChunk, DONE_MARKER};
pub use http::HttpTransport;
pub use replay::ReplayTransport;
pub use sse::SseDecoder;
pub use transport::{pump, ChatTransport, ChunkReceiver, ChunkResult, TransportError};
