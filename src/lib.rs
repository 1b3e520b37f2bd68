//! querywiz Library
//!
//! Incremental terminal renderer for streamed agent transcripts.
//!
//! ## Main Components
//!
//! - [`transcript`] - Part classification and the keyed transcript view
//! - [`session`] - Submit/busy/notice state for one outstanding request
//! - [`stream`] - SSE decoding, chunk accumulation and transports
//! - [`messaging`] - Signal bus and terminal renderer
//! - [`config`] - Settings and XDG directories
//! - [`cli`] - Single-prompt, snapshot and REPL front ends
//!
//! ## Quick Start
//!
//! ```ignore
//! use querywiz::{ChatSession, HttpTransport, Screen, TerminalRenderer};
//!
//! let transport = HttpTransport::new("http://localhost:8000/api/chat");
//! let mut screen = Screen::new(TerminalRenderer::new(), std::io::stdout());
//! let mut session = ChatSession::new();
//! session.set_input("What is in the sales table?");
//! querywiz::cli::drive_request(&mut session, &transport, &mut screen).await?;
//! ```

pub mod cli;
pub mod config;
pub mod messaging;
pub mod session;
pub mod stream;
pub mod transcript;

// Re-export commonly used types
pub use cli::Screen;
pub use config::{Settings, SettingsError, XdgDirs};
pub use messaging::{SignalBus, TerminalRenderer, TransportSignal};
pub use session::ChatSession;
pub use stream::{ChatTransport, HttpTransport, ReplayTransport, TransportError};
pub use transcript::{
    classify, interpret_reasoning, render, render_unknown, resolve_tool_state, Conversation,
    Message, Part, TranscriptView,
};
