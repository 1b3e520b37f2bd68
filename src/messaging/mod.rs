//! Messaging between the transport and the terminal.
//!
//! The transport pump publishes [`TransportSignal`]s on a [`SignalBus`]; the
//! front end applies them to the session and draws the resulting view with
//! a [`TerminalRenderer`].
//!
//! ```text
//!     ┌──────────────┐   Snapshot / Finished / Failed   ┌──────────────┐
//!     │ stream::pump │ ───────────────────────────────► │  SignalBus   │
//!     └──────────────┘                                  └──────┬───────┘
//!                                                              │ broadcast
//!                                                              ▼
//!                                   ┌──────────────┐    ┌──────────────┐
//!                                   │   Terminal   │ ◄──│ ChatSession  │
//!                                   │   Renderer   │    │   (view)     │
//!                                   └──────────────┘    └──────────────┘
//! ```

mod bus;
mod renderer;
mod types;

pub use bus::{BusError, SignalBus, SignalReceiver, SignalSender};
pub use renderer::{LiveRedraw, RenderStyle, TerminalRenderer};
pub use types::TransportSignal;
