//! CLI runner: drives one request at a time and draws the transcript.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::messaging::{BusError, LiveRedraw, SignalBus, TerminalRenderer, TransportSignal};
use crate::session::ChatSession;
use crate::stream::{pump, ChatTransport};
use crate::transcript::{render, Conversation, TranscriptView};

/// Where the transcript goes, and how.
///
/// In live mode every snapshot redraws the region holding the current turn;
/// otherwise the turn is printed once, when it ends.
pub struct Screen<W: Write> {
    renderer: TerminalRenderer,
    live: Option<LiveRedraw>,
    out: W,
    first: usize,
}

impl<W: Write> Screen<W> {
    pub fn new(renderer: TerminalRenderer, out: W) -> Self {
        Self {
            renderer,
            live: None,
            out,
            first: 0,
        }
    }

    /// Redraw while the reply streams.
    pub fn with_live_redraw(mut self, live: bool) -> Self {
        self.live = live.then(LiveRedraw::for_terminal);
        self
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Start a turn whose first message has index `first`.
    pub fn begin(&mut self, first: usize) {
        self.first = first;
        if let Some(live) = self.live.as_mut() {
            live.commit(first);
        }
    }

    /// A newer view is available mid-turn.
    pub fn update(&mut self, view: &TranscriptView) -> std::io::Result<()> {
        if let Some(live) = self.live.as_mut() {
            live.draw(&self.renderer, &mut self.out, view)?;
        }
        Ok(())
    }

    /// The turn is over; leave its final state on screen.
    pub fn end(&mut self, view: &TranscriptView) -> std::io::Result<()> {
        match self.live.as_mut() {
            Some(live) => {
                live.finish(&self.renderer, &mut self.out, view)?;
                live.commit(view.messages.len());
            }
            None => {
                self.renderer.render_from(&mut self.out, view, self.first)?;
            }
        }
        self.out.flush()
    }
}

/// Submit the session's current input and follow the reply to its end.
///
/// Returns `false` without doing anything when the session refuses the
/// submit (blank input or a request already in flight). Transport failures
/// do not surface as errors; they end up as the session notice.
pub async fn drive_request<W: Write>(
    session: &mut ChatSession,
    transport: &dyn ChatTransport,
    screen: &mut Screen<W>,
) -> anyhow::Result<bool> {
    let first = session.conversation().len();
    let Some(outbound) = session.submit() else {
        return Ok(false);
    };

    screen.begin(first);
    screen.update(&session.view())?;

    info!(messages = outbound.len(), "Starting request");

    let chunks = match transport.open(&outbound).await {
        Ok(chunks) => chunks,
        Err(e) => {
            session.fail(e.to_string());
            screen.end(&session.view())?;
            return Ok(true);
        }
    };

    // Subscribe before the pump starts so no signal is missed.
    let bus = SignalBus::new();
    let mut receiver = bus.subscribe();
    tokio::spawn(pump(chunks, outbound, bus.sender()));
    drop(bus);

    loop {
        match receiver.recv().await {
            Ok(TransportSignal::Snapshot(conversation)) => {
                session.apply_snapshot(conversation);
                screen.update(&session.view())?;
            }
            Ok(TransportSignal::Finished) => {
                session.finish();
                break;
            }
            Ok(TransportSignal::Failed(message)) => {
                session.fail(message);
                break;
            }
            Err(BusError::Lagged(skipped)) => {
                debug!(skipped, "Renderer lagged, skipping to newest snapshot");
            }
            Err(e @ BusError::Closed) => {
                session.fail(e.to_string());
                break;
            }
        }
    }

    screen.end(&session.view())?;
    Ok(true)
}

/// Run a single prompt and exit. Returns whether the request succeeded.
pub async fn run_single_prompt<W: Write>(
    transport: &dyn ChatTransport,
    prompt: &str,
    screen: &mut Screen<W>,
) -> anyhow::Result<bool> {
    let mut session = ChatSession::new();
    session.set_input(prompt);

    if !drive_request(&mut session, transport, screen).await? {
        anyhow::bail!("Prompt is empty");
    }
    Ok(session.notice().is_none())
}

/// Render a saved conversation snapshot (JSON) once.
pub fn render_snapshot_file<W: Write>(path: &Path, screen: &mut Screen<W>) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let conversation = Conversation::from_snapshot_json(&text)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;

    debug!(messages = conversation.len(), "Rendering snapshot");
    screen.begin(0);
    screen.end(&render(&conversation, false))?;
    Ok(())
}

/// Get the application version string.
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
