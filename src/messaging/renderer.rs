//! Terminal renderer for transcript views.

use crate::transcript::{
    DebugView, MessageView, PartBody, PartView, ReasoningView, Role, ToolView, TranscriptView,
};
use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
    QueueableCommand,
};
use serde_json::Value;
use std::io::{self, Write};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};
use tracing::debug;
use unicode_width::UnicodeWidthChar;

const DEFAULT_WIDTH: u16 = 60;
const BANNER_INPUT_LIMIT: usize = 80;

/// Render style configuration.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub user_color: Color,
    pub agent_color: Color,
    pub tool_color: Color,
    pub success_color: Color,
    pub error_color: Color,
    pub reasoning_color: Color,
    pub debug_color: Color,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            user_color: Color::Cyan,
            agent_color: Color::Magenta,
            tool_color: Color::Yellow,
            success_color: Color::Green,
            error_color: Color::Red,
            reasoning_color: Color::DarkCyan,
            debug_color: Color::DarkGrey,
        }
    }
}

/// Draws a [`TranscriptView`] to any writer.
pub struct TerminalRenderer {
    style: RenderStyle,
    color: bool,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl TerminalRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self::with_style(RenderStyle::default())
    }

    /// Create with custom style.
    pub fn with_style(style: RenderStyle) -> Self {
        Self {
            style,
            color: true,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Turn ANSI styling on or off.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Render the whole view.
    pub fn render(&self, out: &mut dyn Write, view: &TranscriptView) -> io::Result<()> {
        self.render_from(out, view, 0)
    }

    /// Render messages from index `first` onwards, then the status lines.
    pub fn render_from(
        &self,
        out: &mut dyn Write,
        view: &TranscriptView,
        first: usize,
    ) -> io::Result<()> {
        for message in view.messages.iter().skip(first) {
            self.render_message(out, message)?;
        }

        if view.working {
            self.paint_attr(out, self.style.agent_color, Attribute::Dim, "⋯ working\n")?;
        }
        if let Some(notice) = &view.notice {
            self.paint_bold(out, self.style.error_color, "! ")?;
            self.paint(out, self.style.error_color, notice)?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn render_message(&self, out: &mut dyn Write, message: &MessageView) -> io::Result<()> {
        let color = match message.role {
            Role::User => self.style.user_color,
            Role::Agent => self.style.agent_color,
        };
        self.paint_bold(out, color, message.role.label())?;
        self.paint_bold(out, color, ":\n")?;

        for part in message.parts.iter().filter(|p| p.body.is_visible()) {
            self.render_part(out, part)?;
        }
        writeln!(out)
    }

    fn render_part(&self, out: &mut dyn Write, part: &PartView) -> io::Result<()> {
        match &part.body {
            PartBody::Text(text) => {
                out.write_all(text.as_bytes())?;
                if !text.ends_with('\n') {
                    writeln!(out)?;
                }
                Ok(())
            }
            PartBody::Tool(view) => self.render_tool(out, view),
            PartBody::Reasoning(view) => self.render_reasoning(out, view),
            PartBody::Debug(view) => self.render_debug(out, view),
        }
    }

    /// Render one tool view.
    fn render_tool(&self, out: &mut dyn Write, view: &ToolView) -> io::Result<()> {
        match view {
            ToolView::Invoking { name, input } => {
                self.paint(out, self.style.tool_color, "→ ")?;
                self.paint_bold(out, self.style.tool_color, name)?;
                out.write_all(b" ")?;
                self.paint_attr(
                    out,
                    self.style.debug_color,
                    Attribute::Dim,
                    &truncate(&input.to_string(), BANNER_INPUT_LIMIT),
                )?;
                writeln!(out)
            }
            ToolView::Pending { .. } => Ok(()),
            ToolView::Completed {
                name,
                input,
                output,
            } => {
                self.paint(out, self.style.success_color, "✓ ")?;
                self.paint_bold(out, self.style.success_color, name)?;
                writeln!(out)?;
                if let Some(input) = input {
                    self.render_field(out, "input", input)?;
                }
                if let Some(output) = output {
                    self.render_field(out, "output", output)?;
                }
                Ok(())
            }
            ToolView::Errored { name, error_text } => {
                self.paint(out, self.style.error_color, "✗ ")?;
                self.paint_bold(out, self.style.error_color, name)?;
                writeln!(out)?;
                if let Some(error) = error_text {
                    out.write_all(b"  ")?;
                    self.paint(out, self.style.error_color, error)?;
                    writeln!(out)?;
                }
                Ok(())
            }
            ToolView::Intermediate { name, state } => {
                self.paint(out, self.style.tool_color, "… ")?;
                self.paint_bold(out, self.style.tool_color, name)?;
                self.paint_attr(
                    out,
                    self.style.debug_color,
                    Attribute::Dim,
                    &format!(" ({})", state),
                )?;
                writeln!(out)
            }
            ToolView::NoState { raw_type, raw_data } => {
                self.paint(out, self.style.tool_color, "? ")?;
                self.paint_bold(out, self.style.tool_color, raw_type)?;
                self.paint_attr(out, self.style.debug_color, Attribute::Dim, " (no state)\n")?;
                self.render_json_block(out, raw_type, raw_data)
            }
            ToolView::Unrecognized(debug) => self.render_debug(out, debug),
        }
    }

    fn render_field(&self, out: &mut dyn Write, label: &str, value: &Value) -> io::Result<()> {
        self.paint_attr(
            out,
            self.style.debug_color,
            Attribute::Dim,
            &format!("  {}: ", label),
        )?;
        out.write_all(value.to_string().as_bytes())?;
        writeln!(out)
    }

    /// Render one reasoning status line.
    fn render_reasoning(&self, out: &mut dyn Write, view: &ReasoningView) -> io::Result<()> {
        let line = match view {
            ReasoningView::Thinking => "thinking…".to_string(),
            ReasoningView::DoneThinking => "done thinking".to_string(),
            ReasoningView::CallingTool { tool_name } => {
                format!("invoking tool {}", tool_name.as_deref().unwrap_or("unknown"))
            }
            ReasoningView::ToolComplete { tool_name } => {
                format!("tool {} finished", tool_name.as_deref().unwrap_or("unknown"))
            }
            ReasoningView::Unrecognized { status, data } => {
                let label = match status {
                    Some(status) => format!("reasoning status {:?}", status),
                    None => "reasoning without status".to_string(),
                };
                self.paint_attr(
                    out,
                    self.style.reasoning_color,
                    Attribute::Dim,
                    &format!("· {}\n", label),
                )?;
                return self.render_json_block(out, "data-reasoning", data);
            }
            ReasoningView::Omitted => return Ok(()),
        };

        self.paint_attr(
            out,
            self.style.reasoning_color,
            Attribute::Dim,
            &format!("· {}\n", line),
        )
    }

    fn render_debug(&self, out: &mut dyn Write, view: &DebugView) -> io::Result<()> {
        self.render_json_block(out, view.label(), &view.payload)
    }

    /// Render a JSON payload as a framed block, highlighted when color is on.
    fn render_json_block(&self, out: &mut dyn Write, label: &str, value: &Value) -> io::Result<()> {
        let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());

        self.paint(out, self.style.debug_color, &format!("┌── {}\n", label))?;

        let mut highlighter = self.color.then(|| {
            let syntax = self
                .syntax_set
                .find_syntax_by_extension("json")
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
            HighlightLines::new(syntax, &self.theme_set.themes["base16-ocean.dark"])
        });

        for line in LinesWithEndings::from(&pretty) {
            self.paint(out, self.style.debug_color, "│ ")?;
            match highlighter
                .as_mut()
                .map(|h| h.highlight_line(line, &self.syntax_set))
            {
                Some(Ok(ranges)) => {
                    out.write_all(as_24_bit_terminal_escaped(&ranges[..], false).as_bytes())?;
                    out.queue(ResetColor)?;
                }
                _ => out.write_all(line.as_bytes())?,
            }
        }
        if !pretty.ends_with('\n') {
            writeln!(out)?;
        }

        self.paint(out, self.style.debug_color, "└──\n")
    }

    fn paint(&self, out: &mut dyn Write, color: Color, text: &str) -> io::Result<()> {
        if self.color {
            out.queue(SetForegroundColor(color))?
                .queue(Print(text))?
                .queue(ResetColor)?;
        } else {
            out.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    fn paint_bold(&self, out: &mut dyn Write, color: Color, text: &str) -> io::Result<()> {
        self.paint_attr(out, color, Attribute::Bold, text)
    }

    fn paint_attr(
        &self,
        out: &mut dyn Write,
        color: Color,
        attr: Attribute,
        text: &str,
    ) -> io::Result<()> {
        if self.color {
            out.queue(SetForegroundColor(color))?
                .queue(SetAttribute(attr))?
                .queue(Print(text))?
                .queue(SetAttribute(Attribute::Reset))?
                .queue(ResetColor)?;
        } else {
            out.write_all(text.as_bytes())?;
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Redraws the live region of the terminal as snapshots arrive.
///
/// Only the messages from `first` onwards are drawn, so earlier turns stay
/// in the scrollback untouched. A frame that would not fit in the viewport
/// cannot be cleared by moving the cursor up, so once that happens only the
/// status lines are redrawn until [`LiveRedraw::finish`] prints the turn.
#[derive(Debug, Default)]
pub struct LiveRedraw {
    previous: Option<TranscriptView>,
    first: usize,
    rows: usize,
    viewport: Option<usize>,
    overflowed: bool,
}

impl LiveRedraw {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live redraw bounded by the current terminal height, if known.
    pub fn for_terminal() -> Self {
        Self {
            viewport: terminal_rows(),
            ..Self::default()
        }
    }

    /// Bound frames to `rows` terminal rows.
    pub fn with_viewport(mut self, rows: usize) -> Self {
        self.viewport = Some(rows);
        self
    }

    /// Whether the current turn outgrew the viewport.
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Whether `view` differs visibly from the last frame.
    pub fn needs_redraw(&self, view: &TranscriptView) -> bool {
        match &self.previous {
            None => true,
            Some(previous) => {
                !view.changed_keys(previous).is_empty()
                    || previous.working != view.working
                    || previous.notice != view.notice
            }
        }
    }

    /// Draw `view` over the previous frame. Returns whether anything was
    /// written.
    pub fn draw(
        &mut self,
        renderer: &TerminalRenderer,
        out: &mut dyn Write,
        view: &TranscriptView,
    ) -> io::Result<bool> {
        if !self.needs_redraw(view) {
            return Ok(false);
        }

        let columns = terminal_columns();
        let mut frame = self.frame(renderer, view)?;
        let mut rows = count_rows(&frame, columns);

        // Keep one row free for the cursor.
        if !self.overflowed && self.viewport.is_some_and(|height| rows >= height) {
            debug!(rows, "Frame taller than the terminal, redrawing status only");
            self.overflowed = true;
            frame = self.frame(renderer, view)?;
            rows = count_rows(&frame, columns);
        }

        self.replace(out, &frame)?;
        self.rows = rows;
        self.previous = Some(view.clone());
        Ok(true)
    }

    /// Leave the final state of the turn on screen.
    pub fn finish(
        &mut self,
        renderer: &TerminalRenderer,
        out: &mut dyn Write,
        view: &TranscriptView,
    ) -> io::Result<()> {
        if !self.overflowed {
            self.draw(renderer, out, view)?;
            return Ok(());
        }

        let mut frame = Vec::new();
        renderer.render_from(&mut frame, view, self.first)?;
        self.replace(out, &frame)?;
        self.rows = 0;
        self.previous = Some(view.clone());
        Ok(())
    }

    /// Freeze what has been drawn; the next frame starts at message `first`.
    pub fn commit(&mut self, first: usize) {
        self.first = first;
        self.rows = 0;
        self.previous = None;
        self.overflowed = false;
    }

    fn frame(&self, renderer: &TerminalRenderer, view: &TranscriptView) -> io::Result<Vec<u8>> {
        let mut frame = Vec::new();
        if self.overflowed {
            let status = TranscriptView {
                messages: Vec::new(),
                working: view.working,
                notice: view.notice.clone(),
            };
            renderer.render_from(&mut frame, &status, 0)?;
        } else {
            renderer.render_from(&mut frame, view, self.first)?;
        }
        Ok(frame)
    }

    /// Clear the previous frame and write `frame` in its place.
    fn replace(&self, out: &mut dyn Write, frame: &[u8]) -> io::Result<()> {
        if self.rows > 0 {
            out.queue(MoveUp(self.rows.min(u16::MAX as usize) as u16))?
                .queue(MoveToColumn(0))?
                .queue(Clear(ClearType::FromCursorDown))?;
        }
        out.write_all(frame)?;
        out.flush()
    }
}

fn terminal_columns() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH as usize)
        .max(1)
}

fn terminal_rows() -> Option<usize> {
    terminal_size::terminal_size().map(|(_, terminal_size::Height(h))| (h as usize).max(1))
}

/// Terminal rows taken by `frame`, counting soft wraps.
fn count_rows(frame: &[u8], columns: usize) -> usize {
    let text = String::from_utf8_lossy(frame);
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
        .iter()
        .map(|line| visible_width(line).div_ceil(columns).max(1))
        .sum()
}

/// Display width in columns, ignoring ANSI escape sequences.
fn visible_width(line: &str) -> usize {
    let mut width = 0;
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // CSI: skip to the final byte.
            for nc in chars.by_ref() {
                if nc.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            width += c.width().unwrap_or(0);
        }
    }
    width
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{render, Conversation};
    use serde_json::json;

    fn plain() -> TerminalRenderer {
        TerminalRenderer::new().with_color(false)
    }

    fn draw(view: &TranscriptView) -> String {
        let mut out = Vec::new();
        plain().render(&mut out, view).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn view_of(value: serde_json::Value, working: bool) -> TranscriptView {
        let conversation: Conversation = serde_json::from_value(value).unwrap();
        render(&conversation, working)
    }

    // =========================================================================
    // Renderer Tests
    // =========================================================================

    #[test]
    fn test_renderer_creation() {
        let renderer = TerminalRenderer::new();
        assert_eq!(renderer.style.success_color, Color::Green);
        assert!(renderer.color());
    }

    #[test]
    fn test_custom_style() {
        let style = RenderStyle {
            success_color: Color::Blue,
            ..Default::default()
        };
        let renderer = TerminalRenderer::with_style(style);
        assert_eq!(renderer.style.success_color, Color::Blue);
    }

    #[test]
    fn test_text_and_headers() {
        let out = draw(&view_of(
            json!([
                {"role": "user", "parts": [{"type": "text", "text": "ping"}]},
                {"role": "assistant", "parts": [{"type": "text", "text": "**pong**"}]}
            ]),
            false,
        ));
        assert_eq!(out, "You:\nping\n\nAgent:\n**pong**\n\n");
    }

    #[test]
    fn test_tool_views() {
        let out = draw(&view_of(
            json!([{"role": "assistant", "parts": [
                {"type": "tool-search", "state": "input-available", "input": {"q": "x"}},
                {"type": "tool-search", "state": "output-available", "input": {"q": "x"}, "output": [1]},
                {"type": "tool-fetch", "state": "output-error", "errorText": "timeout"},
                {"type": "tool-fetch", "state": "streaming"},
                {"type": "tool-fetch", "state": "input-streaming"}
            ]}]),
            false,
        ));
        assert!(out.contains("→ search {\"q\":\"x\"}\n"));
        assert!(out.contains("✓ search\n  input: {\"q\":\"x\"}\n  output: [1]\n"));
        assert!(out.contains("✗ fetch\n  timeout\n"));
        assert!(out.contains("… fetch (streaming)\n"));
        assert_eq!(out.matches("fetch").count(), 2);
    }

    #[test]
    fn test_tool_without_state_dumps_raw() {
        let out = draw(&view_of(
            json!([{"role": "assistant", "parts": [{"type": "tool-x", "foo": 1}]}]),
            false,
        ));
        assert!(out.contains("? tool-x (no state)\n"));
        assert!(out.contains("│   \"foo\": 1"));
    }

    #[test]
    fn test_reasoning_lines() {
        let out = draw(&view_of(
            json!([{"role": "assistant", "parts": [
                {"type": "data-reasoning", "data": {"status": "thinking"}},
                {"type": "data-reasoning", "data": {"status": "calling_tool"}},
                {"type": "data-reasoning", "data": {"status": "tool_complete", "toolName": "search"}},
                {"type": "data-reasoning", "data": {"status": "done_thinking"}},
                {"type": "data-reasoning"}
            ]}]),
            false,
        ));
        assert_eq!(
            out,
            "Agent:\n· thinking…\n· invoking tool unknown\n· tool search finished\n· done thinking\n\n"
        );
    }

    #[test]
    fn test_unknown_part_block() {
        let out = draw(&view_of(
            json!([{"role": "assistant", "parts": [{"type": "source-url", "url": "u"}]}]),
            false,
        ));
        assert!(out.contains("┌── source-url\n"));
        assert!(out.contains("│   \"url\": \"u\"\n"));
        assert!(out.contains("└──\n"));
    }

    #[test]
    fn test_working_and_notice() {
        let view = view_of(json!([]), true).with_notice(Some("HTTP 500".into()));
        assert_eq!(draw(&view), "⋯ working\n! HTTP 500\n");
    }

    #[test]
    fn test_color_output_has_escapes() {
        let view = view_of(
            json!([{"role": "assistant", "parts": [{"type": "mystery", "n": 1}]}]),
            false,
        );
        let mut out = Vec::new();
        TerminalRenderer::new().render(&mut out, &view).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\x1b'));
        assert!(text.contains("mystery"));
    }

    // =========================================================================
    // LiveRedraw Tests
    // =========================================================================

    #[test]
    fn test_live_redraw_skips_unchanged() {
        let renderer = plain();
        let mut live = LiveRedraw::new();
        let view = view_of(
            json!([{"role": "user", "parts": [{"type": "text", "text": "hi"}]}]),
            true,
        );

        let mut out = Vec::new();
        assert!(live.draw(&renderer, &mut out, &view).unwrap());
        assert!(!live.draw(&renderer, &mut out, &view.clone()).unwrap());

        let done = TranscriptView {
            working: false,
            ..view
        };
        assert!(live.draw(&renderer, &mut out, &done).unwrap());
    }

    #[test]
    fn test_live_redraw_clears_previous_frame() {
        let renderer = plain();
        let mut live = LiveRedraw::new();
        let first = view_of(
            json!([{"role": "assistant", "parts": [{"type": "text", "text": "a"}]}]),
            true,
        );
        let second = view_of(
            json!([{"role": "assistant", "parts": [{"type": "text", "text": "ab"}]}]),
            true,
        );

        let mut out = Vec::new();
        live.draw(&renderer, &mut out, &first).unwrap();
        let before = out.len();
        live.draw(&renderer, &mut out, &second).unwrap();

        let redraw = String::from_utf8_lossy(&out[before..]).to_string();
        assert!(redraw.starts_with('\x1b'));
        assert!(redraw.ends_with("Agent:\nab\n\n⋯ working\n"));
    }

    #[test]
    fn test_live_redraw_commit_starts_new_region() {
        let renderer = plain();
        let mut live = LiveRedraw::new();
        let view = view_of(
            json!([
                {"role": "user", "parts": [{"type": "text", "text": "one"}]},
                {"role": "user", "parts": [{"type": "text", "text": "two"}]}
            ]),
            false,
        );
        live.commit(1);

        let mut out = Vec::new();
        live.draw(&renderer, &mut out, &view).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "You:\ntwo\n\n");
    }

    #[test]
    fn test_live_redraw_tall_frame_shows_status_until_finish() {
        let renderer = plain();
        let mut live = LiveRedraw::new().with_viewport(6);
        let short = view_of(
            json!([{"role": "assistant", "parts": [{"type": "text", "text": "a"}]}]),
            true,
        );
        let tall = view_of(
            json!([{"role": "assistant", "parts": [{"type": "text", "text": "a\nb\nc\nd"}]}]),
            true,
        );
        let done = view_of(
            json!([{"role": "assistant", "parts": [{"type": "text", "text": "a\nb\nc\nd\ne"}]}]),
            false,
        );

        let mut out = Vec::new();
        live.draw(&renderer, &mut out, &short).unwrap();
        assert!(!live.is_overflowed());

        let before = out.len();
        live.draw(&renderer, &mut out, &tall).unwrap();
        assert!(live.is_overflowed());
        let status = String::from_utf8_lossy(&out[before..]).to_string();
        assert!(status.ends_with("⋯ working\n"));
        assert!(!status.contains("Agent:"));

        let before = out.len();
        live.finish(&renderer, &mut out, &done).unwrap();
        let last = String::from_utf8_lossy(&out[before..]).to_string();
        assert!(last.ends_with("Agent:\na\nb\nc\nd\ne\n\n"));
        assert!(!last.contains("working"));

        live.commit(1);
        assert!(!live.is_overflowed());
    }

    #[test]
    fn test_live_redraw_finish_without_overflow_draws_frame() {
        let renderer = plain();
        let mut live = LiveRedraw::new().with_viewport(40);
        let view = view_of(
            json!([{"role": "user", "parts": [{"type": "text", "text": "hi"}]}]),
            false,
        );

        let mut out = Vec::new();
        live.finish(&renderer, &mut out, &view).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "You:\nhi\n\n");
    }

    #[test]
    fn test_count_rows_wraps() {
        assert_eq!(count_rows(b"abc\nde\n", 80), 2);
        assert_eq!(count_rows(b"abcdef\n", 3), 2);
        assert_eq!(count_rows(b"\n\n", 10), 2);
        assert_eq!(count_rows(b"\x1b[31mab\x1b[0m\n", 2), 1);
    }

    #[test]
    fn test_count_rows_wide_characters() {
        let cjk = "数".repeat(40) + "\n";
        assert_eq!(count_rows(cjk.as_bytes(), 60), 2);
        assert_eq!(count_rows(cjk.as_bytes(), 80), 1);
        assert_eq!(visible_width("🦀ok"), 4);
        assert_eq!(visible_width("\x1b[1m数\x1b[0m"), 2);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééé", 6), "ééé...");
    }
}
