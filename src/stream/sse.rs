//! Server-Sent Events framing.

/// Incremental SSE decoder. Feed it body text as it arrives and collect the
/// `data` payload of every completed event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    /// Trailing bytes of a UTF-8 sequence split across network chunks.
    pending: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw body bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let pending = std::mem::take(&mut self.pending);

        match std::str::from_utf8(&pending) {
            Ok(text) => self.push(text),
            Err(err) if err.error_len().is_none() => {
                let (valid, rest) = pending.split_at(err.valid_up_to());
                self.pending = rest.to_vec();
                // valid_up_to marks a char boundary.
                self.push(std::str::from_utf8(valid).unwrap_or_default())
            }
            Err(_) => self.push(&String::from_utf8_lossy(&pending)),
        }
    }

    /// Append body text; returns the payloads of events completed by it.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);
        if self.buffer.contains('\r') {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }

        let mut payloads = Vec::new();
        while let Some(event) = self.extract_event() {
            if let Some(data) = parse_event(&event) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// End of input: an event left without its blank-line terminator still
    /// counts.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        parse_event(rest.trim_end_matches('\n'))
    }

    fn extract_event(&mut self) -> Option<String> {
        let pos = self.buffer.find("\n\n")?;
        let event = self.buffer[..pos].to_string();
        self.buffer.drain(..pos + 2);
        Some(event)
    }
}

/// Join the `data` lines of one event. `None` if it has none.
fn parse_event(event: &str) -> Option<String> {
    let mut data: Option<String> = None;

    for line in event.lines() {
        if line.starts_with(':') {
            continue;
        }
        let value = match line.strip_prefix("data:") {
            Some(value) => value.strip_prefix(' ').unwrap_or(value),
            None => continue,
        };
        match data.as_mut() {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(value);
            }
            None => data = Some(value.to_string()),
        }
    }

    data
}
