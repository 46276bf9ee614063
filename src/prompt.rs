//! Primitives of the supervisor/child console protocol.
//!
//! The child signals an interactive question by ending a stdout line with a
//! question mark; every preceding non-prompt line is context that belongs to
//! the same message. This trailing-`?` rule is the wire contract between the
//! two processes, so it lives here as a named, tested function rather than
//! inline matching in the streaming loop.

/// A line, ignoring trailing whitespace, that ends with `?` is a prompt.
pub fn is_prompt_line(line: &str) -> bool {
    line.trim_end().ends_with('?')
}

/// Accumulates output lines until a prompt line flushes them as one message.
#[derive(Debug, Default)]
pub struct PromptBuffer {
    pending: String,
}

impl PromptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a non-prompt line and its terminator to the pending message.
    pub fn push_line(&mut self, line: &str) {
        self.pending.push_str(line);
        self.pending.push('\n');
    }

    /// Append the prompt line itself and return the whole message, leaving
    /// the buffer empty for whatever the child prints next.
    pub fn take_with(&mut self, prompt_line: &str) -> String {
        self.pending.push_str(prompt_line);
        std::mem::take(&mut self.pending)
    }
}

/// Isolate the informative substring of a captured stderr payload.
///
/// The child writes `--` before and after its message to fence it off from
/// the terminal color-control noise its error stream otherwise carries.
/// Without a full sentinel pair the trimmed raw text is returned as-is.
pub fn extract_error(raw: &str) -> String {
    if let Some(start) = raw.find("--") {
        let inner = &raw[start + 2..];
        if let Some(end) = inner.rfind("--") {
            return inner[..end].to_string();
        }
    }
    // No full sentinel pair; a lone leading or trailing sentinel is still
    // delimiter noise, not part of the message.
    raw.trim()
        .trim_start_matches("--")
        .trim_end_matches("--")
        .trim()
        .to_string()
}
