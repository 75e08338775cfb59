//! SSE line framing and classification.
//!
//! Handles:
//! - Partial lines across TCP chunks
//! - CRLF and LF line endings
//! - `data:` marker with an optional single space
//! - In-band `{"error":...}` payloads and the `[DONE]` sentinel

use bytes::{Bytes, BytesMut};
use memchr::memchr;

/// Marker that introduces a data record.
pub const DATA_PREFIX: &[u8] = b"data:";

/// Opening bytes of an in-band error object.
pub const ERROR_PREFIX: &[u8] = br#"{"error":"#;

/// Payload that terminates the stream.
pub const DONE: &[u8] = b"[DONE]";

/// Splits a chunked byte stream into newline-terminated lines.
pub struct LineFramer {
    buffer: BytesMut,
}

impl LineFramer {
    /// Create a new framer with default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(8192)
    }

    /// Create a new framer with specified initial capacity.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(cap),
        }
    }

    /// Feed bytes into the framer.
    #[inline]
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Take the next complete line, including its `\n`.
    /// Returns `None` if more data is needed.
    pub fn next_line(&mut self) -> Option<Bytes> {
        let end = memchr(b'\n', &self.buffer)?;
        Some(self.buffer.split_to(end + 1).freeze())
    }

    /// Drop any unterminated tail.
    pub fn discard_partial(&mut self) {
        self.buffer.clear();
    }

    /// Bytes buffered but not yet returned as a line.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single line means to the stream.
#[derive(Debug, PartialEq, Eq)]
pub enum Line<'a> {
    /// Payload of a `data:` record.
    Data(&'a [u8]),
    /// Payload of a `data:` record that opens an error object.
    Error(&'a [u8]),
    /// The `[DONE]` sentinel.
    Done,
    /// Anything else, trimmed. Blank lines, comments, `event:` fields and
    /// raw JSON bodies all land here.
    Noise(&'a [u8]),
}

/// Classify one raw line.
///
/// Surrounding whitespace is trimmed first. After the `data:` marker, a
/// leading space triggers one more trim, so `data:x`, `data: x` and
/// `data:  x  ` all yield `x`.
pub fn classify(raw: &[u8]) -> Line<'_> {
    let line = raw.trim_ascii();
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Line::Noise(line);
    };
    let payload = if payload.starts_with(b" ") {
        payload.trim_ascii()
    } else {
        payload
    };

    if payload.starts_with(ERROR_PREFIX) {
        Line::Error(payload)
    } else if payload == DONE {
        Line::Done
    } else {
        Line::Data(payload)
    }
}
