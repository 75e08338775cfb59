//! Append-only buffer for bytes that may form an in-band error object.

use crate::decode::Decoder;
use crate::error::{ApiError, Error, ErrorResponse};
use bytes::BytesMut;

/// Collects non-frame bytes and decodes them as an [`ErrorResponse`] on demand.
#[derive(Debug, Default)]
pub struct ErrorAccumulator {
    buffer: BytesMut,
    limit: Option<usize>,
}

impl ErrorAccumulator {
    /// Create an accumulator without a size cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator that refuses to grow past `limit` bytes.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            buffer: BytesMut::new(),
            limit,
        }
    }

    /// Append a chunk. Fails without writing if the cap would be exceeded.
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), Error> {
        if let Some(limit) = self.limit {
            if self.buffer.len() + chunk.len() > limit {
                return Err(Error::ErrorBufferFull { limit });
            }
        }
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    /// Everything written so far.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Decode the buffer as an error response.
    ///
    /// Returns `Ok(None)` when nothing was accumulated or the object carries
    /// no `error` member.
    pub fn decode<D: Decoder>(&self, decoder: &D) -> Result<Option<ApiError>, Error> {
        if self.is_empty() {
            return Ok(None);
        }
        let resp: ErrorResponse = decoder.decode(&self.buffer)?;
        Ok(resp.error)
    }
}
