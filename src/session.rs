//! Frame scanning state machine shared by the blocking and async readers.

use crate::accumulator::ErrorAccumulator;
use crate::config::StreamConfig;
use crate::decode::Decoder;
use crate::error::Error;
use crate::sse::{classify, Line};
use bytes::Bytes;

/// State owned by one stream for its whole lifetime.
pub(crate) struct Session<D> {
    accumulator: ErrorAccumulator,
    decoder: D,
    empty_messages_limit: usize,
    finished: bool,
}

/// State of a single pull. Reset on every pull.
#[derive(Debug, Default)]
pub(crate) struct Scan {
    empty_messages: usize,
    error_detected: bool,
}

impl<D: Decoder> Session<D> {
    pub(crate) fn new(config: &StreamConfig, decoder: D) -> Self {
        Self {
            accumulator: ErrorAccumulator::with_limit(config.max_error_bytes),
            decoder,
            empty_messages_limit: config.empty_messages_limit,
            finished: false,
        }
    }

    /// Start a pull. Fails once `[DONE]` has been seen.
    pub(crate) fn begin(&self) -> Result<Scan, Error> {
        if self.finished {
            return Err(Error::EndOfStream);
        }
        Ok(Scan::default())
    }

    /// Advance the pull by one read.
    ///
    /// `read` is the next line, `Ok(None)` once the source is exhausted, or
    /// the source's failure. Returns `None` when the scan should read again.
    pub(crate) fn step(
        &mut self,
        scan: &mut Scan,
        read: Result<Option<Bytes>, Error>,
    ) -> Option<Result<Bytes, Error>> {
        let line = match read {
            Ok(Some(line)) if !scan.error_detected => line,
            Ok(Some(_)) => return Some(Err(self.flagged_error())),
            Ok(None) => {
                tracing::debug!(pending = self.accumulator.bytes().len(), "source exhausted");
                return Some(Err(self.resolve(Error::EndOfStream)));
            }
            Err(e) => return Some(Err(self.resolve(e))),
        };

        match classify(&line) {
            Line::Data(payload) => {
                tracing::trace!(len = payload.len(), "data frame");
                Some(Ok(line.slice_ref(payload)))
            }
            Line::Done => {
                tracing::debug!("stream finished");
                self.finished = true;
                Some(Err(Error::EndOfStream))
            }
            Line::Error(payload) => {
                tracing::debug!("in-band error payload detected");
                scan.error_detected = true;
                self.absorb(scan, payload)
            }
            Line::Noise(noise) => {
                tracing::trace!(len = noise.len(), "noise line");
                self.absorb(scan, noise)
            }
        }
    }

    /// Route a non-frame line to the accumulator and charge it to the tolerance.
    fn absorb(&mut self, scan: &mut Scan, bytes: &[u8]) -> Option<Result<Bytes, Error>> {
        if let Err(e) = self.accumulator.write(bytes) {
            tracing::warn!(error = %e, "error accumulator rejected write");
            return Some(Err(e));
        }
        scan.empty_messages += 1;
        if scan.empty_messages > self.empty_messages_limit {
            tracing::warn!(
                limit = self.empty_messages_limit,
                "too many empty stream messages"
            );
            return Some(Err(Error::TooManyEmptyMessages {
                limit: self.empty_messages_limit,
            }));
        }
        None
    }

    /// Prefer a decodable remote error over the read failure.
    fn resolve(&self, cause: Error) -> Error {
        match self.accumulator.decode(&self.decoder) {
            Ok(Some(api)) => Error::Remote(api),
            _ => cause,
        }
    }

    /// Outcome once an error line was flagged and the read that followed succeeded.
    fn flagged_error(&self) -> Error {
        match self.accumulator.decode(&self.decoder) {
            Ok(Some(api)) => Error::Remote(api),
            Ok(None) => Error::EndOfStream,
            Err(e) => e,
        }
    }

    #[inline]
    pub(crate) fn decoder(&self) -> &D {
        &self.decoder
    }

    #[inline]
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub(crate) fn accumulated(&self) -> &[u8] {
        self.accumulator.bytes()
    }
}
