//! Blocking stream reader over any `BufRead` source.

use crate::config::StreamConfig;
use crate::decode::{Decoder, JsonDecoder};
use crate::error::Error;
use crate::session::Session;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::io::BufRead;
use std::marker::PhantomData;

/// Pull-based reader yielding `T` messages from an SSE body.
///
/// Each pull blocks until a full line is available or the source fails.
pub struct StreamReader<T, R, D = JsonDecoder> {
    reader: R,
    session: Session<D>,
    line_capacity: usize,
    _message: PhantomData<fn() -> T>,
}

impl<T, R: BufRead> StreamReader<T, R> {
    /// Create a reader with default configuration.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, &StreamConfig::default())
    }

    /// Create a reader with custom configuration.
    pub fn with_config(reader: R, config: &StreamConfig) -> Self {
        Self::with_decoder(reader, config, JsonDecoder)
    }
}

impl<T, R: BufRead, D: Decoder> StreamReader<T, R, D> {
    /// Create a reader with a custom payload decoder.
    pub fn with_decoder(reader: R, config: &StreamConfig, decoder: D) -> Self {
        Self {
            reader,
            session: Session::new(config, decoder),
            line_capacity: config.line_capacity,
            _message: PhantomData,
        }
    }

    /// Get the next frame's raw payload.
    pub fn recv_raw(&mut self) -> Result<Bytes, Error> {
        let mut scan = self.session.begin()?;
        loop {
            let read = self.read_line();
            if let Some(outcome) = self.session.step(&mut scan, read) {
                return outcome;
            }
        }
    }

    /// Get the next message.
    pub fn recv(&mut self) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let frame = self.recv_raw()?;
        self.session.decoder().decode(&frame)
    }

    /// Iterate over the remaining messages.
    ///
    /// Ends cleanly on end-of-stream; ends after yielding any other error.
    pub fn messages(&mut self) -> Messages<'_, T, R, D>
    where
        T: DeserializeOwned,
    {
        Messages {
            reader: self,
            done: false,
        }
    }

    /// Check if the `[DONE]` sentinel has been seen.
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    /// Bytes routed to the error accumulator so far.
    pub fn accumulated_error_bytes(&self) -> &[u8] {
        self.session.accumulated()
    }

    /// Get a reference to the underlying source.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Release the underlying source.
    pub fn close(self) {
        tracing::debug!(finished = self.session.is_finished(), "closing stream reader");
        drop(self.reader);
    }

    /// Read one `\n`-terminated line. A trailing fragment without `\n` is
    /// dropped and reported as exhaustion.
    fn read_line(&mut self) -> Result<Option<Bytes>, Error> {
        let mut line = Vec::with_capacity(self.line_capacity.min(1024));
        match self.reader.read_until(b'\n', &mut line)? {
            0 => Ok(None),
            _ if line.ends_with(b"\n") => Ok(Some(Bytes::from(line))),
            n => {
                tracing::debug!(bytes = n, "discarding unterminated trailing line");
                Ok(None)
            }
        }
    }
}

/// Iterator returned by [`StreamReader::messages`].
pub struct Messages<'a, T, R, D> {
    reader: &'a mut StreamReader<T, R, D>,
    done: bool,
}

impl<T, R, D> Iterator for Messages<'_, T, R, D>
where
    T: DeserializeOwned,
    R: BufRead,
    D: Decoder,
{
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.recv() {
            Ok(message) => Some(Ok(message)),
            Err(Error::EndOfStream) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
