//! Async stream reader over a chunked response body.

use crate::config::StreamConfig;
use crate::decode::{Decoder, JsonDecoder};
use crate::error::Error;
use crate::headers::RateLimitHeaders;
use crate::session::{Scan, Session};
use crate::sse::LineFramer;
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Boxed body of a `reqwest::Response`.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// An `EventStream` reading a `reqwest::Response` body.
pub type ResponseStream<T> = EventStream<ByteStream, T, JsonDecoder>;

pin_project! {
    /// A streaming SSE response decoded into `T` messages.
    ///
    /// Pull with [`recv`](EventStream::recv) / [`recv_raw`](EventStream::recv_raw),
    /// or consume as a `futures::Stream`, which ends on end-of-stream.
    pub struct EventStream<S, T, D> {
        #[pin]
        inner: S,
        framer: LineFramer,
        session: Session<D>,
        // Scan of the pull in progress, kept across `Poll::Pending`.
        scan: Option<Scan>,
        source_done: bool,
        headers: HeaderMap,
        _message: PhantomData<fn() -> T>,
    }
}

impl<T> ResponseStream<T> {
    /// Wrap a response whose status has already been checked.
    pub fn from_response(response: reqwest::Response) -> Self {
        Self::from_response_with_config(response, &StreamConfig::default())
    }

    /// Wrap a response with custom configuration.
    pub fn from_response_with_config(response: reqwest::Response, config: &StreamConfig) -> Self {
        let headers = response.headers().clone();
        let inner: ByteStream = Box::pin(response.bytes_stream());
        let mut stream = EventStream::with_decoder(inner, config, JsonDecoder);
        stream.headers = headers;
        stream
    }
}

impl<S, E, T> EventStream<S, T, JsonDecoder>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<Error>,
{
    /// Create a stream over raw body chunks with default configuration.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, &StreamConfig::default())
    }

    /// Create a stream over raw body chunks with custom configuration.
    pub fn with_config(inner: S, config: &StreamConfig) -> Self {
        Self::with_decoder(inner, config, JsonDecoder)
    }
}

impl<S, E, T, D> EventStream<S, T, D>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<Error>,
    D: Decoder,
{
    /// Create a stream with a custom payload decoder.
    pub fn with_decoder(inner: S, config: &StreamConfig, decoder: D) -> Self {
        Self {
            inner,
            framer: LineFramer::with_capacity(config.line_capacity),
            session: Session::new(config, decoder),
            scan: None,
            source_done: false,
            headers: HeaderMap::new(),
            _message: PhantomData,
        }
    }

    /// Poll for the next frame's raw payload.
    pub fn poll_recv_raw(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<Bytes, Error>> {
        let mut this = self.project();

        let mut scan = match this.scan.take() {
            Some(scan) => scan,
            None => match this.session.begin() {
                Ok(scan) => scan,
                Err(e) => return Poll::Ready(Err(e)),
            },
        };

        loop {
            let read = if let Some(line) = this.framer.next_line() {
                Ok(Some(line))
            } else if *this.source_done {
                Ok(None)
            } else {
                match this.inner.as_mut().poll_next(cx) {
                    Poll::Pending => {
                        *this.scan = Some(scan);
                        return Poll::Pending;
                    }
                    Poll::Ready(Some(Ok(chunk))) => {
                        this.framer.feed(&chunk);
                        continue;
                    }
                    Poll::Ready(Some(Err(e))) => Err(e.into()),
                    Poll::Ready(None) => {
                        *this.source_done = true;
                        let dropped = this.framer.buffer_len();
                        if dropped > 0 {
                            tracing::debug!(bytes = dropped, "discarding unterminated trailing line");
                            this.framer.discard_partial();
                        }
                        Ok(None)
                    }
                }
            };

            if let Some(outcome) = this.session.step(&mut scan, read) {
                return Poll::Ready(outcome);
            }
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

    /// Headers of the response this stream was built from.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Rate-limit values from the response headers.
    pub fn rate_limit_headers(&self) -> RateLimitHeaders {
        RateLimitHeaders::from_headers(&self.headers)
    }

    /// Release the underlying body.
    pub fn close(self) {
        tracing::debug!(finished = self.session.is_finished(), "closing event stream");
        drop(self.inner);
    }
}

impl<S, E, T, D> EventStream<S, T, D>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<Error>,
    D: Decoder,
{
    /// Get the next frame's raw payload.
    pub async fn recv_raw(&mut self) -> Result<Bytes, Error> {
        futures::future::poll_fn(|cx| Pin::new(&mut *self).poll_recv_raw(cx)).await
    }

    /// Get the next message.
    pub async fn recv(&mut self) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let frame = self.recv_raw().await?;
        self.session.decoder().decode(&frame)
    }
}

impl<S, E, T, D> Stream for EventStream<S, T, D>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<Error>,
    T: DeserializeOwned,
    D: Decoder,
{
    type Item = Result<T, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let frame = match self.as_mut().poll_recv_raw(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(frame)) => frame,
            Poll::Ready(Err(Error::EndOfStream)) => return Poll::Ready(None),
            Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(e))),
        };
        let this = self.project();
        Poll::Ready(Some(this.session.decoder().decode(&frame)))
    }
}
