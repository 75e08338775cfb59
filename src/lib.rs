//! Incremental SSE stream reader for LLM completion APIs.
//!
//! Turns a `data: <json>` line stream into typed messages, stops on
//! `data: [DONE]`, and recognises `{"error": ...}` objects sent inside the
//! stream body.
//!
//! # Example
//! ```no_run
//! use rust_ai_stream::{ChatCompletionChunk, ResponseStream};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rust_ai_stream::Error> {
//!     let response = reqwest::Client::new()
//!         .post("https://api.openai.com/v1/chat/completions")
//!         .body(r#"{"model":"gpt-4o-mini","stream":true,"messages":[]}"#)
//!         .send()
//!         .await?;
//!
//!     let mut stream: ResponseStream<ChatCompletionChunk> = ResponseStream::from_response(response);
//!     loop {
//!         match stream.recv().await {
//!             Ok(chunk) => print!("{}", chunk.text().unwrap_or_default()),
//!             Err(e) if e.is_end_of_stream() => break,
//!             Err(e) => return Err(e),
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Blocking sources use [`StreamReader`] instead:
//! ```
//! use rust_ai_stream::StreamReader;
//! use std::io::Cursor;
//!
//! let body = "data: {\"id\":1}\n\ndata: [DONE]\n\n";
//! let mut reader: StreamReader<serde_json::Value, _> = StreamReader::new(Cursor::new(body));
//! assert_eq!(reader.recv().unwrap()["id"], 1);
//! assert!(reader.recv().unwrap_err().is_end_of_stream());
//! ```

pub mod accumulator;
pub mod config;
pub mod decode;
pub mod error;
pub mod headers;
pub mod reader;
pub mod sse;
pub mod stream;
pub mod types;

mod session;

pub use accumulator::ErrorAccumulator;
pub use config::{StreamConfig, StreamConfigBuilder};
pub use decode::{Decoder, JsonDecoder};
pub use error::{ApiError, Error, ErrorResponse};
pub use headers::{RateLimitHeaders, ResetTime};
pub use reader::StreamReader;
pub use stream::{EventStream, ResponseStream};
pub use types::*;

#[cfg(feature = "simd-json")]
pub use decode::SimdJsonDecoder;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
