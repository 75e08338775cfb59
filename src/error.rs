use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Unified error type for stream pulls.
#[derive(Error, Debug)]
pub enum Error {
    /// The stream has ended, either through the `[DONE]` sentinel or because
    /// the source ran dry with nothing pending.
    #[error("end of stream")]
    EndOfStream,

    /// The remote sent more non-data lines than the configured limit allows.
    #[error("stream has sent too many empty messages (limit {limit})")]
    TooManyEmptyMessages { limit: usize },

    /// An error object reported by the API inside the stream body.
    #[error("error, {0}")]
    Remote(ApiError),

    /// JSON decoding of a data frame failed.
    #[error("parse: {0}")]
    Parse(String),

    /// The error accumulator refused a write.
    #[error("error payload exceeds {limit} bytes")]
    ErrorBufferFull { limit: usize },

    /// I/O error from a blocking source.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP/network error from a response body.
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration.
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Returns true for the normal terminal condition.
    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }

    /// The API error carried by this failure, if the remote reported one.
    pub fn remote(&self) -> Option<&ApiError> {
        match self {
            Error::Remote(e) => Some(e),
            _ => None,
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

/// Body of an error response: `{"error": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Error object reported by a completion API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, deserialize_with = "message_or_lines")]
    pub message: String,
    #[serde(rename = "type", default, deserialize_with = "string_or_null")]
    pub error_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error codes arrive as strings from some endpoints and numbers from others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Text(String),
    Number(i64),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Text(s) => f.write_str(s),
            ErrorCode::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Accept `"message": "..."` as well as `"message": ["...", "..."]`.
fn message_or_lines<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Message {
        Text(String),
        Lines(Vec<String>),
        Null(()),
    }

    Ok(match Message::deserialize(deserializer)? {
        Message::Text(s) => s,
        Message::Lines(lines) => lines.join("\n"),
        Message::Null(()) => String::new(),
    })
}

fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
