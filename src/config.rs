//! Stream session configuration.

use crate::error::Error;

/// Default tolerance for non-data lines within a single pull.
pub const DEFAULT_EMPTY_MESSAGES_LIMIT: usize = 300;

/// Stream session configuration.
#[derive(Clone, Debug)]
pub struct StreamConfig {
    /// Maximum number of noise lines tolerated while looking for the next frame.
    pub empty_messages_limit: usize,
    /// Maximum size of the error accumulator. Noise from every pull lands in
    /// the accumulator, so a cap bounds the whole session. `None` (the
    /// default) leaves it unbounded.
    pub max_error_bytes: Option<usize>,
    /// Initial capacity of the line buffer.
    pub line_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            empty_messages_limit: DEFAULT_EMPTY_MESSAGES_LIMIT,
            max_error_bytes: None,
            line_capacity: 8192,
        }
    }
}

impl StreamConfig {
    /// Create a new config builder.
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::new()
    }
}

/// Builder for StreamConfig.
pub struct StreamConfigBuilder {
    config: StreamConfig,
}

impl StreamConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: StreamConfig::default(),
        }
    }

    /// Set the noise line tolerance.
    pub fn empty_messages_limit(mut self, limit: usize) -> Self {
        self.config.empty_messages_limit = limit;
        self
    }

    /// Cap the error accumulator at `bytes`.
    pub fn max_error_bytes(mut self, bytes: usize) -> Self {
        self.config.max_error_bytes = Some(bytes);
        self
    }

    /// Let the error accumulator grow without bound.
    pub fn unbounded_error_bytes(mut self) -> Self {
        self.config.max_error_bytes = None;
        self
    }

    /// Set initial line buffer capacity.
    pub fn line_capacity(mut self, cap: usize) -> Self {
        self.config.line_capacity = cap;
        self
    }

    /// Build the config.
    pub fn build(self) -> Result<StreamConfig, Error> {
        if self.config.max_error_bytes == Some(0) {
            return Err(Error::Config("max_error_bytes must be positive".into()));
        }
        Ok(self.config)
    }
}

impl Default for StreamConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
