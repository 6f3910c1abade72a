//! ==============================================================================
//! error.rs - error taxonomy for the relay host
//! ==============================================================================
//!
//! two tiers:
//!     - RelayError: fatal for a whole poll (missing credentials, client setup,
//!       short fan-out).
//!       surfaced to the http boundary as a 500.
//!     - ChannelFetchError: one virtual pin failed. absorbed inside relay.rs
//!       and turned into a 0.0 reading, never seen past the aggregator.
//!
//! ==============================================================================

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// poll-level failure
#[derive(Debug, Error)]
pub enum RelayError {
    /// base url or auth token missing
    #[error("{0}")]
    Configuration(String),

    /// the fan-out returned the wrong number of readings
    #[error("expected {expected} channel readings, received {received}")]
    Incomplete { expected: usize, received: usize },

    /// the http client could not be constructed
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// single channel failure, recovered locally
#[derive(Debug, Error)]
pub enum ChannelFetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    #[error("unparseable reading: {0}")]
    Parse(String),
}

/// configuration file failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
