//! Unified error types for the SeatLink streamer.
//!
//! Every subsystem has its own small error enum; all of them convert into the
//! top-level [`Error`] so the session driver can log failures uniformly.
//! Sensor errors are `Copy` so they can be passed through the reader and
//! logged per channel without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the streamer funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read.
    Sensor(SensorError),
    /// The connection could not be established.
    Connect(ConnectError),
    /// An established connection rejected a frame.
    Link(LinkError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A packet could not be serialised.
    Encode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Connect(e) => write!(f, "connect: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Encode(msg) => write!(f, "encode: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The device handle was never initialised (init failed at startup).
    NotInitialized,
    /// SPI transfer to the ADC failed.
    AdcReadFailed,
    /// GPIO read or write failed.
    GpioFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "device not initialised"),
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioFailed => write!(f, "GPIO access failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Connection establishment errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The endpoint URI could not be parsed or uses an unsupported scheme.
    InvalidEndpoint(String),
    /// Host name resolution produced no usable address.
    Resolve(String),
    /// TCP connect failed or timed out.
    Tcp(String),
    /// The WebSocket upgrade handshake was rejected.
    Handshake(String),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint(msg) => write!(f, "invalid endpoint: {msg}"),
            Self::Resolve(msg) => write!(f, "resolve failed: {msg}"),
            Self::Tcp(msg) => write!(f, "TCP connect failed: {msg}"),
            Self::Handshake(msg) => write!(f, "handshake failed: {msg}"),
        }
    }
}

impl std::error::Error for ConnectError {}

impl From<ConnectError> for Error {
    fn from(e: ConnectError) -> Self {
        Self::Connect(e)
    }
}

// ---------------------------------------------------------------------------
// Established-link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Serialised packet does not fit an outbound frame buffer.
    FrameTooLarge,
    /// Outbound queue is full: the socket has stopped draining.
    QueueFull,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameTooLarge => write!(f, "frame exceeds outbound buffer"),
            Self::QueueFull => write!(f, "outbound queue full (connection stalled)"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No config file at the given path.
    NotFound,
    /// File exists but could not be read.
    Io(String),
    /// File contents are not a valid config document.
    Corrupted(String),
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::Corrupted(msg) => write!(f, "config corrupted: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
