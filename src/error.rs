//! Unified error types for the alarm controller.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! binary's startup error handling uniform.  The state machine itself has
//! no error path: everything it touches either cannot fail or degrades to a
//! logged warning inside the adapter.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible startup operation funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// Board peripherals could not be brought up.
    Init(InitError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Board initialisation errors
// ---------------------------------------------------------------------------

/// Board bring-up failures.  The only condition that aborts the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// The analog input backing the microphone could not be opened.
    AdcUnavailable(String),
    /// An I2C bus could not be opened or addressed.
    I2cBus(String),
    /// A GPIO line could not be exported or configured as output.
    Gpio(String),
    /// The display controller rejected its init sequence.
    Display(&'static str),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcUnavailable(path) => write!(f, "ADC unavailable ({path})"),
            Self::I2cBus(msg) => write!(f, "I2C bus: {msg}"),
            Self::Gpio(msg) => write!(f, "GPIO: {msg}"),
            Self::Display(msg) => write!(f, "display: {msg}"),
        }
    }
}

impl std::error::Error for InitError {}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating [`SystemConfig`](crate::config::SystemConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    Io(std::io::Error),
    /// The file is not valid JSON for the config schema.
    Parse(serde_json::Error),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(e) => write!(f, "parse error: {e}"),
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

// ---------------------------------------------------------------------------
// Notification errors
// ---------------------------------------------------------------------------

/// A single delivery attempt to a notification backend failed.
///
/// Never propagated into the controller; the notification worker logs it
/// and moves on to the next backend.
#[derive(Debug)]
pub enum NotifyError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    Transport(reqwest::Error),
    /// The backend answered with a non-success status.
    Rejected(u16),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Rejected(status) => write!(f, "rejected with HTTP {status}"),
        }
    }
}

impl std::error::Error for NotifyError {}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}
