use std::fmt;

/// Per-tick failure taxonomy. Every variant is isolated to the tick that
/// raised it and surfaced as a log line; none is fatal to the process.
#[derive(Debug)]
pub enum TrackerError {
    /// Malformed spot price or analysis configuration.
    InvalidSnapshot(String),
    /// Fetch or parse of the option chain failed; the analyzer never ran.
    Retrieval(String),
    /// A sink could not write; other sinks and the next tick are unaffected.
    SinkWrite(String),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TrackerError::InvalidSnapshot(msg) => write!(f, "Invalid snapshot: {}", msg),
            TrackerError::Retrieval(msg) => write!(f, "Retrieval error: {}", msg),
            TrackerError::SinkWrite(msg) => write!(f, "Sink write error: {}", msg),
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Retrieval(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Retrieval(err.to_string())
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::SinkWrite(err.to_string())
    }
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        TrackerError::SinkWrite(err.to_string())
    }
}

impl From<notify_rust::error::Error> for TrackerError {
    fn from(err: notify_rust::error::Error) -> Self {
        TrackerError::SinkWrite(err.to_string())
    }
}
