use thiserror::Error;

#[derive(Error, Debug)]
pub enum PowermateError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Readiness wait failed: {0}")]
    Wait(#[source] std::io::Error),
}

impl PowermateError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PowermateError>;

/// Marker error for a device that vanished mid-session. The handle that
/// produced it must be discarded and a fresh open attempted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("device disconnected")]
pub struct Disconnected;
