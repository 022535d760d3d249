use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification used by callers to pick between retry and abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    LocationResolution,
    Transport,
    MalformedResponse,
    IndexOutOfRange,
    SettingsCorrupt,
    Io,
    Prompt,
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not resolve location for ZIP code {zip}: {message}")]
    LocationResolution { zip: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Malformed {document} document: {message}")]
    MalformedResponse {
        document: &'static str,
        message: String,
    },

    #[error("Forecast period {index} requested but the forecast only has {available}")]
    IndexOutOfRange { index: usize, available: usize },

    #[error("Settings file {} is corrupt: {message}", .path.display())]
    SettingsCorrupt { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::InvalidInput(_) => ErrorKind::InvalidInput,
            WeatherError::LocationResolution { .. } => ErrorKind::LocationResolution,
            WeatherError::Transport { .. } => ErrorKind::Transport,
            WeatherError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            WeatherError::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            WeatherError::SettingsCorrupt { .. } => ErrorKind::SettingsCorrupt,
            WeatherError::Io { .. } => ErrorKind::Io,
            WeatherError::Prompt(_) => ErrorKind::Prompt,
        }
    }

    /// Whether the poll loop should sleep for the retry delay and try again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Transport | ErrorKind::MalformedResponse | ErrorKind::IndexOutOfRange
        )
    }

    pub(crate) fn transport(url: &str, message: impl Into<String>) -> Self {
        WeatherError::Transport {
            url: url.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn malformed(document: &'static str, message: impl Into<String>) -> Self {
        WeatherError::MalformedResponse {
            document,
            message: message.into(),
        }
    }

    pub(crate) fn location(zip: &str, message: impl Into<String>) -> Self {
        WeatherError::LocationResolution {
            zip: zip.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
