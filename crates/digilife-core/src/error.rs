//! Error types for digilife operations.
//!
//! Simulation ticks never fail; errors come from configuration,
//! persistence and I/O at the edges of the system.

use std::error::Error;
use std::fmt;

/// Result type for digilife operations.
pub type Result<T> = std::result::Result<T, DigiError>;

/// Errors that can occur outside the tick loop.
#[derive(Debug, Clone)]
pub enum DigiError {
    /// Configuration errors.
    Config(ConfigError),
    /// Session persistence errors.
    Session(SessionError),
    /// Compute backend errors that escaped the CPU fallback.
    Backend(String),
    /// I/O errors (wrapped).
    Io(String),
    /// Serialization errors.
    Serialization(String),
}

impl fmt::Display for DigiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigiError::Config(e) => write!(f, "Config error: {}", e),
            DigiError::Session(e) => write!(f, "Session error: {}", e),
            DigiError::Backend(msg) => write!(f, "Backend error: {}", msg),
            DigiError::Io(msg) => write!(f, "I/O error: {}", msg),
            DigiError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for DigiError {}

impl From<std::io::Error> for DigiError {
    fn from(e: std::io::Error) -> Self {
        DigiError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for DigiError {
    fn from(e: serde_json::Error) -> Self {
        DigiError::Serialization(e.to_string())
    }
}

impl From<ConfigError> for DigiError {
    fn from(e: ConfigError) -> Self {
        DigiError::Config(e)
    }
}

impl From<SessionError> for DigiError {
    fn from(e: SessionError) -> Self {
        DigiError::Session(e)
    }
}

/// Configuration errors.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A value is outside its allowed range.
    OutOfRange { field: String, value: f64, min: f64, max: f64 },
    /// Two values contradict each other.
    Inconsistent(String),
    /// World size string could not be parsed.
    InvalidWorldSize(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfRange { field, value, min, max } => {
                write!(f, "{} = {} is outside [{}, {}]", field, value, min, max)
            }
            ConfigError::Inconsistent(msg) => write!(f, "Inconsistent configuration: {}", msg),
            ConfigError::InvalidWorldSize(s) => {
                write!(f, "Invalid world size '{}' (expected WIDTHxHEIGHT)", s)
            }
        }
    }
}

/// Session persistence errors.
#[derive(Debug, Clone)]
pub enum SessionError {
    /// Save file does not exist.
    NotFound(String),
    /// Save file parsed but holds invalid data.
    Corrupt(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotFound(path) => write!(f, "Save file not found: {}", path),
            SessionError::Corrupt(msg) => write!(f, "Corrupt save file: {}", msg),
        }
    }
}

// Convenience constructors
impl DigiError {
    pub fn out_of_range(field: &str, value: f64, min: f64, max: f64) -> Self {
        DigiError::Config(ConfigError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }

    pub fn corrupt_session(msg: impl Into<String>) -> Self {
        DigiError::Session(SessionError::Corrupt(msg.into()))
    }

    pub fn session_not_found(path: impl Into<String>) -> Self {
        DigiError::Session(SessionError::NotFound(path.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = DigiError::out_of_range("world.width", -1.0, 1.0, 100000.0);
        assert!(e.to_string().contains("world.width"));

        let e = DigiError::corrupt_session("genome too short");
        assert_eq!(e.to_string(), "Session error: Corrupt save file: genome too short");
    }

    #[test]
    fn io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: DigiError = io.into();
        assert!(matches!(e, DigiError::Io(_)));
    }
}
