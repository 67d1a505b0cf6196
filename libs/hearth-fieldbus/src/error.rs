//! Fieldbus Error Types
//!
//! Core error types for transport and buffer operations.

use thiserror::Error;

/// Result type for hearth-fieldbus operations
pub type Result<T> = std::result::Result<T, FieldbusError>;

/// Fieldbus errors
#[derive(Debug, Error, Clone)]
pub enum FieldbusError {
    /// Transport handle not resolved yet
    #[error("Transport not available")]
    TransportUnavailable,

    /// Transport-level read/write failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Timeout errors
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Response carried fewer units than requested
    #[error("Short response: expected {expected}, got {got}")]
    ShortResponse { expected: usize, got: usize },

    /// Address outside the registered or readable span
    #[error("Address out of range: {0}")]
    OutOfRange(u16),

    /// Protocol-level errors
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for FieldbusError {
    fn from(err: std::io::Error) -> Self {
        FieldbusError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FieldbusError {
    fn from(err: serde_json::Error) -> Self {
        FieldbusError::InvalidData(format!("JSON error: {}", err))
    }
}

// Helper methods for creating errors
impl FieldbusError {
    pub fn transport(msg: impl Into<String>) -> Self {
        FieldbusError::Transport(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        FieldbusError::Timeout(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        FieldbusError::Protocol(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        FieldbusError::InvalidData(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        FieldbusError::Config(msg.into())
    }

    /// Check if this error means the transport has not resolved yet
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FieldbusError::TransportUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldbusError::ShortResponse {
            expected: 4,
            got: 2,
        };
        assert_eq!(err.to_string(), "Short response: expected 4, got 2");

        let err = FieldbusError::transport("connection reset");
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn test_is_unavailable() {
        assert!(FieldbusError::TransportUnavailable.is_unavailable());
        assert!(!FieldbusError::OutOfRange(7).is_unavailable());
    }
}
