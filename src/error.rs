//! Error types for the Bedrock advisor MCP server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Bedrock advisor MCP server
#[derive(Error, Debug)]
pub enum AdvisorMcpError {
    /// Tool dispatch errors
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while dispatching a single tool invocation.
///
/// None of these escape the dispatcher; they are rendered into the
/// `Error: ` prefixed result text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model backend unavailable: {message}")]
    BackendUnavailable { message: String },

    #[error("Unrecognized {family} response shape: {message}")]
    UnrecognizedResponseShape { family: String, message: String },
}

/// First schema violation found in a tool's arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid argument '{path}': {reason}")]
pub struct ValidationError {
    /// Dotted path of the offending field
    pub path: String,

    /// What was wrong with it
    pub reason: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    FileRead { path: String, message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid schema for operation '{operation}': {message}")]
    InvalidSchema { operation: String, message: String },

    #[error("Duplicate operation name: {name}")]
    DuplicateOperation { name: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Transport error: {message}")]
    TransportError { message: String },
}

/// Result type alias for advisor MCP operations
pub type Result<T> = std::result::Result<T, AdvisorMcpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DispatchError::UnknownOperation {
            name: "rebalance".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown operation: rebalance");
    }

    #[test]
    fn test_validation_error_names_path() {
        let err: DispatchError = ValidationError::new("portfolio", "required property is missing").into();
        let text = err.to_string();
        assert!(text.contains("'portfolio'"));
        assert!(text.contains("required property is missing"));
    }

    #[test]
    fn test_error_conversion() {
        let dispatch_err = DispatchError::BackendUnavailable {
            message: "timed out".to_string(),
        };
        let err: AdvisorMcpError = dispatch_err.into();
        assert!(matches!(err, AdvisorMcpError::Dispatch(_)));
        assert!(err.to_string().contains("unavailable"));
    }
}
