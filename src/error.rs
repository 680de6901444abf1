//! Error types for calclaw.
//!
//! This module defines all error types used throughout the system.

use thiserror::Error;

/// Main error type for calclaw operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Calendar errors
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Tool errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Agent errors
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Server errors
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for calclaw.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the remote calendar adapter.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected calendar response: {0}")]
    InvalidResponse(String),

    #[error("Invalid local time '{value}': {reason}")]
    InvalidTime { value: String, reason: String },

    #[error("Event not found: {0}")]
    EventNotFound(String),
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        CalendarError::Http(err.to_string())
    }
}

/// Errors raised in the tool layer.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl From<CalendarError> for ToolError {
    fn from(err: CalendarError) -> Self {
        ToolError::ExecutionFailed(err.to_string())
    }
}

/// Errors raised while driving the agent loop.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Model request failed: {0}")]
    Transport(String),

    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no choices")]
    EmptyReply,

    #[error("Malformed model response: {0}")]
    InvalidResponse(String),

    #[error("Turn exceeded {0} reasoning iterations")]
    IterationBudget(usize),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Transport(err.to_string())
    }
}

/// Errors related to the HTTP server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Server error: {0}")]
    Serve(String),
}

/// Errors related to Configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid config value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Missing required config: {0}")]
    MissingRequired(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
