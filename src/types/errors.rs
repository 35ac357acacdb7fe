//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

use crate::rpc::wire::{self, RpcError};

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the MCP server.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unparseable wire message. Fatal when no request id is
    /// recoverable from the frame.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Failure during the initialize exchange (connection is closed).
    #[error("handshake error: {0}")]
    Handshake(String),

    /// Tool name already present in the registry.
    #[error("duplicate tool: {0}")]
    DuplicateTool(String),

    /// Resource not found (map to JSON-RPC METHOD_NOT_FOUND).
    #[error("not found: {0}")]
    NotFound(String),

    /// Validation errors (map to JSON-RPC INVALID_PARAMS).
    #[error("validation error: {0}")]
    Validation(String),

    /// Backend query failures, message includes the underlying cause.
    #[error("query error: {0}")]
    Query(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite errors surfaced by the backend.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to a JSON-RPC error code.
    pub fn to_rpc_code(&self) -> i64 {
        match self {
            Error::Protocol(_) | Error::Handshake(_) => wire::INVALID_REQUEST,
            Error::NotFound(_) => wire::METHOD_NOT_FOUND,
            Error::Validation(_) => wire::INVALID_PARAMS,
            Error::DuplicateTool(_)
            | Error::Query(_)
            | Error::Serialization(_)
            | Error::Sqlite(_)
            | Error::Io(_) => wire::INTERNAL_ERROR,
        }
    }

    /// Build the JSON-RPC error object sent back for this error.
    pub fn to_rpc_error(&self) -> RpcError {
        RpcError {
            code: self.to_rpc_code(),
            message: self.to_string(),
        }
    }
}

// Convenience constructors
impl Error {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn handshake(msg: impl Into<String>) -> Self {
        Self::Handshake(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }
}
