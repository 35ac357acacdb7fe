//! Core types for the MCP server.
//!
//! This module provides foundational types used throughout the system:
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for the server, store, and transport

mod config;
mod errors;

pub use config::{Config, DatabaseConfig, ObservabilityConfig, RpcConfig, ServerConfig};
pub use errors::{Error, Result};
