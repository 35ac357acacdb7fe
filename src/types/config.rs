//! Configuration structures.
//!
//! Configuration is assembled from CLI flags and environment variables at
//! startup and passed explicitly to the server; no module-level globals.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server identity advertised during the handshake.
    #[serde(default)]
    pub server: ServerConfig,

    /// Backing store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Wire transport configuration.
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported in the initialize response.
    pub name: String,

    /// Version reported in the initialize response.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "sqlite-db-mcp-server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Backing store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. Created and seeded on first run.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sqlite_mcp.db"),
        }
    }
}

/// Wire transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Maximum accepted request line size in bytes. Longer frames are a
    /// fatal transport error.
    pub max_line_bytes: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
