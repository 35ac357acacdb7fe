//! Stdio JSON-RPC transport layer.
//!
//! Implements line-delimited JSON-RPC framing over stdin/stdout, the MCP
//! initialize handshake, and the request dispatch loop.

pub mod codec;
pub mod handlers;
pub mod router;
pub mod server;
pub mod wire;

pub use server::McpServer;
