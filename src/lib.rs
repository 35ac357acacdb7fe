//! # sqlite-mcp — MCP stdio server for a local SQLite database
//!
//! Exposes a small set of database tools to a single MCP client over
//! standard input/output:
//! - Line-delimited JSON-RPC framing with the MCP initialize handshake
//! - An immutable tool registry with order-stable discovery
//! - A strictly sequential dispatch loop that converts every tool failure
//!   into a structured result instead of crashing
//! - A pluggable data backend, implemented over SQLite
//!
//! ## Architecture
//!
//! ```text
//!   stdin ──► codec ──► dispatch loop ──► registry ──► handler ──► backend
//!                            │                                        │
//!   stdout ◄── codec ◄── response ◄────── envelope ◄──────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

// Re-export public API
pub mod db;
pub mod rpc;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
