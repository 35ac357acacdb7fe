//! Tool infrastructure — registry, invocation envelope, database tool set.

pub mod db;
pub mod outcome;
pub mod registry;

pub use db::database_tools;
pub use outcome::ToolOutcome;
pub use registry::{ToolHandler, ToolRegistry};
