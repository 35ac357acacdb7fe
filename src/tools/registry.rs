//! Tool registry — the authoritative set of callable tools.
//!
//! Tools are registered once at process start and the registry is immutable
//! afterwards (shared behind an `Arc`). Discovery order is registration
//! order, so repeated `tools/list` calls are idempotent.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::rpc::wire::ToolDescriptor;
use crate::types::{Error, Result};

use super::ToolOutcome;

/// Executable logic bound to a tool name.
///
/// Handlers receive the raw `arguments` object and resolve to the uniform
/// invocation envelope; any `Err` is caught at the dispatch boundary.
pub type ToolHandler =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<ToolOutcome>> + Send + Sync>;

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: ToolHandler,
}

/// Name → (schema, handler) mapping with stable registration order.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is empty or already present.
    pub fn register(&mut self, descriptor: ToolDescriptor, handler: ToolHandler) -> Result<()> {
        if descriptor.name.is_empty() {
            return Err(Error::validation("Tool name cannot be empty"));
        }
        if self.index.contains_key(&descriptor.name) {
            return Err(Error::DuplicateTool(descriptor.name));
        }
        self.index
            .insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(RegisteredTool { descriptor, handler });
        Ok(())
    }

    /// All descriptors in registration order.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Resolve the handler for a name. `None` maps to a structured
    /// not-implemented result at the dispatch layer, never a fatal error.
    pub fn resolve(&self, name: &str) -> Option<ToolHandler> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.entries[i].handler))
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self
            .entries
            .iter()
            .map(|e| e.descriptor.name.as_str())
            .collect();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}
