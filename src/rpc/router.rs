//! Request router — maps method names to handlers.

use serde_json::Value;

use crate::rpc::handlers;
use crate::rpc::wire;
use crate::tools::ToolRegistry;
use crate::types::{Error, Result};

/// Route one post-handshake request to its handler.
pub async fn route_request(
    registry: &ToolRegistry,
    method: &str,
    params: Value,
) -> Result<Value> {
    match method {
        wire::METHOD_LIST_TOOLS => handlers::tools::list(registry).await,
        wire::METHOD_CALL_TOOL => handlers::tools::call(registry, params).await,
        wire::METHOD_PING => Ok(Value::Object(serde_json::Map::new())),
        wire::METHOD_INITIALIZE => Err(Error::protocol("Duplicate initialize request")),
        _ => Err(Error::not_found(format!("Unknown method: {method}"))),
    }
}
