//! Tools method handlers — discovery and invocation.

use serde_json::Value;

use crate::rpc::wire::{CallToolParams, CallToolResult, Content, ListToolsResult};
use crate::tools::{ToolOutcome, ToolRegistry};
use crate::types::{Error, Result};

/// Answer `tools/list` from the registry, in registration order.
pub async fn list(registry: &ToolRegistry) -> Result<Value> {
    tracing::info!("Received tools/list request");
    let result = ListToolsResult {
        tools: registry.list().into_iter().cloned().collect(),
    };
    Ok(serde_json::to_value(result)?)
}

/// Answer `tools/call`: resolve the named tool and execute it.
///
/// An unknown tool and a failing handler both come back as structured
/// `{success: false}` envelopes; execution never crashes the loop.
pub async fn call(registry: &ToolRegistry, params: Value) -> Result<Value> {
    let params: CallToolParams = serde_json::from_value(params)
        .map_err(|e| Error::validation(format!("Invalid tools/call params: {e}")))?;
    tracing::info!(tool = %params.name, "Received tools/call request");

    let outcome = match registry.resolve(&params.name) {
        Some(handler) => match handler(params.arguments).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(tool = %params.name, error = %e, "Tool execution failed");
                ToolOutcome::failure(format!(
                    "Failed to execute tool '{}': {e}",
                    params.name
                ))
            }
        },
        None => {
            tracing::warn!(tool = %params.name, "Tool not found");
            ToolOutcome::failure(format!(
                "Tool '{}' not implemented by this server.",
                params.name
            ))
        }
    };

    let result = CallToolResult {
        is_error: !outcome.is_success(),
        content: vec![Content::Text {
            text: outcome.to_pretty_json()?,
        }],
    };
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteBackend;
    use crate::tools::database_tools;
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> ToolRegistry {
        let backend = Arc::new(SqliteBackend::open_in_memory().unwrap());
        database_tools(backend).unwrap()
    }

    fn envelope_of(result: &Value) -> ToolOutcome {
        let text = result["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn list_names_match_registry() {
        let registry = registry();
        let result = list(&registry).await.unwrap();
        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "list_db_tables",
                "get_table_schema",
                "query_db_table",
                "insert_data",
                "delete_data",
            ]
        );
    }

    #[tokio::test]
    async fn unknown_tool_returns_structured_failure() {
        let registry = registry();
        let result = call(
            &registry,
            json!({"name": "nonexistent_tool", "arguments": {}}),
        )
        .await
        .unwrap();
        assert_eq!(result["isError"], true);
        let outcome = envelope_of(&result);
        assert_eq!(
            outcome.message(),
            "Tool 'nonexistent_tool' not implemented by this server."
        );
    }

    #[tokio::test]
    async fn handler_error_is_wrapped() {
        let registry = registry();
        let result = call(
            &registry,
            json!({"name": "get_table_schema", "arguments": {"table_name": "ghosts"}}),
        )
        .await
        .unwrap();
        let outcome = envelope_of(&result);
        assert!(!outcome.is_success());
        assert!(outcome
            .message()
            .starts_with("Failed to execute tool 'get_table_schema':"));
    }

    #[tokio::test]
    async fn missing_name_is_invalid_params() {
        let registry = registry();
        let err = call(&registry, json!({"arguments": {}})).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn successful_call_pretty_prints_envelope() {
        let registry = registry();
        let result = call(&registry, json!({"name": "list_db_tables", "arguments": {}}))
            .await
            .unwrap();
        assert_eq!(result["isError"], false);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("{\n  \"success\": true"));
    }
}
