//! Database tool set — wires the backend operations into the registry.
//!
//! Five tools, registered in discovery order: `list_db_tables`,
//! `get_table_schema`, `query_db_table`, `insert_data`, `delete_data`.
//! Handlers validate their arguments, call the backend, and fold everything
//! into the uniform invocation envelope.

use std::sync::Arc;

use futures::FutureExt;
use serde_json::{json, Map, Value};

use crate::db::{Backend, DeleteReport};
use crate::rpc::wire::ToolDescriptor;
use crate::types::{Error, Result};

use super::{ToolOutcome, ToolRegistry};

/// Build the registry of database tools over `backend`.
pub fn database_tools(backend: Arc<dyn Backend>) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    {
        let backend = backend.clone();
        registry.register(
            ToolDescriptor {
                name: "list_db_tables".to_string(),
                description: "Lists all tables in the SQLite database.".to_string(),
                input_schema: object_schema(json!({}), &[]),
            },
            Arc::new(move |_args| {
                let backend = backend.clone();
                async move {
                    Ok(match backend.list_tables().await {
                        Ok(tables) => ToolOutcome::success("Tables listed successfully.")
                            .with("tables", json!(tables)),
                        Err(e) => ToolOutcome::failure(format!("Error listing tables: {e}")),
                    })
                }
                .boxed()
            }),
        )?;
    }

    {
        let backend = backend.clone();
        registry.register(
            ToolDescriptor {
                name: "get_table_schema".to_string(),
                description: "Gets the schema (column names and types) of a specific table."
                    .to_string(),
                input_schema: object_schema(
                    json!({
                        "table_name": {
                            "type": "string",
                            "description": "The name of the table to describe.",
                        },
                    }),
                    &["table_name"],
                ),
            },
            Arc::new(move |args| {
                let backend = backend.clone();
                async move {
                    let table = str_arg(&args, "table_name")?;
                    let schema = backend.table_schema(&table).await?;
                    Ok(ToolOutcome::success(format!(
                        "Schema for table '{table}' retrieved successfully."
                    ))
                    .with("table_name", json!(schema.table_name))
                    .with("columns", serde_json::to_value(&schema.columns)?))
                }
                .boxed()
            }),
        )?;
    }

    {
        let backend = backend.clone();
        registry.register(
            ToolDescriptor {
                name: "query_db_table".to_string(),
                description: "Queries a table with an optional condition.".to_string(),
                input_schema: object_schema(
                    json!({
                        "table_name": {
                            "type": "string",
                            "description": "The name of the table to query.",
                        },
                        "columns": {
                            "type": "string",
                            "description": "Comma-separated list of columns to retrieve \
                                            (e.g. \"id, name\"). Defaults to \"*\".",
                        },
                        "condition": {
                            "type": "string",
                            "description": "Optional SQL WHERE clause condition \
                                            (e.g. \"completed = 0\").",
                        },
                    }),
                    &["table_name"],
                ),
            },
            Arc::new(move |args| {
                let backend = backend.clone();
                async move {
                    let table = str_arg(&args, "table_name")?;
                    let columns =
                        opt_str_arg(&args, "columns").unwrap_or_else(|| "*".to_string());
                    let condition = opt_str_arg(&args, "condition");
                    let rows = backend
                        .query(&table, &columns, condition.as_deref())
                        .await?;
                    Ok(ToolOutcome::success(format!(
                        "Query executed successfully. {} row(s) returned.",
                        rows.len()
                    ))
                    .with("rows", json!(rows)))
                }
                .boxed()
            }),
        )?;
    }

    {
        let backend = backend.clone();
        registry.register(
            ToolDescriptor {
                name: "insert_data".to_string(),
                description: "Inserts a new row of data into the specified table.".to_string(),
                input_schema: object_schema(
                    json!({
                        "table_name": {
                            "type": "string",
                            "description": "The name of the table to insert data into.",
                        },
                        "data": {
                            "type": "object",
                            "description": "Column name to value mapping for the new row.",
                        },
                    }),
                    &["table_name", "data"],
                ),
            },
            Arc::new(move |args| {
                let backend = backend.clone();
                async move {
                    let table = str_arg(&args, "table_name")?;
                    let data = map_arg(&args, "data")?;
                    if data.is_empty() {
                        // Rejected before the backend is touched.
                        return Ok(ToolOutcome::failure("No data provided for insertion."));
                    }
                    Ok(match backend.insert(&table, data).await {
                        Ok(report) => ToolOutcome::success(format!(
                            "Data inserted successfully. Row ID: {}",
                            report.row_id
                        ))
                        .with("row_id", json!(report.row_id)),
                        Err(e) => ToolOutcome::failure(format!(
                            "Error inserting data into table '{table}': {e}"
                        )),
                    })
                }
                .boxed()
            }),
        )?;
    }

    {
        let backend = backend.clone();
        registry.register(
            ToolDescriptor {
                name: "delete_data".to_string(),
                description: "Deletes rows from a table based on a given SQL WHERE clause \
                              condition. The condition must not be empty."
                    .to_string(),
                input_schema: object_schema(
                    json!({
                        "table_name": {
                            "type": "string",
                            "description": "The name of the table to delete data from.",
                        },
                        "condition": {
                            "type": "string",
                            "description": "SQL WHERE clause condition selecting the rows to \
                                            delete. Must not be empty.",
                        },
                    }),
                    &["table_name", "condition"],
                ),
            },
            Arc::new(move |args| {
                let backend = backend.clone();
                async move {
                    let table = str_arg(&args, "table_name")?;
                    let condition = str_arg(&args, "condition")?;
                    Ok(match backend.delete(&table, &condition).await {
                        Ok(DeleteReport::Refused { message }) => ToolOutcome::failure(message),
                        Ok(DeleteReport::Deleted { rows_deleted }) => ToolOutcome::success(
                            format!(
                                "{rows_deleted} row(s) deleted successfully from table \
                                 '{table}'."
                            ),
                        )
                        .with("rows_deleted", json!(rows_deleted)),
                        Err(e) => ToolOutcome::failure(format!(
                            "Error deleting data from table '{table}': {e}"
                        )),
                    })
                }
                .boxed()
            }),
        )?;
    }

    Ok(registry)
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn str_arg(args: &Value, key: &str) -> Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| Error::validation(format!("Missing required argument: {key}")))
}

fn opt_str_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn map_arg(args: &Value, key: &str) -> Result<Map<String, Value>> {
    match args.get(key) {
        Some(Value::Object(map)) => Ok(map.clone()),
        _ => Err(Error::validation(format!(
            "Missing required argument: {key}"
        ))),
    }
}
