//! SQLite implementation of the data backend.
//!
//! A single `rusqlite::Connection` behind a mutex; every operation takes the
//! lock, runs to completion, and releases it, so requests stay strictly
//! serialized and nothing is held across calls.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Value};

use crate::types::{Error, Result};

use super::guard::{validate_column_list, validate_condition, validate_identifier};
use super::{bootstrap, Backend, ColumnInfo, DeleteReport, InsertReport, Row, TableSchema};

const EMPTY_DELETE_CONDITION: &str = "Deletion condition cannot be empty. This is a safety \
     measure to prevent accidental deletion of all rows.";

/// SQLite-backed store.
#[derive(Debug)]
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (or create) a database file at `path` and bootstrap it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database, used by tests and demos.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        bootstrap::ensure_database(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock only means a panic elsewhere; the connection
        // itself is still usable.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn require_table(conn: &Connection, table: &str) -> Result<()> {
        let present: bool = conn
            .prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")?
            .query_row([table], |row| row.get::<_, i64>(0))?
            > 0;
        if present {
            Ok(())
        } else {
            Err(Error::validation(format!("Unknown table: '{table}'")))
        }
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    async fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
        )?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    async fn table_schema(&self, table: &str) -> Result<TableSchema> {
        validate_identifier(table, "table")?;
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name, type FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    column_type: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(Error::not_found(format!(
                "Table '{table}' not found or no schema information."
            )));
        }
        Ok(TableSchema {
            table_name: table.to_string(),
            columns,
        })
    }

    async fn query(
        &self,
        table: &str,
        columns: &str,
        condition: Option<&str>,
    ) -> Result<Vec<Row>> {
        validate_identifier(table, "table")?;
        validate_column_list(columns)?;
        if let Some(condition) = condition {
            validate_condition(condition)?;
        }

        let conn = self.conn();
        Self::require_table(&conn, table)?;

        let mut sql = format!("SELECT {columns} FROM {table}");
        if let Some(condition) = condition.filter(|c| !c.trim().is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }

        let query_err =
            |e: rusqlite::Error| Error::query(format!("Error querying table '{table}': {e}"));

        let mut stmt = conn.prepare(&sql).map_err(query_err)?;
        let column_names: Vec<String> =
            stmt.column_names().iter().map(|s| s.to_string()).collect();
        let mut rows = stmt.query([]).map_err(query_err)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(query_err)? {
            let mut object = Map::new();
            for (i, name) in column_names.iter().enumerate() {
                let value = row.get_ref(i).map_err(query_err)?;
                object.insert(name.clone(), sql_to_json(value));
            }
            out.push(object);
        }
        Ok(out)
    }

    async fn insert(&self, table: &str, row: Map<String, Value>) -> Result<InsertReport> {
        validate_identifier(table, "table")?;
        if row.is_empty() {
            return Err(Error::validation("No data provided for insertion."));
        }
        for column in row.keys() {
            validate_identifier(column, "column")?;
        }

        let conn = self.conn();
        Self::require_table(&conn, table)?;

        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = (1..=row.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut params: Vec<rusqlite::types::Value> = Vec::with_capacity(row.len());
        for (column, value) in &row {
            params.push(json_to_sql(column, value)?);
        }

        conn.execute(&sql, rusqlite::params_from_iter(params))?;
        Ok(InsertReport {
            row_id: conn.last_insert_rowid(),
        })
    }

    async fn delete(&self, table: &str, condition: &str) -> Result<DeleteReport> {
        // Safety guard: a blank condition never reaches SQL. The guard
        // lives in the backend so no caller can bypass it.
        if condition.trim().is_empty() {
            return Ok(DeleteReport::Refused {
                message: EMPTY_DELETE_CONDITION.to_string(),
            });
        }
        validate_identifier(table, "table")?;
        validate_condition(condition)?;

        let conn = self.conn();
        Self::require_table(&conn, table)?;

        let sql = format!("DELETE FROM {table} WHERE {condition}");
        let rows_deleted = conn.execute(&sql, [])?;
        Ok(DeleteReport::Deleted { rows_deleted })
    }
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(BASE64.encode(b)),
    }
}

fn json_to_sql(column: &str, value: &Value) -> Result<rusqlite::types::Value> {
    use rusqlite::types::Value as SqlValue;
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::Real(f))
            } else {
                Err(Error::validation(format!(
                    "Unsupported numeric value for column '{column}'"
                )))
            }
        }
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(Error::validation(format!(
            "Unsupported value type for column '{column}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn backend() -> SqliteBackend {
        SqliteBackend::open_in_memory().unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn list_tables_excludes_internal_tables() {
        let tables = backend().list_tables().await.unwrap();
        assert_eq!(tables, vec!["users".to_string(), "todos".to_string()]);
    }

    #[tokio::test]
    async fn list_tables_is_idempotent() {
        let backend = backend();
        let first = backend.list_tables().await.unwrap();
        let second = backend.list_tables().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn table_schema_reports_columns() {
        let schema = backend().table_schema("users").await.unwrap();
        assert_eq!(schema.table_name, "users");
        let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "username", "email"]);
    }

    #[tokio::test]
    async fn table_schema_unknown_table_is_not_found() {
        let err = backend().table_schema("ghosts").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err
            .to_string()
            .contains("Table 'ghosts' not found or no schema information."));
    }

    #[tokio::test]
    async fn query_seeded_open_todos() {
        let rows = backend()
            .query("todos", "*", Some("completed = 0"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["task"], json!("Complete MCP project"));
        assert_eq!(rows[1]["task"], json!("Buy groceries"));
    }

    #[tokio::test]
    async fn query_selects_named_columns() {
        let rows = backend()
            .query("users", "id, username", None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].keys().count(), 2);
        assert_eq!(rows[0]["username"], json!("user1"));
    }

    #[tokio::test]
    async fn query_rejects_hostile_inputs() {
        let backend = backend();
        assert!(backend
            .query("todos; DROP TABLE todos", "*", None)
            .await
            .is_err());
        assert!(backend
            .query("todos", "*", Some("1 = 1; DELETE FROM todos"))
            .await
            .is_err());
        assert!(backend
            .query("todos", "*, (SELECT 1)", None)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn query_unknown_table_fails() {
        let err = backend().query("ghosts", "*", None).await.unwrap_err();
        assert!(err.to_string().contains("ghosts"));
    }

    #[tokio::test]
    async fn insert_reports_new_row_id() {
        let backend = backend();
        let report = backend
            .insert(
                "users",
                object(json!({"username": "u3", "email": "u3@example.com"})),
            )
            .await
            .unwrap();
        assert_eq!(report.row_id, 3);

        let rows = backend.query("users", "*", None).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn insert_empty_row_rejected() {
        let err = backend().insert("users", Map::new()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("No data provided for insertion."));
    }

    #[tokio::test]
    async fn insert_duplicate_email_surfaces_cause() {
        let err = backend()
            .insert(
                "users",
                object(json!({"username": "dup", "email": "user1@example.com"})),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().to_lowercase().contains("unique"));
    }

    #[tokio::test]
    async fn delete_blank_condition_refused_without_mutation() {
        let backend = backend();
        for condition in ["", "   ", "\t"] {
            let report = backend.delete("todos", condition).await.unwrap();
            assert_eq!(
                report,
                DeleteReport::Refused {
                    message: EMPTY_DELETE_CONDITION.to_string(),
                }
            );
        }
        let rows = backend.query("todos", "*", None).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn delete_with_condition_reports_count() {
        let backend = backend();
        let report = backend.delete("todos", "completed = 1").await.unwrap();
        assert_eq!(report, DeleteReport::Deleted { rows_deleted: 1 });
        let rows = backend.query("todos", "*", None).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn file_store_persists_and_reseeds_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let backend = SqliteBackend::open(&path).unwrap();
            backend
                .insert("users", object(json!({"username": "u3", "email": "u3@x.com"})))
                .await
                .unwrap();
        }

        let backend = SqliteBackend::open(&path).unwrap();
        let rows = backend.query("users", "*", None).await.unwrap();
        assert_eq!(rows.len(), 3);
    }
}
