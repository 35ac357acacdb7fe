//! Data backend — the store the tool handlers operate against.
//!
//! The protocol layer only sees the [`Backend`] trait; the SQLite
//! implementation is pluggable behind it. Each operation acquires and
//! releases its connection within the call, so nothing leaks across
//! requests.

pub mod bootstrap;
pub mod guard;
mod sqlite;

pub use sqlite::SqliteBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Result;

/// One result row, column name → value.
pub type Row = Map<String, Value>;

/// Column name and declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

/// Schema of a single table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnInfo>,
}

/// Outcome of an insert: the id of the new row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertReport {
    pub row_id: i64,
}

/// Outcome of a delete. A blank condition is refused as data, not as an
/// error, so the safety guard stays observable and testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteReport {
    Refused { message: String },
    Deleted { rows_deleted: usize },
}

/// Named operations the registry wires up as tools.
#[async_trait]
pub trait Backend: Send + Sync {
    /// List user table names in definition order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Column names and types of `table`. `NotFound` if the table is absent.
    async fn table_schema(&self, table: &str) -> Result<TableSchema>;

    /// Select `columns` from `table`, optionally filtered by `condition`.
    async fn query(
        &self,
        table: &str,
        columns: &str,
        condition: Option<&str>,
    ) -> Result<Vec<Row>>;

    /// Insert one row. `Validation` error if the row is empty.
    async fn insert(&self, table: &str, row: Map<String, Value>) -> Result<InsertReport>;

    /// Delete rows matching `condition`. Refuses a blank condition.
    async fn delete(&self, table: &str, condition: &str) -> Result<DeleteReport>;
}
