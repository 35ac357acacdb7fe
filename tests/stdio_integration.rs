//! Stdio integration tests — validates codec→dispatch→backend→response round-trip.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;

use sqlite_mcp::db::SqliteBackend;
use sqlite_mcp::rpc::McpServer;
use sqlite_mcp::tools::database_tools;
use sqlite_mcp::Config;

struct TestClient {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
}

impl TestClient {
    async fn send_raw(&mut self, raw: &str) {
        self.writer.write_all(raw.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn send(&mut self, value: Value) {
        self.send_raw(&serde_json::to_string(&value).unwrap()).await;
    }

    async fn recv(&mut self) -> Value {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        assert!(n > 0, "server closed the stream unexpectedly");
        serde_json::from_str(&line).unwrap()
    }

    async fn request(&mut self, id: i64, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        let response = self.recv().await;
        assert_eq!(response["id"], json!(id));
        response
    }

    /// Perform the full initialize exchange.
    async fn initialize(&mut self) {
        let response = self
            .request(
                0,
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-harness", "version": "0.0.0"},
                }),
            )
            .await;
        assert!(response.get("error").is_none(), "handshake failed: {response}");
        self.send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
    }

    /// Call a tool and decode the envelope from the text content block.
    async fn call_tool(&mut self, id: i64, name: &str, arguments: Value) -> Value {
        let response = self
            .request(id, "tools/call", json!({"name": name, "arguments": arguments}))
            .await;
        let text = response["result"]["content"][0]["text"]
            .as_str()
            .unwrap_or_else(|| panic!("no text content in {response}"));
        serde_json::from_str(text).unwrap()
    }
}

/// Helper: spin up a server over an in-memory duplex pipe.
fn start_test_server() -> (TestClient, JoinHandle<sqlite_mcp::Result<()>>) {
    let backend = Arc::new(SqliteBackend::open_in_memory().unwrap());
    let registry = Arc::new(database_tools(backend).unwrap());

    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    let (client_read, client_write) = tokio::io::split(client_io);

    let handle = tokio::spawn(async move {
        let server = McpServer::new(registry, Config::default());
        server.serve(server_read, server_write).await
    });

    let client = TestClient {
        reader: BufReader::new(client_read),
        writer: client_write,
    };
    (client, handle)
}

#[tokio::test]
async fn handshake_reports_identity_and_capabilities() {
    let (mut client, _handle) = start_test_server();
    let response = client
        .request(0, "initialize", json!({"protocolVersion": "2024-11-05"}))
        .await;

    let result = &response["result"];
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "sqlite-db-mcp-server");
    assert_eq!(result["capabilities"], json!({"tools": {}}));
}

#[tokio::test]
async fn unsupported_protocol_version_is_fatal() {
    let (mut client, handle) = start_test_server();
    let response = client
        .request(0, "initialize", json!({"protocolVersion": "1999-01-01"}))
        .await;
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unsupported protocol version"));

    let result = handle.await.unwrap();
    assert!(result.is_err());
}

#[tokio::test]
async fn request_before_initialize_is_fatal() {
    let (mut client, handle) = start_test_server();
    let response = client.request(1, "tools/list", json!({})).await;
    assert!(response.get("error").is_some());

    let result = handle.await.unwrap();
    assert!(result.is_err());
}

#[tokio::test]
async fn tools_list_is_order_stable() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let names = |response: &Value| -> Vec<String> {
        response["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect()
    };

    let first = client.request(1, "tools/list", json!({})).await;
    let second = client.request(2, "tools/list", json!({})).await;

    assert_eq!(
        names(&first),
        vec![
            "list_db_tables",
            "get_table_schema",
            "query_db_table",
            "insert_data",
            "delete_data",
        ]
    );
    assert_eq!(names(&first), names(&second));
    assert_eq!(first["result"], second["result"]);
}

#[tokio::test]
async fn fresh_store_seeds_two_open_todos() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let envelope = client
        .call_tool(
            1,
            "query_db_table",
            json!({"table_name": "todos", "columns": "*", "condition": "completed = 0"}),
        )
        .await;
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["rows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_tool_keeps_connection_usable() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let envelope = client.call_tool(1, "nonexistent_tool", json!({})).await;
    assert_eq!(
        envelope,
        json!({
            "success": false,
            "message": "Tool 'nonexistent_tool' not implemented by this server.",
        })
    );

    // The loop keeps serving after the failure.
    let response = client.request(2, "tools/list", json!({})).await;
    assert!(response.get("result").is_some());
}

#[tokio::test]
async fn insert_then_query_returns_new_row() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let envelope = client
        .call_tool(
            1,
            "insert_data",
            json!({
                "table_name": "users",
                "data": {"username": "u3", "email": "u3@example.com"},
            }),
        )
        .await;
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["row_id"], 3);

    let envelope = client
        .call_tool(2, "query_db_table", json!({"table_name": "users"}))
        .await;
    assert_eq!(envelope["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_call_without_name_survives() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let response = client
        .request(9, "tools/call", json!({"arguments": {}}))
        .await;
    assert_eq!(response["error"]["code"], -32602);

    // The loop is still alive.
    let response = client.request(10, "ping", json!({})).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn delete_with_blank_condition_is_refused() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let envelope = client
        .call_tool(
            1,
            "delete_data",
            json!({"table_name": "todos", "condition": "   "}),
        )
        .await;
    assert_eq!(envelope["success"], false);
    assert_eq!(
        envelope["message"],
        "Deletion condition cannot be empty. This is a safety measure to prevent \
         accidental deletion of all rows."
    );

    // Zero mutations happened.
    let envelope = client
        .call_tool(2, "query_db_table", json!({"table_name": "todos"}))
        .await;
    assert_eq!(envelope["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn insert_with_empty_data_is_rejected() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let envelope = client
        .call_tool(1, "insert_data", json!({"table_name": "users", "data": {}}))
        .await;
    assert_eq!(
        envelope,
        json!({"success": false, "message": "No data provided for insertion."})
    );
}

#[tokio::test]
async fn list_db_tables_is_idempotent() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let first = client.call_tool(1, "list_db_tables", json!({})).await;
    let second = client.call_tool(2, "list_db_tables", json!({})).await;
    assert_eq!(first, second);
    assert_eq!(first["tables"], json!(["users", "todos"]));
}

#[tokio::test]
async fn get_table_schema_reports_columns() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let envelope = client
        .call_tool(1, "get_table_schema", json!({"table_name": "users"}))
        .await;
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["table_name"], "users");
    let columns: Vec<&str> = envelope["columns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(columns, vec!["id", "username", "email"]);
}

#[tokio::test]
async fn clean_eof_terminates_loop_normally() {
    let (client, handle) = start_test_server();
    drop(client);

    let result = handle.await.unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn broken_framing_drops_connection() {
    let (mut client, handle) = start_test_server();
    client.send_raw("{this is not json").await;

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(sqlite_mcp::Error::Protocol(_))));
}

#[tokio::test]
async fn unknown_method_returns_error_response() {
    let (mut client, _handle) = start_test_server();
    client.initialize().await;

    let response = client.request(4, "resources/list", json!({})).await;
    assert_eq!(response["error"]["code"], -32601);
}
