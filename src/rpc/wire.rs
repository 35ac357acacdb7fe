//! Wire message shapes for the JSON-RPC / MCP protocol.
//!
//! Three message families cross the transport: the one-time `initialize`
//! exchange, tool discovery (`tools/list`), and tool invocation
//! (`tools/call`). Everything is a single-line JSON object; responses carry
//! exactly one of `result`/`error`, which the [`ResponsePayload`] enum
//! enforces structurally.

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// JSON-RPC protocol marker carried on every frame.
pub const JSONRPC_VERSION: &str = "2.0";

/// Supported MCP protocol versions in order of preference.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2024-11-05", "2024-10-07"];

// JSON-RPC error codes
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

// Method names
pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
pub const METHOD_LIST_TOOLS: &str = "tools/list";
pub const METHOD_CALL_TOOL: &str = "tools/call";
pub const METHOD_PING: &str = "ping";

/// Correlation token of a request expecting a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Call expecting a response (id present).
    Request {
        id: RequestId,
        method: String,
        params: Value,
    },
    /// Fire-and-forget notification (no id).
    Notification { method: String, params: Value },
}

/// A structurally invalid inbound frame.
///
/// When `id` is present the violation is answered with an error response;
/// without an id the framing is unrecoverable and the connection drops.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolViolation {
    pub id: Option<RequestId>,
    pub message: String,
}

/// Decode one line into an [`Incoming`] message.
pub fn decode_incoming(line: &str) -> std::result::Result<Incoming, ProtocolViolation> {
    let value: Value = serde_json::from_str(line).map_err(|e| ProtocolViolation {
        id: None,
        message: format!("Invalid JSON frame: {e}"),
    })?;

    let Value::Object(mut obj) = value else {
        return Err(ProtocolViolation {
            id: None,
            message: "Request frame must be a JSON object".to_string(),
        });
    };

    let id = obj.get("id").and_then(parse_request_id);

    match obj.get("jsonrpc").and_then(|v| v.as_str()) {
        Some(JSONRPC_VERSION) => {}
        _ => {
            return Err(ProtocolViolation {
                id,
                message: "Missing or unsupported jsonrpc version".to_string(),
            })
        }
    }

    let method = match obj.get("method").and_then(|v| v.as_str()) {
        Some(m) => m.to_string(),
        None => {
            return Err(ProtocolViolation {
                id,
                message: "Missing required field: method".to_string(),
            })
        }
    };

    let params = obj
        .remove("params")
        .unwrap_or_else(|| Value::Object(Map::new()));

    Ok(match id {
        Some(id) => Incoming::Request { id, method, params },
        None => Incoming::Notification { method, params },
    })
}

fn parse_request_id(value: &Value) -> Option<RequestId> {
    match value {
        Value::Number(n) => n.as_i64().map(RequestId::Number),
        Value::String(s) => Some(RequestId::String(s.clone())),
        _ => None,
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Success payload or error — never both, never neither.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    Result(Value),
    Error(RpcError),
}

/// Outbound response correlated to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: RequestId,
    pub payload: ResponsePayload,
}

impl Response {
    pub fn result(id: RequestId, result: Value) -> Self {
        Self {
            id,
            payload: ResponsePayload::Result(result),
        }
    }

    pub fn error(id: RequestId, error: RpcError) -> Self {
        Self {
            id,
            payload: ResponsePayload::Error(error),
        }
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 3)?;
        state.serialize_field("jsonrpc", JSONRPC_VERSION)?;
        state.serialize_field("id", &self.id)?;
        match &self.payload {
            ResponsePayload::Result(value) => state.serialize_field("result", value)?,
            ResponsePayload::Error(error) => state.serialize_field("error", error)?,
        }
        state.end()
    }
}

impl<'de> Deserialize<'de> for Response {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct WireResponse {
            jsonrpc: String,
            id: RequestId,
            #[serde(default)]
            result: Option<Value>,
            #[serde(default)]
            error: Option<RpcError>,
        }

        let wire = WireResponse::deserialize(deserializer)?;
        if wire.jsonrpc != JSONRPC_VERSION {
            return Err(D::Error::custom(format!(
                "unsupported jsonrpc version: {}",
                wire.jsonrpc
            )));
        }
        let payload = match (wire.result, wire.error) {
            (Some(result), None) => ResponsePayload::Result(result),
            (None, Some(error)) => ResponsePayload::Error(error),
            _ => {
                return Err(D::Error::custom(
                    "response must carry exactly one of result/error",
                ))
            }
        };
        Ok(Response {
            id: wire.id,
            payload,
        })
    }
}

// =============================================================================
// MCP handshake shapes
// =============================================================================

/// Name/version pair identifying one side of the connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Capabilities advertised by the server: tool discovery and invocation only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

/// Marker object — the tools capability carries no options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsCapability {}

/// Client half of the initialize exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    #[serde(default)]
    pub client_info: Option<Implementation>,
}

/// Server half of the initialize exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
}

// =============================================================================
// Tool discovery and invocation shapes
// =============================================================================

/// Advertised tool: name, description, and argument schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// `tools/list` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolDescriptor>,
}

/// `tools/call` params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// `tools/call` result: a single text block carrying the serialized
/// invocation envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

/// Content block inside a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}
