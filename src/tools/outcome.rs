//! Uniform tool invocation envelope.
//!
//! Every handler resolves to a [`ToolOutcome`] regardless of backend, so the
//! dispatch loop never special-cases individual tools. The success/failure
//! split is a sum type: a failure carries a message and nothing else, so the
//! "never both" invariant holds by construction.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::Result;

/// Result envelope every tool call is serialized into.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Operation succeeded; payload fields are flattened next to the message.
    Success {
        message: String,
        payload: Map<String, Value>,
    },
    /// Operation failed with a human-readable reason.
    Failure { message: String },
}

impl ToolOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
            payload: Map::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Attach a payload field. No-op on failures, which carry only a message.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        if let Self::Success { payload, .. } = &mut self {
            payload.insert(key.to_string(), value);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message } => message,
        }
    }

    /// Render the envelope as the pretty-printed text block placed in the
    /// response content (2-space indentation).
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for ToolOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Success { message, payload } => {
                let mut map = serializer.serialize_map(Some(2 + payload.len()))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("message", message)?;
                for (key, value) in payload {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Failure { message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("message", message)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ToolOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut fields = Map::deserialize(deserializer)?;
        let success = fields
            .remove("success")
            .and_then(|v| v.as_bool())
            .ok_or_else(|| D::Error::missing_field("success"))?;
        let message = match fields.remove("message") {
            Some(Value::String(s)) => s,
            _ => return Err(D::Error::missing_field("message")),
        };
        Ok(if success {
            Self::Success {
                message,
                payload: fields,
            }
        } else {
            Self::Failure { message }
        })
    }
}
