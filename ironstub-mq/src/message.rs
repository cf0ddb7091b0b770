//! Message records and payload normalization

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lease duration reported on messages, in seconds
pub const DEFAULT_MESSAGE_TIMEOUT_SECS: u64 = 60;

/// Reserved count reported on messages
pub const DEFAULT_RESERVED_COUNT: u32 = 3;

/// A message as stored in a queue and handed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub body: String,
    /// Informational only. Queues release messages after their own release timeout.
    pub timeout: u64,
    pub reserved_count: u32,
    pub push_status: Map<String, Value>,
}

impl Message {
    pub fn new(id: String, body: String, timeout: u64) -> Self {
        Self {
            id,
            body,
            timeout,
            reserved_count: DEFAULT_RESERVED_COUNT,
            push_status: Map::new(),
        }
    }
}

/// Reduce one posted element to the body string that gets stored.
///
/// Strings are stored as-is. Objects contribute their `body` field: string
/// bodies are kept, object and array bodies are serialized. An object with no
/// `body` (or a null one) is serialized whole. Anything else is rejected and
/// the returned error names the offending JSON kind.
pub(crate) fn normalize_body(value: Value) -> Result<String, &'static str> {
    match value {
        Value::String(text) => Ok(text),
        Value::Object(fields) => match fields.get("body") {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(body @ (Value::Object(_) | Value::Array(_))) => Ok(body.to_string()),
            Some(Value::Null) | None => Ok(Value::Object(fields).to_string()),
            Some(other) => Err(kind_of(other)),
        },
        other => Err(kind_of(&other)),
    }
}

/// JSON kind name used in validation errors
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
