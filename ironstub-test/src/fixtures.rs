//! Payloads in each accepted message format

use serde_json::{json, Value};

/// A plain string message
pub fn text() -> Value {
    json!("someMessage")
}

/// An object with a string body
pub fn body() -> Value {
    json!({"body": "someMessage"})
}

/// An object with a structured body, stored serialized
pub fn nested() -> Value {
    json!({"body": {"some": "message"}})
}

/// One message in every format, as an array
pub fn all_formats() -> Value {
    Value::Array(vec![text(), body(), nested()])
}
