//! Success envelopes
//!
//! Every successful response is `{ success: true, data, message }`. A write
//! whose ledger transaction confirmed but whose mirror write-back failed
//! additionally carries a top-level `warning` - partial success is never an
//! error status.

use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": data,
        "message": message.into(),
    }))
}

pub fn ok_with_warning<T: Serialize>(
    data: T,
    message: impl Into<String>,
    warning: Option<String>,
) -> Json<Value> {
    let mut body = json!({
        "success": true,
        "data": data,
        "message": message.into(),
    });
    if let Some(warning) = warning {
        body["warning"] = Value::String(warning);
    }
    Json(body)
}
