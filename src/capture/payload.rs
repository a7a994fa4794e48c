//! Pure payload checks — functional core.
//!
//! No I/O here: strings and JSON values in, validated image data out.

use super::CaptureError;
use serde_json::Value;

/// Shortest payload accepted as an encoded image. Anything shorter is an
/// empty or placeholder string from the native side.
pub const MIN_PAYLOAD_LEN: usize = 100;

/// Accept `payload` as base64 image data, or fail with `EmptyImageData`.
pub fn validate_payload(payload: String) -> Result<String, CaptureError> {
    if payload.len() < MIN_PAYLOAD_LEN {
        return Err(CaptureError::EmptyImageData);
    }
    Ok(payload)
}

/// Image data carried by `capture-done`. Non-string payloads count as empty.
pub(crate) fn image_from_signal(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => {
            log::warn!("[CAPTURE] capture-done carried a non-string payload: {}", other);
            String::new()
        }
    }
}

/// Message carried by `capture-error`.
pub(crate) fn message_from_signal(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        Value::Null => "Unknown capture error".to_string(),
        other => other.to_string(),
    }
}
