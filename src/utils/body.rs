use serde_json::{Map, Value};

use crate::utils::error::AppError;
use crate::validation::ValidationError;

/// Upper bound on how much of a rejected body is echoed back.
pub const PREVIEW_MAX_CHARS: usize = 200;

/// Parses a raw request body into a JSON object. An empty body is an empty
/// object.
pub fn parse_json_object(raw: &[u8]) -> Result<Map<String, Value>, AppError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ValidationError::NotAnObject.into()),
        Err(e) => Err(AppError::MalformedJson {
            message: e.to_string(),
            preview: preview(raw),
        }),
    }
}

fn preview(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .chars()
        .take(PREVIEW_MAX_CHARS)
        .collect()
}
