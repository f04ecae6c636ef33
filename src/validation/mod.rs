//! Validation and normalization of untrusted event payloads.
//!
//! Payloads arrive as untyped JSON objects. Each field goes through
//! [`normalize_string`] (presence and type, then trim) and is then checked
//! against its rule: required or optional, maximum length, and for `date`
//! the ISO 8601 grammar in [`date`]. Lengths are counted in Unicode scalar
//! values.
//!
//! Fields are checked in declaration order (title, date, location,
//! description) and the first violation is reported.

pub mod date;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::models::{EventPatch, FieldUpdate, NewEvent};

pub use date::is_valid_date_time;

pub const TITLE_MAX_LEN: usize = 200;
pub const LOCATION_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

/// Image MIME types accepted for uploads, with the file extension used in
/// the storage key.
pub const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

pub const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// Field-level validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be a string")]
    NotAString { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} cannot be null")]
    NullNotAllowed { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be valid ISO 8601")]
    InvalidDate { field: &'static str },

    #[error("{field} must be one of: {allowed}")]
    UnsupportedContentType { field: &'static str, allowed: String },

    #[error("request body must be a JSON object")]
    NotAnObject,
}

impl ValidationError {
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Missing { field }
            | ValidationError::NotAString { field }
            | ValidationError::Empty { field }
            | ValidationError::NullNotAllowed { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidDate { field }
            | ValidationError::UnsupportedContentType { field, .. } => Some(*field),
            ValidationError::NotAnObject => None,
        }
    }

    /// Machine-readable details for the error response body.
    pub fn details(&self) -> Value {
        match self {
            ValidationError::TooLong { field, max } => json!({ "field": field, "maxLength": max }),
            ValidationError::UnsupportedContentType { field, .. } => {
                let allowed: Vec<&str> = ALLOWED_IMAGE_TYPES.iter().map(|(mime, _)| *mime).collect();
                json!({ "field": field, "allowed": allowed })
            }
            other => json!({ "field": other.field() }),
        }
    }
}

/// Outcome of normalizing a single raw field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// The key was not present in the payload.
    Absent,
    /// The key was present with an explicit `null`.
    Null,
    /// A string, trimmed. May be empty.
    Value(String),
}

/// The raw value was neither absent, `null`, nor a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotAString;

/// Normalizes a raw JSON field. `None` means the key was omitted.
///
/// Length is not inspected here; see [`validate_max_len`].
pub fn normalize_string(value: Option<&Value>) -> Result<Normalized, NotAString> {
    match value {
        None => Ok(Normalized::Absent),
        Some(Value::Null) => Ok(Normalized::Null),
        Some(Value::String(s)) => Ok(Normalized::Value(s.trim().to_string())),
        Some(_) => Err(NotAString),
    }
}

/// True iff `value` has at most `max` Unicode scalar values.
pub fn validate_max_len(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

fn normalize_field(payload: &Map<String, Value>, field: &'static str) -> Result<Normalized, ValidationError> {
    normalize_string(payload.get(field)).map_err(|_| ValidationError::NotAString { field })
}

fn check_len(value: String, field: &'static str, max: usize) -> Result<String, ValidationError> {
    if validate_max_len(&value, max) {
        Ok(value)
    } else {
        Err(ValidationError::TooLong { field, max })
    }
}

fn check_date(value: String, field: &'static str) -> Result<String, ValidationError> {
    if is_valid_date_time(&value) {
        Ok(value)
    } else {
        Err(ValidationError::InvalidDate { field })
    }
}

/// A required, non-empty string. Omitted and `null` are both "missing".
fn required_string(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match normalize_field(payload, field)? {
        Normalized::Absent | Normalized::Null => Err(ValidationError::Missing { field }),
        Normalized::Value(s) if s.is_empty() => Err(ValidationError::Empty { field }),
        Normalized::Value(s) => Ok(s),
    }
}

/// A field that may be omitted but, when given, must be a non-empty string.
/// `null` is rejected because the field cannot be cleared.
fn replaceable_string(
    payload: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match normalize_field(payload, field)? {
        Normalized::Absent => Ok(None),
        Normalized::Null => Err(ValidationError::NullNotAllowed { field }),
        Normalized::Value(s) if s.is_empty() => Err(ValidationError::Empty { field }),
        Normalized::Value(s) => Ok(Some(s)),
    }
}

/// An optional, clearable string bounded by `max`.
fn nullable_string(
    payload: &Map<String, Value>,
    field: &'static str,
    max: usize,
) -> Result<FieldUpdate<String>, ValidationError> {
    match normalize_field(payload, field)? {
        Normalized::Absent => Ok(FieldUpdate::Unchanged),
        Normalized::Null => Ok(FieldUpdate::Clear),
        Normalized::Value(s) => check_len(s, field, max).map(FieldUpdate::Set),
    }
}

fn into_option(update: FieldUpdate<String>) -> Option<String> {
    match update {
        FieldUpdate::Set(value) => Some(value),
        FieldUpdate::Unchanged | FieldUpdate::Clear => None,
    }
}

/// Validates a create payload.
pub fn validate_new_event(payload: &Map<String, Value>) -> Result<NewEvent, ValidationError> {
    let title = check_len(required_string(payload, "title")?, "title", TITLE_MAX_LEN)?;
    let date = check_date(required_string(payload, "date")?, "date")?;
    let location = into_option(nullable_string(payload, "location", LOCATION_MAX_LEN)?);
    let description = into_option(nullable_string(payload, "description", DESCRIPTION_MAX_LEN)?);

    Ok(NewEvent {
        title,
        date,
        location,
        description,
    })
}

/// Validates an update payload. Every field is optional; nothing is applied
/// unless all fields pass.
pub fn validate_event_patch(payload: &Map<String, Value>) -> Result<EventPatch, ValidationError> {
    let title = replaceable_string(payload, "title")?
        .map(|s| check_len(s, "title", TITLE_MAX_LEN))
        .transpose()?;
    let date = replaceable_string(payload, "date")?
        .map(|s| check_date(s, "date"))
        .transpose()?;
    let location = nullable_string(payload, "location", LOCATION_MAX_LEN)?;
    let description = nullable_string(payload, "description", DESCRIPTION_MAX_LEN)?;

    Ok(EventPatch {
        title,
        date,
        location,
        description,
    })
}

/// Resolves the requested upload content type against the allow-list and
/// returns it with its file extension. Omitted or `null` falls back to
/// [`DEFAULT_IMAGE_TYPE`].
pub fn validate_content_type(
    payload: &Map<String, Value>,
) -> Result<(&'static str, &'static str), ValidationError> {
    const FIELD: &str = "contentType";

    let requested = match normalize_field(payload, FIELD)? {
        Normalized::Absent | Normalized::Null => DEFAULT_IMAGE_TYPE.to_string(),
        Normalized::Value(s) => s,
    };

    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == requested)
        .copied()
        .ok_or_else(|| ValidationError::UnsupportedContentType {
            field: FIELD,
            allowed: ALLOWED_IMAGE_TYPES
                .iter()
                .map(|(mime, _)| *mime)
                .collect::<Vec<_>>()
                .join(", "),
        })
}
