//! Request and response bodies.
//!
//! # Design
//! Bodies are a tagged variant instead of an untyped value: structured data
//! is a `JsonValue` (object, array, string, number, bool or null), everything
//! else is text or bytes. Encoding to the wire is decided by content
//! negotiation in `Request::body`; this module only provides the encoders.

use crate::error::ApiError;

/// The JSON sum type used for structured bodies.
pub type JsonValue = serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Json(JsonValue),
    Text(String),
    Bytes(Vec<u8>),
}

impl Body {
    /// Empty bodies are never attached to a request.
    ///
    /// Null, empty strings and empty JSON containers count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Json(value) => match value {
                JsonValue::Null => true,
                JsonValue::String(text) => text.is_empty(),
                JsonValue::Array(items) => items.is_empty(),
                JsonValue::Object(fields) => fields.is_empty(),
                JsonValue::Bool(_) | JsonValue::Number(_) => false,
            },
            Self::Text(text) => text.is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
        }
    }

    /// The JSON value, if this body is structured.
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Raw bytes to put on the wire; structured values are sent as compact
    /// JSON.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Empty => Vec::new(),
            Self::Json(value) => value.to_string().into_bytes(),
            Self::Text(text) => text.into_bytes(),
            Self::Bytes(bytes) => bytes,
        }
    }
}

impl From<JsonValue> for Body {
    fn from(value: JsonValue) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

pub(crate) fn encode_json(body: &Body) -> Result<String, ApiError> {
    match body {
        Body::Empty => Ok("null".to_string()),
        Body::Json(value) => serde_json::to_string(value).map_err(ApiError::decode),
        Body::Text(text) => serde_json::to_string(text).map_err(ApiError::decode),
        Body::Bytes(_) => Err(ApiError::decode("binary body cannot be encoded as JSON")),
    }
}

/// Form-encodes a JSON object: scalars are stringified, nulls skipped.
pub(crate) fn encode_form(body: &Body) -> Result<String, ApiError> {
    let fields = match body {
        Body::Empty => return Ok(String::new()),
        Body::Json(JsonValue::Object(fields)) => fields,
        Body::Text(text) => return Ok(text.clone()),
        _ => return Err(ApiError::decode("only JSON objects can be form-encoded")),
    };

    let mut pairs = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        let value = match value {
            JsonValue::Null => continue,
            JsonValue::String(text) => text.clone(),
            JsonValue::Bool(flag) => flag.to_string(),
            JsonValue::Number(number) => number.to_string(),
            JsonValue::Array(_) | JsonValue::Object(_) => {
                return Err(ApiError::decode(format!(
                    "form field '{name}' must be a scalar"
                )));
            }
        };
        pairs.push((name.as_str(), value));
    }
    serde_urlencoded::to_string(pairs).map_err(ApiError::decode)
}
