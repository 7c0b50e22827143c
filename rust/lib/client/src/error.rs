use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key the backend uses for errors that belong to no single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

const NETWORK_MESSAGE: &str = "Network error, please try again.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
const NOT_FOUND_MESSAGE: &str = "Not found.";
const UNEXPECTED_MESSAGE: &str = "Something went wrong. Please try again.";

// ── FieldErrors ─────────────────────────────────────────────────────

/// Field-keyed validation errors, one message per field plus an optional
/// general message.
///
/// Local form checks and backend 4xx bodies both end up in this shape, so
/// a form renders errors the same way whatever produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    general: Option<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding only a general message.
    pub fn general_message(message: impl Into<String>) -> Self {
        Self {
            fields: BTreeMap::new(),
            general: Some(message.into()),
        }
    }

    /// Errors holding one field message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Set the general message unless one is already present.
    pub fn set_general(&mut self, message: impl Into<String>) {
        if self.general.is_none() {
            self.general = Some(message.into());
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn general(&self) -> Option<&str> {
        self.general.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_none()
    }

    /// Normalize a backend error body.
    ///
    /// - `"message"` becomes the general message
    /// - `{"title": ["required", ...]}` keeps the first message per field
    /// - `non_field_errors` wins over `detail` for the general message
    /// - scalars are stringified
    pub fn from_body(body: &Value) -> Self {
        let mut errors = Self::new();
        match body {
            Value::Object(map) => {
                if let Some(v) = map.get(NON_FIELD_ERRORS) {
                    errors.set_general(first_message(v));
                }
                if let Some(v) = map.get("detail") {
                    errors.set_general(first_message(v));
                }
                for (key, value) in map {
                    if key != NON_FIELD_ERRORS && key != "detail" {
                        errors.insert(key.clone(), first_message(value));
                    }
                }
            }
            Value::Null => {}
            other => errors.set_general(first_message(other)),
        }
        errors
    }

    /// Normalize a raw response body that may or may not be JSON.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::new();
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => Self::from_body(&value),
            Err(_) => Self::general_message(trimmed),
        }
    }
}

fn first_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.first().map(first_message).unwrap_or_default(),
        Value::Object(map) => map
            .values()
            .next()
            .map(first_message)
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        if let Some(general) = &self.general {
            parts.push(general.clone());
        }
        f.write_str(&parts.join("; "))
    }
}

// ── ApiError ────────────────────────────────────────────────────────

/// Client-side API error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network: {0}")]
    Network(String),

    /// 401 that the refresh-and-retry protocol could not recover.
    #[error("unauthorized")]
    Unauthorized,

    /// 404 / 410.
    #[error("not found")]
    NotFound,

    /// 4xx with a body, normalized per field.
    #[error("validation: {0}")]
    Validation(FieldErrors),

    /// Any other unsuccessful status.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// A successful response whose body did not have the expected shape.
    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Project the error into the field-keyed shape forms render.
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            ApiError::Network(_) => FieldErrors::general_message(NETWORK_MESSAGE),
            ApiError::Unauthorized => FieldErrors::general_message(SESSION_EXPIRED_MESSAGE),
            ApiError::NotFound => FieldErrors::general_message(NOT_FOUND_MESSAGE),
            ApiError::Validation(errors) if !errors.is_empty() => errors.clone(),
            ApiError::Validation(_) | ApiError::Decode(_) => {
                FieldErrors::general_message(UNEXPECTED_MESSAGE)
            }
            ApiError::Server { status, .. } => {
                FieldErrors::general_message(format!("Server error ({status}). Please try again."))
            }
        }
    }

    /// One-line message suitable for a notice.
    pub fn user_message(&self) -> String {
        let errors = self.field_errors();
        match errors.general() {
            Some(general) => general.to_string(),
            None => errors.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
