//! Error types for the ERP HTTP client layer.
//!
//! The backend is a set of Django REST Framework services that report
//! failures in several body shapes (`detail`, `message`, `error`, or a
//! per-field validation map). [`ErrorBody`] parses those shapes once, at the
//! HTTP boundary, so callers can pattern-match instead of re-parsing display
//! strings.

use std::collections::BTreeMap;
use std::fmt::Display;

use thiserror::Error;

/// Errors that can occur while talking to the ERP backend services.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The HTTP request failed at the transport level (connection refused,
    /// DNS failure, timeout, TLS handshake).
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The server returned 404 for a specific resource path.
    ///
    /// List-style calls translate this into an empty page before it reaches
    /// the caller; it only surfaces for `retrieve`/mutation calls, where it
    /// means the record genuinely does not exist.
    #[error("Not found: {path}")]
    NotFound {
        /// The request path that produced the 404.
        path: String,
    },

    /// The server returned a non-success status other than 404.
    ///
    /// Carries the status code and the parsed error body so callers needing
    /// field-level validation detail can match on [`ErrorBody::FieldErrors`].
    #[error("{}", ApiErrorDisplay { status: *status, body })]
    Api {
        /// The HTTP status code returned by the server.
        status: u16,
        /// The parsed error body.
        body: ErrorBody,
    },

    /// A caller-supplied header name or value was not valid HTTP.
    #[error("Invalid header: {name}")]
    InvalidHeader { name: String },

    /// Failed to parse or construct a URL from the configured base and a
    /// request path.
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// Failed to serialize or deserialize JSON data.
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl HttpError {
    /// True when the error represents resource absence (a real 404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, HttpError::NotFound { .. })
    }

    /// The server status code, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::NotFound { .. } => Some(404),
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Parsed shape of a non-2xx response body.
///
/// Tagged union replacing the original frontend's string heuristics: either
/// the server supplied a single human-readable message, or it supplied a
/// DRF-style per-field validation map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// A single message (from `detail`, `message`, or `error`).
    Message(String),
    /// A field -> messages validation map.
    FieldErrors(BTreeMap<String, Vec<String>>),
    /// Body was absent, empty, or not a recognized shape.
    Opaque,
}

impl ErrorBody {
    /// Parses a raw response body into an [`ErrorBody`].
    ///
    /// Extraction priority follows the backend's conventions: `detail`,
    /// then `message`, then `error`, then a per-field validation map.
    /// Anything else (non-JSON, empty, non-object) is [`ErrorBody::Opaque`].
    pub fn parse(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => return ErrorBody::Opaque,
        };
        let obj = match value.as_object() {
            Some(o) if !o.is_empty() => o,
            _ => return ErrorBody::Opaque,
        };

        for key in ["detail", "message", "error"] {
            if let Some(text) = obj.get(key).and_then(|v| v.as_str()) {
                return ErrorBody::Message(text.to_string());
            }
        }

        // DRF validation shape: {field: ["msg", ...], ...}. Values may also
        // be plain strings on some endpoints.
        let mut fields = BTreeMap::new();
        for (field, messages) in obj {
            let msgs = match messages {
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|m| match m.as_str() {
                        Some(s) => s.to_string(),
                        None => m.to_string(),
                    })
                    .collect(),
                serde_json::Value::String(s) => vec![s.clone()],
                other => vec![other.to_string()],
            };
            fields.insert(field.clone(), msgs);
        }
        ErrorBody::FieldErrors(fields)
    }

    /// Per-field validation messages, when present.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            ErrorBody::FieldErrors(fields) => Some(fields),
            _ => None,
        }
    }
}

struct ApiErrorDisplay<'a> {
    status: u16,
    body: &'a ErrorBody,
}

impl Display for ApiErrorDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.body {
            ErrorBody::Message(text) => write!(f, "{}", text),
            ErrorBody::FieldErrors(fields) => {
                let joined = fields
                    .iter()
                    .map(|(field, msgs)| format!("{}: {}", field, msgs.join(", ")))
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "{}", joined)
            },
            ErrorBody::Opaque => write!(f, "HTTP error! status: {}", self.status),
        }
    }
}
