//! Query-string construction for DRF-style list endpoints.
//!
//! The backend ignores blank filters but treats `0` and `false` as real
//! values, so the builder drops unset/blank entries while preserving
//! falsy-but-defined ones. Array values become repeated keys, which is how
//! DRF parses multi-value filters.

use std::fmt::Write as _;

use url::form_urlencoded;

/// One query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Many(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        QueryValue::Many(value)
    }
}

/// Ordered set of query parameters with last-write-wins keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pairs: Vec<(String, QueryValue)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any existing entry for the key.
    pub fn set(mut self, key: &str, value: impl Into<QueryValue>) -> Self {
        let value = value.into();
        if let Some(existing) = self.pairs.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value;
        } else {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    /// Sets `key` only when `value` is `Some`.
    pub fn set_opt(self, key: &str, value: Option<impl Into<QueryValue>>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    /// Overlays `other` onto `self`; `other`'s entries win on key conflict.
    pub fn merge(mut self, other: Query) -> Self {
        for (key, value) in other.pairs {
            self = self.set(&key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encodes the parameters as `?a=b&c=d`, or an empty string when nothing
    /// survives filtering. Blank and whitespace-only text values are
    /// dropped; `0` and `false` are kept.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.pairs {
            match value {
                QueryValue::Text(text) => {
                    if !text.trim().is_empty() {
                        serializer.append_pair(key, text);
                    }
                },
                QueryValue::Int(n) => {
                    serializer.append_pair(key, &n.to_string());
                },
                QueryValue::Bool(b) => {
                    serializer.append_pair(key, if *b { "true" } else { "false" });
                },
                QueryValue::Many(items) => {
                    for item in items {
                        if !item.trim().is_empty() {
                            serializer.append_pair(key, item);
                        }
                    }
                },
            }
        }
        let encoded = serializer.finish();
        if encoded.is_empty() {
            String::new()
        } else {
            let mut qs = String::with_capacity(encoded.len() + 1);
            let _ = write!(qs, "?{}", encoded);
            qs
        }
    }
}
