//! Response envelope types shared across the ERP services.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// DRF pagination envelope: `{results, count, next, previous}`.
///
/// Several backend endpoints return a bare array or `{items: [...]}` instead
/// of the envelope; [`Page::from_value`] reconciles all three known shapes
/// into this canonical one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl<T> Page<T> {
    /// Synthetic empty page, substituted for 404s on list endpoints.
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            count: 0,
            next: None,
            previous: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Coerces a list response of any known backend shape into a page.
    ///
    /// Shapes, in order of recognition: the full envelope (`results`
    /// present), `{items: [...]}`, a bare JSON array. Anything else
    /// (including null from an empty body) becomes an empty page, keeping
    /// list consumers functional against partially-deployed endpoints.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Object(ref map) if map.contains_key("results") => serde_json::from_value(value),
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => Self::from_items(items),
                _ => Ok(Self::empty()),
            },
            Value::Array(items) => Self::from_items(items),
            _ => Ok(Self::empty()),
        }
    }

    fn from_items(items: Vec<Value>) -> Result<Self, serde_json::Error> {
        let count = items.len() as u64;
        let results = items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(Self {
            results,
            count,
            next: None,
            previous: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_shape_passes_through() {
        let page: Page<Value> = Page::from_value(json!({
            "results": [{"id": 1}, {"id": 2}],
            "count": 40,
            "next": "http://x/?page=2",
            "previous": null
        }))
        .unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.count, 40);
        assert_eq!(page.next.as_deref(), Some("http://x/?page=2"));
    }

    #[test]
    fn items_shape_is_remapped() {
        let page: Page<Value> = Page::from_value(json!({"items": [{"id": 7}]})).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.count, 1);
        assert!(page.next.is_none());
    }

    #[test]
    fn bare_array_is_wrapped() {
        let page: Page<Value> = Page::from_value(json!([{"id": 1}, {"id": 2}, {"id": 3}])).unwrap();
        assert_eq!(page.results.len(), 3);
        assert_eq!(page.count, 3);
    }

    #[test]
    fn unrecognized_shapes_become_empty() {
        let page: Page<Value> = Page::from_value(json!({"unexpected": true})).unwrap();
        assert!(page.is_empty());
        let page: Page<Value> = Page::from_value(Value::Null).unwrap();
        assert!(page.is_empty());
    }
}
