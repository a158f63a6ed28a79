use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pagination block returned by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub total: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Common response shape: a machine-readable `code`, an optional
/// human-readable `message`, and a resource-specific payload field
/// (`tests`, `teachers`, `users`, `user`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Envelope {
    /// Take the payload stored under `field`.
    pub fn take(&mut self, field: &str) -> Option<Value> {
        self.body.remove(field)
    }

    /// Take a list payload; a missing or non-array field yields an empty list.
    pub fn take_items(&mut self, field: &str) -> Vec<Value> {
        match self.take(field) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_parses_camel_case() {
        let p: Pagination = serde_json::from_value(json!({
            "total": 30, "totalPages": 3, "hasNextPage": true, "hasPrevPage": false
        }))
        .unwrap();
        assert_eq!(p.total, 30);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
        assert!(!p.has_prev_page);
    }

    #[test]
    fn test_pagination_missing_fields_default() {
        let p: Pagination = serde_json::from_value(json!({"total": 1})).unwrap();
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
    }

    #[test]
    fn test_envelope_take_items() {
        let mut env: Envelope = serde_json::from_value(json!({
            "code": "testsFetched",
            "tests": [{"_id": "t1"}, {"_id": "t2"}],
            "pagination": {"total": 2, "totalPages": 1, "hasNextPage": false, "hasPrevPage": false}
        }))
        .unwrap();
        assert_eq!(env.code, "testsFetched");
        assert_eq!(env.pagination.map(|p| p.total), Some(2));
        assert_eq!(env.take_items("tests").len(), 2);
        assert!(env.take_items("tests").is_empty());
    }
}
