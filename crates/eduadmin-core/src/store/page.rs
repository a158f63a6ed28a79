use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Pagination;

/// Collection-level pagination totals, as last reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub total: u64,
    pub total_pages: u32,
}

impl From<&Pagination> for Metadata {
    fn from(p: &Pagination) -> Self {
        Self {
            total: p.total,
            total_pages: p.total_pages,
        }
    }
}

/// Cached result for one page number of a paginated collection.
///
/// `data == None` means the page was touched (loading or errored) but no
/// successful response has been stored yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub data: Option<Vec<Value>>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Page {
    pub fn items(&self) -> &[Value] {
        self.data.as_deref().unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// A flat, unordered collection fetched in one go.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatCollection {
    pub items: Option<Vec<Value>>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Shallow-merge `patch` into `target`.
///
/// Top-level fields of an object patch overwrite the target's; other target
/// fields are left alone. A non-object on either side replaces the target.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    match (target.as_object_mut(), patch.as_object()) {
        (Some(target), Some(patch)) => {
            for (k, v) in patch {
                target.insert(k.clone(), v.clone());
            }
        }
        _ => *target = patch.clone(),
    }
}
