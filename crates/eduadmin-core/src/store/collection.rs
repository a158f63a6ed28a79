//! Named collections, either flat or paginated.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::models::Pagination;

use super::error::{Shape, StoreError};
use super::key::CollectionKey;
use super::page::{merge_patch, FlatCollection, Metadata, Page};
use super::staleness::StalenessPolicy;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaginatedCollection {
    pub pages: BTreeMap<u32, Page>,
    pub metadata: Option<Metadata>,
}

/// A collection's shape is fixed when it is created.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Unordered(FlatCollection),
    Paginated(PaginatedCollection),
}

impl Collection {
    fn empty(shape: Shape) -> Self {
        match shape {
            Shape::Unordered => Collection::Unordered(FlatCollection::default()),
            Shape::Paginated => Collection::Paginated(PaginatedCollection::default()),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Collection::Unordered(_) => Shape::Unordered,
            Collection::Paginated(_) => Shape::Paginated,
        }
    }
}

fn check_page(page: u32) -> Result<u32, StoreError> {
    if page == 0 {
        Err(StoreError::InvalidPage(page))
    } else {
        Ok(page)
    }
}

#[derive(Debug, Default)]
pub struct CollectionStore {
    collections: HashMap<CollectionKey, Collection>,
}

impl CollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_collection(&self, key: &CollectionKey) -> bool {
        self.collections.contains_key(key)
    }

    /// Create an empty collection of the requested shape. No-op if the key exists.
    pub fn initialize(&mut self, key: &CollectionKey, paginated: bool) {
        let shape = if paginated { Shape::Paginated } else { Shape::Unordered };
        self.collections.entry(key.clone()).or_insert_with(|| {
            debug!(%key, %shape, "Initializing collection");
            Collection::empty(shape)
        });
    }

    pub fn invalidate(&mut self, key: &CollectionKey) -> bool {
        self.collections.remove(key).is_some()
    }

    pub fn invalidate_page(&mut self, key: &CollectionKey, page: u32) -> bool {
        match self.collections.get_mut(key) {
            Some(Collection::Paginated(c)) => c.pages.remove(&page).is_some(),
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.collections.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &CollectionKey> {
        self.collections.keys()
    }

    fn paginated_mut(&mut self, key: &CollectionKey) -> Result<&mut PaginatedCollection, StoreError> {
        match self
            .collections
            .entry(key.clone())
            .or_insert_with(|| Collection::empty(Shape::Paginated))
        {
            Collection::Paginated(c) => Ok(c),
            Collection::Unordered(_) => Err(StoreError::ShapeMismatch {
                key: key.to_string(),
                expected: Shape::Paginated,
                actual: Shape::Unordered,
            }),
        }
    }

    fn flat_mut(&mut self, key: &CollectionKey) -> Result<&mut FlatCollection, StoreError> {
        match self
            .collections
            .entry(key.clone())
            .or_insert_with(|| Collection::empty(Shape::Unordered))
        {
            Collection::Unordered(c) => Ok(c),
            Collection::Paginated(_) => Err(StoreError::ShapeMismatch {
                key: key.to_string(),
                expected: Shape::Unordered,
                actual: Shape::Paginated,
            }),
        }
    }

    fn paginated(&self, key: &CollectionKey) -> Option<&PaginatedCollection> {
        match self.collections.get(key)? {
            Collection::Paginated(c) => Some(c),
            Collection::Unordered(_) => None,
        }
    }

    // ===== Paginated collections =====

    /// Store a page's result, clear its loading flag and refresh the
    /// collection metadata from `pagination`.
    pub fn set_page(
        &mut self,
        key: &CollectionKey,
        page: u32,
        data: Option<Vec<Value>>,
        error: Option<String>,
        pagination: Option<&Pagination>,
    ) -> Result<(), StoreError> {
        let page = check_page(page)?;
        let collection = self.paginated_mut(key)?;
        if let Some(meta) = pagination {
            collection.metadata = Some(Metadata::from(meta));
        }

        let entry = collection.pages.entry(page).or_default();
        entry.fetched_at = data.as_ref().map(|_| Utc::now());
        entry.data = data;
        entry.error = error;
        entry.is_loading = false;
        if let Some(meta) = pagination {
            entry.has_next_page = meta.has_next_page;
            entry.has_prev_page = meta.has_prev_page;
        }
        Ok(())
    }

    pub fn set_page_loading_state(
        &mut self,
        key: &CollectionKey,
        page: u32,
        loading: bool,
    ) -> Result<(), StoreError> {
        let page = check_page(page)?;
        self.paginated_mut(key)?.pages.entry(page).or_default().is_loading = loading;
        Ok(())
    }

    /// Record an error for a page. Previously loaded data is kept.
    pub fn set_page_error_state(
        &mut self,
        key: &CollectionKey,
        page: u32,
        message: impl Into<String>,
    ) -> Result<(), StoreError> {
        let page = check_page(page)?;
        let entry = self.paginated_mut(key)?.pages.entry(page).or_default();
        entry.error = Some(message.into());
        entry.is_loading = false;
        Ok(())
    }

    /// `None` means the page was never touched.
    pub fn get_page_data(&self, key: &CollectionKey, page: u32) -> Option<&Page> {
        self.paginated(key)?.pages.get(&page)
    }

    pub fn get_metadata(&self, key: &CollectionKey) -> Option<Metadata> {
        self.paginated(key)?.metadata
    }

    pub fn is_page_stale(&self, key: &CollectionKey, page: u32, policy: &StalenessPolicy) -> bool {
        self.get_page_data(key, page)
            .and_then(|p| p.fetched_at)
            .map(|at| policy.is_stale(at))
            .unwrap_or(false)
    }

    // ===== Unordered collections =====

    pub fn get_collection(&self, key: &CollectionKey) -> Option<&FlatCollection> {
        match self.collections.get(key)? {
            Collection::Unordered(c) => Some(c),
            Collection::Paginated(_) => None,
        }
    }

    /// Replace a flat collection's items, clearing loading and error.
    pub fn set_collection(&mut self, key: &CollectionKey, items: Vec<Value>) -> Result<(), StoreError> {
        let collection = self.flat_mut(key)?;
        collection.items = Some(items);
        collection.is_loading = false;
        collection.error = None;
        collection.fetched_at = Some(Utc::now());
        Ok(())
    }

    pub fn get_collection_data(&self, key: &CollectionKey) -> Option<&[Value]> {
        self.get_collection(key)?.items.as_deref()
    }

    pub fn get_collection_error(&self, key: &CollectionKey) -> Option<&str> {
        self.get_collection(key)?.error.as_deref()
    }

    pub fn is_collection_loading(&self, key: &CollectionKey) -> bool {
        self.get_collection(key).map(|c| c.is_loading).unwrap_or(false)
    }

    pub fn set_collection_loading_state(&mut self, key: &CollectionKey, loading: bool) -> Result<(), StoreError> {
        self.flat_mut(key)?.is_loading = loading;
        Ok(())
    }

    pub fn set_collection_error_state(
        &mut self,
        key: &CollectionKey,
        message: impl Into<String>,
    ) -> Result<(), StoreError> {
        let collection = self.flat_mut(key)?;
        collection.error = Some(message.into());
        collection.is_loading = false;
        Ok(())
    }

    /// Merge `patch` into the item of a flat collection whose `id_field`
    /// equals `id`. Absent collections and items are left alone.
    ///
    /// Returns whether an item was patched.
    pub fn update_item_by_id(&mut self, id: &str, patch: &Value, id_field: &str, key: &CollectionKey) -> bool {
        let Some(Collection::Unordered(collection)) = self.collections.get_mut(key) else {
            return false;
        };
        let Some(items) = collection.items.as_mut() else {
            return false;
        };

        match items
            .iter_mut()
            .find(|item| item.get(id_field).and_then(Value::as_str) == Some(id))
        {
            Some(item) => {
                merge_patch(item, patch);
                debug!(%key, id, "Patched cached list item");
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::key::TeacherFilter;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tests_all() -> CollectionKey {
        CollectionKey::Tests(TeacherFilter::All)
    }

    fn meta(total: u64, total_pages: u32, next: bool, prev: bool) -> Pagination {
        Pagination {
            total,
            total_pages,
            has_next_page: next,
            has_prev_page: prev,
        }
    }

    // -------------------------------------------------------------------------
    // Paginated
    // -------------------------------------------------------------------------

    #[test]
    fn test_page_absent_until_touched() {
        let mut store = CollectionStore::new();
        store.initialize(&tests_all(), true);
        assert!(store.get_page_data(&tests_all(), 1).is_none());

        store.set_page_loading_state(&tests_all(), 1, true).unwrap();
        assert!(store.get_page_data(&tests_all(), 1).is_some());
        assert!(store.get_page_data(&tests_all(), 2).is_none());
    }

    #[test]
    fn test_set_page_then_get() {
        let mut store = CollectionStore::new();
        let key = tests_all();
        store.initialize(&key, true);
        store.set_page_loading_state(&key, 1, true).unwrap();

        let data = vec![json!({"_id": "t1"}), json!({"_id": "t2"})];
        store
            .set_page(&key, 1, Some(data.clone()), None, Some(&meta(2, 1, false, false)))
            .unwrap();

        let page = store.get_page_data(&key, 1).unwrap();
        assert_eq!(page.data.as_ref(), Some(&data));
        assert_eq!(page.error, None);
        assert!(!page.is_loading);
        assert!(!page.has_next_page);
        assert!(!page.has_prev_page);
        assert!(page.fetched_at.is_some());

        assert_eq!(
            store.get_metadata(&key),
            Some(Metadata { total: 2, total_pages: 1 })
        );
        assert_eq!(page.items().len(), 2);
    }

    #[test]
    fn test_set_page_copies_flags_from_pagination() {
        let mut store = CollectionStore::new();
        let key = tests_all();
        store
            .set_page(&key, 2, Some(vec![]), None, Some(&meta(40, 4, true, true)))
            .unwrap();

        let page = store.get_page_data(&key, 2).unwrap();
        assert!(page.has_next_page);
        assert!(page.has_prev_page);
    }

    #[test]
    fn test_set_page_rejects_page_zero() {
        let mut store = CollectionStore::new();
        assert_eq!(
            store.set_page(&tests_all(), 0, Some(vec![]), None, None),
            Err(StoreError::InvalidPage(0))
        );
        assert_eq!(
            store.set_page_loading_state(&tests_all(), 0, true),
            Err(StoreError::InvalidPage(0))
        );
        assert!(!store.has_collection(&tests_all()));
    }

    #[test]
    fn test_error_state_keeps_prior_data() {
        let mut store = CollectionStore::new();
        let key = tests_all();
        let data = vec![json!({"_id": "t1"})];
        store.set_page(&key, 1, Some(data.clone()), None, None).unwrap();
        store.set_page_loading_state(&key, 1, true).unwrap();

        store.set_page_error_state(&key, 1, "X").unwrap();

        let page = store.get_page_data(&key, 1).unwrap();
        assert_eq!(page.data, Some(data));
        assert_eq!(page.error.as_deref(), Some("X"));
        assert!(!page.is_loading);
    }

    #[test]
    fn test_loading_state_creates_sparse_page() {
        let mut store = CollectionStore::new();
        let key = tests_all();
        store.initialize(&key, true);

        store.set_page_loading_state(&key, 3, true).unwrap();

        let page = store.get_page_data(&key, 3).unwrap();
        assert!(page.is_loading);
        assert_eq!(page.data, None);
        assert_eq!(page.error, None);
        assert!(store.get_page_data(&key, 1).is_none());
        assert!(store.get_page_data(&key, 2).is_none());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut once = CollectionStore::new();
        once.initialize(&tests_all(), true);

        let mut twice = CollectionStore::new();
        twice.initialize(&tests_all(), true);
        twice.initialize(&tests_all(), true);

        assert_eq!(once.collections, twice.collections);
    }

    #[test]
    fn test_initialize_keeps_existing_shape_and_data() {
        let mut store = CollectionStore::new();
        let key = tests_all();
        store.set_page(&key, 1, Some(vec![json!(1)]), None, None).unwrap();
        store.initialize(&key, false);
        assert_eq!(store.get_page_data(&key, 1).unwrap().items().len(), 1);
    }

    #[test]
    fn test_page_ops_on_flat_collection_are_rejected() {
        let mut store = CollectionStore::new();
        store.initialize(&CollectionKey::TeacherNames, false);

        let err = store
            .set_page_loading_state(&CollectionKey::TeacherNames, 1, true)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::ShapeMismatch { expected: Shape::Paginated, actual: Shape::Unordered, .. }
        ));
        assert!(store.get_page_data(&CollectionKey::TeacherNames, 1).is_none());
        assert!(store.get_metadata(&CollectionKey::TeacherNames).is_none());
    }

    #[test]
    fn test_invalidate_page_and_collection() {
        let mut store = CollectionStore::new();
        let key = tests_all();
        store.set_page(&key, 1, Some(vec![]), None, None).unwrap();
        store.set_page(&key, 2, Some(vec![]), None, None).unwrap();

        assert!(store.invalidate_page(&key, 1));
        assert!(store.get_page_data(&key, 1).is_none());
        assert!(store.get_page_data(&key, 2).is_some());

        assert!(store.invalidate(&key));
        assert!(!store.has_collection(&key));
    }

    #[test]
    fn test_is_page_stale() {
        let mut store = CollectionStore::new();
        let key = tests_all();
        store.set_page(&key, 1, Some(vec![]), None, None).unwrap();

        let policy = StalenessPolicy::After(Duration::minutes(10));
        assert!(!store.is_page_stale(&key, 1, &policy));

        if let Some(Collection::Paginated(c)) = store.collections.get_mut(&key) {
            c.pages.get_mut(&1).unwrap().fetched_at = Some(Utc::now() - Duration::minutes(11));
        }
        assert!(store.is_page_stale(&key, 1, &policy));
        assert!(!store.is_page_stale(&key, 1, &StalenessPolicy::Never));
        assert!(!store.is_page_stale(&key, 9, &policy));
    }

    // -------------------------------------------------------------------------
    // Unordered
    // -------------------------------------------------------------------------

    #[test]
    fn test_flat_collection_lifecycle() {
        let mut store = CollectionStore::new();
        let key = CollectionKey::TeacherNames;
        store.initialize(&key, false);
        assert!(store.get_collection(&key).is_some());
        assert!(store.get_collection_data(&key).is_none());

        store.set_collection_loading_state(&key, true).unwrap();
        assert!(store.is_collection_loading(&key));

        store.set_collection_error_state(&key, "boom").unwrap();
        assert!(!store.is_collection_loading(&key));
        assert_eq!(store.get_collection_error(&key), Some("boom"));

        store.set_collection(&key, vec![json!({"_id": "t1"})]).unwrap();
        assert_eq!(store.get_collection_error(&key), None);
        assert_eq!(store.get_collection_data(&key).map(|d| d.len()), Some(1));
    }

    #[test]
    fn test_flat_error_keeps_items() {
        let mut store = CollectionStore::new();
        let key = CollectionKey::TeacherNames;
        store.set_collection(&key, vec![json!({"_id": "t1"})]).unwrap();
        store.set_collection_error_state(&key, "later failure").unwrap();
        assert_eq!(store.get_collection_data(&key).map(|d| d.len()), Some(1));
    }

    #[test]
    fn test_update_item_by_id_merges_match() {
        let mut store = CollectionStore::new();
        let key = CollectionKey::Users(None);
        store
            .set_collection(
                &key,
                vec![
                    json!({"_id": "u1", "isActive": false, "firstName": "Ali"}),
                    json!({"_id": "u2", "isActive": false}),
                ],
            )
            .unwrap();

        assert!(store.update_item_by_id("u1", &json!({"isActive": true}), "_id", &key));

        let items = store.get_collection_data(&key).unwrap();
        assert_eq!(items[0], json!({"_id": "u1", "isActive": true, "firstName": "Ali"}));
        assert_eq!(items[1], json!({"_id": "u2", "isActive": false}));
    }

    #[test]
    fn test_update_item_by_id_absent_is_noop() {
        let mut store = CollectionStore::new();
        let key = CollectionKey::Users(None);
        let items = vec![json!({"_id": "u2"})];
        store.set_collection(&key, items.clone()).unwrap();

        assert!(!store.update_item_by_id("u1", &json!({"isActive": true}), "_id", &key));
        assert_eq!(store.get_collection_data(&key), Some(items.as_slice()));

        assert!(!store.update_item_by_id(
            "u1",
            &json!({}),
            "_id",
            &CollectionKey::Users(Some(crate::models::Role::Admin))
        ));
        assert!(!store.has_collection(&CollectionKey::Users(Some(crate::models::Role::Admin))));
    }
}
