//! Client-side cache for collections and entities.
//!
//! The `Store` is an explicit service owned by the application and passed by
//! reference to whatever needs it. It holds:
//!
//! - a `CollectionStore` of named flat or paginated collections
//! - one `EntityStore` per `EntityKind`
//! - a `RequestSequencer` that deduplicates in-flight fetches and drops
//!   responses superseded by a newer request
//!
//! Nothing is evicted automatically. Callers refetch (optionally driven by a
//! `StalenessPolicy`) or invalidate explicitly.

pub mod collection;
pub mod entity;
pub mod error;
pub mod key;
pub mod page;
pub mod sequence;
pub mod staleness;

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::models::Pagination;

pub use collection::{Collection, CollectionStore};
pub use entity::EntityStore;
pub use error::{Shape, StoreError};
pub use key::{CollectionKey, EntityKind, TeacherFilter};
pub use page::{merge_patch, FlatCollection, Metadata, Page};
pub use sequence::{FetchTarget, FetchTicket, RequestSequencer};
pub use staleness::{age_display, StalenessPolicy};

#[derive(Debug, Default)]
pub struct Store {
    collections: CollectionStore,
    entities: HashMap<EntityKind, EntityStore>,
    sequencer: RequestSequencer,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collections(&self) -> &CollectionStore {
        &self.collections
    }

    pub fn collections_mut(&mut self) -> &mut CollectionStore {
        &mut self.collections
    }

    pub fn entities(&self, kind: &EntityKind) -> Option<&EntityStore> {
        self.entities.get(kind)
    }

    /// Entity namespace for `kind`, created on first access.
    pub fn entities_mut(&mut self, kind: &EntityKind) -> &mut EntityStore {
        self.entities.entry(kind.clone()).or_default()
    }

    pub fn get_entity(&self, kind: &EntityKind, id: &str) -> Option<&Value> {
        self.entities(kind)?.get_entity(id)
    }

    pub fn invalidate(&mut self, key: &CollectionKey) {
        self.collections.invalidate(key);
        self.sequencer.forget(|t| match t {
            FetchTarget::Page(k, _) | FetchTarget::Collection(k) => k == key,
            FetchTarget::Entity(..) => false,
        });
    }

    pub fn clear(&mut self) {
        self.collections.clear();
        self.entities.clear();
        self.sequencer = RequestSequencer::new();
    }

    // ===== Paginated fetches =====

    /// Start a page fetch: issue a ticket and mark the page loading.
    ///
    /// Returns `Ok(None)` if the page already has a fetch in flight and
    /// `force` is false.
    pub fn begin_page_fetch(
        &mut self,
        key: &CollectionKey,
        page: u32,
        force: bool,
    ) -> Result<Option<FetchTicket>, StoreError> {
        // Validate before a ticket exists so a bad page never looks in flight
        self.collections.set_page_loading_state(key, page, true)?;
        let ticket = self.sequencer.issue(FetchTarget::Page(key.clone(), page), force);
        if ticket.is_none() {
            debug!(%key, page, "Page fetch already in flight");
        }
        Ok(ticket)
    }

    /// Apply a successful page response if its ticket is still current.
    pub fn complete_page(
        &mut self,
        ticket: &FetchTicket,
        data: Vec<Value>,
        pagination: Option<&Pagination>,
    ) -> Result<bool, StoreError> {
        let FetchTarget::Page(key, page) = ticket.target() else {
            return Ok(false);
        };
        if !self.sequencer.settle(ticket) {
            debug!(%key, page, seq = ticket.seq(), "Discarding superseded page response");
            return Ok(false);
        }
        self.collections.set_page(key, *page, Some(data), None, pagination)?;
        Ok(true)
    }

    /// Apply a failed page response if its ticket is still current.
    pub fn fail_page(&mut self, ticket: &FetchTicket, message: impl Into<String>) -> Result<bool, StoreError> {
        let FetchTarget::Page(key, page) = ticket.target() else {
            return Ok(false);
        };
        if !self.sequencer.settle(ticket) {
            debug!(%key, page, seq = ticket.seq(), "Discarding superseded page failure");
            return Ok(false);
        }
        self.collections.set_page_error_state(key, *page, message)?;
        Ok(true)
    }

    // ===== Flat collection fetches =====

    pub fn begin_collection_fetch(
        &mut self,
        key: &CollectionKey,
        force: bool,
    ) -> Result<Option<FetchTicket>, StoreError> {
        self.collections.set_collection_loading_state(key, true)?;
        Ok(self.sequencer.issue(FetchTarget::Collection(key.clone()), force))
    }

    pub fn complete_collection(&mut self, ticket: &FetchTicket, items: Vec<Value>) -> Result<bool, StoreError> {
        let FetchTarget::Collection(key) = ticket.target() else {
            return Ok(false);
        };
        if !self.sequencer.settle(ticket) {
            debug!(%key, seq = ticket.seq(), "Discarding superseded collection response");
            return Ok(false);
        }
        self.collections.set_collection(key, items)?;
        Ok(true)
    }

    pub fn fail_collection(&mut self, ticket: &FetchTicket, message: impl Into<String>) -> Result<bool, StoreError> {
        let FetchTarget::Collection(key) = ticket.target() else {
            return Ok(false);
        };
        if !self.sequencer.settle(ticket) {
            return Ok(false);
        }
        self.collections.set_collection_error_state(key, message)?;
        Ok(true)
    }

    // ===== Entity fetches =====

    pub fn begin_entity_fetch(&mut self, kind: &EntityKind, id: &str, force: bool) -> Option<FetchTicket> {
        self.sequencer
            .issue(FetchTarget::Entity(kind.clone(), id.to_string()), force)
    }

    pub fn is_entity_loading(&self, kind: &EntityKind, id: &str) -> bool {
        self.sequencer
            .is_in_flight(&FetchTarget::Entity(kind.clone(), id.to_string()))
    }

    pub fn complete_entity(&mut self, ticket: &FetchTicket, record: Value) -> bool {
        let FetchTarget::Entity(kind, id) = ticket.target() else {
            return false;
        };
        if !self.sequencer.settle(ticket) {
            debug!(%kind, id, seq = ticket.seq(), "Discarding superseded entity response");
            return false;
        }
        self.entities
            .entry(kind.clone())
            .or_default()
            .add_entity(id.clone(), record);
        true
    }

    /// Settle a failed entity fetch. Returns whether the failure is current.
    pub fn fail_entity(&mut self, ticket: &FetchTicket) -> bool {
        matches!(ticket.target(), FetchTarget::Entity(..)) && self.sequencer.settle(ticket)
    }

    // ===== Cross-propagation =====

    /// Write an updated record into the entity store and into every flat
    /// collection in `keys` that holds an item with the same id.
    ///
    /// Returns how many list items were patched.
    pub fn propagate_entity(
        &mut self,
        kind: &EntityKind,
        id: &str,
        record: &Value,
        id_field: &str,
        keys: &[CollectionKey],
    ) -> usize {
        let entities = self.entities_mut(kind);
        if !entities.update_entity(id, record) {
            entities.add_entity(id, record.clone());
        }

        let patched = keys
            .iter()
            .filter(|key| self.collections.update_item_by_id(id, record, id_field, key))
            .count();
        debug!(%kind, id, patched, "Propagated entity update");
        patched
    }
}

// ============================================================================
// Tests
// ============================================================================
