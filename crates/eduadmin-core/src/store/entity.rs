use std::collections::HashMap;

use serde_json::Value;

use super::page::merge_patch;

/// Full records of one entity kind, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    entities: HashMap<String, Value>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a record.
    pub fn add_entity(&mut self, id: impl Into<String>, record: Value) {
        self.entities.insert(id.into(), record);
    }

    pub fn get_entity(&self, id: &str) -> Option<&Value> {
        self.entities.get(id)
    }

    /// Merge `patch` into an existing record. Returns `false` if the id is unknown.
    pub fn update_entity(&mut self, id: &str, patch: &Value) -> bool {
        match self.entities.get_mut(id) {
            Some(record) => {
                merge_patch(record, patch);
                true
            }
            None => false,
        }
    }

    pub fn remove_entity(&mut self, id: &str) -> Option<Value> {
        self.entities.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
