//! Data models for the education platform.
//!
//! The store keeps raw JSON records so that partial updates can be merged
//! into them. The types here are typed views used at the edges:
//!
//! - `Test`, `TestStatus`: items of the tests list
//! - `TeacherName`: options of the teacher selector
//! - `User`, `Role`: users list items and the user detail record
//! - `Pagination`, `Envelope`: response metadata

pub mod lenient;
pub mod pagination;
pub mod user;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub use pagination::{Envelope, Pagination};
pub use test::{Test, TestAuthor, TestStatus};
pub use user::{Role, TeacherName, User};

/// Deserialize a typed view of a record, logging and skipping malformed ones.
pub fn parse_record<T: DeserializeOwned>(record: &Value) -> Option<T> {
    match serde_json::from_value(record.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(error = %e, "Skipping malformed record");
            None
        }
    }
}

pub fn parse_records<T: DeserializeOwned>(records: &[Value]) -> Vec<T> {
    records.iter().filter_map(parse_record).collect()
}
