//! Core library for eduadmin.
//!
//! Everything that does not depend on the terminal lives here:
//!
//! - `api`: REST client for the education platform backend
//! - `models`: typed views of tests, teachers and users
//! - `store`: client-side collection and entity cache
//! - `auth`: persisted session (bearer token + own user id)
//! - `config`: application configuration
//! - `utils`: formatting helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use store::{CollectionKey, EntityKind, Store};
