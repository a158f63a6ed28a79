//! REST API client module for the education platform backend.
//!
//! This module provides the `ApiClient` for fetching tests, teachers and
//! users, and for updating users. Every response carries a machine-readable
//! `code`; a response with an unexpected code is treated as a failure.
//!
//! Requests are authenticated with a bearer token from the saved session.

pub mod client;
pub mod error;

pub use client::{ApiClient, PageResult, TestsQuery, UpdateResult};
pub use error::ApiError;
