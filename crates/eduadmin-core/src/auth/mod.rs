//! Authentication module for managing the signed-in session.
//!
//! This module provides `Session`: a bearer token plus the signed-in user's
//! id, persisted to disk so the admin client can be reopened without signing
//! in again. The environment (`EDUADMIN_TOKEN`, `EDUADMIN_USER_ID`) takes
//! precedence over the saved file.

pub mod session;

pub use session::{Session, SessionData, ENV_TOKEN, ENV_USER_ID};
