//! Utility functions for string formatting and manipulation.

pub mod format;

pub use format::{format_date, format_time, format_uz_phone, truncate_string};
