//! In-app navigation locations.
//!
//! Routes render to and parse from URL-style locations such as
//! `/tests?page=2&teacherId=abc`, so a session can be opened at a given view
//! from the command line and the current location can be shown in the title bar.

use std::fmt;

use anyhow::{bail, Context, Result};
use eduadmin_core::models::Role;
use eduadmin_core::store::TeacherFilter;
use reqwest::Url;

/// Base used to parse relative locations.
const LOCATION_BASE: &str = "app://eduadmin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Tests { page: u32, teacher: TeacherFilter },
    Users { role: Option<Role> },
    User { id: String },
}

impl Default for Route {
    fn default() -> Self {
        Route::Tests {
            page: 1,
            teacher: TeacherFilter::All,
        }
    }
}

/// Parse a `page` query value. Missing, malformed or non-positive pages fall back to 1.
fn parse_page(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

impl Route {
    pub fn parse(location: &str) -> Result<Self> {
        let location = if location.starts_with('/') {
            location.to_string()
        } else {
            format!("/{}", location)
        };
        let url = Url::parse(&format!("{}{}", LOCATION_BASE, location))
            .with_context(|| format!("Invalid location: {}", location))?;

        let query = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [] | ["tests"] => Ok(Route::Tests {
                page: parse_page(query("page").as_deref()),
                teacher: TeacherFilter::from_param(query("teacherId").as_deref()),
            }),
            ["users"] => {
                let role = match query("role").as_deref() {
                    None | Some("") | Some("all") => None,
                    Some(r) => Some(r.parse::<Role>().map_err(anyhow::Error::msg)?),
                };
                Ok(Route::Users { role })
            }
            ["users", id] => Ok(Route::User { id: id.to_string() }),
            _ => bail!("Unknown location: {}", location),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Tests { .. } => "Tests",
            Route::Users { .. } => "Users",
            Route::User { .. } => "User",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Tests { page, teacher } => {
                write!(f, "/tests?page={}&teacherId={}", page, teacher.as_param())
            }
            Route::Users { role: None } => write!(f, "/users?role=all"),
            Route::Users { role: Some(role) } => write!(f, "/users?role={}", role),
            Route::User { id } => write!(f, "/users/{}", id),
        }
    }
}
