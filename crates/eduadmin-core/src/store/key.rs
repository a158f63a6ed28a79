//! Typed cache keys.
//!
//! Collections and entity namespaces used to be addressed by ad-hoc strings
//! (`"tests-all"`, `"teachersName"`, `"users-admin"`). The enums here keep the
//! same string forms for display and logging, but make the known key space
//! explicit. `Custom` is the escape hatch for anything else.

use std::fmt;
use std::str::FromStr;

use crate::models::Role;

/// Teacher filter applied to the tests list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TeacherFilter {
    All,
    Teacher(String),
}

impl TeacherFilter {
    /// Build from a `teacherId` query value, where `"all"` (or nothing) means no filter.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some("all") => TeacherFilter::All,
            Some(id) => TeacherFilter::Teacher(id.to_string()),
        }
    }

    /// Value sent as the `teacherId` query parameter.
    pub fn as_param(&self) -> &str {
        match self {
            TeacherFilter::All => "all",
            TeacherFilter::Teacher(id) => id,
        }
    }
}

/// Name of a collection in the collection store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    /// Tests authored by the signed-in teacher (`"tests"`).
    OwnTests,
    /// Tests filtered by teacher (`"tests-all"`, `"tests-<teacherId>"`).
    Tests(TeacherFilter),
    /// Flat list of teacher names for the selector (`"teachersName"`).
    TeacherNames,
    /// Users filtered by role, `None` meaning every role (`"users-all"`, `"users-admin"`).
    Users(Option<Role>),
    Custom(String),
}

impl CollectionKey {
    /// Every users list that may hold a denormalized copy of a user record.
    pub fn user_lists() -> Vec<CollectionKey> {
        std::iter::once(CollectionKey::Users(None))
            .chain(Role::ALL.iter().copied().map(|r| CollectionKey::Users(Some(r))))
            .collect()
    }

    /// Parse a key from its string form, falling back to `Custom`.
    pub fn parse(s: &str) -> Self {
        match s.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKey::OwnTests => write!(f, "tests"),
            CollectionKey::Tests(filter) => write!(f, "tests-{}", filter.as_param()),
            CollectionKey::TeacherNames => write!(f, "teachersName"),
            CollectionKey::Users(None) => write!(f, "users-all"),
            CollectionKey::Users(Some(role)) => write!(f, "users-{}", role.as_str()),
            CollectionKey::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for CollectionKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "tests" => CollectionKey::OwnTests,
            "teachersName" => CollectionKey::TeacherNames,
            "users-all" => CollectionKey::Users(None),
            _ => {
                if let Some(rest) = s.strip_prefix("tests-").filter(|r| !r.is_empty()) {
                    CollectionKey::Tests(TeacherFilter::from_param(Some(rest)))
                } else if let Some(role) = s.strip_prefix("users-").and_then(|r| r.parse().ok()) {
                    CollectionKey::Users(Some(role))
                } else {
                    CollectionKey::Custom(s.to_string())
                }
            }
        };
        Ok(key)
    }
}

/// Namespace in the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Users,
    Tests,
    Custom(String),
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Users => write!(f, "users"),
            EntityKind::Tests => write!(f, "tests"),
            EntityKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_key_display() {
        assert_eq!(CollectionKey::OwnTests.to_string(), "tests");
        assert_eq!(CollectionKey::Tests(TeacherFilter::All).to_string(), "tests-all");
        assert_eq!(
            CollectionKey::Tests(TeacherFilter::Teacher("teacher123".into())).to_string(),
            "tests-teacher123"
        );
        assert_eq!(CollectionKey::TeacherNames.to_string(), "teachersName");
        assert_eq!(CollectionKey::Users(None).to_string(), "users-all");
        assert_eq!(CollectionKey::Users(Some(Role::Admin)).to_string(), "users-admin");
    }

    #[test]
    fn test_collection_key_parse_roundtrips_known_forms() {
        for key in [
            CollectionKey::OwnTests,
            CollectionKey::Tests(TeacherFilter::All),
            CollectionKey::Tests(TeacherFilter::Teacher("abc".into())),
            CollectionKey::TeacherNames,
            CollectionKey::Users(Some(Role::Supervisor)),
        ] {
            assert_eq!(CollectionKey::parse(&key.to_string()), key);
        }
    }

    #[test]
    fn test_collection_key_parse_unknown_is_custom() {
        assert_eq!(
            CollectionKey::parse("groups-7"),
            CollectionKey::Custom("groups-7".into())
        );
        assert_eq!(
            CollectionKey::parse("users-janitor"),
            CollectionKey::Custom("users-janitor".into())
        );
    }

    #[test]
    fn test_user_lists_cover_every_role() {
        let keys: Vec<String> = CollectionKey::user_lists().iter().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec!["users-all", "users-admin", "users-student", "users-teacher", "users-supervisor"]
        );
    }

    #[test]
    fn test_teacher_filter_from_param() {
        assert_eq!(TeacherFilter::from_param(None), TeacherFilter::All);
        assert_eq!(TeacherFilter::from_param(Some("all")), TeacherFilter::All);
        assert_eq!(
            TeacherFilter::from_param(Some("t1")),
            TeacherFilter::Teacher("t1".into())
        );
    }
}
