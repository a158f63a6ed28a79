//! User and teacher models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lenient;

/// Maximum length of a teacher label in the selector.
const TEACHER_LABEL_MAX_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
    Teacher,
    Supervisor,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Student, Role::Teacher, Role::Supervisor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Supervisor => "supervisor",
        }
    }

    /// Next role filter in the cycle all → admin → ... → supervisor → all.
    pub fn cycle(current: Option<Role>) -> Option<Role> {
        match current {
            None => Some(Role::Admin),
            Some(Role::Admin) => Some(Role::Student),
            Some(Role::Student) => Some(Role::Teacher),
            Some(Role::Teacher) => Some(Role::Supervisor),
            Some(Role::Supervisor) => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "supervisor" => Ok(Role::Supervisor),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    /// Kept as text so unknown roles still render.
    #[serde(default, deserialize_with = "lenient::text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        let first = self
            .first_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("User");
        match self.last_name.as_deref().filter(|s| !s.is_empty()) {
            Some(last) => format!("{} {}", first, last),
            None => first.to_string(),
        }
    }

    pub fn role_kind(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    pub fn is_teacher(&self) -> bool {
        self.role_kind() == Some(Role::Teacher)
    }
}

/// Entry of the teacher-names list used by the tests filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherName {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text_or_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
}

impl TeacherName {
    pub fn label(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name,
            self.last_name.as_deref().unwrap_or_default()
        );
        name.trim_end().chars().take(TEACHER_LABEL_MAX_LEN).collect()
    }
}
