//! Role-tagged user profiles.
//!
//! A profile is created once at the end of registration and deleted
//! wholesale on re-registration. Each variant carries only the fields
//! that are valid for its role.

use crate::ids::UserIdentity;
use crate::subjects::Subject;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of inline-button payloads that select a role.
pub const ROLE_CALLBACK_PREFIX: &str = "role_";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    #[serde(rename = "cooteacher")]
    CoTeacher,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::CoTeacher, Role::Teacher];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::CoTeacher => "cooteacher",
            Role::Teacher => "teacher",
        }
    }

    /// Inline-button payload selecting this role, e.g. `role_student`.
    pub fn callback_data(self) -> String {
        format!("{ROLE_CALLBACK_PREFIX}{}", self.as_str())
    }

    /// Parses a role selection payload. Anything else yields `None`.
    pub fn from_callback_data(data: &str) -> Option<Self> {
        let name = data.trim().strip_prefix(ROLE_CALLBACK_PREFIX)?;
        Self::ALL.into_iter().find(|role| role.as_str() == name)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Role::Student => "Ученик",
            Role::CoTeacher => "Помощник учителя",
            Role::Teacher => "Учитель",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by every profile shape, seeded from the shared contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub identity: UserIdentity,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(flatten)]
    pub details: PersonalDetails,
    pub grade: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoTeacherProfile {
    #[serde(flatten)]
    pub details: PersonalDetails,
    pub grade: i32,
    pub subject: Subject,
    /// Stored but not consulted anywhere yet.
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    #[serde(flatten)]
    pub details: PersonalDetails,
    pub subject: Subject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Profile {
    Student(StudentProfile),
    #[serde(rename = "cooteacher")]
    CoTeacher(CoTeacherProfile),
    Teacher(TeacherProfile),
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Student(_) => Role::Student,
            Profile::CoTeacher(_) => Role::CoTeacher,
            Profile::Teacher(_) => Role::Teacher,
        }
    }

    pub fn details(&self) -> &PersonalDetails {
        match self {
            Profile::Student(p) => &p.details,
            Profile::CoTeacher(p) => &p.details,
            Profile::Teacher(p) => &p.details,
        }
    }

    pub fn identity(&self) -> &UserIdentity {
        &self.details().identity
    }

    pub fn grade(&self) -> Option<i32> {
        match self {
            Profile::Student(p) => Some(p.grade),
            Profile::CoTeacher(p) => Some(p.grade),
            Profile::Teacher(_) => None,
        }
    }

    pub fn subject(&self) -> Option<Subject> {
        match self {
            Profile::Student(_) => None,
            Profile::CoTeacher(p) => Some(p.subject),
            Profile::Teacher(p) => Some(p.subject),
        }
    }
}

/// A stored profile together with the store's internal row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: i64,
    #[serde(flatten)]
    pub profile: Profile,
}
