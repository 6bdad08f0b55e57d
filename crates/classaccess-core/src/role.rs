//! User roles.
//!
//! Stored and transmitted as the integers 1, 2 and 3. Route guards compare
//! against the variants, never against the raw numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Role {
    Student = 1,
    Teacher = 2,
    Admin = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown role value {0}")]
pub struct UnknownRole(pub i32);

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<i32> for Role {
    type Error = UnknownRole;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Student),
            2 => Ok(Role::Teacher),
            3 => Ok(Role::Admin),
            other => Err(UnknownRole(other)),
        }
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> Self {
        role.as_i32()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
