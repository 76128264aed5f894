//! Authenticated caller identity.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Error, UserId};

/// Role claim attached to every principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    /// Fail with [`Error::forbidden`] unless the principal is `user_id`.
    pub fn require_user(&self, user_id: &UserId) -> Result<(), Error> {
        if &self.user_id == user_id {
            Ok(())
        } else {
            Err(Error::forbidden("caller may only act on their own records"))
        }
    }

    /// Fail with [`Error::forbidden`] unless the principal is a teacher.
    pub fn require_teacher(&self) -> Result<(), Error> {
        if self.is_teacher() {
            Ok(())
        } else {
            Err(Error::forbidden("teacher role required"))
        }
    }
}
