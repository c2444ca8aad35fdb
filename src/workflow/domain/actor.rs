//! Acting users and their roles.

use super::{ParseUserRoleError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user within the tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Tenant administrator.
    Admin,
    /// Team manager.
    Manager,
    /// Regular member.
    Member,
}

impl UserRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
        }
    }

    /// Returns `true` for roles that may drive any task's workflow.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UserRole {
    type Error = ParseUserRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "member" => Ok(Self::Member),
            _ => Err(ParseUserRoleError(value.to_owned())),
        }
    }
}

/// The user invoking a workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    user_id: UserId,
    role: UserRole,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Creates a regular member actor.
    #[must_use]
    pub const fn member(user_id: UserId) -> Self {
        Self::new(user_id, UserRole::Member)
    }

    /// Returns the acting user's identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the acting user's role.
    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Returns `true` when the actor holds a privileged role.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

/// Whether an actor belongs to the task's reviewer team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeamMembership {
    /// The actor is a member of the reviewer team.
    Member,
    /// The actor is not a member, or the task has no reviewer team.
    NonMember,
}

impl TeamMembership {
    /// Returns `true` for [`TeamMembership::Member`].
    #[must_use]
    pub const fn is_member(self) -> bool {
        matches!(self, Self::Member)
    }
}

impl From<bool> for TeamMembership {
    fn from(is_member: bool) -> Self {
        if is_member {
            Self::Member
        } else {
            Self::NonMember
        }
    }
}
