use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability tier cached on a session.
///
/// Derived once from [`crate::User::is_administrator`] when a session is
/// populated and persisted next to the user so reloads keep the same value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn from_admin_flag(is_administrator: bool) -> Self {
        if is_administrator { Role::Admin } else { Role::User }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
