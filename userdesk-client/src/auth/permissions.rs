//! Permission helper module for role checks
//!
//! Capabilities are a static table over the session's cached role. Nothing
//! here talks to the server; the server remains the final authority.

use std::fmt;
use std::str::FromStr;

use crate::session::{Session, SessionStore};

/// Named operations the console gates locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CreateUser,
    ListUsers,
    ViewUser,
}

impl Capability {
    pub const ALL: [Capability; 3] =
        [Capability::CreateUser, Capability::ListUsers, Capability::ViewUser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CreateUser => "create_user",
            Capability::ListUsers => "list_users",
            Capability::ViewUser => "view_user",
        }
    }

    pub fn admin_only(&self) -> bool {
        matches!(self, Capability::CreateUser)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCapability(pub String);

impl fmt::Display for UnknownCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown capability `{}`", self.0)
    }
}

impl std::error::Error for UnknownCapability {}

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// Permission checker for the current session
#[derive(Debug, Clone, Copy)]
pub struct PermissionChecker<'a> {
    session: Option<&'a Session>,
}

impl<'a> PermissionChecker<'a> {
    pub fn new(session: Option<&'a Session>) -> Self {
        Self { session }
    }

    pub fn is_admin(&self) -> bool {
        self.session.map(Session::is_admin).unwrap_or(false)
    }

    /// Typed check. No session means no capability.
    pub fn allows(&self, capability: Capability) -> bool {
        match self.session {
            None => false,
            Some(session) => !capability.admin_only() || session.is_admin(),
        }
    }

    /// Check by name. Unknown names are denied.
    pub fn has_capability(&self, name: &str) -> bool {
        name.parse::<Capability>()
            .map(|capability| self.allows(capability))
            .unwrap_or(false)
    }

    pub fn can_create_users(&self) -> bool {
        self.allows(Capability::CreateUser)
    }

    pub fn can_view_users(&self) -> bool {
        self.allows(Capability::ListUsers) && self.allows(Capability::ViewUser)
    }
}

/// Extension trait for quick checks against the live session
pub trait SessionPermissionExt {
    fn has_capability(&self, name: &str) -> bool;

    fn allows(&self, capability: Capability) -> bool;

    fn is_admin(&self) -> bool;
}

impl SessionPermissionExt for SessionStore {
    fn has_capability(&self, name: &str) -> bool {
        self.with_session(|s| PermissionChecker::new(s).has_capability(name))
    }

    fn allows(&self, capability: Capability) -> bool {
        self.with_session(|s| PermissionChecker::new(s).allows(capability))
    }

    fn is_admin(&self) -> bool {
        self.with_session(|s| PermissionChecker::new(s).is_admin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{BearerToken, SessionUser};
    use userdesk_model::{Role, User};

    fn session(role: Role) -> Session {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 1,
            "isAdministrator": role.is_admin()
        }))
        .unwrap();
        Session {
            token: BearerToken::new("t"),
            user: SessionUser { user, role },
        }
    }

    #[test]
    fn no_session_has_nothing() {
        let checker = PermissionChecker::new(None);
        assert!(!checker.is_admin());
        for capability in Capability::ALL {
            assert!(!checker.allows(capability));
        }
    }

    #[test]
    fn capability_table() {
        let admin = session(Role::Admin);
        let user = session(Role::User);
        let admin = PermissionChecker::new(Some(&admin));
        let user = PermissionChecker::new(Some(&user));

        assert!(admin.has_capability("create_user"));
        assert!(!user.has_capability("create_user"));
        assert!(user.has_capability("list_users"));
        assert!(user.has_capability("view_user"));
        assert!(user.can_view_users());
        assert!(!user.can_create_users());

        assert!(!admin.has_capability("delete_everything"));
        assert!(!admin.has_capability(""));
    }

    #[test]
    fn capability_names_round_trip() {
        for capability in Capability::ALL {
            assert_eq!(
                capability.as_str().parse::<Capability>(),
                Ok(capability)
            );
        }
        assert!("root".parse::<Capability>().is_err());
    }
}
