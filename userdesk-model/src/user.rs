//! User records as exchanged with the user API.
//!
//! The API speaks camelCase JSON. Fields the console never reads
//! (`passwordHash`, `salt`, ...) are ignored on decode and never emitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::timestamp;

/// Numeric user identifier assigned by the server.
pub type UserId = i64;

/// User profile including audit fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Backend flag; `null` and missing both mean "not an administrator".
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_administrator: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserId>,
}

fn default_true() -> bool {
    true
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl User {
    /// Role tier this record maps to.
    pub fn derived_role(&self) -> Role {
        Role::from_admin_flag(self.is_administrator)
    }

    /// Case-insensitive match against id, name or email.
    ///
    /// `needle` is expected to be lowercased and trimmed already.
    pub fn matches_term(&self, needle: &str) -> bool {
        self.id.to_string().contains(needle)
            || self.name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }
}

/// Payload for `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_administrator: Option<bool>,
}

/// Partial payload for `PUT /users/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_administrator: Option<bool>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.is_active.is_none()
            && self.is_administrator.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_payload_and_ignores_secrets() {
        let payload = json!({
            "id": 7,
            "name": "Ana",
            "email": "ana@example.com",
            "passwordHash": "xxx",
            "salt": "yyy",
            "isActive": true,
            "isAdministrator": null,
            "deleted": false,
            "createdAt": "2024-02-03T10:11:12.5",
            "createdBy": 1
        });

        let user: User = serde_json::from_value(payload).unwrap();
        assert_eq!(user.id, 7);
        assert!(!user.is_administrator);
        assert_eq!(user.derived_role(), Role::User);
        assert!(user.created_at.is_some());
        assert_eq!(user.created_by, Some(1));

        let encoded = serde_json::to_value(&user).unwrap();
        assert!(encoded.get("passwordHash").is_none());
        assert!(encoded.get("updatedAt").is_none());
    }

    #[test]
    fn update_request_omits_absent_fields() {
        let req = UpdateUserRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "isActive": false })
        );
        assert!(UpdateUserRequest::default().is_empty());
    }

    #[test]
    fn matches_term_checks_id_name_and_email() {
        let user: User = serde_json::from_value(json!({
            "id": 42, "name": "Bruno Lima", "email": "BRUNO@corp.io"
        }))
        .unwrap();
        assert!(user.matches_term("42"));
        assert!(user.matches_term("lima"));
        assert!(user.matches_term("corp.io"));
        assert!(!user.matches_term("carla"));
    }
}
