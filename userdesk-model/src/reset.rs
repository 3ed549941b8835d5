//! Password reset payloads for both reset scenarios.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Server-issued reset token. `expires_at` is informational only.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenGrant {
    pub reset_token: String,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for ResetTokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTokenGrant")
            .field("reset_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetWithTokenRequest {
    pub reset_token: String,
    pub new_password: String,
}

impl std::fmt::Debug for ResetWithTokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetWithTokenRequest").finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub new_password: String,
}

impl std::fmt::Debug for ResetPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetPasswordRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Optional body returned by both reset endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn grant_decodes_with_and_without_expiry() {
        let grant: ResetTokenGrant = serde_json::from_value(json!({
            "resetToken": "abc123",
            "expiresAt": "2030-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(grant.reset_token, "abc123");
        assert!(grant.expires_at.is_some());

        let bare: ResetTokenGrant =
            serde_json::from_value(json!({ "resetToken": "t" })).unwrap();
        assert!(bare.expires_at.is_none());
    }

    #[test]
    fn reset_bodies_use_camel_case() {
        let body = ResetWithTokenRequest {
            reset_token: "abc123".into(),
            new_password: "NewPass1".into(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "resetToken": "abc123", "newPassword": "NewPass1" })
        );
    }
}
