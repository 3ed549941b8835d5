//! Password reset in its two scenarios.
//!
//! Forgotten password: request a reset token by email, then spend it on a
//! new password. Both calls are public and never touch the session.
//!
//! Authenticated: one call carrying the session bearer. A 401 here clears
//! the session and reports an expired token.

use reqwest::StatusCode;
use tracing::info;
use userdesk_model::{
    ForgotPasswordRequest, ResetOutcome, ResetPasswordRequest, ResetTokenGrant,
    ResetWithTokenRequest,
};

use crate::auth::gateway::AuthGateway;
use crate::errors::{ApiError, ResetError};
use crate::infra::Access;
use crate::validation;

pub type ResetResult<T> = Result<T, ResetError>;

impl AuthGateway {
    /// Ask the server for a reset token for `email`.
    pub async fn request_reset_token(
        &self,
        email: &str,
    ) -> ResetResult<ResetTokenGrant> {
        let email = validation::email(email)?;
        let grant: ResetTokenGrant = self
            .api()
            .post(
                &self.api().endpoints().forgot_password,
                &ForgotPasswordRequest { email },
                Access::Public,
            )
            .await
            .map_err(map_request_token_error)?;

        if grant.reset_token.trim().is_empty() {
            return Err(ResetError::Failed(ApiError::InvalidResponse(
                "reset token grant carried an empty token".into(),
            )));
        }
        info!(expires_at = ?grant.expires_at, "reset token issued");
        Ok(grant)
    }

    /// Spend a reset token on a new password. The reset token is the only
    /// credential sent.
    pub async fn reset_with_token(
        &self,
        reset_token: &str,
        new_password: &str,
        confirmation: Option<&str>,
    ) -> ResetResult<ResetOutcome> {
        let reset_token = validation::reset_token(reset_token)?;
        validation::new_password(new_password, confirmation)?;

        let request = ResetWithTokenRequest {
            reset_token,
            new_password: new_password.to_string(),
        };
        let outcome = self
            .api()
            .post_optional::<_, ResetOutcome>(
                &self.api().endpoints().reset_with_token,
                &request,
                Access::Public,
            )
            .await
            .map_err(map_reset_with_token_error)?;
        info!("password reset with reset token");
        Ok(outcome.unwrap_or_default())
    }

    /// Change `email`'s password using the held session.
    pub async fn reset_authenticated(
        &self,
        email: &str,
        new_password: &str,
        confirmation: Option<&str>,
    ) -> ResetResult<ResetOutcome> {
        if !self.session().is_active() {
            return Err(ResetError::NotAuthenticated);
        }
        let email = validation::email(email)?;
        validation::new_password(new_password, confirmation)?;

        let request = ResetPasswordRequest {
            email: email.clone(),
            new_password: new_password.to_string(),
        };
        let outcome = self
            .api()
            .post_optional::<_, ResetOutcome>(
                &self.api().endpoints().reset_password,
                &request,
                Access::Session,
            )
            .await
            .map_err(|err| map_authenticated_reset_error(err, &email))?;
        info!("password reset for authenticated session");
        Ok(outcome.unwrap_or_default())
    }
}

fn map_request_token_error(err: ApiError) -> ResetError {
    match err.status() {
        Some(StatusCode::NOT_FOUND) => ResetError::UserNotFound,
        Some(StatusCode::BAD_REQUEST) => ResetError::InvalidEmail,
        _ => ResetError::Failed(err),
    }
}

fn map_reset_with_token_error(err: ApiError) -> ResetError {
    match err {
        ApiError::Status { status, message } => match status {
            StatusCode::UNAUTHORIZED => ResetError::InvalidCredentials,
            StatusCode::NOT_FOUND => ResetError::UserNotFound,
            StatusCode::BAD_REQUEST => ResetError::InvalidPayload(message),
            _ => ResetError::Failed(ApiError::Status { status, message }),
        },
        other => ResetError::Failed(other),
    }
}

/// The 401 arm relies on the client having already rejected the session.
fn map_authenticated_reset_error(err: ApiError, email: &str) -> ResetError {
    match err {
        ApiError::NotAuthenticated => ResetError::NotAuthenticated,
        ApiError::Unauthorized { .. } => ResetError::SessionExpired,
        ApiError::Status { status, message } => match status {
            StatusCode::FORBIDDEN => ResetError::NotPermitted {
                email: email.to_string(),
            },
            StatusCode::BAD_REQUEST => ResetError::InvalidPayload(message),
            _ => ResetError::Failed(ApiError::Status { status, message }),
        },
        other => ResetError::Failed(other),
    }
}
