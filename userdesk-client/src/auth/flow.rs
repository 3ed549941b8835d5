//! Forgot-password dialog state

use tracing::debug;
use userdesk_model::ResetTokenGrant;

use crate::auth::gateway::AuthGateway;
use crate::auth::reset::ResetResult;
use crate::errors::{ResetError, ValidationError};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Password changed successfully.";

/// Where the dialog currently is
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ForgotPasswordState {
    /// No reset token yet
    #[default]
    AwaitingToken,

    /// A reset token is held, waiting for the new password
    TokenHeld { grant: ResetTokenGrant },

    /// Terminal. `message` is what the dialog reports to its opener.
    Done { message: String },
}

/// Two-step forgot-password flow.
///
/// A failed step leaves the state where it was and records a display
/// message. The held reset token lives only here and is dropped with the
/// flow.
#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordFlow {
    state: ForgotPasswordState,
    error: Option<String>,
}

impl ForgotPasswordFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token obtained elsewhere, e.g. from a reset email.
    pub fn with_token(reset_token: impl Into<String>) -> Self {
        Self {
            state: ForgotPasswordState::TokenHeld {
                grant: ResetTokenGrant {
                    reset_token: reset_token.into(),
                    expires_at: None,
                },
            },
            error: None,
        }
    }

    pub fn state(&self) -> &ForgotPasswordState {
        &self.state
    }

    /// Message from the last failed step, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, ForgotPasswordState::Done { .. })
    }

    pub fn reset_token(&self) -> Option<&str> {
        match &self.state {
            ForgotPasswordState::TokenHeld { grant } => {
                Some(&grant.reset_token)
            }
            _ => None,
        }
    }

    pub fn success_message(&self) -> Option<&str> {
        match &self.state {
            ForgotPasswordState::Done { message } => Some(message),
            _ => None,
        }
    }

    /// Step one. Allowed again while a token is held; the newest grant wins.
    pub async fn request_token(
        &mut self,
        gateway: &AuthGateway,
        email: &str,
    ) -> ResetResult<()> {
        self.ensure_open()?;
        let result = gateway.request_reset_token(email).await;
        match result {
            Ok(grant) => self.apply_grant(grant),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Record a grant obtained outside the flow. Used when several token
    /// requests are in flight at once: apply each as it completes.
    pub fn apply_grant(&mut self, grant: ResetTokenGrant) -> ResetResult<()> {
        self.ensure_open()?;
        if matches!(self.state, ForgotPasswordState::TokenHeld { .. }) {
            debug!("replacing held reset token with a newer grant");
        }
        self.state = ForgotPasswordState::TokenHeld { grant };
        self.error = None;
        Ok(())
    }

    /// Step two. Refused locally while no token is held.
    pub async fn submit(
        &mut self,
        gateway: &AuthGateway,
        new_password: &str,
        confirmation: Option<&str>,
    ) -> ResetResult<&str> {
        self.ensure_open()?;
        let Some(token) = self.reset_token().map(str::to_string) else {
            return Err(self.fail(ValidationError::ResetTokenRequired.into()));
        };

        match gateway
            .reset_with_token(&token, new_password, confirmation)
            .await
        {
            Ok(outcome) => {
                let message = outcome
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
                self.state = ForgotPasswordState::Done { message };
                self.error = None;
                Ok(self.success_message().unwrap_or(DEFAULT_SUCCESS_MESSAGE))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn ensure_open(&self) -> ResetResult<()> {
        if self.is_done() {
            return Err(ResetError::FlowFinished);
        }
        Ok(())
    }

    fn fail(&mut self, err: ResetError) -> ResetError {
        self.error = Some(err.user_message());
        err
    }
}
