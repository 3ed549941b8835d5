use tracing::{info, warn};
use userdesk_model::{LoginRequest, LoginResponse, User};

use crate::errors::{ApiError, AuthError, AuthResult};
use crate::infra::{Access, ApiClient};
use crate::session::{BearerToken, Session, SessionStore};
use crate::validation;

/// Login, logout and identity checks against the user API.
#[derive(Debug, Clone)]
pub struct AuthGateway {
    api: ApiClient,
}

impl AuthGateway {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Authenticate and populate the session.
    ///
    /// The login call never carries a bearer. After a successful login the
    /// user is fetched again with the new token; that record wins, and the
    /// login payload is used when the refetch fails or names another user.
    /// Any failure leaves the session exactly as it was.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<Session> {
        let email = validation::email(email)?;
        validation::login_password(password)?;

        let request = LoginRequest {
            email,
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .api
            .post(&self.api.endpoints().login, &request, Access::Public)
            .await?;

        let token = BearerToken::new(response.token);
        if token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "login response carried an empty token".into(),
            )
            .into());
        }

        let user = self.refetch_user(&token, response.user).await;
        let session = self.session().set(token, user)?;
        info!(user_id = session.user_id(), "logged in");
        Ok(session)
    }

    /// Drop the local session. No server call; safe to repeat.
    pub fn logout(&self) {
        self.session().clear();
    }

    /// Confirm the held token still works and refresh the cached user.
    ///
    /// A 401 clears the session through the client's rejection handling.
    pub async fn validate_session(&self) -> AuthResult<Session> {
        let (token, id) = self
            .session()
            .with_session(|s| s.map(|s| (s.token.clone(), s.user_id())))
            .ok_or(AuthError::NotAuthenticated)?;

        let path = self.api.endpoints().user_item(id);
        let user: User = self.api.get(&path, Access::Session).await?;
        if user.id != id {
            return Err(ApiError::InvalidResponse(format!(
                "requested user {id}, server returned {}",
                user.id
            ))
            .into());
        }
        Ok(self.session().set(token, user)?)
    }

    pub fn current_user(&self) -> Option<User> {
        self.session().with_session(|s| s.map(|s| s.user.user.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_active()
    }

    async fn refetch_user(&self, token: &BearerToken, fallback: User) -> User {
        let path = self.api.endpoints().user_item(fallback.id);
        match self
            .api
            .get::<User>(&path, Access::Token(token.clone()))
            .await
        {
            Ok(user) if user.id == fallback.id => user,
            Ok(user) => {
                warn!(
                    user_id = fallback.id,
                    returned = user.id,
                    "refetched a different user, using login payload"
                );
                fallback
            }
            Err(err) => {
                warn!(
                    user_id = fallback.id,
                    "post-login refetch failed, using login payload: {}", err
                );
                fallback
            }
        }
    }
}
