//! User directory
//!
//! CRUD over the user collection with the session bearer. Creation is gated
//! locally on the `create_user` capability; update and delete are left to
//! the server to authorize.

use reqwest::StatusCode;
use tracing::info;
use userdesk_model::{CreateUserRequest, UpdateUserRequest, User, UserId};

use crate::auth::permissions::{Capability, SessionPermissionExt};
use crate::errors::{ApiError, UserAdminError, ValidationError};
use crate::infra::{Access, ApiClient};
use crate::validation;

pub type UserAdminResult<T> = Result<T, UserAdminError>;

/// Form input for a new user.
#[derive(Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: Option<String>,
    pub is_administrator: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("is_administrator", &self.is_administrator)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Run the form checks and produce the wire payload.
    pub fn validate(&self) -> Result<CreateUserRequest, ValidationError> {
        let name = validation::name(&self.name)?;
        let email = validation::email(&self.email)?;
        validation::new_password(
            &self.password,
            self.confirm_password.as_deref(),
        )?;
        Ok(CreateUserRequest {
            name,
            email,
            password: self.password.clone(),
            is_administrator: self.is_administrator.then_some(true),
        })
    }
}

#[derive(Debug, Clone)]
pub struct UserDirectory {
    api: ApiClient,
}

impl UserDirectory {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_users(&self) -> UserAdminResult<Vec<User>> {
        self.require(Capability::ListUsers)?;
        self.api
            .get(&self.api.endpoints().users, Access::Session)
            .await
            .map_err(|e| map_api_error(e, None))
    }

    pub async fn get_user(&self, id: UserId) -> UserAdminResult<User> {
        self.require(Capability::ViewUser)?;
        self.api
            .get(&self.api.endpoints().user_item(id), Access::Session)
            .await
            .map_err(|e| map_api_error(e, Some(id)))
    }

    pub async fn create_user(
        &self,
        new_user: &NewUser,
    ) -> UserAdminResult<User> {
        self.require(Capability::CreateUser)?;
        let request = new_user.validate()?;
        let created: User = self
            .api
            .post(&self.api.endpoints().users, &request, Access::Session)
            .await
            .map_err(|e| map_api_error(e, None))?;
        info!(user_id = created.id, "user created");
        Ok(created)
    }

    pub async fn update_user(
        &self,
        id: UserId,
        mut request: UpdateUserRequest,
    ) -> UserAdminResult<User> {
        self.require_session()?;
        if request.is_empty() {
            return Err(ValidationError::EmptyUpdate.into());
        }
        if let Some(name) = request.name.take() {
            request.name = Some(validation::name(&name)?);
        }
        if let Some(email) = request.email.take() {
            request.email = Some(validation::email(&email)?);
        }
        let updated: User = self
            .api
            .put(&self.api.endpoints().user_item(id), &request, Access::Session)
            .await
            .map_err(|e| map_api_error(e, Some(id)))?;
        info!(user_id = id, "user updated");
        Ok(updated)
    }

    pub async fn delete_user(&self, id: UserId) -> UserAdminResult<()> {
        self.require_session()?;
        self.api
            .delete(&self.api.endpoints().user_item(id), Access::Session)
            .await
            .map_err(|e| map_api_error(e, Some(id)))?;
        info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Fetch everything and filter locally.
    pub async fn search(&self, term: &str) -> UserAdminResult<Vec<User>> {
        let users = self.list_users().await?;
        Ok(filter_users(&users, term))
    }

    fn require_session(&self) -> UserAdminResult<()> {
        if !self.api.session().is_active() {
            return Err(UserAdminError::NotAuthenticated);
        }
        Ok(())
    }

    fn require(&self, capability: Capability) -> UserAdminResult<()> {
        self.require_session()?;
        if !self.api.session().allows(capability) {
            return Err(UserAdminError::Forbidden(capability.as_str()));
        }
        Ok(())
    }
}

/// Case-insensitive match on id, name or email. A blank term keeps all.
pub fn filter_users(users: &[User], term: &str) -> Vec<User> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return users.to_vec();
    }
    users
        .iter()
        .filter(|u| u.matches_term(&needle))
        .cloned()
        .collect()
}

fn map_api_error(err: ApiError, id: Option<UserId>) -> UserAdminError {
    match err {
        ApiError::NotAuthenticated => UserAdminError::NotAuthenticated,
        ApiError::Unauthorized { .. } => UserAdminError::SessionExpired,
        ApiError::Status { status, message } => match (status, id) {
            (StatusCode::FORBIDDEN, _) => {
                UserAdminError::PermissionDenied(message)
            }
            (StatusCode::NOT_FOUND, Some(id)) => UserAdminError::NotFound(id),
            (StatusCode::BAD_REQUEST | StatusCode::CONFLICT, _) => {
                UserAdminError::InvalidRequest(message)
            }
            _ => UserAdminError::Api(ApiError::Status { status, message }),
        },
        other => UserAdminError::Api(other),
    }
}
