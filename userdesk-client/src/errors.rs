//! Error types for the console client
//!
//! Every remote failure is converted into one of these enums at the call
//! site. Each enum can classify itself into [`ErrorClass`] and render the
//! message an operator should see, so front-ends never inspect raw HTTP
//! responses.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use userdesk_model::UserId;

/// Coarse error taxonomy shared by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Client-side check failed; nothing was sent.
    Validation,
    /// HTTP 401 on an authenticated call. The session has been cleared.
    AuthenticationRejected,
    /// HTTP 403. Session untouched.
    AuthorizationDenied,
    /// HTTP 404. Session untouched.
    NotFound,
    /// Anything else: other non-2xx statuses, network failures, bad payloads.
    Transient,
}

/// Client-side input validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("email is required")]
    EmailRequired,

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("password is required")]
    PasswordRequired,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("name is required")]
    NameRequired,

    #[error("reset token is required")]
    ResetTokenRequired,

    #[error("no changes were requested")]
    EmptyUpdate,
}

/// Key/value persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("unable to determine a data directory for session state")]
    NoDataDir,

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupted storage data in {path}")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode session data")]
    Encode(#[source] serde_json::Error),
}

/// Transport and HTTP-level failures
#[derive(Debug, Error)]
pub enum ApiError {
    /// An authenticated call was attempted without a session token.
    #[error("not authenticated")]
    NotAuthenticated,

    /// HTTP 401 on a session-authenticated call. The session store has
    /// already been cleared when this is returned.
    #[error("authentication rejected: {message}")]
    Unauthorized { message: String },

    #[error("request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::NotAuthenticated => ErrorClass::Validation,
            ApiError::Unauthorized { .. } => ErrorClass::AuthenticationRejected,
            ApiError::Status { status, .. } => match *status {
                StatusCode::FORBIDDEN => ErrorClass::AuthorizationDenied,
                StatusCode::NOT_FOUND => ErrorClass::NotFound,
                _ => ErrorClass::Transient,
            },
            ApiError::Network(_)
            | ApiError::InvalidResponse(_)
            | ApiError::Encode(_) => ErrorClass::Transient,
        }
    }

    pub fn user_message(&self) -> String {
        match self.class() {
            ErrorClass::Validation => "You need to log in first.".to_string(),
            ErrorClass::AuthenticationRejected => {
                "Your session has expired. Please log in again.".to_string()
            }
            ErrorClass::AuthorizationDenied => {
                "You are not allowed to perform this action.".to_string()
            }
            ErrorClass::NotFound => "Not found.".to_string(),
            ErrorClass::Transient => {
                "Something went wrong talking to the server. Please try again."
                    .to_string()
            }
        }
    }
}

/// Login, logout and identity-check failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("not authenticated")]
    NotAuthenticated,
}

impl AuthError {
    /// HTTP status preserved from the server response, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AuthError::Api(err) => err.status(),
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            AuthError::Validation(_) | AuthError::NotAuthenticated => {
                ErrorClass::Validation
            }
            AuthError::Api(err) => err.class(),
            AuthError::Storage(_) => ErrorClass::Transient,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(err) => capitalize(&err.to_string()),
            AuthError::NotAuthenticated => {
                "You need to log in first.".to_string()
            }
            AuthError::Api(ApiError::Status { status, .. })
                if *status == StatusCode::UNAUTHORIZED
                    || *status == StatusCode::BAD_REQUEST =>
            {
                "Invalid email or password.".to_string()
            }
            AuthError::Api(err) => err.user_message(),
            AuthError::Storage(_) => {
                "Could not save the session locally. Please try again."
                    .to_string()
            }
        }
    }
}

/// Password reset failures, already mapped per scenario
#[derive(Debug, Error)]
pub enum ResetError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Authenticated reset attempted without a held session token.
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid reset token or credentials")]
    InvalidCredentials,

    #[error("invalid reset payload: {0}")]
    InvalidPayload(String),

    /// Server rejected the session token; the session has been cleared.
    #[error("session token expired")]
    SessionExpired,

    #[error("not permitted to reset the password for {email}")]
    NotPermitted { email: String },

    /// The forgot-password flow already completed.
    #[error("password reset already completed")]
    FlowFinished,

    #[error("password reset request failed")]
    Failed(#[source] ApiError),
}

impl ResetError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ResetError::Validation(_)
            | ResetError::NotAuthenticated
            | ResetError::FlowFinished => ErrorClass::Validation,
            ResetError::UserNotFound => ErrorClass::NotFound,
            ResetError::SessionExpired => ErrorClass::AuthenticationRejected,
            ResetError::NotPermitted { .. } => ErrorClass::AuthorizationDenied,
            ResetError::InvalidEmail
            | ResetError::InvalidCredentials
            | ResetError::InvalidPayload(_) => ErrorClass::Validation,
            ResetError::Failed(err) => err.class(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ResetError::Validation(err) => capitalize(&err.to_string()),
            ResetError::NotAuthenticated => {
                "You need to log in before changing a password.".to_string()
            }
            ResetError::UserNotFound => "User not found.".to_string(),
            ResetError::InvalidEmail => "Invalid email.".to_string(),
            ResetError::InvalidCredentials => {
                "Invalid email, reset token or current password.".to_string()
            }
            ResetError::InvalidPayload(_) => {
                "Invalid data. Check the email and passwords.".to_string()
            }
            ResetError::SessionExpired => {
                "Token expired. Please log in again.".to_string()
            }
            ResetError::NotPermitted { .. } => {
                "You are not allowed to change this password.".to_string()
            }
            ResetError::FlowFinished => {
                "The password has already been changed.".to_string()
            }
            ResetError::Failed(_) => {
                "Could not change the password. Please try again.".to_string()
            }
        }
    }
}

/// User directory failures
#[derive(Debug, Error)]
pub enum UserAdminError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("not authenticated")]
    NotAuthenticated,

    /// Refused locally: the session lacks the named capability.
    #[error("missing capability `{0}`")]
    Forbidden(&'static str),

    /// Server answered 403.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("user {0} not found")]
    NotFound(UserId),

    /// Server rejected the session token; the session has been cleared.
    #[error("session expired")]
    SessionExpired,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Api(ApiError),
}

impl UserAdminError {
    pub fn class(&self) -> ErrorClass {
        match self {
            UserAdminError::Validation(_)
            | UserAdminError::NotAuthenticated
            | UserAdminError::InvalidRequest(_) => ErrorClass::Validation,
            UserAdminError::Forbidden(_)
            | UserAdminError::PermissionDenied(_) => {
                ErrorClass::AuthorizationDenied
            }
            UserAdminError::NotFound(_) => ErrorClass::NotFound,
            UserAdminError::SessionExpired => {
                ErrorClass::AuthenticationRejected
            }
            UserAdminError::Api(err) => err.class(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            UserAdminError::Validation(err) => capitalize(&err.to_string()),
            UserAdminError::NotAuthenticated => {
                "You need to log in first.".to_string()
            }
            UserAdminError::Forbidden("create_user") => {
                "Only administrators can create users.".to_string()
            }
            UserAdminError::Forbidden(_)
            | UserAdminError::PermissionDenied(_) => {
                "You are not allowed to perform this action.".to_string()
            }
            UserAdminError::NotFound(id) => format!("User {id} not found."),
            UserAdminError::SessionExpired => {
                "Your session has expired. Please log in again.".to_string()
            }
            UserAdminError::InvalidRequest(_) => {
                "Invalid data. Check the fields and try again.".to_string()
            }
            UserAdminError::Api(err) => err.user_message(),
        }
    }
}

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for raw API calls
pub type ApiResult<T> = Result<T, ApiError>;

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(chars.as_str());
            if !out.ends_with('.') {
                out.push('.');
            }
            out
        }
        None => String::new(),
    }
}
