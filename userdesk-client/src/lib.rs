//! Userdesk client library
//!
//! Client-side core of the user-management console: the persisted session,
//! login and password reset against the user API, local permission checks
//! and the user directory.
//!
//! Notes
//! - Every front-end (the `userdeskctl` binary, tests) wires the same
//!   [`SessionStore`] into an [`ApiClient`]; there is no global state.
//! - Errors are classified through [`errors::ErrorClass`] and carry a
//!   ready-to-display message.

pub mod auth;
pub mod errors;
pub mod infra;
pub mod session;
pub mod storage;
pub mod users;
pub mod validation;

#[cfg(test)]
mod tests;

pub use auth::{AuthGateway, Capability, ForgotPasswordFlow, PermissionChecker};
pub use errors::{
    ApiError, AuthError, ErrorClass, ResetError, StorageError, UserAdminError,
    ValidationError,
};
pub use infra::{Access, ApiClient, HttpTransport, ReqwestTransport};
pub use session::{BearerToken, Session, SessionStore};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use users::{NewUser, UserDirectory};
