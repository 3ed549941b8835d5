//! Core data model definitions shared across userdesk crates.
#![allow(missing_docs)]

pub mod auth;
pub mod reset;
pub mod role;
pub mod timestamp;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use auth::{LoginRequest, LoginResponse};
pub use reset::{
    ForgotPasswordRequest, ResetOutcome, ResetPasswordRequest, ResetTokenGrant,
    ResetWithTokenRequest,
};
pub use role::Role;
pub use user::{CreateUserRequest, UpdateUserRequest, User, UserId};
