//! Authentication domain
//!
//! Login and logout, both password reset scenarios, the forgot-password
//! dialog state and local permission checks.

pub mod flow;
pub mod gateway;
pub mod permissions;
pub mod reset;

pub use flow::{ForgotPasswordFlow, ForgotPasswordState};
pub use gateway::AuthGateway;
pub use permissions::{Capability, PermissionChecker, SessionPermissionExt};
pub use reset::ResetResult;
