//! Client-side input checks. A failure here means no request is sent.

use crate::errors::ValidationError;

/// Minimum accepted length for a new password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Trim and check that `email` looks like `local@domain.tld`.
pub fn email(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    let invalid = || ValidationError::InvalidEmail(trimmed.to_string());
    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || trimmed.contains(char::is_whitespace)
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}

/// Login passwords are only checked for presence.
pub fn login_password(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    Ok(())
}

/// New passwords must meet the minimum length and match the confirmation
/// when one is supplied.
pub fn new_password(
    password: &str,
    confirmation: Option<&str>,
) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if let Some(confirmation) = confirmation
        && confirmation != password
    {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn name(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(trimmed.to_string())
}

pub fn reset_token(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::ResetTokenRequired);
    }
    Ok(trimmed.to_string())
}
