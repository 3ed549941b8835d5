//! Guard rails applied after all configuration layers are merged.

use tracing::warn;
use url::Url;

use crate::loader::error::ConfigLoadError;
use crate::models::Config;

/// Normalize a user-provided base URL.
///
/// Operators commonly type `localhost:7201`, which the HTTP client rejects,
/// so a missing scheme defaults to `http://`. The scheme is matched
/// case-insensitively and the host must be non-empty. Trailing slashes on
/// the path are trimmed to keep joined paths free of `//`.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigLoadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigLoadError::EmptyBaseUrl);
    }
    let invalid = |source| ConfigLoadError::InvalidBaseUrl {
        value: raw.to_string(),
        source,
    };

    let with_scheme = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    let mut parsed = Url::parse(&with_scheme).map_err(invalid)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigLoadError::UnsupportedScheme {
            value: raw.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid(url::ParseError::EmptyHost));
    }

    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    let mut normalized = parsed.to_string();
    if parsed.query().is_none() && parsed.fragment().is_none() {
        normalized.truncate(normalized.trim_end_matches('/').len());
    }

    if normalized != raw {
        warn!("normalized base URL from '{}' to '{}'", raw, normalized);
    }
    Ok(normalized)
}

/// `scheme://` or `http:`/`https:` prefix, in any case.
fn has_scheme(value: &str) -> bool {
    if let Some((scheme, _)) = value.split_once("://") {
        let scheme_char =
            |c: char| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.');
        return !scheme.is_empty() && scheme.chars().all(scheme_char);
    }
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http:") || lower.starts_with("https:")
}

fn check_path(name: &'static str, value: &str) -> Result<(), ConfigLoadError> {
    let invalid = |reason: &'static str| ConfigLoadError::InvalidEndpoint {
        name,
        value: value.to_string(),
        reason,
    };
    if value.trim().is_empty() {
        return Err(invalid("path is empty"));
    }
    if !value.starts_with('/') {
        return Err(invalid("path must start with '/'"));
    }
    if value.contains(char::is_whitespace) {
        return Err(invalid("path must not contain whitespace"));
    }
    Ok(())
}

/// Validate and normalize a merged configuration in place.
pub fn validate(config: &mut Config) -> Result<(), ConfigLoadError> {
    config.api.base_url = normalize_base_url(&config.api.base_url)?;
    if config.api.timeout_secs == 0 {
        return Err(ConfigLoadError::InvalidTimeout);
    }

    let endpoints = &config.endpoints;
    check_path("login", &endpoints.login)?;
    check_path("forgot_password", &endpoints.forgot_password)?;
    check_path("reset_with_token", &endpoints.reset_with_token)?;
    check_path("reset_password", &endpoints.reset_password)?;
    check_path("users", &endpoints.users)?;
    if endpoints.users.contains("{id}") {
        return Err(ConfigLoadError::InvalidEndpoint {
            name: "users",
            value: endpoints.users.clone(),
            reason: "collection path must not contain '{id}'",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_scheme_and_trims_slash() {
        assert_eq!(
            normalize_base_url("localhost:7201/").unwrap(),
            "http://localhost:7201"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com").unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn rejects_empty_and_garbage_urls() {
        assert!(matches!(
            normalize_base_url("  "),
            Err(ConfigLoadError::EmptyBaseUrl)
        ));
        assert!(normalize_base_url("http://").is_err());
        assert!(normalize_base_url("https://").is_err());
        assert!(normalize_base_url("https:///").is_err());
        assert!(matches!(
            normalize_base_url("ftp://files.example.com"),
            Err(ConfigLoadError::UnsupportedScheme { ref scheme, .. })
                if scheme == "ftp"
        ));
    }

    #[test]
    fn scheme_is_detected_before_trimming() {
        assert_eq!(
            normalize_base_url("HTTP://Api.Example.com/").unwrap(),
            "http://api.example.com"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com/v1//").unwrap(),
            "https://api.example.com/v1"
        );
        assert_eq!(
            normalize_base_url(" http://127.0.0.1:9 ").unwrap(),
            "http://127.0.0.1:9"
        );
    }

    #[test]
    fn endpoint_paths_are_checked() {
        let mut config = Config::default();
        config.endpoints.login = "Auth/login".into();
        let err = validate(&mut config).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::InvalidEndpoint { name: "login", .. }
        ));

        let mut config = Config::default();
        config.endpoints.users = "/users/{id}".into();
        assert!(validate(&mut config).is_err());

        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(matches!(
            validate(&mut config),
            Err(ConfigLoadError::InvalidTimeout)
        ));
    }
}
