//! Environment-backed configuration for a directory session

use anyhow::{Result, bail};

/// Connection new users are created in when none is configured.
pub const DEFAULT_CONNECTION: &str = "Username-Password-Authentication";

/// Request budget used when none is configured.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// Runtime settings resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Normalized base URL of the directory tenant, without a trailing slash.
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Name of the directory connection new users are created in.
    pub connection_name: String,
    pub requests_per_second: u32,
}

impl Settings {
    /// Load settings from the environment, honoring a local `.env` file.
    ///
    /// Fails fast on missing credentials or an unusable request budget so a
    /// misconfigured session never reaches the menu.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let domain = require_var("DIRECTORY_DOMAIN")?;
        let client_id = require_var("DIRECTORY_CLIENT_ID")?;
        let client_secret = require_var("DIRECTORY_CLIENT_SECRET")?;
        let connection_name = std::env::var("DIRECTORY_CONNECTION")
            .unwrap_or_else(|_| DEFAULT_CONNECTION.to_string());
        let requests_per_second = std::env::var("DIRECTORY_REQUESTS_PER_SECOND")
            .unwrap_or_else(|_| DEFAULT_REQUESTS_PER_SECOND.to_string());

        Self::build(
            domain,
            client_id,
            client_secret,
            connection_name,
            requests_per_second,
        )
    }

    fn build(
        domain: String,
        client_id: String,
        client_secret: String,
        connection_name: String,
        requests_per_second: String,
    ) -> Result<Self> {
        let base_url = normalize_domain(&domain)?;

        if client_id.trim().is_empty() {
            bail!("DIRECTORY_CLIENT_ID must not be empty");
        }
        if client_secret.trim().is_empty() {
            bail!("DIRECTORY_CLIENT_SECRET must not be empty");
        }
        if connection_name.trim().is_empty() {
            bail!("DIRECTORY_CONNECTION must not be empty");
        }

        let requests_per_second: u32 = requests_per_second
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("DIRECTORY_REQUESTS_PER_SECOND must be a positive integer"))?;
        if requests_per_second == 0 {
            bail!("DIRECTORY_REQUESTS_PER_SECOND must be greater than zero");
        }

        Ok(Self {
            base_url,
            client_id,
            client_secret,
            connection_name,
            requests_per_second,
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{} is not set", name),
    }
}

/// Normalize a tenant domain into a base URL without a trailing slash.
///
/// A bare domain like `tenant.eu.auth0.com` gets an `https://` scheme; an
/// explicit `http://` is kept so local development targets keep working.
fn normalize_domain(domain: &str) -> Result<String> {
    let trimmed = domain.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("DIRECTORY_DOMAIN must not be empty");
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("https://{}", trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(domain: &str, requests_per_second: &str) -> Result<Settings> {
        Settings::build(
            domain.to_string(),
            "client".to_string(),
            "secret".to_string(),
            DEFAULT_CONNECTION.to_string(),
            requests_per_second.to_string(),
        )
    }

    #[test]
    fn test_bare_domain_gets_https_scheme() {
        let settings = build("tenant.eu.auth0.com", "10").unwrap();
        assert_eq!(settings.base_url, "https://tenant.eu.auth0.com");
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let settings = build("https://tenant.eu.auth0.com/", "10").unwrap();
        assert_eq!(settings.base_url, "https://tenant.eu.auth0.com");
    }

    #[test]
    fn test_http_scheme_is_kept_for_local_targets() {
        let settings = build("http://localhost:8080", "10").unwrap();
        assert_eq!(settings.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_zero_request_budget_is_rejected() {
        assert!(build("tenant.eu.auth0.com", "0").is_err());
    }

    #[test]
    fn test_non_numeric_request_budget_is_rejected() {
        assert!(build("tenant.eu.auth0.com", "fast").is_err());
    }

    #[test]
    fn test_blank_secret_is_rejected() {
        let result = Settings::build(
            "tenant.eu.auth0.com".to_string(),
            "client".to_string(),
            "   ".to_string(),
            DEFAULT_CONNECTION.to_string(),
            "10".to_string(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_domain_is_rejected() {
        assert!(build("   ", "10").is_err());
    }
}
