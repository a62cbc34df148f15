//! Endpoint constants and URL builders for the directory API

/// Base path of the user management API
pub const API_BASE_PATH: &str = "/api/v2";

/// Path of the OAuth token endpoint
pub const TOKEN_PATH: &str = "/oauth/token";

/// Grant type used for machine-to-machine authentication
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

/// Number of users requested per page when listing
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Seconds a token is retired before its real expiry
pub const TOKEN_SAFETY_BUFFER_SECS: u64 = 60;

/// Build the OAuth token endpoint URL
pub fn token_endpoint(base_url: &str) -> String {
    format!("{}{}", base_url, TOKEN_PATH)
}

/// Build the audience value sent with token requests
pub fn audience(base_url: &str) -> String {
    format!("{}{}/", base_url, API_BASE_PATH)
}

/// Build the users collection endpoint URL
pub fn users_endpoint(base_url: &str) -> String {
    format!("{}{}/users", base_url, API_BASE_PATH)
}

/// Build the endpoint URL for a single user record
pub fn user_endpoint(base_url: &str, user_id: &str) -> String {
    format!(
        "{}{}/users/{}",
        base_url,
        API_BASE_PATH,
        urlencoding::encode(user_id)
    )
}
