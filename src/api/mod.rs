//! Rate-limited access layer for the remote directory API
//!
//! Everything the interactive session does goes through this module: one
//! shared [`RateLimiter`] paces all traffic, one [`TokenProvider`] caches the
//! OAuth2 client-credentials token, and [`UserOperations`] exposes the user
//! management calls on top of clients handed out by the [`ClientFactory`].

pub mod client;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod rate_limiter;
pub mod token;
pub mod users;

pub use client::{ApiClient, ClientFactory, build_http_client};
pub use error::ApiError;
pub use logging::{ApiLogger, OperationContext};
pub use models::{NewUser, PageCursor, UserRecord, UserUpdate};
pub use rate_limiter::{RateLimiter, RateLimiterStats};
pub use token::TokenProvider;
pub use users::UserOperations;
