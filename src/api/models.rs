//! Data shapes exchanged with the directory API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::constants;

/// A user record as returned by the directory API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Human-readable name, falling back to the email address.
    pub fn display_name(&self) -> String {
        match (&self.given_name, &self.family_name) {
            (Some(given), Some(family)) => format!("{} {}", given, family),
            (Some(given), None) => given.clone(),
            (None, Some(family)) => family.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Input collected for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub given_name: String,
    pub family_name: String,
}

/// Wire payload for user creation. New accounts always start unverified.
#[derive(Debug, Serialize)]
pub struct CreateUserRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub given_name: &'a str,
    pub family_name: &'a str,
    pub connection: &'a str,
    pub email_verified: bool,
}

/// Fields that can be changed on an existing user.
///
/// `None` fields are left untouched and never serialized, so the PATCH body
/// contains exactly the fields being changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

impl UserUpdate {
    /// Drop fields that are blank or whitespace-only.
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_field(self.email),
            given_name: normalize_field(self.given_name),
            family_name: normalize_field(self.family_name),
        }
    }

    /// True when no field would be sent to the API.
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.given_name.is_none() && self.family_name.is_none()
    }
}

fn normalize_field(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Zero-based cursor over the paged user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u32,
    pub per_page: u32,
}

impl PageCursor {
    /// Cursor for the first page at the default page size.
    pub fn first() -> Self {
        Self {
            page: 0,
            per_page: constants::DEFAULT_PAGE_SIZE,
        }
    }

    /// Cursor for the page after this one.
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}
