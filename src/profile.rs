use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public account information for a GitHub user, as returned by
/// `GET /users/{username}`. Field names match the upstream payload.
///
/// Optional fields decode `null` and a missing key to the same `None`, and
/// always serialize back out as `null` so the wire shape stays stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub blog: Option<String>,
    #[serde(default)]
    pub twitter_username: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Display name, falling back to the login.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }

    /// GitHub reports "no blog" as an empty string rather than null.
    pub fn blog_url(&self) -> Option<&str> {
        self.blog.as_deref().filter(|b| !b.is_empty())
    }
}

/// A handle as typed by the user. Never rejected locally; the upstream
/// decides whether it names an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Username {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Input of the `getProfileByUsername` procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInput {
    pub username: Username,
}
