//! Session record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use greencart_core::{Email, UserId};

/// Public projection of the authenticated user.
///
/// This is what the session carries; it never includes the password hash
/// or the full address book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
}

impl SessionUser {
    /// Display name, e.g. "John Doe".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The current authenticated session.
///
/// A process-wide singleton persisted under its own key; created on
/// login/signup, destroyed (together with cart and wishlist) on logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: SessionUser,
    /// Bearer token when the session was established remotely; `None` for
    /// local-fallback logins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub login_time: DateTime<Utc>,
}

impl Session {
    /// Start a session for `user`, optionally carrying a remote token.
    #[must_use]
    pub fn start(user: SessionUser, token: Option<String>) -> Self {
        Self {
            user,
            token,
            login_time: Utc::now(),
        }
    }
}
