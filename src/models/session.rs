//! Login state and session records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contents of login_state.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginState {
    #[serde(default)]
    pub stay_logged_in: bool,
    #[serde(default = "default_username")]
    pub username: String,
}

fn default_username() -> String {
    "User".to_string()
}

/// Contents of login_info.json: who logged in last, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginInfo {
    pub username: String,
    pub login_time: DateTime<Utc>,
}

impl LoginInfo {
    pub fn new(username: impl Into<String>, login_time: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            login_time,
        }
    }

    /// Whether the record is younger than `ttl` at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now.signed_duration_since(self.login_time) < ttl
    }
}

/// An authenticated user as seen by the player screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub stay_logged_in: bool,
}

impl Session {
    pub fn new(username: impl Into<String>, stay_logged_in: bool) -> Self {
        Self {
            username: username.into(),
            stay_logged_in,
        }
    }
}
