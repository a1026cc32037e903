//! Account and session operations behind the login, signup and reset screens

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::{Paths, UserConfig};
use crate::models::{LoginInfo, LoginState, Session, User};
use crate::store::{SessionTable, StoreError, UserTable};
use crate::utils::auth::{hash_password, validate_new_password, verify_password, PasswordError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Username cannot be empty.")]
    EmptyUsername,

    #[error("Username already exists.")]
    UsernameTaken,

    #[error("Username not found.")]
    UnknownUser,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Could not access account data: {0}")]
    Store(#[from] StoreError),
}

/// Owns the credential table and the session records
#[derive(Debug, Clone)]
pub struct AuthService {
    users: UserTable,
    sessions: SessionTable,
    session_ttl: chrono::Duration,
}

impl AuthService {
    pub fn new(paths: &Paths, config: &UserConfig) -> Self {
        Self {
            users: UserTable::new(paths.users_path()),
            sessions: SessionTable::new(paths.login_state_path(), paths.login_info_path()),
            session_ttl: config.session_ttl(),
        }
    }

    /// Check credentials and record the login
    pub fn login(
        &self,
        username: &str,
        password: &str,
        stay_logged_in: bool,
    ) -> Result<Session, AuthError> {
        self.login_at(username, password, stay_logged_in, Utc::now())
    }

    pub fn login_at(
        &self,
        username: &str,
        password: &str,
        stay_logged_in: bool,
        now: DateTime<Utc>,
    ) -> Result<Session, AuthError> {
        let user = match self.users.get_by_username(username) {
            Ok(user) => user,
            Err(e) if e.is_corrupt() => {
                warn!("Credential file unreadable, treating as empty: {}", e);
                None
            }
            Err(e) => return Err(e.into()),
        };

        // same error for unknown users and wrong passwords
        let user = user
            .filter(|user| verify_password(password, &user.password))
            .ok_or(AuthError::InvalidCredentials)?;

        self.sessions.save_state(&LoginState {
            stay_logged_in,
            username: user.username.clone(),
        })?;

        if stay_logged_in {
            self.sessions
                .save_info(&LoginInfo::new(user.username.clone(), now))?;
        }

        info!("User '{}' logged in", user.username);
        Ok(Session::new(user.username, stay_logged_in))
    }

    /// Register a new account
    pub fn signup(&self, username: &str, password: &str, confirm: &str) -> Result<(), AuthError> {
        validate_new_password(password, confirm)?;

        if username.trim().is_empty() {
            return Err(AuthError::EmptyUsername);
        }

        let user = User::new(username.to_string(), hash_password(password));
        if !self.users.insert(&user)? {
            return Err(AuthError::UsernameTaken);
        }

        info!("Registered user '{}'", username);
        Ok(())
    }

    /// Replace an existing user's password
    pub fn reset_password(
        &self,
        username: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        validate_new_password(new_password, confirm)?;

        let user = User::new(username.to_string(), hash_password(new_password));
        if !self.users.update(&user)? {
            return Err(AuthError::UnknownUser);
        }

        info!("Password reset for user '{}'", username);
        Ok(())
    }

    /// Forget the stay-logged-in choice and the last-login record
    pub fn logout(&self, username: &str) -> Result<(), AuthError> {
        self.sessions.save_state(&LoginState {
            stay_logged_in: false,
            username: username.to_string(),
        })?;
        self.sessions.clear_info()?;

        info!("User '{}' logged out", username);
        Ok(())
    }

    /// Persist the session's flag when the player exits
    pub fn save_exit_state(&self, session: &Session) -> Result<(), AuthError> {
        self.sessions.save_state(&LoginState {
            stay_logged_in: session.stay_logged_in,
            username: session.username.clone(),
        })?;
        Ok(())
    }

    /// The session to resume at startup, if any.
    ///
    /// Honored only when the flag is set, the last-login record names the
    /// same user, and that login is younger than the session lifetime.
    /// Unreadable records count as logged out.
    pub fn restore_session(&self, now: DateTime<Utc>) -> Option<Session> {
        let login = self.fresh_login(now)?;
        info!("Restoring session for '{}'", login.username);
        Some(Session::new(login.username, true))
    }

    fn fresh_login(&self, now: DateTime<Utc>) -> Option<LoginInfo> {
        let state = match self.sessions.load_state() {
            Ok(Some(state)) if state.stay_logged_in => state,
            Ok(_) => return None,
            Err(e) => {
                warn!("Ignoring login state: {}", e);
                return None;
            }
        };

        let login = match self.sessions.load_info() {
            Ok(Some(login)) => login,
            Ok(None) => {
                debug!("Stay-logged-in is set but there is no login record");
                return None;
            }
            Err(e) => {
                warn!("Ignoring login record: {}", e);
                return None;
            }
        };

        if login.username != state.username {
            warn!(
                "Login state is for '{}' but the last login was '{}'; not restoring",
                state.username, login.username
            );
            return None;
        }

        if !login.is_fresh(now, self.session_ttl) {
            info!("Session for '{}' has expired", login.username);
            return None;
        }

        Some(login)
    }

    /// Whether anyone has signed up yet. An unreadable file counts as empty.
    pub fn has_accounts(&self) -> bool {
        match self.users.all() {
            Ok(users) => !users.is_empty(),
            Err(e) => {
                warn!("Credential file unreadable, treating as empty: {}", e);
                false
            }
        }
    }

    /// Username to pre-fill on the login screen, while the session that
    /// remembered it is still alive
    pub fn remembered_username(&self, now: DateTime<Utc>) -> Option<String> {
        self.fresh_login(now).map(|login| login.username)
    }

    /// When `username` last logged in with stay-logged-in checked
    pub fn last_login(&self, username: &str) -> Option<DateTime<Utc>> {
        self.sessions
            .load_info()
            .ok()
            .flatten()
            .filter(|login| login.username == username)
            .map(|login| login.login_time)
    }
}
