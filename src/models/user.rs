//! User model

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Username, unique across the credential file
    pub username: String,
    /// Password credential in `<salt>$<hex hash>` form (never the plain password)
    pub password: String,
}

impl User {
    /// Create a new user from an already hashed credential
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            username,
            password: password_hash,
        }
    }
}
