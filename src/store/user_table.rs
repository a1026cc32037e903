//! Credential file operations

use std::collections::BTreeMap;
use std::path::PathBuf;

use super::json_file::{read_json, write_json};
use super::StoreError;
use crate::models::User;

/// On-disk shape of users.json: username -> credential
type UserMap = BTreeMap<String, String>;

/// Credential table backed by users.json
#[derive(Debug, Clone)]
pub struct UserTable {
    path: PathBuf,
}

impl UserTable {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<UserMap, StoreError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    /// Get all users
    pub fn all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(username, password)| User::new(username, password))
            .collect())
    }

    /// Get user by username
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut users = self.load()?;
        Ok(users
            .remove_entry(username)
            .map(|(username, password)| User::new(username, password)))
    }

    /// Insert a user. Returns false, without writing, if the username is taken.
    pub fn insert(&self, user: &User) -> Result<bool, StoreError> {
        let mut users = self.load()?;
        if users.contains_key(&user.username) {
            return Ok(false);
        }

        users.insert(user.username.clone(), user.password.clone());
        write_json(&self.path, &users)?;
        Ok(true)
    }

    /// Replace a user's credential. Returns false if the user does not exist.
    pub fn update(&self, user: &User) -> Result<bool, StoreError> {
        let mut users = self.load()?;
        match users.get_mut(&user.username) {
            Some(password) => *password = user.password.clone(),
            None => return Ok(false),
        }

        write_json(&self.path, &users)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(dir: &TempDir) -> UserTable {
        UserTable::new(dir.path().join("users.json"))
    }

    #[test]
    fn test_insert_and_lookup() {
        let dir = TempDir::new().unwrap();
        let users = table(&dir);

        assert!(users.insert(&User::new("amy".into(), "s$h".into())).unwrap());
        let amy = users.get_by_username("amy").unwrap().unwrap();
        assert_eq!(amy.password, "s$h");
        assert!(users.get_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn test_insert_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let users = table(&dir);

        users.insert(&User::new("amy".into(), "first".into())).unwrap();
        assert!(!users.insert(&User::new("amy".into(), "second".into())).unwrap());
        assert_eq!(
            users.get_by_username("amy").unwrap().unwrap().password,
            "first"
        );
    }

    #[test]
    fn test_update_requires_existing_user() {
        let dir = TempDir::new().unwrap();
        let users = table(&dir);

        assert!(!users.update(&User::new("ghost".into(), "x".into())).unwrap());
        assert!(users.all().unwrap().is_empty());

        users.insert(&User::new("amy".into(), "old".into())).unwrap();
        assert!(users.update(&User::new("amy".into(), "new".into())).unwrap());
        assert_eq!(users.get_by_username("amy").unwrap().unwrap().password, "new");
    }

    #[test]
    fn test_file_is_a_flat_mapping() {
        let dir = TempDir::new().unwrap();
        let users = table(&dir);
        users.insert(&User::new("amy".into(), "cred".into())).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
        let parsed: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.get("amy").map(String::as_str), Some("cred"));
    }
}
