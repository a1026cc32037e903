//! Login state and last-login records

use std::path::PathBuf;

use super::json_file::{read_json, remove, write_json};
use super::StoreError;
use crate::models::{LoginInfo, LoginState};

/// The two session files: login_state.json and login_info.json.
///
/// They are written independently; readers must not assume they agree.
#[derive(Debug, Clone)]
pub struct SessionTable {
    state_path: PathBuf,
    info_path: PathBuf,
}

impl SessionTable {
    pub fn new(state_path: PathBuf, info_path: PathBuf) -> Self {
        Self {
            state_path,
            info_path,
        }
    }

    pub fn load_state(&self) -> Result<Option<LoginState>, StoreError> {
        read_json(&self.state_path)
    }

    pub fn save_state(&self, state: &LoginState) -> Result<(), StoreError> {
        write_json(&self.state_path, state)
    }

    pub fn load_info(&self) -> Result<Option<LoginInfo>, StoreError> {
        read_json(&self.info_path)
    }

    pub fn save_info(&self, info: &LoginInfo) -> Result<(), StoreError> {
        write_json(&self.info_path, info)
    }

    pub fn clear_info(&self) -> Result<(), StoreError> {
        remove(&self.info_path)
    }
}
