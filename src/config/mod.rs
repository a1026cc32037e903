//! Configuration module for Ultra
//!
//! This module contains the application settings and path management.

mod paths;
mod user_config;

pub use paths::Paths;
pub use user_config::UserConfig;

/// Symbols accepted by the password policy
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Minimum password length, counted in characters
pub const MIN_PASSWORD_LEN: usize = 8;
