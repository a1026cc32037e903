//! Utility modules for Ultra

pub mod auth;
pub mod dates;
pub mod filesystem;
