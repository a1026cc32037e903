//! Data models for Ultra
//!
//! This module contains the core data structures shared across the application.

mod enums;
mod session;
mod user;

pub use enums::PlaybackState;
pub use session::{LoginInfo, LoginState, Session};
pub use user::User;
