//! Core library functions for Ultra

pub mod auth;
pub mod player;
pub mod playlist;
pub mod poller;

pub use auth::{AuthError, AuthService};
pub use player::{PlayerError, Player, PlayerStatus, PollOutcome};
pub use playlist::Playlist;
pub use poller::Poller;
