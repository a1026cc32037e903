//! Enum types shared between the player and the screens

use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback state of the single audio channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing...",
            PlaybackState::Paused => "Paused",
        };
        f.write_str(label)
    }
}
