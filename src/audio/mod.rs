//! Audio output for Ultra
//!
//! The player talks to an [`AudioOutput`] it owns. [`RodioOutput`] is the
//! real device; tests drive the player through a fake clock instead.

mod rodio_output;

pub use rodio_output::RodioOutput;

use lofty::{AudioFile, Probe};
use std::path::Path;
use std::time::Duration;

/// Errors raised by the audio layer
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("cannot read duration of {path}: {message}")]
    Probe { path: String, message: String },

    #[error("audio device unavailable: {0}")]
    Device(String),

    #[error("audio thread has stopped")]
    Disconnected,
}

/// A single output channel: at most one song plays at a time.
pub trait AudioOutput: Send {
    /// Stop whatever is playing and start `path` at `offset`.
    fn play_from(&mut self, path: &Path, offset: Duration) -> Result<(), AudioError>;

    /// Stop output. Position resets to zero.
    fn stop(&mut self);

    /// Time spent playing since the last `play_from`, zero when stopped.
    fn position(&self) -> Duration;

    /// Set the output volume, 0.0 to 1.0
    fn set_volume(&mut self, volume: f32);

    /// Total length of the song at `path`
    fn probe_duration(&self, path: &Path) -> Result<Duration, AudioError> {
        probe_duration(path)
    }
}

/// Read a song's length from its metadata
pub fn probe_duration(path: &Path) -> Result<Duration, AudioError> {
    let tagged_file =
        Probe::open(path)
            .and_then(|probe| probe.read())
            .map_err(|e| AudioError::Probe {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

    Ok(tagged_file.properties().duration())
}
