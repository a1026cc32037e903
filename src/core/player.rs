//! Playback engine
//!
//! A small state machine (stopped, playing, paused) over one owned audio
//! output and the playlist. Elapsed time is `paused_at + output position`,
//! where `paused_at` is the offset the output was last started from.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::playlist::Playlist;
use crate::audio::{AudioError, AudioOutput};
use crate::config::UserConfig;
use crate::models::PlaybackState;
use crate::utils::filesystem::{list_songs, song_stem, truncate_song_name};

/// A song counts as finished this close to its end
const END_OF_TRACK_MARGIN: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("No song directory chosen yet. Use `load <dir>` first.")]
    NoDirectory,

    #[error("The playlist is empty.")]
    EmptyPlaylist,

    /// Holds the zero-based index; the message counts from one like `list` does
    #[error("There is no song number {} in the playlist.", .0 + 1)]
    NoSuchSong(usize),

    #[error("Song file not found: {}", .0.display())]
    SongNotFound(PathBuf),

    #[error("Error loading songs from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// What the seek bar should show after a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing to update: stopped, paused, or the user is dragging the seek bar
    Idle,
    Progress { elapsed: Duration, duration: Duration },
    /// The song reached its end; the caller should move to the next one
    Finished,
}

/// Snapshot for the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatus {
    pub state: PlaybackState,
    pub song: Option<String>,
    pub index: Option<usize>,
    pub len: usize,
    pub elapsed: Duration,
    pub duration: Duration,
    pub volume: u8,
}

pub struct Player<A: AudioOutput> {
    audio: A,
    playlist: Playlist,
    state: PlaybackState,
    elapsed: Duration,
    /// Offset the output was last started from; the resume point while paused
    paused_at: Duration,
    duration: Duration,
    seeking: bool,
    volume: u8,
    song_extensions: Vec<String>,
    display_name_max_len: usize,
}

impl<A: AudioOutput> Player<A> {
    pub fn new(mut audio: A, config: &UserConfig) -> Self {
        let volume = config.default_volume.min(100);
        audio.set_volume(f32::from(volume) / 100.0);

        Self {
            audio,
            playlist: Playlist::new(),
            state: PlaybackState::Stopped,
            elapsed: Duration::ZERO,
            paused_at: Duration::ZERO,
            duration: Duration::ZERO,
            seeking: false,
            volume,
            song_extensions: config.song_extensions.clone(),
            display_name_max_len: config.display_name_max_len,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Whether the poller should be ticking
    pub fn wants_polling(&self) -> bool {
        self.state == PlaybackState::Playing && !self.seeking
    }

    /// Replace the playlist with the songs found in `dir`
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize, PlayerError> {
        let songs = list_songs(dir, &self.song_extensions).map_err(|source| PlayerError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        self.stop();
        let count = songs.len();
        self.playlist.load(dir.to_path_buf(), songs);
        info!("Loaded {} songs from {}", count, dir.display());
        Ok(count)
    }

    /// Play the song under the cursor: from the resume point if paused, else from 0
    pub fn play_song(&mut self) -> Result<(), PlayerError> {
        if self.state != PlaybackState::Paused {
            self.elapsed = Duration::ZERO;
            self.paused_at = Duration::ZERO;
        }

        let path = self.current_song_path()?;
        self.audio.stop();
        self.start(&path, self.paused_at)
    }

    /// Stop output and remember where we were
    pub fn pause_song(&mut self) -> Result<(), PlayerError> {
        match self.state {
            PlaybackState::Playing => {
                self.elapsed = self.current_elapsed();
                self.audio.stop();
                self.paused_at = self.elapsed;
                self.state = PlaybackState::Paused;
                debug!("Paused at {:?}", self.paused_at);
                Ok(())
            }
            PlaybackState::Paused => self.resume_song(),
            PlaybackState::Stopped => Ok(()),
        }
    }

    /// Reload the current song and continue from the resume point
    pub fn resume_song(&mut self) -> Result<(), PlayerError> {
        if self.state != PlaybackState::Paused {
            return Ok(());
        }
        let path = self.current_song_path()?;
        self.start(&path, self.paused_at)
    }

    pub fn toggle_play_pause(&mut self) -> Result<PlaybackState, PlayerError> {
        match self.state {
            PlaybackState::Playing => self.pause_song()?,
            PlaybackState::Paused => self.resume_song()?,
            PlaybackState::Stopped => self.play_song()?,
        }
        Ok(self.state)
    }

    pub fn next_song(&mut self) -> Result<(), PlayerError> {
        self.ensure_songs()?;
        self.reset_for_new_song();
        self.playlist.advance();
        self.play_song()
    }

    pub fn previous_song(&mut self) -> Result<(), PlayerError> {
        self.ensure_songs()?;
        self.reset_for_new_song();
        self.playlist.retreat();
        self.play_song()
    }

    /// Shuffle the playlist and play from its new first song
    pub fn shuffle(&mut self) -> Result<(), PlayerError> {
        self.ensure_songs()?;
        self.reset_for_new_song();
        self.playlist.shuffle(&mut rand::thread_rng());
        self.play_song()
    }

    /// Jump to a song by position and play it from the start
    pub fn play_index(&mut self, index: usize) -> Result<(), PlayerError> {
        self.ensure_songs()?;
        if index >= self.playlist.len() {
            return Err(PlayerError::NoSuchSong(index));
        }
        self.reset_for_new_song();
        self.playlist.select(index);
        self.play_song()
    }

    /// Fuzzy-find a song in the playlist
    pub fn find(&self, query: &str) -> Option<usize> {
        self.playlist.find(query)
    }

    /// The user started dragging the seek bar to `position`
    pub fn begin_seek(&mut self, position: Duration) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        self.seeking = true;
        self.elapsed = self.clamp_to_length(position);
    }

    /// The user released the seek bar at `position`
    pub fn commit_seek(&mut self, position: Duration) -> Result<(), PlayerError> {
        if self.state == PlaybackState::Stopped {
            self.seeking = false;
            return Ok(());
        }

        let position = self.clamp_to_length(position);
        self.paused_at = position;
        self.elapsed = position;
        self.seeking = false;

        if self.state == PlaybackState::Playing {
            let path = self.current_song_path()?;
            self.start(&path, position)?;
        }
        debug!("Seeked to {:?}", position);
        Ok(())
    }

    /// Drag and release in one step
    pub fn seek_to(&mut self, position: Duration) -> Result<(), PlayerError> {
        self.begin_seek(position);
        self.commit_seek(position)
    }

    /// Refresh elapsed time from the output. Called once per poll interval.
    ///
    /// A song whose length could not be read never finishes on its own.
    pub fn poll(&mut self) -> PollOutcome {
        if !self.wants_polling() {
            return PollOutcome::Idle;
        }

        self.elapsed = self.current_elapsed();
        if !self.duration.is_zero()
            && self.elapsed >= self.duration.saturating_sub(END_OF_TRACK_MARGIN)
        {
            info!("Finished {}", self.playlist.current().unwrap_or_default());
            return PollOutcome::Finished;
        }

        PollOutcome::Progress {
            elapsed: self.elapsed,
            duration: self.duration,
        }
    }

    /// Set the volume in percent (0-100)
    pub fn set_volume(&mut self, percent: u8) {
        self.volume = percent.min(100);
        self.audio.set_volume(f32::from(self.volume) / 100.0);
    }

    /// Stop output and forget the resume point
    pub fn stop(&mut self) {
        self.audio.stop();
        self.state = PlaybackState::Stopped;
        self.elapsed = Duration::ZERO;
        self.paused_at = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.seeking = false;
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            state: self.state,
            song: self
                .playlist
                .current()
                .map(|song| truncate_song_name(song_stem(song), self.display_name_max_len)),
            index: self.playlist.current_index(),
            len: self.playlist.len(),
            elapsed: self.elapsed,
            duration: self.duration,
            volume: self.volume,
        }
    }

    fn current_elapsed(&self) -> Duration {
        self.clamp_to_length(self.paused_at + self.audio.position())
    }

    /// Zero length means unknown, so nothing to clamp against
    fn clamp_to_length(&self, position: Duration) -> Duration {
        if self.duration.is_zero() {
            position
        } else {
            position.min(self.duration)
        }
    }

    fn ensure_songs(&self) -> Result<(), PlayerError> {
        if self.playlist.directory().is_none() {
            return Err(PlayerError::NoDirectory);
        }
        if self.playlist.is_empty() {
            return Err(PlayerError::EmptyPlaylist);
        }
        Ok(())
    }

    fn current_song_path(&self) -> Result<PathBuf, PlayerError> {
        self.ensure_songs()?;
        let path = self
            .playlist
            .current_path()
            .ok_or(PlayerError::EmptyPlaylist)?;

        if !path.is_file() {
            return Err(PlayerError::SongNotFound(path));
        }
        Ok(path)
    }

    fn reset_for_new_song(&mut self) {
        self.audio.stop();
        self.state = PlaybackState::Stopped;
        self.elapsed = Duration::ZERO;
        self.paused_at = Duration::ZERO;
        self.seeking = false;
    }

    /// Start output at `offset`. Any failure leaves the player stopped.
    fn start(&mut self, path: &Path, offset: Duration) -> Result<(), PlayerError> {
        let result = self
            .audio
            .probe_duration(path)
            .and_then(|duration| {
                self.audio.play_from(path, offset)?;
                Ok(duration)
            });

        match result {
            Ok(duration) => {
                self.duration = duration;
                self.paused_at = offset;
                self.elapsed = offset;
                self.seeking = false;
                self.state = PlaybackState::Playing;
                info!("Playing {} from {:?}", path.display(), offset);
                Ok(())
            }
            Err(e) => {
                warn!("Playback failed for {}: {}", path.display(), e);
                self.stop();
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::FakeOutput;
    use tempfile::TempDir;

    const SEC: Duration = Duration::from_secs(1);

    fn library(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        dir
    }

    fn player_with(dir: &TempDir, fake: &FakeOutput) -> Player<FakeOutput> {
        let mut player = Player::new(fake.clone(), &UserConfig::default());
        player.load_directory(dir.path()).unwrap();
        player
    }

    #[test]
    fn test_play_pause_resume_cycle() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let fake = FakeOutput::new().with_duration("a.mp3", 100 * SEC);
        let mut player = player_with(&dir, &fake);

        assert_eq!(player.toggle_play_pause().unwrap(), PlaybackState::Playing);
        assert_eq!(fake.last_play(), Some(("a.mp3".into(), Duration::ZERO)));

        fake.advance(30 * SEC);
        assert_eq!(player.toggle_play_pause().unwrap(), PlaybackState::Paused);
        assert!(!fake.is_playing());
        assert_eq!(player.status().elapsed, 30 * SEC);

        // resume restarts the output from the stored offset
        assert_eq!(player.toggle_play_pause().unwrap(), PlaybackState::Playing);
        assert_eq!(fake.last_play(), Some(("a.mp3".into(), 30 * SEC)));

        fake.advance(5 * SEC);
        assert_eq!(
            player.poll(),
            PollOutcome::Progress {
                elapsed: 35 * SEC,
                duration: 100 * SEC
            }
        );
    }

    #[test]
    fn test_pause_when_paused_resumes() {
        let dir = library(&["a.mp3"]);
        let fake = FakeOutput::new();
        let mut player = player_with(&dir, &fake);

        player.play_song().unwrap();
        fake.advance(10 * SEC);
        player.pause_song().unwrap();
        player.pause_song().unwrap();

        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(fake.last_play(), Some(("a.mp3".into(), 10 * SEC)));
    }

    #[test]
    fn test_next_and_previous_wrap_and_restart_from_zero() {
        let dir = library(&["a.mp3", "b.mp3", "c.mp3"]);
        let fake = FakeOutput::new();
        let mut player = player_with(&dir, &fake);

        player.play_song().unwrap();
        fake.advance(20 * SEC);

        player.previous_song().unwrap();
        assert_eq!(player.status().index, Some(2));
        assert_eq!(fake.last_play(), Some(("c.mp3".into(), Duration::ZERO)));

        player.next_song().unwrap();
        assert_eq!(player.status().index, Some(0));
        assert_eq!(fake.last_play(), Some(("a.mp3".into(), Duration::ZERO)));
    }

    #[test]
    fn test_next_from_paused_starts_at_zero() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let fake = FakeOutput::new();
        let mut player = player_with(&dir, &fake);

        player.play_song().unwrap();
        fake.advance(50 * SEC);
        player.pause_song().unwrap();
        player.next_song().unwrap();

        assert_eq!(fake.last_play(), Some(("b.mp3".into(), Duration::ZERO)));
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_end_of_track_one_second_early() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let fake = FakeOutput::new().with_duration("a.mp3", 10 * SEC);
        let mut player = player_with(&dir, &fake);

        player.play_song().unwrap();
        fake.advance(Duration::from_millis(8_900));
        assert!(matches!(player.poll(), PollOutcome::Progress { .. }));

        fake.advance(Duration::from_millis(100));
        assert_eq!(player.poll(), PollOutcome::Finished);

        player.next_song().unwrap();
        assert_eq!(fake.last_play(), Some(("b.mp3".into(), Duration::ZERO)));
    }

    #[test]
    fn test_elapsed_never_exceeds_duration() {
        let dir = library(&["a.mp3"]);
        let fake = FakeOutput::new().with_duration("a.mp3", 10 * SEC);
        let mut player = player_with(&dir, &fake);

        player.play_song().unwrap();
        fake.advance(60 * SEC);
        assert_eq!(player.poll(), PollOutcome::Finished);
        assert_eq!(player.status().elapsed, 10 * SEC);
    }

    #[test]
    fn test_unknown_length_keeps_playing() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let fake = FakeOutput::new().with_duration("a.mp3", Duration::ZERO);
        let mut player = player_with(&dir, &fake);

        player.play_song().unwrap();
        assert_eq!(
            player.poll(),
            PollOutcome::Progress {
                elapsed: Duration::ZERO,
                duration: Duration::ZERO
            }
        );

        fake.advance(30 * SEC);
        assert_eq!(
            player.poll(),
            PollOutcome::Progress {
                elapsed: 30 * SEC,
                duration: Duration::ZERO
            }
        );

        player.seek_to(90 * SEC).unwrap();
        assert_eq!(fake.last_play(), Some(("a.mp3".into(), 90 * SEC)));
        assert_eq!(player.status().elapsed, 90 * SEC);
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_seeking_suspends_progress_updates() {
        let dir = library(&["a.mp3"]);
        let fake = FakeOutput::new().with_duration("a.mp3", 100 * SEC);
        let mut player = player_with(&dir, &fake);

        player.play_song().unwrap();
        fake.advance(5 * SEC);
        player.begin_seek(60 * SEC);

        fake.advance(SEC);
        assert_eq!(player.poll(), PollOutcome::Idle);
        assert_eq!(player.status().elapsed, 60 * SEC);
        assert!(!player.wants_polling());

        player.commit_seek(60 * SEC).unwrap();
        assert_eq!(fake.last_play(), Some(("a.mp3".into(), 60 * SEC)));
        assert!(player.wants_polling());

        fake.advance(2 * SEC);
        assert_eq!(
            player.poll(),
            PollOutcome::Progress {
                elapsed: 62 * SEC,
                duration: 100 * SEC
            }
        );
    }

    #[test]
    fn test_seek_while_paused_stays_paused() {
        let dir = library(&["a.mp3"]);
        let fake = FakeOutput::new().with_duration("a.mp3", 100 * SEC);
        let mut player = player_with(&dir, &fake);

        player.play_song().unwrap();
        player.pause_song().unwrap();
        let plays_before = fake.plays().len();

        player.seek_to(40 * SEC).unwrap();
        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(fake.plays().len(), plays_before);

        player.resume_song().unwrap();
        assert_eq!(fake.last_play(), Some(("a.mp3".into(), 40 * SEC)));
    }

    #[test]
    fn test_seek_is_clamped_and_ignored_when_stopped() {
        let dir = library(&["a.mp3"]);
        let fake = FakeOutput::new().with_duration("a.mp3", 100 * SEC);
        let mut player = player_with(&dir, &fake);

        player.seek_to(30 * SEC).unwrap();
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(fake.plays().is_empty());

        player.play_song().unwrap();
        player.seek_to(500 * SEC).unwrap();
        assert_eq!(fake.last_play(), Some(("a.mp3".into(), 100 * SEC)));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let fake = FakeOutput::new();
        let mut player = player_with(&dir, &fake);
        std::fs::remove_file(dir.path().join("a.mp3")).unwrap();

        let err = player.play_song().unwrap_err();
        assert!(matches!(err, PlayerError::SongNotFound(_)));
        assert_eq!(player.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_audio_failure_leaves_player_stopped() {
        let dir = library(&["a.mp3"]);
        let fake = FakeOutput::new();
        let mut player = player_with(&dir, &fake);
        fake.state.lock().fail_next_play = true;

        assert!(matches!(
            player.play_song().unwrap_err(),
            PlayerError::Audio(AudioError::Decode { .. })
        ));
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(player.poll(), PollOutcome::Idle);
    }

    #[test]
    fn test_empty_and_unloaded_playlists() {
        let fake = FakeOutput::new();
        let mut player = Player::new(fake.clone(), &UserConfig::default());
        assert!(matches!(player.next_song(), Err(PlayerError::NoDirectory)));

        let empty = library(&["cover.jpg"]);
        assert_eq!(player.load_directory(empty.path()).unwrap(), 0);
        assert!(matches!(player.play_song(), Err(PlayerError::EmptyPlaylist)));
        assert!(matches!(player.shuffle(), Err(PlayerError::EmptyPlaylist)));
    }

    #[test]
    fn test_unreadable_directory() {
        let dir = TempDir::new().unwrap();
        let mut player = Player::new(FakeOutput::new(), &UserConfig::default());
        let err = player.load_directory(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, PlayerError::Io { .. }));
    }

    #[test]
    fn test_play_index_bounds() {
        let dir = library(&["a.mp3", "b.mp3"]);
        let fake = FakeOutput::new();
        let mut player = player_with(&dir, &fake);

        assert!(matches!(player.play_index(5), Err(PlayerError::NoSuchSong(5))));
        player.play_index(1).unwrap();
        assert_eq!(fake.last_play(), Some(("b.mp3".into(), Duration::ZERO)));
    }

    #[test]
    fn test_shuffle_plays_first_song() {
        let dir = library(&["a.mp3", "b.mp3", "c.mp3"]);
        let fake = FakeOutput::new();
        let mut player = player_with(&dir, &fake);

        player.shuffle().unwrap();
        let first = player.playlist().songs()[0].clone();
        assert_eq!(player.status().index, Some(0));
        assert_eq!(fake.last_play(), Some((first, Duration::ZERO)));
    }

    #[test]
    fn test_volume_and_status_name() {
        let dir = library(&["A very long song title that keeps going.mp3"]);
        let fake = FakeOutput::new();
        let mut player = player_with(&dir, &fake);
        assert_eq!(fake.state.lock().volume, 0.5);

        player.set_volume(250);
        assert_eq!(player.status().volume, 100);
        assert_eq!(fake.state.lock().volume, 1.0);

        assert_eq!(
            player.status().song.as_deref(),
            Some("A very long song title th...")
        );
    }

    #[test]
    fn test_load_directory_stops_playback() {
        let dir = library(&["a.mp3"]);
        let other = library(&["x.mp3", "y.mp3"]);
        let fake = FakeOutput::new();
        let mut player = player_with(&dir, &fake);

        player.play_song().unwrap();
        assert_eq!(player.load_directory(other.path()).unwrap(), 2);
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(!fake.is_playing());
    }
}
