//! The in-memory playlist: song file names from one directory and a cursor

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};

use crate::utils::filesystem::song_stem;

/// Ordered song list with a cursor that wraps at both ends.
///
/// The cursor is always in range while the list is non-empty.
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    directory: Option<PathBuf>,
    songs: Vec<String>,
    current: usize,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `songs` from `directory`, cursor at the start
    pub fn load(&mut self, directory: PathBuf, songs: Vec<String>) {
        self.directory = Some(directory);
        self.songs = songs;
        self.current = 0;
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn songs(&self) -> &[String] {
        &self.songs
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.songs.is_empty()).then_some(self.current)
    }

    pub fn current(&self) -> Option<&str> {
        self.songs.get(self.current).map(String::as_str)
    }

    /// Full path of the song under the cursor
    pub fn current_path(&self) -> Option<PathBuf> {
        let dir = self.directory.as_ref()?;
        self.current().map(|song| dir.join(song))
    }

    /// Move to `(i + 1) mod N`
    pub fn advance(&mut self) -> Option<usize> {
        let len = self.songs.len();
        if len == 0 {
            return None;
        }
        self.current = (self.current + 1) % len;
        Some(self.current)
    }

    /// Move to `(i - 1) mod N`
    pub fn retreat(&mut self) -> Option<usize> {
        let len = self.songs.len();
        if len == 0 {
            return None;
        }
        self.current = (self.current + len - 1) % len;
        Some(self.current)
    }

    /// Point the cursor at `index`. Returns false if it is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.songs.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Shuffle the songs and move the cursor to the first one
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        if self.songs.is_empty() {
            return None;
        }
        self.songs.shuffle(rng);
        self.current = 0;
        Some(0)
    }

    /// Best fuzzy match for `query` among the song names, extension ignored
    pub fn find(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default().ignore_case();
        let query_lower = query.to_lowercase();

        self.songs
            .iter()
            .enumerate()
            .filter_map(|(i, song)| {
                let stem = song_stem(song);
                let mut score = matcher.fuzzy_match(stem, query)?;
                // whole-substring hits beat scattered ones
                if stem.to_lowercase().contains(&query_lower) {
                    score += 1000;
                }
                Some((i, score))
            })
            // max_by_key keeps the last maximum; reverse so ties go to the earliest song
            .rev()
            .max_by_key(|(_, score)| *score)
            .map(|(i, _)| i)
    }
}
