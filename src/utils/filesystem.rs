//! Filesystem utilities

use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Check if a file name has one of the given extensions (case-insensitive)
pub fn has_extension(name: &str, extensions: &[String]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// List the song file names directly inside `dir`, sorted by name.
///
/// Subdirectories are not descended into and hidden files are skipped.
pub fn list_songs(dir: &Path, extensions: &[String]) -> io::Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        ));
    }

    let mut songs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            tracing::debug!("Skipping non-utf8 file name: {:?}", entry.path());
            continue;
        };

        if name.starts_with('.') || !has_extension(name, extensions) {
            continue;
        }

        songs.push(name.to_string());
    }

    songs.sort_by_key(|name| name.to_lowercase());
    Ok(songs)
}

/// Strip the extension from a song file name
pub fn song_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}

/// Shorten a song name to `max_len` characters, suffixed with "..."
pub fn truncate_song_name(name: &str, max_len: usize) -> String {
    if name.chars().count() > max_len {
        let cut: String = name.chars().take(max_len).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}
