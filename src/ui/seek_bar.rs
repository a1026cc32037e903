//! Progress bar standing in for the seek slider

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::PlayerStatus;
use crate::utils::dates::format_clock;

const TEMPLATE: &str = "{msg} {bar:40.cyan/blue} {prefix}";

pub struct SeekBar {
    visible: bool,
    bar: Option<ProgressBar>,
}

impl SeekBar {
    /// A bar that only draws when `visible`, so piped sessions stay clean
    pub fn new(visible: bool) -> Self {
        Self { visible, bar: None }
    }

    pub fn show(&mut self, status: &PlayerStatus) {
        if !self.visible {
            return;
        }

        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(0);
            if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
                bar.set_style(style.progress_chars("##-"));
            }
            bar
        });

        bar.set_length(status.duration.as_secs());
        bar.set_position(status.elapsed.as_secs());
        bar.set_message(song_label(status));
        bar.set_prefix(time_label(status));
    }

    pub fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for SeekBar {
    fn drop(&mut self) {
        self.clear();
    }
}

/// "Playing... Song name", or "Stopped" with nothing loaded
pub fn song_label(status: &PlayerStatus) -> String {
    match &status.song {
        Some(song) => format!("{} {}", status.state, song),
        None => status.state.to_string(),
    }
}

/// "01:05 / 03:20"
pub fn time_label(status: &PlayerStatus) -> String {
    format!(
        "{} / {}",
        format_clock(status.elapsed),
        format_clock(status.duration)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaybackState;
    use std::time::Duration;

    fn status(song: Option<&str>) -> PlayerStatus {
        PlayerStatus {
            state: PlaybackState::Playing,
            song: song.map(str::to_string),
            index: Some(0),
            len: 1,
            elapsed: Duration::from_secs(65),
            duration: Duration::from_secs(200),
            volume: 50,
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(song_label(&status(Some("Intro"))), "Playing... Intro");
        assert_eq!(song_label(&status(None)), "Playing...");
        assert_eq!(time_label(&status(None)), "01:05 / 03:20");
    }

    #[test]
    fn test_hidden_bar_never_draws() {
        let mut bar = SeekBar::new(false);
        bar.show(&status(Some("Intro")));
        assert!(bar.bar.is_none());
        bar.clear();
    }
}
