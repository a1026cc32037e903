//! The player screen
//!
//! Console input and poller ticks are both awaited on this task, so the
//! player is only ever touched from here. After every event the poller is
//! synced with the player: it runs while a song plays and nobody is seeking.

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::Screen;
use crate::audio::AudioOutput;
use crate::config::UserConfig;
use crate::core::{AuthService, PlayerError, Player, PollOutcome, Poller};
use crate::models::{PlaybackState, Session};
use crate::ui::console::Console;
use crate::ui::router::{ScreenKind, Transition};
use crate::ui::seek_bar::{song_label, time_label, SeekBar};
use crate::utils::dates::{format_clock, parse_clock};

const HELP: &str = "\
Commands:
  load <dir>        load the songs in a directory
  play | pause      start or pause the current song
  toggle            play/pause
  next | prev       skip forwards or backwards
  shuffle           shuffle the playlist and play from the top
  select <n>        play song number n
  find <text>       play the best match for text
  seek <mm:ss>      jump to a position
  volume <0-100>    set the volume
  list | status     show the playlist or what is playing
  logout | exit";

pub struct MusicPlayerScreen<A: AudioOutput> {
    auth: AuthService,
    session: Session,
    player: Player<A>,
    poller: Poller,
    seek_bar: SeekBar,
    /// Loaded once when the screen starts
    startup_dir: Option<PathBuf>,
}

impl<A: AudioOutput> MusicPlayerScreen<A> {
    pub fn new(
        auth: AuthService,
        session: Session,
        audio: A,
        config: &UserConfig,
        show_seek_bar: bool,
    ) -> Self {
        Self {
            auth,
            session,
            player: Player::new(audio, config),
            poller: Poller::new(config.poll_interval()),
            seek_bar: SeekBar::new(show_seek_bar),
            startup_dir: config.music_dir.as_ref().map(PathBuf::from),
        }
    }

    /// Handle one command line. `Some` means the screen is done.
    async fn handle_line(
        &mut self,
        console: &mut Console,
        line: &str,
    ) -> Result<Option<Transition>> {
        let line = line.trim();
        let line = line.strip_prefix(':').unwrap_or(line);
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        debug!("Player command: {:?} {:?}", command, arg);

        match command.to_lowercase().as_str() {
            "" => {}
            "help" | "?" => console.say(HELP).await?,
            "load" => {
                if arg.is_empty() {
                    console.error_dialog("Error", "Usage: load <dir>").await?;
                } else {
                    self.load(console, Path::new(arg)).await?;
                }
            }
            "play" => {
                let result = self.player.play_song();
                self.report(console, result).await?;
            }
            "pause" => {
                let result = self.player.pause_song();
                self.report(console, result).await?;
            }
            "toggle" => {
                let result = self.player.toggle_play_pause().map(|_| ());
                self.report(console, result).await?;
            }
            "next" => {
                let result = self.player.next_song();
                self.report(console, result).await?;
            }
            "prev" | "previous" => {
                let result = self.player.previous_song();
                self.report(console, result).await?;
            }
            "shuffle" => {
                let result = self.player.shuffle();
                self.report(console, result).await?;
            }
            "select" => match arg.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    let result = self.player.play_index(n - 1);
                    self.report(console, result).await?;
                }
                _ => console.error_dialog("Error", "Usage: select <n>").await?,
            },
            "find" => match self.player.find(arg) {
                Some(index) if !arg.is_empty() => {
                    let result = self.player.play_index(index);
                    self.report(console, result).await?;
                }
                _ => {
                    console
                        .error_dialog("Error", &format!("No song matches \"{}\".", arg))
                        .await?
                }
            },
            "seek" => self.seek(console, arg).await?,
            "volume" => match arg.parse::<u8>() {
                Ok(percent) if percent <= 100 => {
                    self.player.set_volume(percent);
                    console.say(&format!("Volume {}%", percent)).await?;
                }
                _ => console.error_dialog("Error", "Usage: volume <0-100>").await?,
            },
            "list" => self.list(console).await?,
            "status" => self.print_status(console).await?,
            "logout" => {
                self.shut_down();
                match self.auth.logout(&self.session.username) {
                    Ok(()) => return Ok(Some(Transition::Goto(ScreenKind::Login))),
                    Err(e) => {
                        warn!("Logout failed: {}", e);
                        console.error_dialog("Error", &e.to_string()).await?;
                    }
                }
            }
            "exit" | "quit" => return Ok(Some(self.exit())),
            other => {
                console
                    .say(&format!("Unknown command `{}`. Type `help`.", other))
                    .await?
            }
        }

        Ok(None)
    }

    /// One poller tick: refresh the seek bar or move on to the next song
    async fn on_tick(&mut self, console: &mut Console) -> Result<()> {
        match self.player.poll() {
            PollOutcome::Idle => {}
            PollOutcome::Progress { .. } => self.seek_bar.show(&self.player.status()),
            PollOutcome::Finished => {
                self.seek_bar.clear();
                console.say("Finished!").await?;
                let result = self.player.next_song();
                self.report(console, result).await?;
            }
        }
        Ok(())
    }

    async fn load(&mut self, console: &mut Console, dir: &Path) -> Result<()> {
        match self.player.load_directory(dir) {
            Ok(0) => {
                console
                    .say(&format!("No songs found in {}", dir.display()))
                    .await?
            }
            Ok(count) => {
                console
                    .say(&format!("Loaded {} songs from {}", count, dir.display()))
                    .await?
            }
            Err(e) => {
                warn!("{}", e);
                console.error_dialog("Error", &e.to_string()).await?;
            }
        }
        self.seek_bar.clear();
        Ok(())
    }

    async fn seek(&mut self, console: &mut Console, arg: &str) -> Result<()> {
        let Some(position) = parse_clock(arg) else {
            return console.error_dialog("Error", "Usage: seek <mm:ss>").await;
        };
        if self.player.state() == PlaybackState::Stopped {
            return console.say("Nothing is playing.").await;
        }

        match self.player.seek_to(position) {
            Ok(()) => {
                let status = self.player.status();
                self.seek_bar.show(&status);
                console
                    .say(&format!("Seeked to {}", format_clock(status.elapsed)))
                    .await
            }
            Err(e) => self.report(console, Err(e)).await,
        }
    }

    async fn list(&mut self, console: &mut Console) -> Result<()> {
        let playlist = self.player.playlist();
        if playlist.is_empty() {
            return console.say("The playlist is empty.").await;
        }

        let current = playlist.current_index();
        let lines: Vec<String> = playlist
            .songs()
            .iter()
            .enumerate()
            .map(|(i, song)| {
                let marker = if Some(i) == current { '>' } else { ' ' };
                format!("{} {:>3}. {}", marker, i + 1, song)
            })
            .collect();
        console.say(&lines.join("\n")).await
    }

    async fn print_status(&mut self, console: &mut Console) -> Result<()> {
        let status = self.player.status();
        let position = match status.index {
            Some(i) => format!("{}/{}", i + 1, status.len),
            None => "-".to_string(),
        };
        console
            .say(&format!(
                "{}  {}  [{}]  volume {}%",
                song_label(&status),
                time_label(&status),
                position,
                status.volume
            ))
            .await
    }

    /// Show what is playing after a successful command, or the error
    async fn report(
        &mut self,
        console: &mut Console,
        result: Result<(), PlayerError>,
    ) -> Result<()> {
        match result {
            Ok(()) => {
                let status = self.player.status();
                if status.state == PlaybackState::Playing {
                    self.seek_bar.show(&status);
                } else {
                    self.seek_bar.clear();
                }
                console.say(&song_label(&status)).await
            }
            Err(e) => {
                warn!("{}", e);
                self.seek_bar.clear();
                console.error_dialog("Error", &e.to_string()).await
            }
        }
    }

    fn shut_down(&mut self) {
        self.poller.stop();
        self.player.stop();
        self.seek_bar.clear();
    }

    fn exit(&mut self) -> Transition {
        self.shut_down();
        if let Err(e) = self.auth.save_exit_state(&self.session) {
            warn!("Could not save login state: {}", e);
        }
        Transition::Exit
    }
}

#[async_trait]
impl<A: AudioOutput + 'static> Screen for MusicPlayerScreen<A> {
    fn kind(&self) -> ScreenKind {
        ScreenKind::MusicPlayer(self.session.clone())
    }

    async fn run(&mut self, console: &mut Console) -> Result<Transition> {
        console
            .say(&format!(
                "== Ultra Player ==  Logged in as {}. Type `help` for commands.",
                self.session.username
            ))
            .await?;

        if let Some(dir) = self.startup_dir.take() {
            self.load(console, &dir).await?;
        }

        let mut needs_prompt = true;
        loop {
            if needs_prompt {
                console.write_prompt("> ").await?;
                needs_prompt = false;
            }

            tokio::select! {
                line = console.next_line() => {
                    let Some(line) = line? else {
                        return Ok(self.exit());
                    };
                    if let Some(transition) = self.handle_line(console, &line).await? {
                        return Ok(transition);
                    }
                    needs_prompt = true;
                }
                _ = self.poller.next_tick() => self.on_tick(console).await?,
            }

            self.poller.sync(self.player.wants_polling());
        }
    }
}
