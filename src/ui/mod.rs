//! Terminal front end
//!
//! The router decides which screen is active; screens are built only when
//! entered and dropped as soon as they finish, so the player (and with it the
//! audio device) exists only while the player screen is showing.

pub mod console;
pub mod router;
pub mod screens;
pub mod seek_bar;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::audio::{AudioError, AudioOutput, RodioOutput};
use crate::config::UserConfig;
use crate::core::AuthService;
use crate::models::Session;
use self::console::Console;
use self::router::{Router, ScreenKind, Transition};
use self::screens::{LoginScreen, MusicPlayerScreen, ResetPasswordScreen, Screen, SignUpScreen};

/// Opens the audio output when the player screen is entered
#[async_trait]
pub trait AudioFactory: Send + Sync {
    type Output: AudioOutput + 'static;

    async fn open(&self) -> Result<Self::Output, AudioError>;
}

/// The default output device
pub struct RodioFactory;

#[async_trait]
impl AudioFactory for RodioFactory {
    type Output = RodioOutput;

    async fn open(&self) -> Result<RodioOutput, AudioError> {
        RodioOutput::open().await
    }
}

/// Everything the screens need
pub struct App<F: AudioFactory> {
    pub auth: AuthService,
    pub config: UserConfig,
    pub audio: F,
}

impl<F: AudioFactory> App<F> {
    pub fn new(auth: AuthService, config: UserConfig, audio: F) -> Self {
        Self {
            auth,
            config,
            audio,
        }
    }

    async fn build(&self, kind: &ScreenKind, console: &Console) -> Result<Box<dyn Screen>> {
        let screen: Box<dyn Screen> = match kind {
            ScreenKind::Login => Box::new(LoginScreen::new(self.auth.clone())),
            ScreenKind::SignUp => Box::new(SignUpScreen::new(self.auth.clone())),
            ScreenKind::ResetPassword => Box::new(ResetPasswordScreen::new(self.auth.clone())),
            ScreenKind::MusicPlayer(session) => {
                let audio = self
                    .audio
                    .open()
                    .await
                    .context("Failed to open the audio output")?;
                Box::new(MusicPlayerScreen::new(
                    self.auth.clone(),
                    session.clone(),
                    audio,
                    &self.config,
                    console.is_interactive(),
                ))
            }
        };
        Ok(screen)
    }

    /// Show screens until one of them exits
    pub async fn run(&self, console: &mut Console, restored: Option<Session>) -> Result<()> {
        let mut router = Router::initial(restored);

        loop {
            let mut screen = self.build(router.current(), console).await?;
            debug!("Entering the {} screen", screen.kind().name());
            let transition = screen.run(console).await?;
            drop(screen);

            match transition {
                Transition::Exit => {
                    info!("Exiting from the {} screen", router.current().name());
                    return Ok(());
                }
                Transition::Goto(next) => router.navigate(next)?,
            }
        }
    }
}
