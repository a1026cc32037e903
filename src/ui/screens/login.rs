use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use super::{command_list, is_yes, read_field, read_password, Screen};
use crate::core::{AuthError, AuthService};
use crate::ui::console::Console;
use crate::ui::router::{ScreenKind, Transition};
use crate::utils::dates::timestamp_to_relative;

const COMMANDS: [(&str, ScreenKind); 2] = [
    ("signup", ScreenKind::SignUp),
    ("reset", ScreenKind::ResetPassword),
];

pub struct LoginScreen {
    auth: AuthService,
}

impl LoginScreen {
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl Screen for LoginScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Login
    }

    async fn run(&mut self, console: &mut Console) -> Result<Transition> {
        console
            .say(&format!("== Login ==  ({})", command_list(&COMMANDS)))
            .await?;

        if !self.auth.has_accounts() {
            console
                .say("No accounts yet. Type :signup to create one.")
                .await?;
        }

        let remembered = self.auth.remembered_username(Utc::now());
        let username_label = match &remembered {
            Some(name) => format!("Username [{}]: ", name),
            None => "Username: ".to_string(),
        };

        loop {
            let mut username = form_field!(read_field(console, &username_label, &COMMANDS));
            if username.trim().is_empty() {
                if let Some(name) = &remembered {
                    username = name.clone();
                }
            }
            let password = form_field!(read_password(console, "Password: ", &COMMANDS));
            let stay = form_field!(read_field(console, "Stay logged in? [y/N]: ", &COMMANDS));

            let last_login = self.auth.last_login(&username);
            match self.auth.login(&username, &password, is_yes(&stay)) {
                Ok(session) => {
                    let greeting = match last_login {
                        Some(at) => format!(
                            "Welcome back, {}! Last login {}.",
                            session.username,
                            timestamp_to_relative(at)
                        ),
                        None => format!("Welcome, {}!", session.username),
                    };
                    console.say(&greeting).await?;
                    return Ok(Transition::Goto(ScreenKind::MusicPlayer(session)));
                }
                Err(e) => {
                    if matches!(e, AuthError::Store(_)) {
                        warn!("Login failed: {}", e);
                    }
                    console.error_dialog("Login Failed", &e.to_string()).await?;
                }
            }
        }
    }
}
