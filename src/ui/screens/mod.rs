//! The four screens
//!
//! Each screen runs until the user leaves it and reports where to go next.
//! The form screens share [`read_field`] so `:commands` behave the same
//! everywhere.

use anyhow::Result;
use async_trait::async_trait;

use super::console::{Console, Input};
use super::router::{ScreenKind, Transition};

/// Read one answer or leave the screen:
/// `form_field!(read_field(console, "Username: ", &COMMANDS))`
macro_rules! form_field {
    ($read:expr) => {
        match $read.await? {
            $crate::ui::screens::Field::Value(value) => value,
            $crate::ui::screens::Field::Leave(transition) => return Ok(transition),
        }
    };
}

mod login;
mod music_player;
mod reset_password;
mod signup;

pub use login::LoginScreen;
pub use music_player::MusicPlayerScreen;
pub use reset_password::ResetPasswordScreen;
pub use signup::SignUpScreen;

#[async_trait]
pub trait Screen: Send {
    fn kind(&self) -> ScreenKind;

    /// Run until the user leaves this screen
    async fn run(&mut self, console: &mut Console) -> Result<Transition>;
}

pub(crate) enum Field {
    Value(String),
    Leave(Transition),
}

/// Prompt for `label`. `:exit` and closed input quit and the `commands`
/// pairs switch screens. Any other answer, colon or not, is the value.
pub(crate) async fn read_field(
    console: &mut Console,
    label: &str,
    commands: &[(&str, ScreenKind)],
) -> Result<Field> {
    let input = console.prompt(label).await?;
    Ok(to_field(input, commands))
}

/// [`read_field`] with the typed characters hidden
pub(crate) async fn read_password(
    console: &mut Console,
    label: &str,
    commands: &[(&str, ScreenKind)],
) -> Result<Field> {
    let input = console.prompt_hidden(label).await?;
    Ok(to_field(input, commands))
}

fn to_field(input: Input, commands: &[(&str, ScreenKind)]) -> Field {
    let value = match input {
        Input::Value(value) => value,
        Input::Eof => return Field::Leave(Transition::Exit),
    };

    let Some(name) = value.trim().strip_prefix(':') else {
        return Field::Value(value);
    };
    let name = name.trim().to_lowercase();

    if name == "exit" {
        return Field::Leave(Transition::Exit);
    }
    match commands.iter().find(|(command, _)| *command == name) {
        Some((_, kind)) => Field::Leave(Transition::Goto(kind.clone())),
        None => Field::Value(value),
    }
}

/// ":signup, :reset, :exit"
pub(crate) fn command_list(commands: &[(&str, ScreenKind)]) -> String {
    commands
        .iter()
        .map(|(name, _)| *name)
        .chain(std::iter::once("exit"))
        .map(|name| format!(":{}", name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether a yes/no answer means yes
pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
