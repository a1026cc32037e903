use anyhow::Result;
use async_trait::async_trait;

use super::{command_list, read_field, read_password, Screen};
use crate::core::AuthService;
use crate::ui::console::Console;
use crate::ui::router::{ScreenKind, Transition};

const COMMANDS: [(&str, ScreenKind); 1] = [("back", ScreenKind::Login)];

pub struct SignUpScreen {
    auth: AuthService,
}

impl SignUpScreen {
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl Screen for SignUpScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::SignUp
    }

    async fn run(&mut self, console: &mut Console) -> Result<Transition> {
        console
            .say(&format!("== Sign Up ==  ({})", command_list(&COMMANDS)))
            .await?;

        loop {
            let username = form_field!(read_field(console, "Username: ", &COMMANDS));
            let password = form_field!(read_password(console, "Password: ", &COMMANDS));
            let confirm = form_field!(read_password(console, "Confirm password: ", &COMMANDS));

            match self.auth.signup(&username, &password, &confirm) {
                Ok(()) => {
                    console
                        .info_dialog("Success", "Registration successful.")
                        .await?;
                    return Ok(Transition::Goto(ScreenKind::Login));
                }
                Err(e) => console.error_dialog("Sign Up Failed", &e.to_string()).await?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::console::testing::{read_output, scripted};
    use crate::ui::screens::testing::auth_in;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_signup_retries_until_valid() {
        let dir = TempDir::new().unwrap();
        let auth = auth_in(&dir);
        auth.signup("taken", "Abc12345!", "Abc12345!").unwrap();

        let script = "amy\nshort\nshort\n\
                      taken\nAbc12345!\nAbc12345!\n\
                      amy\nAbc12345!\nAbc12345?\n\
                      amy\nAbc12345!\nAbc12345!\n";
        let (mut console, output) = scripted(script);
        let mut screen = SignUpScreen::new(auth.clone());

        assert_eq!(
            screen.run(&mut console).await.unwrap(),
            Transition::Goto(ScreenKind::Login)
        );
        assert!(auth.login("amy", "Abc12345!", false).is_ok());

        drop(console);
        let text = read_output(output).await;
        assert!(text.contains("[Sign Up Failed] Password must be at least 8 characters long."));
        assert!(text.contains("[Sign Up Failed] Username already exists."));
        assert!(text.contains("[Sign Up Failed] Passwords do not match."));
        assert!(text.contains("[Success] Registration successful."));
    }

    #[tokio::test]
    async fn test_back_returns_to_login() {
        let dir = TempDir::new().unwrap();
        let (mut console, _output) = scripted("amy\n:back\n");
        let mut screen = SignUpScreen::new(auth_in(&dir));

        assert_eq!(
            screen.run(&mut console).await.unwrap(),
            Transition::Goto(ScreenKind::Login)
        );
    }

    #[tokio::test]
    async fn test_password_may_start_with_a_colon() {
        let dir = TempDir::new().unwrap();
        let auth = auth_in(&dir);
        let (mut console, output) = scripted("amy\n:Abc12345\n:Abc12345\n");
        let mut screen = SignUpScreen::new(auth.clone());

        assert_eq!(
            screen.run(&mut console).await.unwrap(),
            Transition::Goto(ScreenKind::Login)
        );
        assert!(auth.login("amy", ":Abc12345", false).is_ok());

        drop(console);
        let text = read_output(output).await;
        assert!(text.contains("[Success] Registration successful."));
    }
}
