use anyhow::Result;
use async_trait::async_trait;

use super::{command_list, read_field, read_password, Screen};
use crate::core::AuthService;
use crate::ui::console::Console;
use crate::ui::router::{ScreenKind, Transition};

const COMMANDS: [(&str, ScreenKind); 1] = [("back", ScreenKind::Login)];

pub struct ResetPasswordScreen {
    auth: AuthService,
}

impl ResetPasswordScreen {
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl Screen for ResetPasswordScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::ResetPassword
    }

    async fn run(&mut self, console: &mut Console) -> Result<Transition> {
        console
            .say(&format!("== Reset Password ==  ({})", command_list(&COMMANDS)))
            .await?;

        loop {
            let username = form_field!(read_field(console, "Username: ", &COMMANDS));
            let password = form_field!(read_password(console, "New password: ", &COMMANDS));
            let confirm = form_field!(read_password(console, "Confirm password: ", &COMMANDS));

            match self.auth.reset_password(&username, &password, &confirm) {
                Ok(()) => {
                    console
                        .info_dialog("Success", "Password reset successfully.")
                        .await?;
                    return Ok(Transition::Goto(ScreenKind::Login));
                }
                Err(e) => console.error_dialog("Reset Failed", &e.to_string()).await?,
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
    async fn test_reset_then_login_with_new_password() {
        let dir = TempDir::new().unwrap();
        let auth = auth_in(&dir);
        auth.signup("amy", "Abc12345!", "Abc12345!").unwrap();

        let script = "ghost\nXyz98765#\nXyz98765#\n\
                      amy\nxyz98765#\nxyz98765#\n\
                      amy\nXyz98765#\nXyz98765#\n";
        let (mut console, output) = scripted(script);
        let mut screen = ResetPasswordScreen::new(auth.clone());

        assert_eq!(
            screen.run(&mut console).await.unwrap(),
            Transition::Goto(ScreenKind::Login)
        );
        assert!(auth.login("amy", "Abc12345!", false).is_err());
        assert!(auth.login("amy", "Xyz98765#", false).is_ok());

        drop(console);
        let text = read_output(output).await;
        assert!(text.contains("[Reset Failed] Username not found."));
        assert!(text.contains("[Reset Failed] Password must contain at least one uppercase letter."));
        assert!(text.contains("[Success] Password reset successfully."));
    }

    #[tokio::test]
    async fn test_exit_quits() {
        let dir = TempDir::new().unwrap();
        let (mut console, _output) = scripted(":exit\n");
        let mut screen = ResetPasswordScreen::new(auth_in(&dir));
        assert_eq!(screen.run(&mut console).await.unwrap(), Transition::Exit);
    }
}
