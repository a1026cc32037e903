//! Screen navigation
//!
//! Screens do not construct each other. They return a [`Transition`] and the
//! router checks it against the allowed edges before the next screen is built.

use crate::models::Session;

/// Every screen the application can show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenKind {
    Login,
    ResetPassword,
    SignUp,
    MusicPlayer(Session),
}

impl ScreenKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScreenKind::Login => "login",
            ScreenKind::ResetPassword => "reset-password",
            ScreenKind::SignUp => "signup",
            ScreenKind::MusicPlayer(_) => "music-player",
        }
    }
}

/// What a screen asks for when it finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Goto(ScreenKind),
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot navigate from {from} to {to}")]
pub struct NavigationError {
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug)]
pub struct Router {
    current: ScreenKind,
}

impl Router {
    /// Start on the player when a session was restored, else on login
    pub fn initial(restored: Option<Session>) -> Self {
        let current = match restored {
            Some(session) => ScreenKind::MusicPlayer(session),
            None => ScreenKind::Login,
        };
        Self { current }
    }

    pub fn current(&self) -> &ScreenKind {
        &self.current
    }

    pub fn can_navigate(from: &ScreenKind, to: &ScreenKind) -> bool {
        use ScreenKind::*;
        matches!(
            (from, to),
            (Login, SignUp)
                | (Login, ResetPassword)
                | (Login, MusicPlayer(_))
                | (SignUp, Login)
                | (ResetPassword, Login)
                | (MusicPlayer(_), Login)
        )
    }

    /// Move to `to`, or leave the router untouched if the edge is not allowed
    pub fn navigate(&mut self, to: ScreenKind) -> Result<(), NavigationError> {
        if !Self::can_navigate(&self.current, &to) {
            return Err(NavigationError {
                from: self.current.name(),
                to: to.name(),
            });
        }
        tracing::debug!("Navigating {} -> {}", self.current.name(), to.name());
        self.current = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> ScreenKind {
        ScreenKind::MusicPlayer(Session::new("amy", false))
    }

    #[test]
    fn test_initial_screen_follows_session() {
        assert_eq!(Router::initial(None).current(), &ScreenKind::Login);
        assert_eq!(
            Router::initial(Some(Session::new("amy", false))).current(),
            &player()
        );
    }

    #[test]
    fn test_login_flow() {
        let mut router = Router::initial(None);
        router.navigate(ScreenKind::SignUp).unwrap();
        router.navigate(ScreenKind::Login).unwrap();
        router.navigate(ScreenKind::ResetPassword).unwrap();
        router.navigate(ScreenKind::Login).unwrap();
        router.navigate(player()).unwrap();
        router.navigate(ScreenKind::Login).unwrap();
    }

    #[test]
    fn test_illegal_edges_are_rejected() {
        let mut router = Router::initial(None);
        router.navigate(ScreenKind::SignUp).unwrap();

        let err = router.navigate(player()).unwrap_err();
        assert_eq!(err.from, "signup");
        assert_eq!(err.to, "music-player");
        assert_eq!(router.current(), &ScreenKind::SignUp);

        assert!(!Router::can_navigate(&ScreenKind::Login, &ScreenKind::Login));
        assert!(!Router::can_navigate(&player(), &ScreenKind::SignUp));
        assert!(!Router::can_navigate(
            &ScreenKind::ResetPassword,
            &ScreenKind::SignUp
        ));
    }
}
