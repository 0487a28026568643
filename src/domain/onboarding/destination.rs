//! Destinations, screens and navigation modes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::PostId;

/// Where an onboarding decision sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Login,
    Survey,
    Posts,
    CompleteProfile,
}

impl Destination {
    /// Canonical path of the destination screen.
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Login => "/auth/login",
            Destination::Survey => "/survey",
            Destination::Posts => "/posts",
            Destination::CompleteProfile => "/complete-profile",
        }
    }

    /// Whether `screen` may stay mounted when this is the resolved
    /// destination.
    pub fn permits(&self, screen: &Screen) -> bool {
        match (self, screen) {
            (Destination::Login, Screen::Login | Screen::Register) => true,
            (Destination::Posts, Screen::Posts | Screen::PostDetail(_)) => true,
            (Destination::Survey, Screen::Survey) => true,
            (Destination::CompleteProfile, Screen::CompleteProfile) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A mounted page, identified by its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Home,
    Login,
    Register,
    AuthCallback,
    CompleteProfile,
    Survey,
    Posts,
    PostDetail(PostId),
}

impl Screen {
    /// Parses a request path. Query strings and trailing slashes are
    /// ignored. Unknown paths yield `None`.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let screen = match trimmed {
            "" => Screen::Home,
            "/auth/login" => Screen::Login,
            "/auth/register" => Screen::Register,
            "/auth/callback" => Screen::AuthCallback,
            "/complete-profile" => Screen::CompleteProfile,
            "/survey" => Screen::Survey,
            "/posts" => Screen::Posts,
            other => {
                let id = other.strip_prefix("/posts/")?;
                Screen::PostDetail(id.parse().ok()?)
            }
        };
        Some(screen)
    }

    pub fn path(&self) -> String {
        match self {
            Screen::Home => "/".to_string(),
            Screen::Login => "/auth/login".to_string(),
            Screen::Register => "/auth/register".to_string(),
            Screen::AuthCallback => "/auth/callback".to_string(),
            Screen::CompleteProfile => "/complete-profile".to_string(),
            Screen::Survey => "/survey".to_string(),
            Screen::Posts => "/posts".to_string(),
            Screen::PostDetail(id) => format!("/posts/{}", id),
        }
    }

    /// Auth screens are replaced in history when left, so "back" never
    /// returns to them.
    pub fn is_auth_screen(&self) -> bool {
        matches!(self, Screen::Login | Screen::Register | Screen::AuthCallback)
    }

    /// Navigation mode to use when redirecting away from this screen.
    pub fn leave_mode(&self) -> NavigationMode {
        if self.is_auth_screen() || matches!(self, Screen::Home) {
            NavigationMode::Replace
        } else {
            NavigationMode::Push
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// How a redirect is recorded in the client's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    Push,
    Replace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_paths() {
        assert_eq!(Screen::from_path("/"), Some(Screen::Home));
        assert_eq!(Screen::from_path("/auth/login"), Some(Screen::Login));
        assert_eq!(Screen::from_path("/survey/"), Some(Screen::Survey));
        assert_eq!(
            Screen::from_path("/auth/callback?code=abc"),
            Some(Screen::AuthCallback)
        );
        assert_eq!(Screen::from_path("/nowhere"), None);
    }

    #[test]
    fn parses_post_detail_with_uuid() {
        let id = PostId::new();
        let screen = Screen::from_path(&format!("/posts/{}", id)).unwrap();
        assert_eq!(screen, Screen::PostDetail(id));
        assert_eq!(Screen::from_path("/posts/not-a-uuid"), None);
    }

    #[test]
    fn login_destination_permits_register() {
        assert!(Destination::Login.permits(&Screen::Register));
        assert!(!Destination::Login.permits(&Screen::Posts));
    }

    #[test]
    fn posts_destination_permits_post_detail() {
        assert!(Destination::Posts.permits(&Screen::PostDetail(PostId::new())));
        assert!(!Destination::Posts.permits(&Screen::Survey));
    }

    #[test]
    fn home_and_callback_are_never_permitted() {
        for destination in [
            Destination::Login,
            Destination::Survey,
            Destination::Posts,
            Destination::CompleteProfile,
        ] {
            assert!(!destination.permits(&Screen::Home));
            assert!(!destination.permits(&Screen::AuthCallback));
        }
    }

    #[test]
    fn leaving_auth_screens_replaces_history() {
        assert_eq!(Screen::Login.leave_mode(), NavigationMode::Replace);
        assert_eq!(Screen::Home.leave_mode(), NavigationMode::Replace);
        assert_eq!(Screen::Survey.leave_mode(), NavigationMode::Push);
    }
}
