//! Navigator port - moves the client to another screen.

use crate::domain::onboarding::NavigationMode;

/// Client-side router.
///
/// Navigation is fire-and-forget; the guard only needs to know it happened
/// once.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str, mode: NavigationMode);

    /// Path of the screen currently shown, when known.
    fn current_path(&self) -> Option<String>;
}
