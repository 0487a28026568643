//! Navigator that records every redirect.

use std::sync::Mutex;

use crate::domain::onboarding::NavigationMode;
use crate::ports::Navigator;

use super::lock;

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    navigations: Mutex<Vec<(String, NavigationMode)>>,
    current: Mutex<Option<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigator that starts on `path`.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            navigations: Mutex::new(Vec::new()),
            current: Mutex::new(Some(path.into())),
        }
    }

    pub fn navigations(&self) -> Vec<(String, NavigationMode)> {
        lock(&self.navigations).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.navigations).len()
    }

    pub fn last(&self) -> Option<(String, NavigationMode)> {
        lock(&self.navigations).last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, mode: NavigationMode) {
        lock(&self.navigations).push((path.to_string(), mode));
        *lock(&self.current) = Some(path.to_string());
    }

    fn current_path(&self) -> Option<String> {
        lock(&self.current).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_navigations_in_order() {
        let navigator = RecordingNavigator::at("/auth/login");
        navigator.navigate("/posts", NavigationMode::Replace);
        navigator.navigate("/posts/1", NavigationMode::Push);

        assert_eq!(navigator.count(), 2);
        assert_eq!(
            navigator.last(),
            Some(("/posts/1".to_string(), NavigationMode::Push))
        );
        assert_eq!(navigator.current_path().as_deref(), Some("/posts/1"));
    }
}
