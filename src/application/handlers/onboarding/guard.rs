//! RouteGuard - keeps the mounted screen consistent with the onboarding
//! decision.
//!
//! The guard fetches the session and the profile, each bounded by a
//! timeout, feeds them to `resolve` and redirects when the current screen is
//! not permitted. Redirects are issued once per (user, destination, screen)
//! key. Results of a settle that was overtaken by a newer settle or by a
//! session change are discarded.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::foundation::{AuthError, DomainError, ErrorCode, Identity, UserId};
use crate::domain::onboarding::{resolve, Destination, Screen};
use crate::domain::user::Profile;
use crate::ports::{Navigator, ProfileRepository, SessionStore};

/// Default bound on each session/profile fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    pub fetch_timeout: Duration,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Which fetch a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Session,
    Profile,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::Session => write!(f, "session"),
            FetchStage::Profile => write!(f, "profile"),
        }
    }
}

/// A fetch failed; the user stays on the screen and may retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardFailure {
    TimedOut(FetchStage),
    Backend { stage: FetchStage, message: String },
}

impl GuardFailure {
    pub fn retryable(&self) -> bool {
        true
    }

    /// Message suitable for showing to the user.
    pub fn message(&self) -> String {
        match self {
            GuardFailure::TimedOut(stage) => {
                format!("Loading your {} took too long. Please try again.", stage)
            }
            GuardFailure::Backend { stage, .. } => {
                format!("We could not load your {}. Please try again.", stage)
            }
        }
    }
}

/// Where the guard stands for the mounted screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardStatus {
    /// Fetches in flight; nothing may be decided yet.
    Loading,
    /// The screen may stay mounted.
    Allowed(Destination),
    /// A redirect to the destination has been issued.
    Redirected(Destination),
    Failed(GuardFailure),
    /// Backend not configured. Not retried.
    Unavailable(String),
    /// The result was overtaken and discarded.
    Superseded,
}

impl GuardStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, GuardStatus::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RedirectKey {
    user_id: Option<UserId>,
    destination: Destination,
    screen: Screen,
}

enum Settled {
    Done(Option<Identity>, Option<Profile>),
    Stop(GuardStatus),
}

pub struct RouteGuard {
    sessions: Arc<dyn SessionStore>,
    profiles: Arc<dyn ProfileRepository>,
    navigator: Arc<dyn Navigator>,
    config: GuardConfig,
    generation: AtomicU64,
    status: watch::Sender<GuardStatus>,
    last_redirect: Mutex<Option<RedirectKey>>,
}

impl RouteGuard {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        profiles: Arc<dyn ProfileRepository>,
        navigator: Arc<dyn Navigator>,
        config: GuardConfig,
    ) -> Self {
        let (status, _) = watch::channel(GuardStatus::Loading);
        Self {
            sessions,
            profiles,
            navigator,
            config,
            generation: AtomicU64::new(0),
            status,
            last_redirect: Mutex::new(None),
        }
    }

    pub fn status(&self) -> GuardStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified whenever the status changes.
    pub fn status_updates(&self) -> watch::Receiver<GuardStatus> {
        self.status.subscribe()
    }

    /// Fetches session and profile, resolves the destination and redirects
    /// if `screen` is not permitted.
    pub async fn settle(&self, screen: Screen) -> GuardStatus {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.status.send_replace(GuardStatus::Loading);

        let (identity, profile) = match self.fetch().await {
            Settled::Done(identity, profile) => (identity, profile),
            Settled::Stop(status) => {
                if self.is_stale(generation, None) {
                    return GuardStatus::Superseded;
                }
                self.status.send_replace(status.clone());
                return status;
            }
        };

        if self.is_stale(generation, Some(identity.as_ref().map(|i| &i.user_id))) {
            tracing::debug!(screen = %screen, "Guard result superseded, discarding");
            return GuardStatus::Superseded;
        }

        let destination = resolve(identity.is_some(), profile.as_ref());
        let status = if destination.permits(&screen) {
            self.clear_redirect();
            GuardStatus::Allowed(destination)
        } else {
            self.redirect_once(identity.map(|i| i.user_id), destination, screen);
            GuardStatus::Redirected(destination)
        };
        self.status.send_replace(status.clone());
        status
    }

    /// Clears a failure and settles again. Called on an explicit user retry.
    pub async fn retry(&self, screen: Screen) -> GuardStatus {
        tracing::info!(screen = %screen, "Guard retry requested");
        self.settle(screen).await
    }

    /// Settles now and again after every session change. Dropping the
    /// returned handle stops watching.
    pub fn watch(self: Arc<Self>, screen: Screen) -> GuardWatch {
        let mut changes = self.sessions.subscribe();
        let guard = self.clone();
        let task = tokio::spawn(async move {
            guard.settle(screen).await;
            while changes.changed().await.is_ok() {
                guard.settle(screen).await;
            }
        });
        GuardWatch { guard: self, task }
    }

    async fn fetch(&self) -> Settled {
        let identity = match self
            .bounded(FetchStage::Session, self.sessions.current_session())
            .await
        {
            Err(status) => return Settled::Stop(status),
            Ok(Ok(identity)) => identity,
            Ok(Err(AuthError::NotConfigured)) => {
                tracing::warn!("Auth backend not configured");
                return Settled::Stop(GuardStatus::Unavailable(
                    "The service is not configured. Please contact support.".to_string(),
                ));
            }
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Session fetch failed");
                return Settled::Stop(GuardStatus::Failed(GuardFailure::Backend {
                    stage: FetchStage::Session,
                    message: err.to_string(),
                }));
            }
        };

        let Some(identity) = identity else {
            return Settled::Done(None, None);
        };

        let profile = match self
            .bounded(FetchStage::Profile, self.profiles.find_by_id(&identity.user_id))
            .await
        {
            Err(status) => return Settled::Stop(status),
            Ok(Ok(profile)) => profile,
            Ok(Err(err)) => return Settled::Stop(Self::profile_failure(&identity, err)),
        };

        Settled::Done(Some(identity), profile)
    }

    async fn bounded<T>(
        &self,
        stage: FetchStage,
        fetch: impl Future<Output = T>,
    ) -> Result<T, GuardStatus> {
        tokio::time::timeout(self.config.fetch_timeout, fetch)
            .await
            .map_err(|_| {
                tracing::warn!(stage = %stage, timeout = ?self.config.fetch_timeout, "Guard fetch timed out");
                GuardStatus::Failed(GuardFailure::TimedOut(stage))
            })
    }

    fn profile_failure(identity: &Identity, err: DomainError) -> GuardStatus {
        if err.code == ErrorCode::NotConfigured {
            tracing::warn!(user_id = %identity.user_id, "Profile backend not configured");
            return GuardStatus::Unavailable(
                "The service is not configured. Please contact support.".to_string(),
            );
        }
        tracing::warn!(user_id = %identity.user_id, error = %err, "Profile fetch failed");
        GuardStatus::Failed(GuardFailure::Backend {
            stage: FetchStage::Profile,
            message: err.message,
        })
    }

    /// A result is stale when a newer settle started, or when the session
    /// feed now reports a different user than the one fetched.
    fn is_stale(&self, generation: u64, fetched: Option<Option<&UserId>>) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            return true;
        }
        match fetched {
            Some(fetched) => {
                let current = self.sessions.subscribe().borrow().clone();
                current.as_ref().map(|i| &i.user_id) != fetched
            }
            None => false,
        }
    }

    fn redirect_once(&self, user_id: Option<UserId>, destination: Destination, screen: Screen) {
        let key = RedirectKey {
            user_id,
            destination,
            screen,
        };
        let mut last = self
            .last_redirect
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if last.as_ref() == Some(&key) {
            tracing::debug!(destination = %destination, "Redirect already issued");
            return;
        }
        let mode = screen.leave_mode();
        tracing::info!(
            from = %screen,
            to = %destination,
            mode = ?mode,
            "Guard redirect"
        );
        self.navigator.navigate(destination.path(), mode);
        *last = Some(key);
    }

    fn clear_redirect(&self) {
        self.last_redirect
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }
}

/// Running watch over one screen. Stops when dropped.
pub struct GuardWatch {
    guard: Arc<RouteGuard>,
    task: JoinHandle<()>,
}

impl GuardWatch {
    pub fn status(&self) -> GuardStatus {
        self.guard.status()
    }

    pub fn status_updates(&self) -> watch::Receiver<GuardStatus> {
        self.guard.status_updates()
    }
}

impl Drop for GuardWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}
