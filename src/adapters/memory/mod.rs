//! In-memory adapters.
//!
//! Every port has an in-memory implementation. They back the unit and
//! integration tests and the `InMemoryRealtime` hub is also used by the
//! server for in-process comment fan-out.
//!
//! Test controls (forced failures, artificial delays, call counters) live on
//! the concrete types, not on the ports.

mod navigator;
mod post_repository;
mod profile_repository;
mod realtime;
mod session;
mod survey_repository;

pub use navigator::RecordingNavigator;
pub use post_repository::InMemoryPostRepository;
pub use profile_repository::InMemoryProfileRepository;
pub use realtime::InMemoryRealtime;
pub use session::{InMemoryAuth, InMemorySessionStore};
pub use survey_repository::InMemorySurveyRepository;

use std::sync::{Mutex, MutexGuard};

/// Locks a mutex that only guards plain data; a poisoned lock still holds a
/// usable value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
