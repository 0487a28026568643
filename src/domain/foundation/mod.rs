//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the onboarding domain.

mod auth;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, Identity};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CommentId, PostId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
