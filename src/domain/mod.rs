//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, identity)
//! - `user` - Profile record, registration staging, medical survey
//! - `onboarding` - Destination resolution for authenticated users
//! - `community` - Posts, comments and likes

pub mod community;
pub mod foundation;
pub mod onboarding;
pub mod user;
