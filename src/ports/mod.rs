//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Session Ports
//!
//! - `SessionStore` - Client session: current identity, sign-in/up/out, change feed
//! - `SessionValidator` - Server-side access token validation
//! - `Navigator` - Client-side router used by the route guard
//!
//! ## Persistence Ports
//!
//! - `ProfileRepository` - Per-identity profile row
//! - `SurveyRepository` - Medical survey answers
//! - `PostRepository` - Posts, likes and comments
//!
//! ## Realtime Ports
//!
//! - `RealtimeChannel` - Topic based comment event delivery

mod navigator;
mod post_repository;
mod profile_repository;
mod realtime_channel;
mod session_store;
mod session_validator;
mod survey_repository;

pub use navigator::Navigator;
pub use post_repository::PostRepository;
pub use profile_repository::ProfileRepository;
pub use realtime_channel::{CommentEventHandler, RealtimeChannel, Subscription};
pub use session_store::{Credentials, SessionStore, SessionStoreFactory, SignUpResult};
pub use session_validator::SessionValidator;
pub use survey_repository::SurveyRepository;
