//! Supabase adapters.
//!
//! - `SupabaseClient` - shared reqwest client for PostgREST and GoTrue
//! - `SupabaseSessionStore` / `SupabaseSessionFactory` - password sign-in,
//!   sign-up and sign-out
//! - `SupabaseJwtValidator` - HS256 access-token validation for the server
//! - Profile, survey and post repositories over PostgREST tables
//!
//! Realtime fan-out is not done through Supabase; the server uses the
//! in-process hub from `adapters::memory`.

mod client;
mod jwt_validator;
mod post_repository;
mod profile_repository;
mod session_store;
mod survey_repository;

pub use client::{SupabaseClient, SupabaseConfig, SupabaseError};
pub use jwt_validator::{SupabaseJwtValidator, AUTHENTICATED_AUDIENCE};
pub use post_repository::SupabasePostRepository;
pub use profile_repository::SupabaseProfileRepository;
pub use session_store::{SupabaseSessionFactory, SupabaseSessionStore};
pub use survey_repository::SupabaseSurveyRepository;
