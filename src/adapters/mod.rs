//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - in-memory implementations of every port
//! - `supabase` - PostgREST/GoTrue-backed repositories, session store and
//!   JWT validator
//! - `http` - axum routes, auth middleware and error mapping

pub mod http;
pub mod memory;
pub mod supabase;
