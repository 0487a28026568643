//! Community Onboarding - onboarding gate, survey workflow and community
//! feed backed by Supabase.
//!
//! The core decides which screen a user may see next from their session and
//! profile, and reconciles that decision across the auth callback, the route
//! guard and page-level checks.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
