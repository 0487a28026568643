//! Onboarding module - the routing decision for authenticated users.
//!
//! `resolve` is the only place that maps (session, profile) to a
//! destination. Guards and handlers call it; none re-implement its branches.

mod destination;
mod resolver;

pub use destination::{Destination, NavigationMode, Screen};
pub use resolver::resolve;
