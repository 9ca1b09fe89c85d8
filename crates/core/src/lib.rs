//! Domain core for playlist playback and versioned dashboards.
//!
//! Everything in this crate is storage-agnostic. Persistence and search are
//! reached through the port traits in [`ports`], which `kiosk-db` implements
//! against PostgreSQL and tests implement in memory.

pub mod dashboard;
pub mod error;
pub mod playlist;
pub mod ports;
pub mod resolver;
pub mod search;
pub mod slug;
pub mod types;
