//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` struct matching the database row,
//! plus conversions into the `kiosk-core` domain types.

pub mod dashboard;
pub mod playlist;
