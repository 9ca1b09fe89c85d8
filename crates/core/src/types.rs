//! Identifier and time aliases shared by every crate.

/// Row ids (PostgreSQL BIGSERIAL), org ids and user ids.
pub type DbId = i64;

/// Org id of rows that belong to no organization.
pub const NO_ORG: DbId = 0;

/// UTC wall-clock time.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
