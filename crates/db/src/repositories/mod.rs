//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod dashboard_repo;
pub mod playlist_repo;
pub mod search_repo;

pub use dashboard_repo::DashboardRepo;
pub use playlist_repo::PlaylistRepo;
pub use search_repo::DashboardSearchRepo;
