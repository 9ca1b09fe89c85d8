pub mod dashboard;
pub mod playlist;
