//! eCourts tracker application library.
//!
//! Exposes configuration and the [`Dashboard`](dashboard::Dashboard)
//! composition root so integration tests and the binary entrypoint can both
//! build the full component graph.

pub mod config;
pub mod dashboard;

pub use config::AppConfig;
pub use dashboard::{Dashboard, SavedCase};
