//! Durable storage for profiler runs.
//!
//! Runs are labeled, timestamped call-graph snapshots. This crate owns their
//! persistence (save, point lookup, paginated listing, age-based retention)
//! and returns plain data; rendering belongs to the hosting application.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::run::{
    total_page_count, Payload, Run, RunId, RunPage, RunSummary, DEFAULT_PAGE_SIZE,
};
pub use repo::run_repo::{RepoError, RepoResult, RunRepository, SqliteRunRepository};
pub use service::run_service::RunService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
