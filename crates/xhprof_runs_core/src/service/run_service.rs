//! Run use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for hosts that record and browse runs.
//! - Turn retention policy (maximum age) into repository sweeps.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::run::{Payload, Run, RunId, RunPage, DEFAULT_PAGE_SIZE};
use crate::repo::run_repo::{now_epoch_secs, RepoError, RepoResult, RunRepository};

/// Use-case service wrapper for run persistence.
pub struct RunService<R: RunRepository> {
    repo: R,
    page_size: u32,
}

impl<R: RunRepository> RunService<R> {
    /// Creates a service listing `DEFAULT_PAGE_SIZE` runs per page.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Overrides the page size used by [`Self::list_page`].
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Records a run under a fresh store-assigned id.
    pub fn record_run(&self, payload: &Payload, label: &str) -> RepoResult<RunId> {
        self.repo.save_run(payload, label, None)
    }

    /// Records a run under an id the caller promises is unused.
    ///
    /// Returns `DuplicateId` when the promise does not hold.
    pub fn record_run_with_id(
        &self,
        payload: &Payload,
        label: &str,
        id: RunId,
    ) -> RepoResult<RunId> {
        self.repo.save_run(payload, label, Some(id))
    }

    pub fn get_run(&self, id: RunId) -> RepoResult<Run> {
        self.repo.get_run(id)
    }

    /// Lists one page using the configured page size.
    pub fn list_page(&self, page: u32) -> RepoResult<RunPage> {
        self.repo.list_runs(page, self.page_size)
    }

    pub fn list_runs(&self, page: u32, page_size: u32) -> RepoResult<RunPage> {
        self.repo.list_runs(page, page_size)
    }

    /// Deletes runs created strictly before `before` (epoch seconds).
    pub fn garbage_collect(&self, before: i64) -> RepoResult<()> {
        self.repo.garbage_collect(before)
    }

    /// Deletes runs older than `max_age_secs` relative to now.
    ///
    /// Returns the cutoff that was applied.
    pub fn purge_older_than(&self, max_age_secs: u64) -> RepoResult<i64> {
        let max_age = i64::try_from(max_age_secs).map_err(|_| {
            RepoError::InvalidArgument(format!("max age {max_age_secs}s is out of range"))
        })?;
        let cutoff = now_epoch_secs().saturating_sub(max_age);
        self.repo.garbage_collect(cutoff)?;
        Ok(cutoff)
    }
}
