//! Domain model for persisted profiler runs.
//!
//! # Invariants
//! - Every run is identified by a store-assigned (or caller-promised)
//!   `RunId` that is never reused for another run.
//! - Runs are immutable after `save`; they only disappear through retention.

pub mod run;
