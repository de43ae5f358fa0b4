//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the run persistence contract used by services and hosts.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Decode`,
//!   `InvalidArgument`) distinctly from store transport errors.
//! - Repositories never render or print; they return data only.

pub mod run_repo;
