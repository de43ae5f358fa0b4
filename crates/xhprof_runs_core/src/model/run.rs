//! Run domain model.
//!
//! # Responsibility
//! - Define the persisted run record and its payload-free summary.
//! - Own pagination math shared by the repository and its callers.
//!
//! # Invariants
//! - `created_at` is epoch seconds assigned at write time, never by callers.
//! - `payload` is opaque; nothing in core inspects its structure.

use serde::{Deserialize, Serialize};

/// Store-native run identifier (SQLite rowid).
pub type RunId = i64;

/// Call-graph profiling data as produced by the profiler.
///
/// An arbitrary tree of scalars, sequences and mappings. Mapping key order is
/// preserved across a save/load round trip.
pub type Payload = serde_json::Value;

/// Page size used when a caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Listing row for a run; excludes the payload so list views never decode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: RunId,
    /// Short classification, typically the route the profile was captured for.
    pub label: String,
    /// Unix epoch seconds.
    pub created_at: i64,
}

/// Fully loaded run with decoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub label: String,
    pub created_at: i64,
    pub payload: Payload,
}

impl Run {
    /// Returns the payload-free listing view of this run.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            id: self.id,
            label: self.label.clone(),
            created_at: self.created_at,
        }
    }

    /// Short human-readable description, always naming the label.
    pub fn description(&self) -> String {
        format!("Run #{} (label={})", self.id, self.label)
    }
}

/// One page of run summaries, newest identifier first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPage {
    pub runs: Vec<RunSummary>,
    /// 1-based page number that was requested.
    pub page: u32,
    pub page_size: u32,
    pub total_runs: u64,
    /// See [`total_page_count`].
    pub total_pages: u64,
}

/// Computes the page count reported alongside a listing.
///
/// Returns `floor(total_runs / page_size) + 1`. When `total_runs` is an exact
/// multiple of `page_size` this reports one trailing empty page; existing
/// consumers render page links from this number, so it is kept as is.
///
/// A zero `page_size` is treated as one.
pub fn total_page_count(total_runs: u64, page_size: u32) -> u64 {
    total_runs / u64::from(page_size.max(1)) + 1
}

#[cfg(test)]
mod tests {
    use super::{total_page_count, Run};
    use serde_json::json;

    #[test]
    fn page_count_rounds_down_and_adds_one() {
        assert_eq!(total_page_count(250, 100), 3);
        assert_eq!(total_page_count(0, 100), 1);
        assert_eq!(total_page_count(99, 100), 1);
    }

    #[test]
    fn page_count_keeps_trailing_page_on_exact_multiple() {
        assert_eq!(total_page_count(200, 100), 3);
        assert_eq!(total_page_count(100, 100), 2);
    }

    #[test]
    fn description_names_id_and_label() {
        let run = Run {
            id: 42,
            label: "checkout".to_string(),
            created_at: 1_700_000_000,
            payload: json!({}),
        };
        assert_eq!(run.description(), "Run #42 (label=checkout)");
        assert_eq!(run.summary().label, "checkout");
    }
}
