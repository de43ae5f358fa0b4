//! Run repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist, load, page through and expire profiler runs.
//! - Own payload encoding; nothing else in core touches serialized payloads.
//!
//! # Invariants
//! - `created_at` is assigned here from the system clock, in epoch seconds.
//! - Caller-supplied ids are never overwritten; a collision is `DuplicateId`.
//! - Listing is ordered by `run_id DESC`; its count and page come from one
//!   read transaction.
//! - Argument validation happens before any SQL is issued.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::run::{total_page_count, Payload, Run, RunId, RunPage, RunSummary};
use log::{debug, info};
use rusqlite::{ffi, params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

const RUN_SELECT_SQL: &str = "SELECT
    run_id,
    label,
    created_at,
    payload
FROM xhprof_runs";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by run repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Store could not be reached or a statement failed.
    Db(DbError),
    /// No run is stored under this id.
    NotFound(RunId),
    /// A run exists but its stored payload is not valid structured data.
    Decode {
        id: RunId,
        source: serde_json::Error,
    },
    /// Payload could not be serialized.
    Encode(serde_json::Error),
    /// Request rejected before touching the store.
    InvalidArgument(String),
    /// A caller-supplied id is already taken.
    DuplicateId(RunId),
    /// Connection has not been migrated to the schema this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "invalid run id: {id}"),
            Self::Decode { id, source } => {
                write!(f, "stored payload of run {id} cannot be decoded: {source}")
            }
            Self::Encode(err) => write!(f, "run payload cannot be encoded: {err}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::DuplicateId(id) => write!(f, "run id already exists: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "run repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::NotFound(_)
            | Self::InvalidArgument(_)
            | Self::DuplicateId(_)
            | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for profiler runs.
pub trait RunRepository {
    /// Loads one run with its decoded payload.
    fn get_run(&self, id: RunId) -> RepoResult<Run>;
    /// Persists a run and returns the id it is stored under.
    ///
    /// With `id = None` the store assigns a fresh id.
    fn save_run(&self, payload: &Payload, label: &str, id: Option<RunId>) -> RepoResult<RunId>;
    /// Returns the 1-based `page` of run summaries, newest id first.
    fn list_runs(&self, page: u32, page_size: u32) -> RepoResult<RunPage>;
    /// Deletes every run with `created_at < before` (epoch seconds).
    fn garbage_collect(&self, before: i64) -> RepoResult<()>;
}

/// SQLite-backed run repository borrowing a caller-managed connection.
pub struct SqliteRunRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRunRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl RunRepository for SqliteRunRepository<'_> {
    fn get_run(&self, id: RunId) -> RepoResult<Run> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RUN_SELECT_SQL} WHERE run_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_run_row(row),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn save_run(&self, payload: &Payload, label: &str, id: Option<RunId>) -> RepoResult<RunId> {
        let encoded = serde_json::to_string(payload).map_err(RepoError::Encode)?;
        let created_at = now_epoch_secs();

        let inserted = self.conn.execute(
            "INSERT INTO xhprof_runs (run_id, label, created_at, payload)
             VALUES (?1, ?2, ?3, ?4);",
            params![id, label, created_at, encoded],
        );
        match (inserted, id) {
            (Ok(_), _) => {}
            (Err(rusqlite::Error::SqliteFailure(err, _)), Some(taken))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                return Err(RepoError::DuplicateId(taken));
            }
            (Err(err), _) => return Err(err.into()),
        }

        let run_id = id.unwrap_or_else(|| self.conn.last_insert_rowid());
        debug!(
            "event=run_save module=repo status=ok run_id={run_id} caller_id={} payload_bytes={}",
            id.is_some(),
            encoded.len()
        );
        Ok(run_id)
    }

    fn list_runs(&self, page: u32, page_size: u32) -> RepoResult<RunPage> {
        if page == 0 {
            return Err(RepoError::InvalidArgument(format!(
                "page must be >= 1, got {page}"
            )));
        }
        if page_size == 0 {
            return Err(RepoError::InvalidArgument(format!(
                "page_size must be >= 1, got {page_size}"
            )));
        }

        // Count and slice must see the same row set. Inside a caller's
        // transaction that already holds; otherwise open a read one here.
        let tx = if self.conn.is_autocommit() {
            Some(self.conn.unchecked_transaction()?)
        } else {
            None
        };

        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM xhprof_runs;", [], |row| row.get(0))?;
        let total_runs = u64::try_from(total).unwrap_or_default();
        let offset = u64::from(page - 1) * u64::from(page_size);

        let mut runs = Vec::new();
        // Pages past the end are answered without a range query.
        if offset < total_runs {
            let mut stmt = self.conn.prepare(
                "SELECT run_id, label, created_at
                 FROM xhprof_runs
                 ORDER BY run_id DESC
                 LIMIT ?1 OFFSET ?2;",
            )?;
            let mut rows = stmt.query(params![i64::from(page_size), offset as i64])?;
            while let Some(row) = rows.next()? {
                runs.push(parse_summary_row(row)?);
            }
        }

        if let Some(tx) = tx {
            tx.commit()?;
        }

        Ok(RunPage {
            runs,
            page,
            page_size,
            total_runs,
            total_pages: total_page_count(total_runs, page_size),
        })
    }

    fn garbage_collect(&self, before: i64) -> RepoResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM xhprof_runs WHERE created_at < ?1;", [before])?;
        info!("event=run_gc module=repo status=ok before={before} deleted={deleted}");
        Ok(())
    }
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<RunSummary> {
    Ok(RunSummary {
        id: row.get("run_id")?,
        label: row.get("label")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_run_row(row: &Row<'_>) -> RepoResult<Run> {
    let summary = parse_summary_row(row)?;
    let encoded: String = row.get("payload")?;
    let payload = serde_json::from_str::<Payload>(&encoded).map_err(|source| {
        RepoError::Decode {
            id: summary.id,
            source,
        }
    })?;

    Ok(Run {
        id: summary.id,
        label: summary.label,
        created_at: summary.created_at,
        payload,
    })
}

/// Current wall-clock time in epoch seconds; `0` if the clock is before 1970.
pub(crate) fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::now_epoch_secs;

    #[test]
    fn clock_reports_seconds_not_millis() {
        let now = now_epoch_secs();
        // 2001-09-09 .. 2286-11-20 in seconds.
        assert!(now > 1_000_000_000);
        assert!(now < 10_000_000_000);
    }
}
