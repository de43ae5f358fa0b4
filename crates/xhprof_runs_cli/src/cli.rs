use clap::{Parser, Subcommand};
use std::path::PathBuf;
use xhprof_runs_core::{RunId, DEFAULT_PAGE_SIZE};

#[derive(Parser)]
#[command(name = "xhprof-runs")]
#[command(about = "Store, browse and expire profiler runs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database file holding the runs
    #[arg(long, env = "XHPROF_RUNS_DB", default_value = "xhprof_runs.db")]
    pub db: PathBuf,

    /// Log level (trace, debug, info, warn, error); needs --log-dir
    #[arg(long, env = "XHPROF_RUNS_LOG_LEVEL", requires = "log_dir")]
    pub log_level: Option<String>,

    /// Directory for rotated log files; logging stays off when unset
    #[arg(long, env = "XHPROF_RUNS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a run from a JSON payload
    Save {
        /// Label, usually the profiled route
        #[arg(long)]
        label: String,

        /// Store under this id instead of a generated one
        #[arg(long)]
        id: Option<RunId>,

        /// Read the payload from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show one run
    Get {
        /// Run id
        id: RunId,
    },

    /// List runs, newest first
    List {
        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Runs per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },

    /// Delete old runs
    Gc {
        /// Delete runs created before this unix timestamp
        #[arg(long, conflicts_with = "older_than", required_unless_present = "older_than")]
        before: Option<i64>,

        /// Delete runs older than this many seconds
        #[arg(long)]
        older_than: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_defaults_to_first_page() {
        let cli = Cli::try_parse_from(["xhprof-runs", "--db", "runs.db", "list"]).unwrap();
        match cli.command {
            Commands::List { page, page_size } => {
                assert_eq!(page, 1);
                assert_eq!(page_size, xhprof_runs_core::DEFAULT_PAGE_SIZE);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn gc_requires_exactly_one_cutoff() {
        assert!(Cli::try_parse_from(["xhprof-runs", "gc"]).is_err());
        assert!(
            Cli::try_parse_from(["xhprof-runs", "gc", "--before", "10", "--older-than", "5"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["xhprof-runs", "gc", "--older-than", "86400"]).is_ok());
    }

    #[test]
    fn log_level_without_log_dir_is_rejected() {
        assert!(Cli::try_parse_from(["xhprof-runs", "--log-level", "debug", "list"]).is_err());

        let cli = Cli::try_parse_from([
            "xhprof-runs",
            "--log-level",
            "debug",
            "--log-dir",
            "/tmp/xhprof-runs-logs",
            "list",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
