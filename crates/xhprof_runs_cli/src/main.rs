//! Command-line host for the run store.
//!
//! Opens the database, hands one request to the run service and renders the
//! result; all persistence rules live in `xhprof_runs_core`.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use xhprof_runs_core::db::open_db;
use xhprof_runs_core::{default_log_level, init_logging, RunService, SqliteRunRepository};

mod cli;
mod commands;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let log_dir = std::env::current_dir()
            .context("cannot resolve current directory")?
            .join(log_dir);
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy()).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("cannot open run store `{}`", cli.db.display()))?;
    let service = RunService::new(SqliteRunRepository::try_new(&conn)?);
    info!(
        "event=cli_start module=cli status=ok version={}",
        xhprof_runs_core::core_version()
    );

    let stdout = std::io::stdout();
    commands::run(&service, cli.command, &mut stdout.lock())
}
