use crate::cli::Commands;
use anyhow::{bail, Context, Result};
use chrono::DateTime;
use std::io::{Read, Write};
use xhprof_runs_core::{Payload, RepoError, RunPage, RunRepository, RunService};

pub fn run<R: RunRepository>(
    service: &RunService<R>,
    command: Commands,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Save { label, id, file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("cannot read payload file `{}`", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .context("cannot read payload from stdin")?;
                    buffer
                }
            };
            let payload: Payload =
                serde_json::from_str(&raw).context("payload is not valid JSON")?;
            let run_id = match id {
                Some(id) => service.record_run_with_id(&payload, &label, id)?,
                None => service.record_run(&payload, &label)?,
            };
            writeln!(out, "{run_id}")?;
        }
        Commands::Get { id } => match service.get_run(id) {
            Ok(run) => {
                writeln!(out, "{}", run.description())?;
                writeln!(out, "{}", serde_json::to_string_pretty(&run.payload)?)?;
            }
            Err(RepoError::NotFound(id)) => bail!("Invalid Run Id = {id}"),
            Err(err) => return Err(err.into()),
        },
        Commands::List { page, page_size } => {
            let listing = service.list_runs(page, page_size)?;
            write_page(out, &listing)?;
        }
        Commands::Gc { before, older_than } => {
            let cutoff = match (before, older_than) {
                (Some(before), _) => {
                    service.garbage_collect(before)?;
                    before
                }
                (None, Some(max_age)) => service.purge_older_than(max_age)?,
                (None, None) => bail!("either --before or --older-than is required"),
            };
            writeln!(out, "deleted runs created before {}", format_timestamp(cutoff))?;
        }
    }
    Ok(())
}

fn write_page(out: &mut impl Write, listing: &RunPage) -> Result<()> {
    for run in &listing.runs {
        writeln!(
            out,
            "{}\t{}\t{}",
            run.id,
            run.label,
            format_timestamp(run.created_at)
        )?;
    }
    writeln!(
        out,
        "page {}/{} ({} runs)",
        listing.page, listing.total_pages, listing.total_runs
    )?;
    Ok(())
}

fn format_timestamp(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| epoch_secs.to_string())
}
