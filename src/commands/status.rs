//! Status command handler

use anyhow::Result;

use keepsync::application::sync::{SyncOptions, SyncUseCase};
use keepsync::{default_registry, FileStatus, JsonStateRepository, LocalFs};

use super::Context;
use crate::cli::SourceFlags;

pub fn cmd_status(ctx: &Context, flags: &SourceFlags, remote: bool) -> Result<bool> {
    let args = ctx.source_args(flags)?;
    let options = SyncOptions::new(&ctx.destination, args);

    let use_case = SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), default_registry())
        .with_events(ctx.events())
        .with_cancel(ctx.cancel.clone());
    let report = use_case.status(&options, remote)?;

    if !ctx.json {
        if report.stale {
            println!("Source arguments changed since the last sync; run `keepsync sync`.");
        }
        for failure in &report.errors {
            eprintln!("error: {}: {}", failure.path, failure.error);
        }
        println!(
            "{} customized, {} deleted, {} untracked, {} errors",
            report.count(FileStatus::Customized),
            report.count(FileStatus::Deleted),
            report.untracked.len(),
            report.errors.len()
        );
    }
    Ok(report.is_success())
}
