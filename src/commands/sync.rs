//! Sync command handler

use anyhow::Result;

use keepsync::application::sync::{SyncOptions, SyncUseCase};
use keepsync::{default_registry, JsonStateRepository, LocalFs};

use super::Context;
use crate::cli::SourceFlags;

pub fn cmd_sync(
    ctx: &Context,
    flags: &SourceFlags,
    force: bool,
    clean: bool,
    concurrency: Option<usize>,
) -> Result<bool> {
    let args = ctx.source_args(flags)?;
    let options = SyncOptions::new(&ctx.destination, args)
        .with_force(force)
        .with_clean(clean || ctx.config.sync.clean)
        .with_concurrency(concurrency.unwrap_or(ctx.config.sync.concurrency));

    let use_case = SyncUseCase::new(JsonStateRepository::new(), LocalFs::new(), default_registry())
        .with_events(ctx.events())
        .with_cancel(ctx.cancel.clone());
    let report = use_case.sync(&options)?;

    if report.cancelled && !ctx.json {
        eprintln!("Interrupted; the next sync will resume where this one stopped.");
    }
    Ok(report.is_success())
}
