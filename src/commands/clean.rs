//! Clean command handler

use anyhow::Result;

use keepsync::application::clean::CleanUseCase;
use keepsync::{JsonStateRepository, LocalFs};

use super::Context;

pub fn cmd_clean(ctx: &Context) -> Result<bool> {
    let report = CleanUseCase::new(JsonStateRepository::new(), LocalFs::new())
        .with_events(ctx.events())
        .execute(&ctx.destination)?;

    if !ctx.json {
        println!(
            "clean: {} issues, {} deleted, {} errors",
            report.issues.len(),
            report.deleted.len(),
            report.errors.len()
        );
    }
    Ok(report.is_success())
}
