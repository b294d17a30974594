//! Seed command - create random accounts

use anyhow::Result;
use colored::Colorize;

use super::{get_context, GlobalOpts};
use crate::output;
use bankline_core::OperationResult;

pub fn run(opts: &GlobalOpts, count: Option<usize>, min_balance: Option<i64>, json: bool) -> Result<()> {
    let ctx = get_context(opts)?;
    let count = count.unwrap_or(ctx.config.seed_rows);
    let min_balance = min_balance.unwrap_or(ctx.config.transfer_amount);

    let seeded = ctx
        .seed_service
        .insert_rows(&opts.run_context(), count, min_balance)?;

    if json {
        let result = OperationResult::ok(&seeded)
            .with_context("count", serde_json::json!(seeded.len()));
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    output::success(&format!("Created {} accounts", seeded.len()));
    for id in &seeded.ids {
        println!("  {}", id.to_string().dimmed());
    }
    Ok(())
}
