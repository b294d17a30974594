//! Demo command - seed, transfer once, report, clean up

use anyhow::Result;
use colored::Colorize;

use super::{get_context, GlobalOpts};
use crate::output;

/// Run the full demo cycle against the configured store.
///
/// Only a failed seed aborts the run. Later failures are reported and the
/// seeded rows are still removed.
pub fn run(opts: &GlobalOpts, rows: Option<usize>, amount: Option<i64>) -> Result<()> {
    let ctx = get_context(opts)?;
    let run = opts.run_context();
    let rows = rows.unwrap_or(ctx.config.seed_rows);
    let amount = amount.unwrap_or(ctx.config.transfer_amount);

    output::info(&format!("Creating {} accounts", rows));
    let seeded = ctx.seed_service.insert_rows(&run, rows, amount)?;

    match ctx.report_service.balances() {
        Ok(report) => output::print_balances("Balances before transfer", &report),
        Err(e) => output::error(&format!("Failed to read balances: {}", e)),
    }

    match seeded.transfer_pair(&mut rand::thread_rng()) {
        Some((from, to)) => {
            println!(
                "\nTransferring {} from {} to {}",
                amount.to_string().bold(),
                from,
                to
            );
            match ctx.transfer_service.transfer(&run, from, to, amount) {
                Ok(()) if from == to => {
                    output::warning("Source and destination are the same account, nothing moved")
                }
                Ok(()) => output::success("Transfer committed"),
                Err(e) => output::error(&format!("Transfer failed: {}", e)),
            }
        }
        None => output::warning("No accounts to transfer between"),
    }

    match ctx.report_service.balances() {
        Ok(report) => output::print_balances("\nBalances after transfer", &report),
        Err(e) => output::error(&format!("Failed to read balances: {}", e)),
    }

    match ctx.seed_service.teardown(&run, &seeded) {
        Ok(deleted) => output::success(&format!("Removed {} demo accounts", deleted)),
        Err(e) => output::error(&format!("Failed to remove demo accounts: {}", e)),
    }

    Ok(())
}
