//! Transfer command - move funds between two accounts

use anyhow::{Context, Result};
use uuid::Uuid;

use super::{get_context, GlobalOpts};
use crate::output;
use bankline_core::{OperationResult, TransferRequest};

pub fn run(opts: &GlobalOpts, from: Uuid, to: Uuid, amount: Option<i64>, json: bool) -> Result<()> {
    let ctx = get_context(opts)?;
    let amount = amount.unwrap_or(ctx.config.transfer_amount);

    let result = ctx
        .transfer_service
        .transfer(&opts.run_context(), from, to, amount);

    if json {
        let report = match &result {
            Ok(()) => OperationResult::ok(TransferRequest { from, to, amount }),
            Err(e) => OperationResult::fail(e.to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    result.with_context(|| format!("Transfer of {} from {} to {} failed", amount, from, to))?;

    if !json {
        output::success(&format!("Transferred {} from {} to {}", amount, from, to));
    }
    Ok(())
}
