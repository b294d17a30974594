//! Balances command - list every account

use anyhow::Result;

use super::{get_context, GlobalOpts};
use crate::output;

pub fn run(opts: &GlobalOpts, json: bool) -> Result<()> {
    let ctx = get_context(opts)?;
    let report = ctx.report_service.balances()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::print_balances("Balances", &report);
    Ok(())
}
