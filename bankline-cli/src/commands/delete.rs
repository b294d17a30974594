//! Delete command - remove accounts by id

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use uuid::Uuid;

use super::{get_context, GlobalOpts};
use crate::output;
use bankline_core::SeededAccounts;

pub fn run(opts: &GlobalOpts, ids: Vec<Uuid>, force: bool) -> Result<()> {
    if ids.is_empty() {
        output::warning("No account ids given");
        return Ok(());
    }

    // Confirm deletion unless --force or not interactive
    if !force && atty::is(atty::Stream::Stdin) {
        println!(
            "\n{}",
            format!("This will permanently delete {} accounts.", ids.len()).yellow()
        );
        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let ctx = get_context(opts)?;
    let requested = ids.len();
    let deleted = ctx
        .seed_service
        .teardown(&opts.run_context(), &SeededAccounts::new(ids))?;

    if deleted < requested {
        output::warning(&format!(
            "Deleted {} of {} accounts, the rest did not exist",
            deleted, requested
        ));
    } else {
        output::success(&format!("Deleted {} accounts", deleted));
    }
    Ok(())
}
