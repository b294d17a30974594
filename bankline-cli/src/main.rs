//! Bankline CLI - concurrent-safe funds transfers on DuckDB

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;
mod logging;
mod output;

use bankline_core::config::Config;
use commands::{balances, delete, demo, seed, transfer, GlobalOpts};

/// Bankline - retrying funds transfers between accounts
#[derive(Parser)]
#[command(name = "bank", version, about, long_about = None)]
struct Cli {
    /// Database file (prompted for when unset and interactive)
    #[arg(long, global = true, env = "BANKLINE_DB")]
    database: Option<PathBuf>,

    /// Use a throwaway in-memory database
    #[arg(long, global = true)]
    in_memory: bool,

    /// Give up on a command after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed accounts, make one transfer, show balances, then clean up
    Demo {
        /// Accounts to create (default from settings)
        #[arg(long)]
        rows: Option<usize>,
        /// Amount to transfer (default from settings)
        #[arg(long)]
        amount: Option<i64>,
    },

    /// Create random accounts
    Seed {
        /// Number of accounts (default from settings)
        #[arg(long, short)]
        count: Option<usize>,
        /// Lowest starting balance (default: the transfer amount)
        #[arg(long)]
        min_balance: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every account and the total balance
    Balances {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move funds from one account to another
    Transfer {
        /// Account to debit
        from: Uuid,
        /// Account to credit
        to: Uuid,
        /// Amount to move (default from settings)
        #[arg(long, short, allow_negative_numbers = true)]
        amount: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete accounts by id
    Delete {
        /// Account IDs to delete
        #[arg(required = true)]
        ids: Vec<Uuid>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (data_dir, config) = match commands::load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            output::error(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.log, cli.json_logs);

    match run(cli, data_dir, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, data_dir: PathBuf, config: Config) -> Result<()> {
    let opts = GlobalOpts {
        data_dir,
        config,
        database: cli.database,
        in_memory: cli.in_memory,
        timeout_ms: cli.timeout_ms,
    };

    match cli.command {
        Commands::Demo { rows, amount } => demo::run(&opts, rows, amount),
        Commands::Seed { count, min_balance, json } => seed::run(&opts, count, min_balance, json),
        Commands::Balances { json } => balances::run(&opts, json),
        Commands::Transfer { from, to, amount, json } => transfer::run(&opts, from, to, amount, json),
        Commands::Delete { ids, force } => delete::run(&opts, ids, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_accepted_alongside_database() {
        // Also covers BANKLINE_DB being exported in the environment
        std::env::set_var("BANKLINE_DB", "/tmp/from-env.duckdb");
        let from_env = Cli::try_parse_from(["bank", "--in-memory", "balances"]);
        std::env::remove_var("BANKLINE_DB");

        let cli = from_env.unwrap();
        assert!(cli.in_memory);
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/from-env.duckdb")));

        let cli = Cli::try_parse_from([
            "bank",
            "--database",
            "bank.duckdb",
            "--in-memory",
            "balances",
        ])
        .unwrap();
        assert!(cli.in_memory);
    }
}
