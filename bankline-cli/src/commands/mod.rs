//! CLI command implementations

pub mod balances;
pub mod delete;
pub mod demo;
pub mod seed;
pub mod transfer;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use dialoguer::Input;
use tracing::debug;

use bankline_core::config::Config;
use crate::output;
use bankline_core::{BanklineContext, RunContext};

/// Options shared by every command
#[derive(Debug, Clone)]
pub struct GlobalOpts {
    pub data_dir: PathBuf,
    pub config: Config,
    pub database: Option<PathBuf>,
    pub in_memory: bool,
    pub timeout_ms: Option<u64>,
}

impl GlobalOpts {
    /// Run context for one command: bounded when `--timeout-ms` is set
    pub fn run_context(&self) -> RunContext {
        match self.timeout_ms {
            Some(ms) => {
                debug!(timeout_ms = ms, "run bounded by timeout");
                RunContext::with_timeout(Duration::from_millis(ms))
            }
            None => RunContext::background(),
        }
    }
}

/// Get the bankline directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BANKLINE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".bankline"))
        .ok_or_else(|| anyhow!("Could not find home directory, set BANKLINE_DIR"))
}

/// Load settings from the data directory
pub fn load_config() -> Result<(PathBuf, Config)> {
    let data_dir = get_data_dir()?;
    let config = Config::load(&data_dir)
        .with_context(|| format!("Failed to load settings from {:?}", data_dir))?;
    Ok((data_dir, config))
}

/// Build the bankline context for a command
///
/// Database precedence: `--in-memory`, then `--database`/`BANKLINE_DB`, then
/// settings.json, then a prompt (interactive) or `<data dir>/bank.duckdb`.
pub fn get_context(opts: &GlobalOpts) -> Result<BanklineContext> {
    let mut config = opts.config.clone();

    if opts.in_memory {
        config.database = None;
    } else {
        if let Some(path) = &opts.database {
            config.database = Some(path.clone());
        }
        if config.database.is_none() {
            config.database = Some(choose_database(&opts.data_dir)?);
        }
    }

    if let Some(path) = config.database.as_deref().and_then(Path::parent) {
        if !path.as_os_str().is_empty() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
    }

    match &config.database {
        Some(path) => debug!(path = %path.display(), "using database file"),
        None => debug!("using in-memory database"),
    }
    BanklineContext::new(config).context("Failed to initialize bankline context")
}

fn choose_database(data_dir: &Path) -> Result<PathBuf> {
    let default = data_dir.join("bank.duckdb");
    if !atty::is(atty::Stream::Stdin) {
        return Ok(default);
    }

    let answer: String = Input::new()
        .with_prompt("Database file")
        .default(default.display().to_string())
        .interact_text()?;
    let chosen = PathBuf::from(answer.trim());

    remember_database(data_dir, &chosen)?;
    output::info(&format!(
        "Saved database path to {}",
        data_dir.join("settings.json").display()
    ));
    Ok(chosen)
}

/// Store the chosen database in settings.json so later runs skip the prompt.
/// Environment overrides are not written back.
pub fn remember_database(data_dir: &Path, database: &Path) -> Result<()> {
    let mut stored = Config::read(data_dir)
        .with_context(|| format!("Failed to read settings from {:?}", data_dir))?;
    stored.database = Some(database.to_path_buf());
    stored
        .save(data_dir)
        .with_context(|| format!("Failed to save settings to {:?}", data_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remember_database_keeps_other_settings() {
        let dir = TempDir::new().unwrap();
        let mut existing = Config::default();
        existing.seed_rows = 12;
        existing.save(dir.path()).unwrap();

        let db = dir.path().join("chosen.duckdb");
        remember_database(dir.path(), &db).unwrap();

        let stored = Config::read(dir.path()).unwrap();
        assert_eq!(stored.database, Some(db));
        assert_eq!(stored.seed_rows, 12);
    }

    #[test]
    fn test_in_memory_wins_over_database() {
        let dir = TempDir::new().unwrap();
        let opts = GlobalOpts {
            data_dir: dir.path().to_path_buf(),
            config: Config::default(),
            database: Some(dir.path().join("unused.duckdb")),
            in_memory: true,
            timeout_ms: None,
        };

        let ctx = get_context(&opts).unwrap();
        assert!(ctx.store.db_path().is_none());
        assert!(!dir.path().join("unused.duckdb").exists());
    }
}
