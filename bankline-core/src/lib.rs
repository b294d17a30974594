//! Bankline Core - Retrying funds transfers over an optimistic store
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Account, TransferRequest, etc.)
//! - **ports**: Trait definitions for the transactional account store
//! - **services**: Retry executor, transfers, seeding and reports
//! - **adapters**: Concrete implementations (DuckDB)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::sync::Arc;

use tracing::debug;

use adapters::duckdb::DuckDbStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{Account, BalanceReport, SeededAccounts, TransferRequest};
pub use services::{CancelToken, RetryExecutor, RetryPolicy, RunContext};

/// Main context for Bankline operations
///
/// Holds the store, the configuration and all services. Every service shares
/// the same store and retry policy.
pub struct BanklineContext {
    pub config: Config,
    pub store: Arc<DuckDbStore>,
    pub transfer_service: TransferService<DuckDbStore>,
    pub seed_service: SeedService<DuckDbStore>,
    pub report_service: ReportService<DuckDbStore>,
}

impl BanklineContext {
    /// Create a new Bankline context
    ///
    /// Opens `config.database`, or a private in-memory store when it is unset,
    /// and makes sure the accounts table exists.
    pub fn new(config: Config) -> Result<Self> {
        let executor = RetryExecutor::new(config.retry_policy()?)?;

        let store = match &config.database {
            Some(path) => DuckDbStore::open(path)?,
            None => {
                debug!("no database configured, using in-memory store");
                DuckDbStore::open_in_memory()?
            }
        };
        let store = Arc::new(store);
        store.ensure_schema()?;

        let transfer_service = TransferService::new(Arc::clone(&store), executor.clone());
        let seed_service = SeedService::new(Arc::clone(&store), executor);
        let report_service = ReportService::new(Arc::clone(&store));

        Ok(Self {
            config,
            store,
            transfer_service,
            seed_service,
            report_service,
        })
    }
}
