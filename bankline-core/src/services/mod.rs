//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Everything that
//! writes goes through the retry executor.

pub mod context;
mod report;
pub mod retry;
mod seed;
mod transfer;

pub use context::{CancelToken, RunContext};
pub use report::ReportService;
pub use retry::{Backoff, RetryExecutor, RetryPolicy};
pub use seed::{SeedService, SEED_BALANCE_SPREAD};
pub use transfer::{transfer_funds, TransferService};
