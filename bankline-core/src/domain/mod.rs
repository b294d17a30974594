//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external dependencies.

mod account;
pub mod balance;
pub mod result;
mod transfer;

pub use account::Account;
pub use balance::{BalanceReport, SeededAccounts};
pub use transfer::TransferRequest;
