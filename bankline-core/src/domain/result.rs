//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Core library error type
///
/// Only [`Error::RetryableConflict`] is recovered inside the retry loop.
/// Every other variant is terminal and reaches the caller unchanged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transaction conflict: {0}")]
    RetryableConflict(String),

    #[error("Transaction abandoned after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    #[error("Account {account} balance {balance} is lower than transfer amount {amount}")]
    InsufficientFunds {
        account: Uuid,
        balance: i64,
        amount: i64,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("Account already exists: {0}")]
    DuplicateAccount(Uuid),

    #[error("Invalid transfer amount {0}: must be positive")]
    InvalidAmount(i64),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a retryable conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::RetryableConflict(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the store asked for the whole transaction to be run again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryableConflict(_))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Attach a context entry, e.g. the number of attempts made
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(Error::conflict("Conflict on update!").is_retryable());

        assert!(!Error::InsufficientFunds {
            account: Uuid::new_v4(),
            balance: 50,
            amount: 100,
        }
        .is_retryable());
        assert!(!Error::AccountNotFound(Uuid::new_v4()).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
        assert!(!Error::DeadlineExceeded.is_retryable());
        assert!(!Error::StoreUnavailable("database is locked".into()).is_retryable());
        assert!(!Error::RetryExhausted {
            attempts: 3,
            last_error: "conflict".into(),
        }
        .is_retryable());
    }

    #[test]
    fn test_insufficient_funds_message() {
        let id = Uuid::nil();
        let err = Error::InsufficientFunds {
            account: id,
            balance: 50,
            amount: 100,
        };
        assert_eq!(
            err.to_string(),
            format!("Account {} balance 50 is lower than transfer amount 100", id)
        );
    }

    #[test]
    fn test_operation_result_fail() {
        let result: OperationResult<i32> = OperationResult::fail("Something went wrong");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_from_result() {
        let ok: Result<i32> = Ok(42);
        let result: OperationResult<i32> = ok.into();
        assert!(result.success);
        assert_eq!(result.data, Some(42));

        let err: Result<i32> = Err(Error::InvalidAmount(0));
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("must be positive"));
    }

    #[test]
    fn test_with_context() {
        let result = OperationResult::ok(()).with_context("attempts", serde_json::json!(3));
        let context = result.context.unwrap();
        assert_eq!(context.get("attempts"), Some(&serde_json::json!(3)));
    }
}
