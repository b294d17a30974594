//! Transfer request

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};

/// A request to move `amount` from one account to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: i64,
}

impl TransferRequest {
    /// Build a request, rejecting non-positive amounts
    pub fn new(from: Uuid, to: Uuid, amount: i64) -> Result<Self> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        Ok(Self { from, to, amount })
    }

    /// Source and destination are the same account; nothing to move.
    pub fn is_self_transfer(&self) -> bool {
        self.from == self.to
    }
}
