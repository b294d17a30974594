//! Account domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};

/// A row of the `accounts` relation.
///
/// The id is fixed at creation. Balance changes only through [`Account::debit`]
/// and [`Account::credit`], which refuse to produce a negative or overflowing
/// balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: Uuid,
    balance: i64,
}

impl Account {
    /// Build an account from a known id and balance (e.g. a row read back from the store)
    pub fn new(id: Uuid, balance: i64) -> Self {
        Self { id, balance }
    }

    /// Open a new account with a random v4 id
    pub fn open(balance: i64) -> Self {
        Self::new(Uuid::new_v4(), balance)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Validate account data before it is written
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.balance < 0 {
            return Err("account balance cannot be negative");
        }
        Ok(())
    }

    /// Remove `amount` from the balance.
    ///
    /// Fails with [`Error::InsufficientFunds`] and leaves the balance untouched
    /// when the account cannot cover the amount.
    pub fn debit(&mut self, amount: i64) -> Result<()> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        if self.balance < amount {
            return Err(Error::InsufficientFunds {
                account: self.id,
                balance: self.balance,
                amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Add `amount` to the balance
    pub fn credit(&mut self, amount: i64) -> Result<()> {
        if amount <= 0 {
            return Err(Error::InvalidAmount(amount));
        }
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            Error::validation(format!(
                "crediting {} to account {} would overflow its balance",
                amount, self.id
            ))
        })?;
        Ok(())
    }
}
