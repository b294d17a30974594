//! Balance report and seeded account set

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Account;

/// Point-in-time listing of every account and the sum of their balances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    pub taken_at: DateTime<Utc>,
    pub accounts: Vec<Account>,
    pub total: i128,
}

impl BalanceReport {
    pub fn new(accounts: Vec<Account>) -> Self {
        // i128 so a report over many near-max balances cannot overflow
        let total = accounts.iter().map(|a| a.balance() as i128).sum();
        Self {
            taken_at: Utc::now(),
            accounts,
            total,
        }
    }

    /// Balance of a single account in this report, if present
    pub fn balance_of(&self, id: Uuid) -> Option<i64> {
        self.accounts
            .iter()
            .find(|a| a.id() == id)
            .map(Account::balance)
    }
}

/// Ids created by a seeding run.
///
/// Returned by the seeder and handed to teardown, so cleanup only ever
/// touches rows this run created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededAccounts {
    pub ids: Vec<Uuid>,
}

impl SeededAccounts {
    pub fn new(ids: Vec<Uuid>) -> Self {
        Self { ids }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Pick the demo transfer pair: the first seeded account pays a randomly
    /// chosen seeded account, which may be itself.
    pub fn transfer_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(Uuid, Uuid)> {
        let from = *self.ids.first()?;
        let to = self.ids[rng.gen_range(0..self.ids.len())];
        Some((from, to))
    }
}
