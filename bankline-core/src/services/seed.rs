//! Seed service - demo account creation and teardown

use std::sync::Arc;

use rand::Rng;
use tracing::info;

use super::context::RunContext;
use super::retry::RetryExecutor;
use crate::domain::result::{Error, Result};
use crate::domain::{Account, SeededAccounts};
use crate::ports::{AccountStore, TransactionalStore};

/// Seed balances are drawn from `0..SEED_BALANCE_SPREAD`, plus a floor
pub const SEED_BALANCE_SPREAD: i64 = 10_000;

/// Creates random accounts for the demo and removes them afterwards
pub struct SeedService<S> {
    store: Arc<S>,
    executor: RetryExecutor,
}

impl<S: TransactionalStore> SeedService<S> {
    pub fn new(store: Arc<S>, executor: RetryExecutor) -> Self {
        Self { store, executor }
    }

    /// Insert `count` accounts in one transaction.
    ///
    /// Each balance is at least `min_balance`, so every seeded account can
    /// afford one transfer of that size. Ids are generated per attempt; the
    /// returned set is the one that committed.
    pub fn insert_rows(
        &self,
        ctx: &RunContext,
        count: usize,
        min_balance: i64,
    ) -> Result<SeededAccounts> {
        if min_balance < 0 {
            return Err(Error::validation("minimum seed balance cannot be negative"));
        }
        if min_balance > i64::MAX - SEED_BALANCE_SPREAD {
            return Err(Error::validation(format!(
                "minimum seed balance {} is too large, the limit is {}",
                min_balance,
                i64::MAX - SEED_BALANCE_SPREAD
            )));
        }
        info!(count, "creating new rows");

        let seeded = self.executor.run(self.store.as_ref(), ctx, |tx| {
            let mut rng = rand::thread_rng();
            let mut ids = Vec::with_capacity(count);
            for _ in 0..count {
                let account = Account::open(rng.gen_range(0..SEED_BALANCE_SPREAD) + min_balance);
                tx.create(&account)?;
                ids.push(account.id());
            }
            Ok(SeededAccounts::new(ids))
        })?;

        info!(count = seeded.len(), "rows created");
        Ok(seeded)
    }

    /// Delete exactly the accounts a seeding run created
    pub fn teardown(&self, ctx: &RunContext, seeded: &SeededAccounts) -> Result<usize> {
        if seeded.is_empty() {
            return Ok(0);
        }

        let deleted = self
            .executor
            .run(self.store.as_ref(), ctx, |tx| tx.delete_by_ids(&seeded.ids))?;

        info!(deleted, "seeded rows removed");
        Ok(deleted)
    }
}
