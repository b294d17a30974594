//! Transfer service - moves balance between two accounts

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::context::RunContext;
use super::retry::RetryExecutor;
use crate::domain::result::Result;
use crate::domain::TransferRequest;
use crate::ports::{AccountStore, TransactionalStore};

/// Transfer service for debit/credit pairs
pub struct TransferService<S> {
    store: Arc<S>,
    executor: RetryExecutor,
}

impl<S: TransactionalStore> TransferService<S> {
    pub fn new(store: Arc<S>, executor: RetryExecutor) -> Self {
        Self { store, executor }
    }

    /// Move `amount` from `from` to `to` in one transaction, retrying on conflict.
    ///
    /// Transferring to the same account succeeds without touching the store.
    pub fn transfer(&self, ctx: &RunContext, from: Uuid, to: Uuid, amount: i64) -> Result<()> {
        let request = TransferRequest::new(from, to, amount)?;

        if request.is_self_transfer() {
            info!(account = %from, amount, "self-transfer, nothing to move");
            return Ok(());
        }

        self.executor
            .run(self.store.as_ref(), ctx, |tx| transfer_funds(tx, &request))?;

        info!(from = %from, to = %to, amount, "transfer committed");
        Ok(())
    }
}

/// One transfer attempt: read both rows, validate, write both rows.
///
/// Always reads through `accounts` so a retried attempt sees the state left by
/// whichever transaction beat it. Store conflicts are returned untouched.
pub fn transfer_funds<A>(accounts: &A, request: &TransferRequest) -> Result<()>
where
    A: AccountStore + ?Sized,
{
    let mut from = accounts.get(request.from)?;
    let mut to = accounts.get(request.to)?;

    from.debit(request.amount)?;
    to.credit(request.amount)?;

    accounts.update(&from)?;
    accounts.update(&to)?;
    Ok(())
}
