//! Store port - transactional access to the `accounts` relation

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::Account;

/// CRUD operations over `accounts` rows.
///
/// Implemented both by a store (each call is its own implicit transaction)
/// and by an open transaction (each call joins that transaction).
pub trait AccountStore {
    /// Get account by ID, failing with `AccountNotFound` if absent
    fn get(&self, id: Uuid) -> Result<Account>;

    /// Insert a new account, failing with `DuplicateAccount` if the id exists
    fn create(&self, account: &Account) -> Result<()>;

    /// Overwrite the balance of an existing account
    fn update(&self, account: &Account) -> Result<()>;

    /// All accounts, ordered by id
    fn find_all(&self) -> Result<Vec<Account>>;

    /// Delete the given accounts, returning how many rows were removed
    fn delete_by_ids(&self, ids: &[Uuid]) -> Result<usize>;
}

/// A store that can open transactions.
///
/// Conflicts must surface as `Error::RetryableConflict` so the retry core
/// never needs to know which store it is talking to.
pub trait TransactionalStore: Send + Sync {
    type Transaction: StoreTransaction;

    /// Open a new transaction at the store's serializable isolation level
    fn begin(&self) -> Result<Self::Transaction>;
}

/// An open transaction. Dropping it without `commit` discards its writes.
pub trait StoreTransaction: AccountStore {
    fn commit(self) -> Result<()>;

    fn rollback(self) -> Result<()>;
}
