//! DuckDB store implementation
//!
//! DuckDB runs every transaction under optimistic MVCC. Two transactions that
//! write the same row cannot both commit: the loser gets a "Conflict on update"
//! (or "write-write conflict") error and must be retried from the start. This
//! adapter maps that signal to `Error::RetryableConflict`.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use duckdb::{params, params_from_iter, Connection};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::Account;
use crate::ports::{AccountStore, StoreTransaction, TransactionalStore};

/// Maximum number of attempts when the database file is locked
const MAX_OPEN_ATTEMPTS: u32 = 5;

/// Initial open retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_OPEN_DELAY_MS: u64 = 50;

const SCHEMA: &str = include_str!("schema.sql");

/// Check if an error message indicates a file locking issue
fn is_file_lock_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// Check if an error message is DuckDB asking for the transaction to be retried
fn is_conflict_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("conflict on update")
        || lower.contains("conflict on tuple deletion")
        || lower.contains("write-write conflict")
        || (lower.contains("transactioncontext") && lower.contains("conflict"))
}

fn is_duplicate_key_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("duplicate key") || lower.contains("violates primary key")
}

/// Classify a store error message.
///
/// This is the only place that knows what a DuckDB conflict looks like.
/// Anything unrecognised stays terminal.
pub fn classify_store_error(message: &str) -> Error {
    if is_conflict_error(message) {
        Error::RetryableConflict(message.to_string())
    } else if is_file_lock_error(message) {
        Error::StoreUnavailable(message.to_string())
    } else {
        Error::Database(message.to_string())
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        classify_store_error(&err.to_string())
    }
}

/// DuckDB-backed account store
///
/// Holds one base connection. Calls made directly on the store autocommit;
/// each transaction gets its own connection cloned from the same database
/// instance so that concurrent transactions are isolated from each other.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbStore {
    /// Open (or create) a file-backed store
    ///
    /// Retries with exponential backoff while another process holds the
    /// database file lock.
    pub fn open(db_path: &Path) -> Result<Self> {
        let mut last_error = String::new();

        for attempt in 0..MAX_OPEN_ATTEMPTS {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    debug!(path = %db_path.display(), attempt = attempt + 1, "opened database");
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_file_lock_error(&err_msg) && attempt < MAX_OPEN_ATTEMPTS - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_OPEN_DELAY_MS * 2u64.pow(attempt));
                        warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max_attempts = MAX_OPEN_ATTEMPTS,
                            error = %err_msg,
                            "database busy, retrying open"
                        );
                        thread::sleep(delay);
                        last_error = err_msg;
                        continue;
                    }
                    return Err(Error::StoreUnavailable(format!(
                        "failed to open {}: {}",
                        db_path.display(),
                        err_msg
                    )));
                }
            }
        }

        Err(Error::StoreUnavailable(format!(
            "failed to open {} after {} attempts: {}",
            db_path.display(),
            MAX_OPEN_ATTEMPTS,
            last_error
        )))
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        // Extension autoloading is off: the store only needs core SQL
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    /// Path of the backing file, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Create the `accounts` table if it does not exist yet
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("connection lock poisoned: {}", e)))
    }
}

impl AccountStore for DuckDbStore {
    fn get(&self, id: Uuid) -> Result<Account> {
        get_account(&*self.lock()?, id)
    }

    fn create(&self, account: &Account) -> Result<()> {
        create_account(&*self.lock()?, account)
    }

    fn update(&self, account: &Account) -> Result<()> {
        update_account(&*self.lock()?, account)
    }

    fn find_all(&self) -> Result<Vec<Account>> {
        find_all_accounts(&*self.lock()?)
    }

    fn delete_by_ids(&self, ids: &[Uuid]) -> Result<usize> {
        delete_accounts(&*self.lock()?, ids)
    }
}

impl TransactionalStore for DuckDbStore {
    type Transaction = DuckDbTransaction;

    fn begin(&self) -> Result<DuckDbTransaction> {
        let conn = self.lock()?.try_clone()?;
        conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(DuckDbTransaction {
            conn,
            finished: false,
        })
    }
}

/// An open DuckDB transaction on its own connection
pub struct DuckDbTransaction {
    conn: Connection,
    finished: bool,
}

impl AccountStore for DuckDbTransaction {
    fn get(&self, id: Uuid) -> Result<Account> {
        get_account(&self.conn, id)
    }

    fn create(&self, account: &Account) -> Result<()> {
        create_account(&self.conn, account)
    }

    fn update(&self, account: &Account) -> Result<()> {
        update_account(&self.conn, account)
    }

    fn find_all(&self) -> Result<Vec<Account>> {
        find_all_accounts(&self.conn)
    }

    fn delete_by_ids(&self, ids: &[Uuid]) -> Result<usize> {
        delete_accounts(&self.conn, ids)
    }
}

impl StoreTransaction for DuckDbTransaction {
    fn commit(mut self) -> Result<()> {
        self.finished = true;
        if let Err(e) = self.conn.execute_batch("COMMIT") {
            // DuckDB normally aborts a failed commit itself; make sure of it
            if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK") {
                debug!(error = %rollback_err, "rollback after failed commit failed");
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl Drop for DuckDbTransaction {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                debug!(error = %e, "rollback of abandoned transaction failed");
            }
        }
    }
}

// === Statements shared by the store and its transactions ===

fn account_from_row(id: &str, balance: i64) -> Result<Account> {
    let id = Uuid::parse_str(id)
        .map_err(|e| Error::database(format!("invalid account id {:?}: {}", id, e)))?;
    Ok(Account::new(id, balance))
}

fn get_account(conn: &Connection, id: Uuid) -> Result<Account> {
    let row = conn.query_row(
        "SELECT id, balance FROM accounts WHERE id = ?",
        params![id.to_string()],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
    );

    match row {
        Ok((id_str, balance)) => account_from_row(&id_str, balance),
        Err(duckdb::Error::QueryReturnedNoRows) => Err(Error::AccountNotFound(id)),
        Err(e) => Err(e.into()),
    }
}

fn create_account(conn: &Connection, account: &Account) -> Result<()> {
    account.validate().map_err(Error::validation)?;

    let inserted = conn.execute(
        "INSERT INTO accounts (id, balance) VALUES (?, ?)",
        params![account.id().to_string(), account.balance()],
    );

    match inserted {
        Ok(_) => Ok(()),
        Err(e) => {
            let err_msg = e.to_string();
            if !is_conflict_error(&err_msg) && is_duplicate_key_error(&err_msg) {
                Err(Error::DuplicateAccount(account.id()))
            } else {
                Err(e.into())
            }
        }
    }
}

fn update_account(conn: &Connection, account: &Account) -> Result<()> {
    account.validate().map_err(Error::validation)?;

    let changed = conn.execute(
        "UPDATE accounts SET balance = ? WHERE id = ?",
        params![account.balance(), account.id().to_string()],
    )?;

    if changed == 0 {
        return Err(Error::AccountNotFound(account.id()));
    }
    Ok(())
}

fn find_all_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT id, balance FROM accounts ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut accounts = Vec::new();
    for row in rows {
        let (id, balance) = row?;
        accounts.push(account_from_row(&id, balance)?);
    }
    Ok(accounts)
}

fn delete_accounts(conn: &Connection, ids: &[Uuid]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("DELETE FROM accounts WHERE id IN ({})", placeholders);
    let deleted = conn.execute(&sql, params_from_iter(ids.iter().map(|id| id.to_string())))?;
    Ok(deleted)
}
