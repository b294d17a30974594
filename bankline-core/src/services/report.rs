//! Report service - balance listings

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::BalanceReport;
use crate::ports::AccountStore;

pub struct ReportService<S> {
    store: Arc<S>,
}

impl<S: AccountStore> ReportService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Snapshot of every account at call time
    pub fn balances(&self) -> Result<BalanceReport> {
        let accounts = self.store.find_all()?;
        Ok(BalanceReport::new(accounts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DuckDbStore;
    use crate::domain::Account;

    #[test]
    fn test_balances_lists_all_accounts() {
        let store = Arc::new(DuckDbStore::open_in_memory().unwrap());
        store.ensure_schema().unwrap();
        let a = Account::open(500);
        let b = Account::open(100);
        store.create(&a).unwrap();
        store.create(&b).unwrap();

        let report = ReportService::new(Arc::clone(&store)).balances().unwrap();

        assert_eq!(report.accounts.len(), 2);
        assert_eq!(report.total, 600);
        assert_eq!(report.balance_of(a.id()), Some(500));
        assert_eq!(report.balance_of(b.id()), Some(100));
    }

    #[test]
    fn test_balances_empty_store() {
        let store = Arc::new(DuckDbStore::open_in_memory().unwrap());
        store.ensure_schema().unwrap();

        let report = ReportService::new(store).balances().unwrap();
        assert!(report.accounts.is_empty());
        assert_eq!(report.total, 0);
    }
}
