//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The retry core and
//! transfer logic depend only on these traits, not on concrete stores.

mod store;

pub use store::{AccountStore, StoreTransaction, TransactionalStore};
