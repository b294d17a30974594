//! Adapter implementations (hexagonal architecture)
//!
//! Adapters implement the port traits for a concrete store.

pub mod duckdb;

pub use self::duckdb::{classify_store_error, DuckDbStore, DuckDbTransaction};
