//! Concurrent transfer tests
//!
//! Several threads move money between the same handful of accounts through one
//! shared store. DuckDB rejects overlapping writers with conflicts, the retry
//! executor replays them, and the total balance must never change.
//!
//! Run with: cargo test --test concurrent_transfers_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rand::Rng;
use tempfile::TempDir;

use bankline_core::adapters::DuckDbStore;
use bankline_core::ports::AccountStore;
use bankline_core::services::{
    RetryExecutor, RetryPolicy, RunContext, SeedService, TransferService,
};
use bankline_core::Error;

/// Number of concurrent threads
const THREAD_COUNT: usize = 6;

/// Transfers attempted by each thread
const TRANSFERS_PER_THREAD: usize = 10;

const ACCOUNT_COUNT: usize = 4;

fn contention_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 50,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(25),
        max_elapsed: None,
        jitter: true,
    }
}

#[test]
fn test_concurrent_transfers_conserve_total() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_concurrent.duckdb");

    let store = Arc::new(DuckDbStore::open(&db_path).unwrap());
    store.ensure_schema().unwrap();
    let executor = RetryExecutor::new(contention_policy()).unwrap();

    let seeded = SeedService::new(Arc::clone(&store), executor.clone())
        .insert_rows(&RunContext::background(), ACCOUNT_COUNT, 100)
        .unwrap();
    let total_before: i64 = store.find_all().unwrap().iter().map(|a| a.balance()).sum();

    let service = Arc::new(TransferService::new(Arc::clone(&store), executor));
    let ids = Arc::new(seeded.ids);
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let committed = Arc::new(AtomicUsize::new(0));
    let refused = Arc::new(AtomicUsize::new(0));
    let exhausted = Arc::new(AtomicUsize::new(0));

    let mut handles = vec![];

    for _ in 0..THREAD_COUNT {
        let service = Arc::clone(&service);
        let ids = Arc::clone(&ids);
        let barrier = Arc::clone(&barrier);
        let committed = Arc::clone(&committed);
        let refused = Arc::clone(&refused);
        let exhausted = Arc::clone(&exhausted);

        handles.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            barrier.wait();

            for _ in 0..TRANSFERS_PER_THREAD {
                let from = ids[rng.gen_range(0..ids.len())];
                let to = ids[rng.gen_range(0..ids.len())];
                let amount = rng.gen_range(1..500);

                match service.transfer(&RunContext::background(), from, to, amount) {
                    Ok(()) => {
                        committed.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(Error::InsufficientFunds { .. }) => {
                        refused.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(Error::RetryExhausted { .. }) => {
                        exhausted.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => panic!("unexpected transfer error: {}", e),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let committed = committed.load(Ordering::SeqCst);
    let refused = refused.load(Ordering::SeqCst);
    let exhausted = exhausted.load(Ordering::SeqCst);
    println!(
        "committed: {}, insufficient funds: {}, exhausted: {}",
        committed, refused, exhausted
    );

    assert_eq!(committed + refused + exhausted, THREAD_COUNT * TRANSFERS_PER_THREAD);
    assert!(committed > 0, "no transfer made it through");

    let accounts = store.find_all().unwrap();
    assert_eq!(accounts.len(), ACCOUNT_COUNT);
    let total_after: i64 = accounts.iter().map(|a| a.balance()).sum();
    assert_eq!(total_before, total_after);
    assert!(accounts.iter().all(|a| a.balance() >= 0));
}

/// Two threads hammering the same pair in opposite directions
#[test]
fn test_opposing_transfers_on_one_pair() {
    let store = Arc::new(DuckDbStore::open_in_memory().unwrap());
    store.ensure_schema().unwrap();
    let executor = RetryExecutor::new(contention_policy()).unwrap();

    let seeded = SeedService::new(Arc::clone(&store), executor.clone())
        .insert_rows(&RunContext::background(), 2, 1_000)
        .unwrap();
    let (a, b) = (seeded.ids[0], seeded.ids[1]);
    let start_a = store.get(a).unwrap().balance();
    let start_b = store.get(b).unwrap().balance();

    let service = Arc::new(TransferService::new(Arc::clone(&store), executor));
    let barrier = Arc::new(Barrier::new(2));

    let directions = [(a, b), (b, a)];
    let handles: Vec<_> = directions
        .into_iter()
        .map(|(from, to)| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut moved = 0i64;
                for _ in 0..10 {
                    match service.transfer(&RunContext::background(), from, to, 10) {
                        Ok(()) => moved += 10,
                        Err(Error::RetryExhausted { .. }) => {}
                        Err(e) => panic!("unexpected transfer error: {}", e),
                    }
                }
                moved
            })
        })
        .collect();

    let moved: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(store.get(a).unwrap().balance(), start_a - moved[0] + moved[1]);
    assert_eq!(store.get(b).unwrap().balance(), start_b - moved[1] + moved[0]);
}
