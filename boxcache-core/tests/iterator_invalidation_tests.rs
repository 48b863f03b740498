use std::sync::Arc;
use std::thread;
use std::time::Duration;

use boxcache_core::{Cache, CacheError};

/// An iterator created before a concurrent insert lands must fail the whole
/// iteration rather than silently mixing pre- and post-mutation state.
#[test]
fn iterator_fails_fast_when_another_thread_mutates_mid_iteration() {
    let cache: Arc<Cache<u32, u32>> = Arc::new(Cache::fifo(100));
    for i in 0..50 {
        cache.insert(i, i).unwrap();
    }

    let mutator_cache = cache.clone();
    let mutator = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        mutator_cache.insert(999, 999).unwrap();
    });

    let mut saw_error = false;
    let mut consumed = 0;
    for item in cache.iter() {
        match item {
            Ok(_) => {
                consumed += 1;
                thread::sleep(Duration::from_millis(1));
            }
            Err(CacheError::ConcurrentModification) => {
                saw_error = true;
                break;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    mutator.join().unwrap();
    assert!(saw_error, "expected iteration to observe a concurrent mutation (consumed {consumed} items first)");
}

/// An iterator that runs to completion with no intervening mutation yields
/// every live entry exactly once, independent of which ordering helper is
/// also being called concurrently on other threads.
#[test]
fn iterator_is_unaffected_by_concurrent_reads() {
    let cache: Arc<Cache<u32, u32>> = Arc::new(Cache::lru(30));
    for i in 0..30 {
        cache.insert(i, i * 2).unwrap();
    }

    let reader_cache = cache.clone();
    let reader = thread::spawn(move || {
        for _ in 0..200 {
            let _ = reader_cache.get(&0);
            let _ = reader_cache.most_recently_used();
        }
    });

    let items: Result<Vec<_>, _> = cache.iter().collect();
    reader.join().unwrap();

    let items = items.expect("no mutation occurred, iteration must succeed");
    assert_eq!(items.len(), 30);
}
