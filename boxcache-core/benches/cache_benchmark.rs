use boxcache_core::Cache;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::thread;

fn bench_insert_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_sequential");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("FIFO", size), size, |b, &size| {
            b.iter(|| {
                let cache: Cache<String, i32> = Cache::fifo(size);
                for i in 0..size {
                    cache.insert(format!("key{}", i), black_box(i as i32)).unwrap();
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("LRU", size), size, |b, &size| {
            b.iter(|| {
                let cache: Cache<String, i32> = Cache::lru(size);
                for i in 0..size {
                    cache.insert(format!("key{}", i), black_box(i as i32)).unwrap();
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("LFU", size), size, |b, &size| {
            b.iter(|| {
                let cache: Cache<String, i32> = Cache::lfu(size);
                for i in 0..size {
                    cache.insert(format!("key{}", i), black_box(i as i32)).unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_get_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_sequential");

    for size in [10, 100, 1000].iter() {
        let cache: Cache<String, i32> = Cache::fifo(*size);
        for i in 0..*size {
            cache.insert(format!("key{}", i), i as i32).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("FIFO", size), size, |b, &size| {
            b.iter(|| {
                for i in 0..size {
                    black_box(cache.get(&format!("key{}", i)));
                }
            });
        });

        let lru_cache: Cache<String, i32> = Cache::lru(*size);
        for i in 0..*size {
            lru_cache.insert(format!("key{}", i), i as i32).unwrap();
        }

        group.bench_with_input(BenchmarkId::new("LRU", size), size, |b, &size| {
            b.iter(|| {
                for i in 0..size {
                    black_box(lru_cache.get(&format!("key{}", i)));
                }
            });
        });
    }

    group.finish();
}

fn bench_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");

    for num_threads in [2, 4, 8].iter() {
        let cache: Arc<Cache<String, i32>> = Arc::new(Cache::fifo(100));
        for i in 0..100 {
            cache.insert(format!("key{}", i), i as i32).unwrap();
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let cache = cache.clone();
                            thread::spawn(move || {
                                for i in 0..100 {
                                    black_box(cache.get(&format!("key{}", i % 100)));
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_concurrent_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_mixed");

    for num_threads in [2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let cache: Arc<Cache<String, i32>> = Arc::new(Cache::fifo(100));
                    let handles: Vec<_> = (0..num_threads)
                        .map(|thread_id| {
                            let cache = cache.clone();
                            thread::spawn(move || {
                                for i in 0..50 {
                                    if i % 2 == 0 {
                                        let _ = cache.insert(
                                            format!("key{}", thread_id * 50 + i),
                                            black_box(i as i32),
                                        );
                                    } else {
                                        black_box(cache.get(&format!("key{}", thread_id * 50 + i)));
                                    }
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction");

    group.bench_function("FIFO_eviction", |b| {
        b.iter(|| {
            let cache: Cache<String, i32> = Cache::fifo(50);
            for i in 0..100 {
                let _ = cache.insert(format!("key{}", i), black_box(i as i32));
            }
        });
    });

    group.bench_function("LRU_eviction", |b| {
        b.iter(|| {
            let cache: Cache<String, i32> = Cache::lru(50);
            for i in 0..100 {
                let _ = cache.insert(format!("key{}", i), black_box(i as i32));
            }
        });
    });

    group.bench_function("LFU_eviction", |b| {
        b.iter(|| {
            let cache: Cache<String, i32> = Cache::lfu(50);
            for i in 0..100 {
                let _ = cache.insert(format!("key{}", i), black_box(i as i32));
            }
        });
    });

    group.bench_function("RR_eviction", |b| {
        b.iter(|| {
            let cache: Cache<String, i32> = Cache::rr(50);
            for i in 0..100 {
                let _ = cache.insert(format!("key{}", i), black_box(i as i32));
            }
        });
    });

    group.finish();
}

fn bench_rwlock_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("rwlock_concurrent_reads");

    let cache: Arc<Cache<String, i32>> = Arc::new(Cache::fifo(1000));
    for i in 0..1000 {
        cache.insert(format!("key{}", i), i as i32).unwrap();
    }

    for num_threads in [2, 4, 8, 16].iter() {
        group.bench_with_input(
            BenchmarkId::new("pure_reads", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let cache = cache.clone();
                            thread::spawn(move || {
                                for i in 0..100 {
                                    black_box(cache.get(&format!("key{}", i)));
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_read_heavy_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_heavy_workload");

    for num_threads in [2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::new("90_read_10_write", num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let cache: Arc<Cache<String, i32>> = Arc::new(Cache::fifo(100));
                    let handles: Vec<_> = (0..num_threads)
                        .map(|thread_id| {
                            let cache = cache.clone();
                            thread::spawn(move || {
                                for i in 0..100 {
                                    if i % 10 == 0 {
                                        let _ = cache.insert(
                                            format!("key{}", thread_id * 100 + i),
                                            black_box(i as i32),
                                        );
                                    } else {
                                        black_box(cache.get(&format!("key{}", i % 50)));
                                    }
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_memoize_single_flight(c: &mut Criterion) {
    use boxcache_core::Cached;

    let mut group = c.benchmark_group("memoize_single_flight");

    for num_threads in [2, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            num_threads,
            |b, &num_threads| {
                b.iter(|| {
                    let cached = Arc::new(Cached::<i32, i32>::new(Cache::lru(64)));
                    let handles: Vec<_> = (0..num_threads)
                        .map(|_| {
                            let cached = cached.clone();
                            thread::spawn(move || {
                                cached.call::<_, String>(black_box(7), || Ok(49))
                            })
                        })
                        .collect();

                    for handle in handles {
                        handle.join().unwrap().unwrap();
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_sequential,
    bench_get_sequential,
    bench_concurrent_reads,
    bench_concurrent_mixed,
    bench_eviction,
    bench_rwlock_concurrent_reads,
    bench_read_heavy_workload,
    bench_memoize_single_flight
);
criterion_main!(benches);
