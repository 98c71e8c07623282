//! Micro-benchmarks of the synchronization primitives on the phase
//! barrier's hot path: pool permit traffic, control point updates, and
//! the modular gap predicate.

use std::hint::black_box;
use std::thread;

use criterion::{criterion_group, criterion_main, Criterion};

use ebb_bench::{registered_control, shared_pool};
use ebb_engine::modular_gap;

fn pool_uncontended(c: &mut Criterion) {
    let pool = shared_pool(4);
    c.bench_function("pool_acquire_release", |b| {
        b.iter(|| {
            pool.acquire();
            pool.release();
        })
    });
}

fn pool_contended(c: &mut Criterion) {
    c.bench_function("pool_acquire_release_contended", |b| {
        b.iter(|| {
            let pool = shared_pool(2);
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    let pool = pool.clone();
                    thread::spawn(move || {
                        for _ in 0..100 {
                            pool.acquire();
                            pool.release();
                        }
                    })
                })
                .collect();
            for worker in workers {
                worker.join().unwrap();
            }
        })
    });
}

fn control_point_cycle(c: &mut Criterion) {
    let cp = registered_control(3);
    c.bench_function("control_increment_mark_done", |b| {
        b.iter(|| {
            cp.increment();
            cp.mark_done();
            black_box(cp.val());
        })
    });
}

fn gap_predicate(c: &mut Criterion) {
    let parent = registered_control(3);
    let child = registered_control(3);
    parent.increment();
    c.bench_function("modular_gap_reads", |b| {
        b.iter(|| {
            let gap = modular_gap(3, child.val(), parent.val());
            black_box(gap == 1 && parent.is_done());
        })
    });
}

criterion_group!(
    benches,
    pool_uncontended,
    pool_contended,
    control_point_cycle,
    gap_predicate
);
criterion_main!(benches);
