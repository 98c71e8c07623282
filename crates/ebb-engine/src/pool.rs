//! The processor pool: a counting semaphore rationing phase execution.
//!
//! The pool bounds how many phase callables run simultaneously across a
//! parent and its children. A domain acquires one permit when it enters
//! a phase and releases it when the phase completes, before it tries to
//! enter the next one, so the pool size governs inter-domain parallelism
//! independently of how many worker threads exist.

use std::sync::{Condvar, Mutex};

/// Counting semaphore over a fixed processor budget.
///
/// `acquire` is not FIFO and no fairness is promised; freedom from
/// starvation comes from the phasing invariants, not from the pool.
#[derive(Debug)]
pub struct Pool {
    n_procs: u32,
    remaining: Mutex<u32>,
    available: Condvar,
}

impl Pool {
    /// Create a pool with `n_procs` permits.
    ///
    /// # Panics
    ///
    /// Panics if `n_procs` is zero; a zero-permit pool could never hand
    /// out a permit.
    pub fn new(n_procs: u32) -> Self {
        assert!(n_procs > 0, "pool needs at least one processor");
        Self {
            n_procs,
            remaining: Mutex::new(n_procs),
            available: Condvar::new(),
        }
    }

    /// The configured budget.
    pub fn n_procs(&self) -> u32 {
        self.n_procs
    }

    /// Permits currently free.
    pub fn remaining(&self) -> u32 {
        *self.remaining.lock().expect("pool mutex poisoned")
    }

    /// Take one permit, blocking while none is free.
    pub fn acquire(&self) {
        let mut remaining = self.remaining.lock().expect("pool mutex poisoned");
        while *remaining == 0 {
            remaining = self
                .available
                .wait(remaining)
                .expect("pool mutex poisoned");
        }
        *remaining -= 1;
    }

    /// Return one permit and wake one waiter.
    pub fn release(&self) {
        let mut remaining = self.remaining.lock().expect("pool mutex poisoned");
        *remaining += 1;
        debug_assert!(
            *remaining <= self.n_procs,
            "more permits released than acquired"
        );
        self.available.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn permits_start_at_budget() {
        let pool = Pool::new(3);
        assert_eq!(pool.n_procs(), 3);
        assert_eq!(pool.remaining(), 3);
    }

    #[test]
    fn acquire_release_round_trip() {
        let pool = Pool::new(2);
        pool.acquire();
        pool.acquire();
        assert_eq!(pool.remaining(), 0);
        pool.release();
        assert_eq!(pool.remaining(), 1);
        pool.release();
        assert_eq!(pool.remaining(), 2);
    }

    #[test]
    #[should_panic(expected = "at least one processor")]
    fn zero_budget_is_rejected() {
        let _ = Pool::new(0);
    }

    #[test]
    fn exhausted_pool_blocks_until_release() {
        let pool = Arc::new(Pool::new(1));
        pool.acquire();

        let acquired = Arc::new(AtomicBool::new(false));
        let waiter = {
            let pool = Arc::clone(&pool);
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                pool.acquire();
                acquired.store(true, Ordering::SeqCst);
                pool.release();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!acquired.load(Ordering::SeqCst), "waiter should block");

        pool.release();
        waiter.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
        assert_eq!(pool.remaining(), 1);
    }

    #[test]
    fn remaining_stays_within_bounds_under_contention() {
        let pool = Arc::new(Pool::new(2));
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..100 {
                        pool.acquire();
                        let free = pool.remaining();
                        assert!(free <= 2, "remaining {free} exceeds budget");
                        pool.release();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(pool.remaining(), 2);
    }
}
