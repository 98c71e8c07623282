//! The phase barrier shared by a parent domain and its children.
//!
//! The parent owns the bundle: one mutex, one condition variable per
//! side, the processor pool, and read-only views of every child's
//! control point. Children hold `Arc` clones; the project guarantees
//! the parent outlives them.
//!
//! Wait predicates, with `gap(a, b)` the modular gap from `a` to `b`:
//!
//! - the parent may enter its next phase once `gap(parent, child) == 0`
//!   for every child, i.e. no child is still working a full cycle
//!   behind;
//! - a child may enter once `gap(child, parent) > 1`, or
//!   `gap(child, parent) == 1` and the parent has completed its current
//!   phase. A parent two or more phases ahead has necessarily entered
//!   the intermediate phase, and entering a phase implies completing the
//!   one before it; the only completion ever in question is the
//!   parent's current phase, which the `== 1` arm checks.
//!
//! Together the predicates keep the modular gap between parent and child
//! in `{0, 1}` at every synchronization point and bound the absolute lag
//! to one timestep in either direction.
//!
//! Lock ordering: `enter` acquires a pool permit while still holding the
//! barrier mutex, but `complete` releases its permit *before* taking the
//! mutex. A permit-starved waiter inside `enter` can therefore always be
//! unblocked by a completing sibling; no cycle exists.

use std::sync::{Arc, Condvar, Mutex};

use crate::control::{modular_gap, ControlPoint};
use crate::pool::Pool;

/// Parent-owned synchronization bundle.
#[derive(Debug)]
pub(crate) struct Barrier {
    lock: Mutex<()>,
    /// The parent waits here; children signal it.
    cv_parent: Condvar,
    /// Children wait here; the parent signals them.
    cv_children: Condvar,
    pool: Pool,
    /// Control points of the children, in project order.
    children: Vec<Arc<ControlPoint>>,
}

impl Barrier {
    /// Build the bundle for a parent with the given pool size and child
    /// control points. The child list is fixed at construction.
    pub(crate) fn new(pool_size: u32, children: Vec<Arc<ControlPoint>>) -> Self {
        Self {
            lock: Mutex::new(()),
            cv_parent: Condvar::new(),
            cv_children: Condvar::new(),
            pool: Pool::new(pool_size),
            children,
        }
    }

    /// The shared processor pool.
    #[cfg(test)]
    pub(crate) fn pool(&self) -> &Pool {
        &self.pool
    }

    fn children_caught_up(&self, parent: &ControlPoint) -> bool {
        let ncp = parent.ncp();
        let pval = parent.val();
        self.children
            .iter()
            .all(|child| modular_gap(ncp, pval, child.val()) == 0)
    }

    fn parent_far_enough_ahead(child: &ControlPoint, parent: &ControlPoint) -> bool {
        let gap = modular_gap(child.ncp(), child.val(), parent.val());
        gap > 1 || (gap == 1 && parent.is_done())
    }

    /// Parent side of `phase_check`: wait for every child to catch up,
    /// advance, wake the children, and take a permit.
    pub(crate) fn parent_enter(&self, parent: &ControlPoint) {
        let mut guard = self.lock.lock().expect("barrier mutex poisoned");
        while !self.children_caught_up(parent) {
            guard = self.cv_parent.wait(guard).expect("barrier mutex poisoned");
        }
        parent.increment();
        self.cv_children.notify_all();
        // Still holding the mutex: completing domains release their
        // permit without touching it, so this cannot deadlock.
        self.pool.acquire();
    }

    /// Child side of `phase_check`: wait for the parent to pull ahead,
    /// advance, wake the parent, and take a permit.
    pub(crate) fn child_enter(&self, child: &ControlPoint, parent: &ControlPoint) {
        let mut guard = self.lock.lock().expect("barrier mutex poisoned");
        while !Self::parent_far_enough_ahead(child, parent) {
            guard = self
                .cv_children
                .wait(guard)
                .expect("barrier mutex poisoned");
        }
        child.increment();
        self.cv_parent.notify_one();
        self.pool.acquire();
    }

    /// Parent side of `complete_phase`.
    pub(crate) fn parent_complete(&self, parent: &ControlPoint) {
        self.pool.release();
        let _guard = self.lock.lock().expect("barrier mutex poisoned");
        parent.mark_done();
        self.cv_children.notify_all();
    }

    /// Child side of `complete_phase`.
    pub(crate) fn child_complete(&self, child: &ControlPoint) {
        self.pool.release();
        let _guard = self.lock.lock().expect("barrier mutex poisoned");
        child.mark_done();
        self.cv_parent.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebb_model::PhaseCounter;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    fn control_with_phases(n: u32) -> Arc<ControlPoint> {
        let cp = Arc::new(ControlPoint::new());
        for _ in 0..n {
            cp.register_phase();
        }
        cp
    }

    #[test]
    fn parent_without_waiting_children_passes_immediately() {
        let parent = control_with_phases(2);
        let child = control_with_phases(2);
        let barrier = Barrier::new(2, vec![child]);
        // Fresh control points have gap 0: the very first parent check
        // must pass without blocking.
        barrier.parent_enter(&parent);
        assert_eq!(parent.val(), 0);
        assert!(!parent.is_done());
        assert_eq!(barrier.pool().remaining(), 1);
        barrier.parent_complete(&parent);
        assert!(parent.is_done());
        assert_eq!(barrier.pool().remaining(), 2);
    }

    /// The wrap scenario: ncp = 3, both sides at the initial state.
    /// The child must wait through the parent's first phase: while the
    /// gap is 0, and while the gap is 1 but the parent is not done.
    #[test]
    fn child_waits_for_gap_and_parent_completion() {
        let parent = control_with_phases(3);
        let child = control_with_phases(3);
        let barrier = Arc::new(Barrier::new(2, vec![Arc::clone(&child)]));

        let passed = Arc::new(AtomicBool::new(false));
        let waiter = {
            let barrier = Arc::clone(&barrier);
            let child = Arc::clone(&child);
            let parent = Arc::clone(&parent);
            let passed = Arc::clone(&passed);
            thread::spawn(move || {
                barrier.child_enter(&child, &parent);
                passed.store(true, Ordering::SeqCst);
            })
        };

        // Gap 0: the child must hold.
        thread::sleep(Duration::from_millis(50));
        assert!(!passed.load(Ordering::SeqCst), "child passed at gap 0");

        // Parent advances but has not completed: gap 1, still holding.
        barrier.parent_enter(&parent);
        thread::sleep(Duration::from_millis(50));
        assert!(
            !passed.load(Ordering::SeqCst),
            "child passed before parent completed"
        );

        // Parent completes: gap 1 with done(parent), the child may go.
        barrier.parent_complete(&parent);
        waiter.join().unwrap();
        assert!(passed.load(Ordering::SeqCst));
        assert_eq!(child.val(), 0);
    }

    #[test]
    fn parent_waits_for_lagging_child() {
        let parent = control_with_phases(2);
        let child = control_with_phases(2);
        let barrier = Arc::new(Barrier::new(2, vec![Arc::clone(&child)]));

        // Parent runs a full phase; the child never moves. The parent's
        // next check sees gap(parent, child) == 1 and must hold.
        barrier.parent_enter(&parent);
        barrier.parent_complete(&parent);

        let passed = Arc::new(AtomicBool::new(false));
        let waiter = {
            let barrier = Arc::clone(&barrier);
            let parent = Arc::clone(&parent);
            let passed = Arc::clone(&passed);
            thread::spawn(move || {
                barrier.parent_enter(&parent);
                passed.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(
            !passed.load(Ordering::SeqCst),
            "parent passed while child lagged"
        );

        // Child catches up; its enter wakes the parent.
        barrier.child_enter(&child, &parent);
        waiter.join().unwrap();
        assert!(passed.load(Ordering::SeqCst));
        barrier.child_complete(&child);
        barrier.parent_complete(&parent);
    }
}
