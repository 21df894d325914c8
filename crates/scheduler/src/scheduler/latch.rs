use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Counting join: opens once `count_down` has been called `count` times.
///
/// Completions are signalled through [`CompletionGuard`], which counts down
/// when dropped, so a completion is recorded on every exit path of the
/// code holding it, including unwinding.
#[derive(Debug)]
pub struct CompletionLatch {
    remaining: Mutex<usize>,
    opened: Condvar,
}

impl CompletionLatch {
    pub fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            remaining: Mutex::new(count),
            opened: Condvar::new(),
        })
    }

    /// Take one completion slot. Dropping the guard signals completion.
    pub fn guard(self: &Arc<Self>) -> CompletionGuard {
        CompletionGuard {
            latch: Arc::clone(self),
        }
    }

    pub fn remaining(&self) -> usize {
        *self.lock()
    }

    /// Block until every completion has been signalled.
    pub fn wait(&self) {
        let mut remaining = self.lock();
        while *remaining > 0 {
            remaining = self
                .opened
                .wait(remaining)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn count_down(&self) {
        let mut remaining = self.lock();
        // Saturating: more guards than the initial count is a caller bug,
        // but must not wrap and leave waiters blocked forever.
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.opened.notify_all();
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Signals one completion on its latch when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard immediately signals completion"]
pub struct CompletionGuard {
    latch: Arc<CompletionLatch>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.latch.count_down();
    }
}

#[cfg(test)]
mod tests {
    use std::panic;
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn zero_count_is_open() {
        let latch = CompletionLatch::new(0);
        latch.wait();
        assert_eq!(latch.remaining(), 0);
    }

    #[test]
    fn waits_for_every_guard() {
        let latch = CompletionLatch::new(3);
        let started = Instant::now();

        for i in 0..3u64 {
            let guard = latch.guard();
            thread::spawn(move || {
                let _done = guard;
                thread::sleep(Duration::from_millis(20 * (i + 1)));
            });
        }

        latch.wait();
        assert_eq!(latch.remaining(), 0);
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn guard_counts_down_on_panic() {
        let latch = CompletionLatch::new(1);
        let guard = latch.guard();

        let handle = thread::spawn(move || {
            let _done = guard;
            panic!("worker died");
        });

        latch.wait();
        assert!(handle.join().is_err());
    }

    #[test]
    fn guard_dropped_unused_still_counts() {
        let latch = CompletionLatch::new(2);
        drop(latch.guard());
        assert_eq!(latch.remaining(), 1);

        let caught = panic::catch_unwind(|| {
            let _g = latch.guard();
            panic!("unwinding");
        });
        assert!(caught.is_err());
        assert_eq!(latch.remaining(), 0);
    }

    #[test]
    fn extra_guards_saturate() {
        let latch = CompletionLatch::new(1);
        drop(latch.guard());
        drop(latch.guard());
        assert_eq!(latch.remaining(), 0);
        latch.wait();
    }
}
