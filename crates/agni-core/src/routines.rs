use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

/// Tracks outstanding background tasks ("routine tokens"), the Rust
/// equivalent of the source's wait-group plus `no_of_routines` counter,
/// both mutated under one mutex so the two never drift apart (`spec.md` §3
/// invariant: `no_of_routines` equals exactly the number of outstanding
/// wait-group tokens at any consistent observation point).
///
/// A long-lived task calls [`RoutineTracker::add`], gets back a
/// [`RoutineGuard`], and holds it for the task's lifetime; dropping the
/// guard releases the token on every exit path, including panic unwinding,
/// matching the source's deferred `Remove_Routine` inside a `recover()`
/// block.
#[derive(Debug, Default)]
pub struct RoutineTracker {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    count: Mutex<u16>,
    notify: Notify,
}

impl RoutineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Add_Routine`
    pub fn add(&self) -> RoutineGuard {
        let mut count = self.inner.count.lock();
        *count += 1;
        RoutineGuard {
            inner: Arc::clone(&self.inner),
            released: false,
        }
    }

    /// `no_of_routines`
    pub fn count(&self) -> u16 {
        *self.inner.count.lock()
    }

    /// `WaitforClose` — blocks until every outstanding routine token has
    /// been released.
    pub async fn wait_for_close(&self) {
        loop {
            // Register interest before checking the count: `notify_waiters`
            // leaves no permit for a later `notified()` call, so checking
            // first would lose the wakeup if the last guard dropped between
            // the check and the await.
            let notified = self.inner.notify.notified();
            if *self.inner.count.lock() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// RAII handle returned by [`RoutineTracker::add`]. Dropping it is
/// equivalent to calling `Remove_Routine`.
#[derive(Debug)]
pub struct RoutineGuard {
    inner: Arc<Inner>,
    released: bool,
}

impl RoutineGuard {
    /// Explicit `Remove_Routine`. Also runs on drop if not called directly.
    pub fn release(mut self) {
        self.do_release();
    }

    fn do_release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut count = self.inner.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.inner.notify.notify_waiters();
        }
    }
}

impl Drop for RoutineGuard {
    fn drop(&mut self) {
        self.do_release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_for_close_returns_immediately_with_no_routines() {
        let tracker = RoutineTracker::new();
        tracker.wait_for_close().await;
    }

    #[tokio::test]
    async fn wait_for_close_blocks_until_every_guard_drops() {
        let tracker = RoutineTracker::new();
        let g1 = tracker.add();
        let g2 = tracker.add();
        assert_eq!(tracker.count(), 2);

        let tracker2 = RoutineTracker { inner: Arc::clone(&tracker.inner) };
        let waiter = tokio::spawn(async move {
            tracker2.wait_for_close().await;
        });

        tokio::task::yield_now().await;
        drop(g1);
        tokio::task::yield_now().await;
        assert_eq!(tracker.count(), 1);
        drop(g2);

        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("wait_for_close should resolve after last guard drops")
            .unwrap();
        assert_eq!(tracker.count(), 0);
    }

    #[tokio::test]
    async fn explicit_release_does_not_double_decrement_on_drop() {
        let tracker = RoutineTracker::new();
        let g = tracker.add();
        g.release();
        assert_eq!(tracker.count(), 0);
    }
}
