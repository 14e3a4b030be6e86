//! Bounded concurrency with a per-permit cool-down
//!
//! A [`BoundedPool`] caps in-flight work at N permits. When a cool-down is
//! set, each permit is held for that long after its task finishes, so
//! consecutive requests through the same slot are spaced out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Semaphore-backed limiter
#[derive(Debug, Clone)]
pub struct BoundedPool {
    semaphore: Arc<Semaphore>,
    permits: usize,
    cooldown: Duration,
}

impl BoundedPool {
    /// Create pool with `permits` slots (at least one) and no cool-down
    #[must_use]
    pub fn new(permits: usize) -> Self {
        let permits = permits.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            permits,
            cooldown: Duration::ZERO,
        }
    }

    /// With cool-down held after each task
    #[inline]
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Number of slots
    #[inline]
    #[must_use]
    pub fn permits(&self) -> usize {
        self.permits
    }

    /// Slots currently free
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Run `task` once a slot is free
    pub async fn run<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is never closed, so acquisition only waits.
        let permit = self.semaphore.acquire().await;
        let out = task.await;
        if !self.cooldown.is_zero() {
            tokio::time::sleep(self.cooldown).await;
        }
        drop(permit);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_permits() {
        let pool = BoundedPool::new(3);
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let tasks = (0..10).map(|_| {
            pool.run(async {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            })
        });
        join_all(tasks).await;

        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(pool.available(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_spaces_groups() {
        let pool = BoundedPool::new(3).with_cooldown(Duration::from_millis(150));
        let start = Instant::now();

        // Six instant tasks through three slots: the second wave waits one cool-down.
        join_all((0..6).map(|_| pool.run(async {}))).await;

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(450));
    }

    #[test]
    fn zero_permits_is_one() {
        assert_eq!(BoundedPool::new(0).permits(), 1);
    }
}
