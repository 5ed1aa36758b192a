//! Keeping the device awake while foreground sharing runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Platform wake lock.
pub trait WakeLock: Send + Sync + 'static {
    /// Keeps the device awake.
    fn acquire(&self);
    /// Lets the device sleep again.
    fn release(&self);
}

/// Wake lock that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWakeLock;

impl WakeLock for NoopWakeLock {
    fn acquire(&self) {}
    fn release(&self) {}
}

/// Holds an acquired [`WakeLock`] and releases it exactly once.
///
/// Released by [`WakeLockGuard::release`] or on drop, whichever happens first.
pub struct WakeLockGuard {
    lock: Arc<dyn WakeLock>,
    released: AtomicBool,
}

impl WakeLockGuard {
    /// Acquires `lock`.
    pub fn acquire(lock: Arc<dyn WakeLock>) -> Self {
        lock.acquire();
        tracing::debug!("wake lock acquired");
        Self {
            lock,
            released: AtomicBool::new(false),
        }
    }

    /// Releases the lock; later calls do nothing.
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.lock.release();
            tracing::debug!("wake lock released");
        }
    }

    /// True once released.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Drop for WakeLockGuard {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counting {
        acquired: AtomicUsize,
        released: AtomicUsize,
    }

    impl WakeLock for Counting {
        fn acquire(&self) {
            self.acquired.fetch_add(1, Ordering::SeqCst);
        }
        fn release(&self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn releases_once() {
        let lock = Arc::new(Counting::default());
        let guard = WakeLockGuard::acquire(lock.clone());
        guard.release();
        guard.release();
        assert!(guard.is_released());
        drop(guard);
        assert_eq!(lock.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(lock.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases() {
        let lock = Arc::new(Counting::default());
        drop(WakeLockGuard::acquire(lock.clone()));
        assert_eq!(lock.released.load(Ordering::SeqCst), 1);
    }
}
