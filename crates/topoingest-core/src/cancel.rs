//! Cooperative cancellation
//!
//! The pipeline polls a [`CancellationCheck`] at unit boundaries only. Nothing
//! is ever interrupted mid-unit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Source of the cooperative stop signal
pub trait CancellationCheck: Send + Sync {
    /// True once work should stop
    fn is_cancelled(&self) -> bool;
}

/// Never requests cancellation
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancellationCheck for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancellationCheck for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: CancellationCheck + ?Sized> CancellationCheck for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_cancel() {
        assert!(!NeverCancel.is_cancelled());
    }

    #[test]
    fn test_atomic_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let check: Arc<dyn CancellationCheck> = flag.clone();
        assert!(!check.is_cancelled());
        flag.store(true, Ordering::Release);
        assert!(check.is_cancelled());
    }
}
