//! Re-entrancy guard around synthetic replays
//!
//! While held, the controller lets every qualifying event through untouched.
//! That is what keeps its own replayed click from being captured again.

use std::cell::Cell;
use std::rc::Rc;

/// Shared `reemitting` flag; clones observe the same state
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    reemitting: Rc<Cell<bool>>,
}

/// Clears the flag when dropped, including during unwinding
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct GuardToken {
    reemitting: Rc<Cell<bool>>,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.reemitting.set(false);
    }
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reemitting(&self) -> bool {
        self.reemitting.get()
    }

    /// Set the flag until the returned token is dropped
    pub fn acquire(&self) -> GuardToken {
        self.reemitting.set(true);
        GuardToken {
            reemitting: Rc::clone(&self.reemitting),
        }
    }

    /// Run `dispatch` with the flag set
    pub fn hold<R>(&self, dispatch: impl FnOnce() -> R) -> R {
        let _token = self.acquire();
        dispatch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_hold_sets_and_clears() {
        let guard = ReentrancyGuard::new();
        let seen = guard.hold(|| guard.is_reemitting());
        assert!(seen);
        assert!(!guard.is_reemitting());
    }

    #[test]
    fn test_clones_share_state() {
        let guard = ReentrancyGuard::new();
        let observer = guard.clone();
        let _token = guard.acquire();
        assert!(observer.is_reemitting());
    }

    #[test]
    fn test_cleared_when_dispatch_panics() {
        let guard = ReentrancyGuard::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            guard.hold(|| panic!("dispatch failed"));
        }));
        assert!(result.is_err());
        assert!(!guard.is_reemitting());
    }
}
