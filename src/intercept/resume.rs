//! Resume strategies: performing the user's original action after a rewrite
//!
//! Strategies are tried in order. The preferred one invokes the host
//! framework's handler directly; the fallback replays a click under the
//! re-entrancy guard.

use super::guard::ReentrancyGuard;

/// Result of one resume attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeOutcome {
    /// The original action was started
    Resumed,
    /// The capability this strategy needs is missing; try the next one
    Unavailable,
}

pub trait ResumeStrategy {
    /// Short name for diagnostics
    fn label(&self) -> &'static str;

    /// Check for the capability and, if present, start the original action.
    ///
    /// Strategies that dispatch synthetic events must do so inside
    /// `guard.hold(..)`.
    fn resume(&self, guard: &ReentrancyGuard) -> ResumeOutcome;
}

/// First strategy that resumes wins; `None` when every strategy came up empty
pub fn resume_with(
    strategies: &[Box<dyn ResumeStrategy>],
    guard: &ReentrancyGuard,
) -> Option<&'static str> {
    strategies
        .iter()
        .find(|strategy| strategy.resume(guard) == ResumeOutcome::Resumed)
        .map(|strategy| strategy.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Scripted {
        label: &'static str,
        available: bool,
        calls: Rc<Cell<u32>>,
    }

    impl ResumeStrategy for Scripted {
        fn label(&self) -> &'static str {
            self.label
        }

        fn resume(&self, _guard: &ReentrancyGuard) -> ResumeOutcome {
            self.calls.set(self.calls.get() + 1);
            if self.available {
                ResumeOutcome::Resumed
            } else {
                ResumeOutcome::Unavailable
            }
        }
    }

    fn scripted(label: &'static str, available: bool, calls: &Rc<Cell<u32>>) -> Box<dyn ResumeStrategy> {
        Box::new(Scripted {
            label,
            available,
            calls: Rc::clone(calls),
        })
    }

    #[test]
    fn test_preferred_strategy_short_circuits() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let strategies = vec![scripted("direct", true, &first), scripted("replay", true, &second)];
        assert_eq!(resume_with(&strategies, &ReentrancyGuard::new()), Some("direct"));
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);
    }

    #[test]
    fn test_falls_back_in_order() {
        let calls = Rc::new(Cell::new(0));
        let strategies = vec![scripted("direct", false, &calls), scripted("replay", true, &calls)];
        assert_eq!(resume_with(&strategies, &ReentrancyGuard::new()), Some("replay"));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_no_strategy_available() {
        let calls = Rc::new(Cell::new(0));
        let strategies = vec![scripted("direct", false, &calls)];
        assert_eq!(resume_with(&strategies, &ReentrancyGuard::new()), None);
        assert_eq!(resume_with(&[], &ReentrancyGuard::new()), None);
    }
}
