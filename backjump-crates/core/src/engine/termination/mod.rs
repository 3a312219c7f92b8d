//! Cooperative limits for a search loop built on the [`State`](crate::State).
//!
//! Nothing inside the kernel can be interrupted; a search loop polls
//! [`TerminationCondition::should_stop`] between decisions and reports what it did through the
//! other hooks.
mod budgets;
mod combinator;
mod indefinite;

pub use budgets::ConflictBudget;
pub use budgets::DecisionBudget;
pub use budgets::TimeBudget;
pub use combinator::Combinator;
pub use indefinite::Indefinite;

/// Determines when a search loop should give up.
pub trait TerminationCondition {
    /// Returns `true` when the search should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;

    fn decision_has_been_made(&mut self) {}

    fn conflict_has_been_analysed(&mut self) {}
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        self.as_mut().is_some_and(T::should_stop)
    }

    fn decision_has_been_made(&mut self) {
        if let Some(condition) = self {
            condition.decision_has_been_made();
        }
    }

    fn conflict_has_been_analysed(&mut self) {
        if let Some(condition) = self {
            condition.conflict_has_been_analysed();
        }
    }
}
