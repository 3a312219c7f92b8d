use std::time::Duration;
use std::time::Instant;

use super::TerminationCondition;

/// Stops once the given number of decisions has been made.
#[derive(Clone, Copy, Debug)]
pub struct DecisionBudget {
    budget: u64,
    num_decisions: u64,
}

impl DecisionBudget {
    pub fn new(budget: u64) -> Self {
        DecisionBudget {
            budget,
            num_decisions: 0,
        }
    }
}

impl TerminationCondition for DecisionBudget {
    fn should_stop(&mut self) -> bool {
        self.num_decisions >= self.budget
    }

    fn decision_has_been_made(&mut self) {
        self.num_decisions += 1;
    }
}

/// Stops once the given number of conflicts has been analysed.
#[derive(Clone, Copy, Debug)]
pub struct ConflictBudget {
    budget: u64,
    num_conflicts: u64,
}

impl ConflictBudget {
    pub fn new(budget: u64) -> Self {
        ConflictBudget {
            budget,
            num_conflicts: 0,
        }
    }
}

impl TerminationCondition for ConflictBudget {
    fn should_stop(&mut self) -> bool {
        self.num_conflicts >= self.budget
    }

    fn conflict_has_been_analysed(&mut self) {
        self.num_conflicts += 1;
    }
}

/// Stops once the time budget, measured from creation, is used up.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    started_at: Instant,
    budget: Duration,
}

impl TimeBudget {
    pub fn starting_now(budget: Duration) -> TimeBudget {
        TimeBudget {
            started_at: Instant::now(),
            budget,
        }
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&mut self) -> bool {
        self.started_at.elapsed() >= self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_budget_counts_decisions_only() {
        let mut budget = DecisionBudget::new(2);
        budget.conflict_has_been_analysed();
        budget.decision_has_been_made();
        assert!(!budget.should_stop());

        budget.decision_has_been_made();
        assert!(budget.should_stop());
    }

    #[test]
    fn conflict_budget_counts_conflicts_only() {
        let mut budget = ConflictBudget::new(1);
        budget.decision_has_been_made();
        assert!(!budget.should_stop());

        budget.conflict_has_been_analysed();
        assert!(budget.should_stop());
    }

    #[test]
    fn zero_time_budget_is_exhausted_immediately() {
        let mut budget = TimeBudget::starting_now(Duration::ZERO);
        assert!(budget.should_stop());
    }
}
