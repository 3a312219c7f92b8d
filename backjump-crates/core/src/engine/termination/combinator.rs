use super::TerminationCondition;

/// Stops as soon as either of two conditions does; both are kept informed of every decision and
/// conflict.
#[derive(Clone, Copy, Debug)]
pub struct Combinator<First, Second> {
    first: First,
    second: Second,
}

impl<First, Second> Combinator<First, Second> {
    pub fn new(first: First, second: Second) -> Self {
        Combinator { first, second }
    }
}

impl<First: TerminationCondition, Second: TerminationCondition> TerminationCondition
    for Combinator<First, Second>
{
    fn should_stop(&mut self) -> bool {
        // Both are polled so that neither misses a poll.
        let first = self.first.should_stop();
        let second = self.second.should_stop();
        first || second
    }

    fn decision_has_been_made(&mut self) {
        self.first.decision_has_been_made();
        self.second.decision_has_been_made();
    }

    fn conflict_has_been_analysed(&mut self) {
        self.first.conflict_has_been_analysed();
        self.second.conflict_has_been_analysed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::termination::ConflictBudget;
    use crate::engine::termination::DecisionBudget;
    use crate::engine::termination::Indefinite;

    #[test]
    fn stops_when_either_side_stops() {
        let mut combined = Combinator::new(DecisionBudget::new(5), ConflictBudget::new(1));
        assert!(!combined.should_stop());

        combined.conflict_has_been_analysed();
        assert!(combined.should_stop());
    }

    #[test]
    fn absent_conditions_never_stop() {
        let mut combined = Combinator::new(Indefinite, None::<DecisionBudget>);
        combined.decision_has_been_made();
        assert!(!combined.should_stop());
    }
}
