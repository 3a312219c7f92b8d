use crate::basic_types::PropagationStatus;
use crate::basic_types::RuleStoreError;
use crate::engine::propagation::DomainEvents;
use crate::engine::propagation::EventMask;
use crate::engine::propagation::ExplainedEvent;
use crate::engine::propagation::ExplanationContext;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::Priority;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::variables::DomainId;
use crate::engine::variables::ReadDomains;
use crate::predicate;

/// The [`PropagatorConstructor`] for the [`BinaryLessOrEqualPropagator`], which enforces
/// `x + offset <= y`.
#[derive(Clone, Copy, Debug)]
pub struct BinaryLessOrEqualArgs {
    pub x: DomainId,
    pub y: DomainId,
    pub offset: i32,
}

impl PropagatorConstructor for BinaryLessOrEqualArgs {
    type PropagatorImpl = BinaryLessOrEqualPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let BinaryLessOrEqualArgs { x, y, offset } = self;

        context.register(x, DomainEvents::LOWER_BOUND, LocalId::from(0));
        context.register(y, DomainEvents::UPPER_BOUND, LocalId::from(1));

        BinaryLessOrEqualPropagator { x, y, offset }
    }
}

/// Bounds propagator for `x + offset <= y`.
#[derive(Clone, Debug)]
pub struct BinaryLessOrEqualPropagator {
    x: DomainId,
    y: DomainId,
    offset: i32,
}

impl Propagator for BinaryLessOrEqualPropagator {
    fn name(&self) -> &str {
        "BinaryLessOrEqual"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, mut context: PropagationContext, _: EventMask) -> PropagationStatus {
        let (x, y, offset) = (self.x, self.y, self.offset);

        context.post(predicate!(y >= context.lower_bound(x).saturating_add(offset)))?;
        context.post(predicate!(x <= context.upper_bound(y).saturating_sub(offset)))?;

        if context.upper_bound(x).saturating_add(offset) <= context.lower_bound(y) {
            context.set_entailed();
        }

        Ok(())
    }

    /// The lower bound of `y` only depends on the lower bound of `x`, and the upper bound of `x`
    /// only on the upper bound of `y`.
    fn why(
        &self,
        context: &mut ExplanationContext,
        event: Option<ExplainedEvent>,
    ) -> Result<bool, RuleStoreError> {
        let mut new_rules = context.add_propagator_activation_rule();

        match event {
            Some(event) if event.variable == self.y => {
                new_rules |= context.add_lower_bound_rule(self.x);
            }
            Some(event) if event.variable == self.x => {
                new_rules |= context.add_upper_bound_rule(self.y);
            }
            _ => {
                new_rules |= context.add_lower_bound_rule(self.x);
                new_rules |= context.add_upper_bound_rule(self.y);
            }
        }

        Ok(new_rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::conflict_analysis::ConflictAnalyzer;
    use crate::engine::conflict_analysis::ConflictOutcome;
    use crate::engine::State;

    #[test]
    fn bounds_are_filtered_in_both_directions() {
        let mut state = State::default();
        let x = state.new_bounded_variable(0, 10);
        let y = state.new_bounded_variable(0, 10);

        let _ = state
            .add_propagator(BinaryLessOrEqualArgs { x, y, offset: 3 })
            .expect("no propagation is in progress");
        state.propagate().expect("feasible");

        assert_eq!(state.lower_bound(y), 3);
        assert_eq!(state.upper_bound(x), 7);
    }

    #[test]
    fn explanation_follows_the_bounds_only() {
        let mut state = State::default();
        let x = state.new_bounded_variable(0, 10);
        let y = state.new_bounded_variable(0, 10);
        let unrelated = state.new_bounded_variable(0, 10);

        let _ = state
            .add_propagator(BinaryLessOrEqualArgs { x, y, offset: 1 })
            .expect("no propagation is in progress");
        state.propagate().expect("feasible");

        state.decide(predicate!(x >= 5)).expect("in bounds");
        state.propagate().expect("feasible");
        state.decide(predicate!(unrelated <= 2)).expect("in bounds");
        state.propagate().expect("feasible");

        let contradiction = state
            .decide(predicate!(y <= 5))
            .and_then(|_| state.propagate())
            .expect_err("y has to be at least 6");

        let mut analyzer = ConflictAnalyzer::default();
        let outcome = analyzer
            .analyse(&mut state, contradiction)
            .expect("only bound rules are used");

        match outcome {
            ConflictOutcome::Backjump {
                target_world,
                refuted,
                reason,
                ..
            } => {
                assert_eq!(target_world, 3);
                assert_eq!(refuted, predicate!(y <= 5));
                assert!(reason.contains_decision_at(1));
                assert!(!reason.contains_decision_at(2));
            }
            ConflictOutcome::RootInfeasible { .. } => panic!("decisions are involved"),
        }
    }

    #[test]
    fn extreme_offsets_do_not_overflow() {
        let mut state = State::default();
        let x = state.new_bounded_variable(0, 10);
        let y = state.new_bounded_variable(0, 10);
        let _ = state
            .add_propagator(BinaryLessOrEqualArgs { x, y, offset: i32::MIN })
            .expect("no propagation is in progress");
        state.propagate().expect("always satisfied");
        assert_eq!(state.upper_bound(x), 10);

        let _ = state
            .add_propagator(BinaryLessOrEqualArgs { x, y, offset: i32::MAX })
            .expect("no propagation is in progress");
        assert!(state.propagate().is_err());
    }
}
