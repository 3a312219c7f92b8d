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

/// The [`PropagatorConstructor`] for the [`BinaryNotEqualsPropagator`].
#[derive(Clone, Copy, Debug)]
pub struct BinaryNotEqualsArgs {
    pub a: DomainId,
    pub b: DomainId,
}

impl PropagatorConstructor for BinaryNotEqualsArgs {
    type PropagatorImpl = BinaryNotEqualsPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let BinaryNotEqualsArgs { a, b } = self;

        // Only an assignment of one of the two allows filtering
        context.register(a, DomainEvents::ASSIGN, LocalId::from(0));
        context.register(b, DomainEvents::ASSIGN, LocalId::from(1));

        BinaryNotEqualsPropagator { a, b }
    }
}

/// Propagator for the constraint `a != b`.
#[derive(Clone, Debug)]
pub struct BinaryNotEqualsPropagator {
    a: DomainId,
    b: DomainId,
}

impl Propagator for BinaryNotEqualsPropagator {
    fn name(&self) -> &str {
        "BinaryNotEq"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContext, _: EventMask) -> PropagationStatus {
        let a_lb = context.lower_bound(self.a);
        let a_ub = context.upper_bound(self.a);
        let b_lb = context.lower_bound(self.b);
        let b_ub = context.upper_bound(self.b);

        if a_ub < b_lb || b_ub < a_lb {
            // The domains no longer overlap
            context.set_entailed();
            return Ok(());
        }

        if a_lb == a_ub {
            context.post(predicate!(self.b != a_lb))?;
        }
        if b_lb == b_ub {
            context.post(predicate!(self.a != b_lb))?;
        }

        if context.is_fixed(self.a) || context.is_fixed(self.b) {
            context.set_entailed();
        }

        Ok(())
    }

    /// A value is removed from one variable because the other one is fixed to it; the bounds of
    /// the fixed variable explain that.
    fn why(
        &self,
        context: &mut ExplanationContext,
        event: Option<ExplainedEvent>,
    ) -> Result<bool, RuleStoreError> {
        let mut new_rules = context.add_propagator_activation_rule();

        match event {
            Some(event) if event.variable == self.a => {
                new_rules |= context.add_bounds_rule(self.b);
            }
            Some(event) if event.variable == self.b => {
                new_rules |= context.add_bounds_rule(self.a);
            }
            _ => {
                new_rules |= context.add_bounds_rule(self.a);
                new_rules |= context.add_bounds_rule(self.b);
            }
        }

        Ok(new_rules)
    }
}
