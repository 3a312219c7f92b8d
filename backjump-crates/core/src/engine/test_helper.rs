#![cfg(test)]
//! Small propagators and states which set up specific scenarios for the tests of the engine and
//! the conflict analysis.
use crate::basic_types::PropagationStatus;
use crate::basic_types::RuleStoreError;
use crate::engine::predicates::Predicate;
use crate::engine::propagation::DomainEvents;
use crate::engine::propagation::EventMask;
use crate::engine::propagation::ExplainedEvent;
use crate::engine::propagation::ExplanationContext;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::variables::DomainId;
use crate::engine::variables::ReadDomains;
use crate::engine::State;
use crate::predicate;

/// `smaller < larger`, filtering bounds only.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChainLink {
    pub(crate) smaller: DomainId,
    pub(crate) larger: DomainId,
}

impl PropagatorConstructor for ChainLink {
    type PropagatorImpl = ChainLink;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        context.register(self.smaller, DomainEvents::LOWER_BOUND, LocalId::from(0));
        context.register(self.larger, DomainEvents::UPPER_BOUND, LocalId::from(1));
        self
    }
}

impl Propagator for ChainLink {
    fn name(&self) -> &str {
        "ChainLink"
    }

    fn propagate(&mut self, mut context: PropagationContext, _: EventMask) -> PropagationStatus {
        let smaller = self.smaller;
        let larger = self.larger;

        context.post(predicate!(larger >= context.lower_bound(smaller) + 1))?;
        context.post(predicate!(smaller <= context.upper_bound(larger) - 1))?;
        Ok(())
    }
}

/// A state with variables `x_0 > x_1 > ... > x_{n-1}`, all in `[1, n - 1]`, which is
/// infeasible at the root.
pub(crate) fn bounded_chain(n: usize) -> (State, Vec<DomainId>) {
    let mut state = State::default();
    let variables: Vec<DomainId> = (0..n)
        .map(|_| state.new_bounded_variable(1, n as i32 - 1))
        .collect();

    for pair in variables.windows(2) {
        let _ = state
            .add_propagator(ChainLink {
                smaller: pair[1],
                larger: pair[0],
            })
            .expect("no propagation is in progress");
    }

    (state, variables)
}

/// Fails whenever `watched` changes while `condition` holds; the failure only depends on
/// `condition`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tripwire {
    pub(crate) condition: Predicate,
    pub(crate) watched: DomainId,
}

impl PropagatorConstructor for Tripwire {
    type PropagatorImpl = Tripwire;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        context.register(self.watched, DomainEvents::ANY_INT, LocalId::from(0));
        self
    }
}

impl Propagator for Tripwire {
    fn name(&self) -> &str {
        "Tripwire"
    }

    fn propagate(&mut self, context: PropagationContext, events: EventMask) -> PropagationStatus {
        if !events.full_propagation && context.evaluate(self.condition) == Some(true) {
            return Err(context.contradiction("tripwire"));
        }
        Ok(())
    }

    fn why(
        &self,
        context: &mut ExplanationContext,
        _: Option<ExplainedEvent>,
    ) -> Result<bool, RuleStoreError> {
        Ok(context.add_full_domain_rule(self.condition.get_domain()))
    }
}

/// Does nothing but count how often it is called.
#[derive(Clone, Debug)]
pub(crate) struct Counter {
    pub(crate) watched: Vec<DomainId>,
    pub(crate) num_calls: usize,
    pub(crate) last_events: Option<EventMask>,
}

impl Counter {
    pub(crate) fn new(watched: &[DomainId]) -> Self {
        Counter {
            watched: watched.to_vec(),
            num_calls: 0,
            last_events: None,
        }
    }
}

impl PropagatorConstructor for Counter {
    type PropagatorImpl = Counter;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        for (index, &variable) in self.watched.iter().enumerate() {
            context.register(variable, DomainEvents::ANY_INT, LocalId::from(index as u32));
        }
        self
    }
}

impl Propagator for Counter {
    fn name(&self) -> &str {
        "Counter"
    }

    fn propagate(&mut self, _: PropagationContext, events: EventMask) -> PropagationStatus {
        self.num_calls += 1;
        self.last_events = Some(events);
        Ok(())
    }
}
