use crate::basic_types::RuleStoreError;
use crate::engine::conflict_analysis::RuleStore;
use crate::engine::event_log::Event;
use crate::engine::event_log::EventIndex;
use crate::engine::event_log::EventKind;
#[cfg(doc)]
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorId;
use crate::engine::variables::DomainId;
use crate::engine::variables::Domains;
use crate::engine::variables::ReadDomains;

/// The event a propagator is asked to justify in [`Propagator::why`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExplainedEvent {
    pub index: EventIndex,
    pub variable: DomainId,
    pub kind: EventKind,
    pub values: [i32; 3],
}

impl ExplainedEvent {
    pub(crate) fn new(index: EventIndex, event: &Event) -> Self {
        ExplainedEvent {
            index,
            variable: event.variable,
            kind: event.kind,
            values: event.values,
        }
    }
}

/// The context that is available when a propagator explains one of its events.
///
/// The domains are the _current_ ones, i.e. those at the moment of the contradiction; rules are
/// added to the rule store of the running analysis.
#[derive(Debug)]
pub struct ExplanationContext<'a> {
    rule_store: &'a mut RuleStore,
    domains: Domains<'a>,
    propagator_id: PropagatorId,
    scope: &'a [DomainId],
}

impl<'a> ExplanationContext<'a> {
    pub(crate) fn new(
        rule_store: &'a mut RuleStore,
        domains: Domains<'a>,
        propagator_id: PropagatorId,
        scope: &'a [DomainId],
    ) -> Self {
        ExplanationContext {
            rule_store,
            domains,
            propagator_id,
            scope,
        }
    }

    /// The variables the propagator registered for.
    pub fn scope(&self) -> &'a [DomainId] {
        self.scope
    }

    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }

    /// Every change to `variable` is relevant.
    pub fn add_full_domain_rule(&mut self, variable: DomainId) -> bool {
        self.rule_store.add_full_domain_rule(variable)
    }

    /// Changes raising the lower bound of `variable` are relevant.
    pub fn add_lower_bound_rule(&mut self, variable: DomainId) -> bool {
        self.rule_store.add_lower_bound_rule(variable)
    }

    /// Changes lowering the upper bound of `variable` are relevant.
    pub fn add_upper_bound_rule(&mut self, variable: DomainId) -> bool {
        self.rule_store.add_upper_bound_rule(variable)
    }

    pub fn add_bounds_rule(&mut self, variable: DomainId) -> bool {
        self.rule_store.add_bounds_rule(variable)
    }

    /// The removal of `value` from `variable` is relevant.
    ///
    /// On a bounded variable this becomes a bound rule when `value` lies outside (or on) the
    /// current bounds, and is an error otherwise.
    pub fn add_removal_rule(
        &mut self,
        variable: DomainId,
        value: i32,
    ) -> Result<bool, RuleStoreError> {
        self.rule_store
            .add_removal_rule(self.domains, variable, value)
    }

    /// The activation of the explaining propagator is relevant.
    pub fn add_propagator_activation_rule(&mut self) -> bool {
        self.rule_store
            .add_propagator_activation_rule(self.propagator_id)
    }
}

impl ReadDomains for ExplanationContext<'_> {
    fn domains(&self) -> Domains<'_> {
        self.domains
    }
}
