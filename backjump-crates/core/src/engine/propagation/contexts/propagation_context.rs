use crate::basic_types::Contradiction;
use crate::basic_types::PropagationStatus;
use crate::engine::event_log::Cause;
use crate::engine::event_log::EventIndex;
use crate::engine::event_log::EventLog;
use crate::engine::predicates::Predicate;
use crate::engine::propagation::PropagationEngine;
#[cfg(doc)]
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorId;
use crate::engine::reversible::ReversibleStore;
use crate::engine::variables::DomainStore;
use crate::engine::variables::Domains;
use crate::engine::variables::ReadDomains;

/// Provides information about the state of the solver to a propagator.
///
/// Domains can be read through the implementation of [`ReadDomains`], and changes to the state
/// can be made via [`Self::post`]. Every change is recorded in the event log with the propagator
/// as its cause.
#[derive(Debug)]
pub struct PropagationContext<'a> {
    pub(crate) store: &'a mut ReversibleStore,
    pub(crate) domains: &'a DomainStore,
    pub(crate) event_log: &'a mut EventLog,
    pub(crate) engine: &'a mut PropagationEngine,
    pub(crate) propagator_id: PropagatorId,
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(
        store: &'a mut ReversibleStore,
        domains: &'a DomainStore,
        event_log: &'a mut EventLog,
        engine: &'a mut PropagationEngine,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagationContext {
            store,
            domains,
            event_log,
            engine,
            propagator_id,
        }
    }

    /// The id of the propagator which is running.
    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }

    /// Make `predicate` true.
    ///
    /// Emptying a domain returns a [`Contradiction`] naming the running propagator, which should
    /// be propagated out of [`Propagator::propagate`] with `?`.
    pub fn post(&mut self, predicate: Predicate) -> PropagationStatus {
        self.post_tracked(predicate).map(|_| ())
    }

    /// Like [`Self::post`], but returns the index of the logged event if the domain changed.
    /// Propagators which need to know exactly what they justified in [`Propagator::why`] can keep
    /// this index.
    pub fn post_tracked(&mut self, predicate: Predicate) -> Result<Option<EventIndex>, Contradiction> {
        self.engine.post(
            self.store,
            self.domains,
            self.event_log,
            predicate,
            Cause::Propagator(self.propagator_id),
        )
    }

    /// A contradiction raised by the running propagator, for failures that do not come from
    /// an empty domain.
    pub fn contradiction(&self, message: &'static str) -> Contradiction {
        Contradiction::new(Cause::Propagator(self.propagator_id), message)
    }

    /// The propagator will not be able to remove any more values on the current branch, so it is
    /// not scheduled again until the branch is undone.
    pub fn set_entailed(&mut self) {
        self.engine
            .deactivate_propagator(self.store, self.propagator_id);
    }

    /// Reversible state owned by the propagator can be read and written here.
    pub fn reversible_store(&mut self) -> &mut ReversibleStore {
        self.store
    }
}

impl ReadDomains for PropagationContext<'_> {
    fn domains(&self) -> Domains<'_> {
        self.domains.view(self.store)
    }
}
