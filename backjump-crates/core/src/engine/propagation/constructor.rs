use super::DomainEvents;
use super::LocalId;
use super::Propagator;
use super::PropagatorId;
use crate::engine::propagation::PropagationEngine;
use crate::engine::reversible::ReversibleStore;
use crate::engine::variables::DomainId;
use crate::engine::variables::DomainStore;
use crate::engine::variables::Domains;
use crate::engine::variables::ReadDomains;

/// A propagator constructor creates a fully initialised instance of a [`Propagator`].
///
/// The constructor is responsible for indicating on which events the propagator should be
/// scheduled. Additionally, the propagator can allocate reversible state it needs from the
/// [`ReversibleStore`].
pub trait PropagatorConstructor {
    /// The propagator that is produced by this constructor.
    type PropagatorImpl: Propagator;

    /// Create the propagator instance from `Self`.
    fn create(self, context: PropagatorConstructorContext) -> Self::PropagatorImpl;
}

/// [`PropagatorConstructorContext`] is used when [`Propagator`]s are initialised after creation.
///
/// Propagators use it to register to domain changes of variables, to read the current bounds of
/// variables and to allocate reversible state.
#[derive(Debug)]
pub struct PropagatorConstructorContext<'a> {
    engine: &'a mut PropagationEngine,
    store: &'a mut ReversibleStore,
    domains: &'a DomainStore,
    propagator_id: PropagatorId,
}

impl<'a> PropagatorConstructorContext<'a> {
    pub(crate) fn new(
        propagator_id: PropagatorId,
        engine: &'a mut PropagationEngine,
        store: &'a mut ReversibleStore,
        domains: &'a DomainStore,
    ) -> Self {
        PropagatorConstructorContext {
            engine,
            store,
            domains,
            propagator_id,
        }
    }

    /// Subscribes the propagator to the given [`DomainEvents`] of `variable`.
    ///
    /// Each variable should get a unique [`LocalId`]; most often this is the index of the
    /// variable in the internal array of variables of the propagator. The variables registered
    /// here form the scope of the propagator, which is what the default
    /// [`Propagator::why`] explains with.
    pub fn register(&mut self, variable: DomainId, events: DomainEvents, local_id: LocalId) {
        self.engine
            .register(self.propagator_id, variable, events, local_id);
    }

    /// The id the propagator will get.
    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }

    /// Allocate reversible state for the propagator.
    pub fn reversible_store(&mut self) -> &mut ReversibleStore {
        self.store
    }
}

impl ReadDomains for PropagatorConstructorContext<'_> {
    fn domains(&self) -> Domains<'_> {
        self.domains.view(self.store)
    }
}
