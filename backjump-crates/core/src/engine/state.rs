use log::debug;
use log::trace;

use crate::asserts::backjump_assert_simple;
use crate::basic_types::Contradiction;
use crate::basic_types::EngineError;
use crate::basic_types::PropagationStatus;
use crate::engine::conflict_analysis::LearnedClause;
use crate::engine::conflict_analysis::NogoodSink;
use crate::engine::conflict_analysis::Reason;
use crate::engine::conflict_analysis::RefutationMemo;
#[cfg(doc)]
use crate::engine::conflict_analysis::ConflictAnalyzer;
use crate::engine::decisions::Decision;
use crate::engine::decisions::DecisionId;
use crate::engine::decisions::DecisionStore;
use crate::engine::event_log::Cause;
use crate::engine::event_log::EventLog;
use crate::engine::predicates::Predicate;
use crate::engine::propagation::store::PropagatorStore;
use crate::engine::propagation::DomainEvents;
use crate::engine::propagation::EngineStatus;
use crate::engine::propagation::EventMask;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationEngine;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::PropagatorHandle;
use crate::engine::propagation::PropagatorId;
use crate::engine::propagation::PropagatorStatus;
use crate::engine::reversible::ReversibleStore;
use crate::engine::variables::DomainId;
use crate::engine::variables::DomainStore;
use crate::engine::variables::Domains;
use crate::engine::variables::ReadDomains;
use crate::propagators::nogoods::NogoodPropagator;
use crate::propagators::nogoods::NogoodPropagatorConstructor;
use crate::statistics::create_statistics_struct;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The [`State`] owns everything that changes during search: the reversible memory, the
/// domains, the event log, the propagators and the chain of decisions.
///
/// Worlds are opened by [`State::decide`] and [`State::refute`] (one world per decision) and
/// closed by [`State::restore_to`]. A search loop alternates between deciding, calling
/// [`State::propagate`] and, on a [`Contradiction`], handing the state to a
/// [`ConflictAnalyzer`].
#[derive(Debug)]
pub struct State {
    pub(crate) reversible: ReversibleStore,
    pub(crate) domains: DomainStore,
    pub(crate) event_log: EventLog,
    pub(crate) engine: PropagationEngine,
    pub(crate) propagators: PropagatorStore,
    pub(crate) decisions: DecisionStore,
    pub(crate) refutations: RefutationMemo,
    nogoods: Option<PropagatorHandle<NogoodPropagator>>,
    statistics: StateStatistics,
}

create_statistics_struct!(StateStatistics {
    num_propagator_calls: u64,
    num_decisions: u64,
    num_refutations: u64,
    num_contradictions: u64,
    num_restorations: u64,
});

impl Default for State {
    fn default() -> Self {
        let mut reversible = ReversibleStore::default();
        let event_log = EventLog::new(&mut reversible);

        State {
            reversible,
            domains: DomainStore::default(),
            event_log,
            engine: PropagationEngine::default(),
            propagators: PropagatorStore::default(),
            decisions: DecisionStore::default(),
            refutations: RefutationMemo::default(),
            nogoods: None,
            statistics: StateStatistics::default(),
        }
    }
}

/// Operations to create variables and propagators.
impl State {
    /// Create a variable with domain `[lower_bound, upper_bound]` which can represent holes.
    pub fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.domains
            .grow(&mut self.reversible, lower_bound, upper_bound, true)
    }

    /// Create a variable which only stores its bounds; removing a value strictly between the
    /// bounds has no effect on it.
    pub fn new_bounded_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.domains
            .grow(&mut self.reversible, lower_bound, upper_bound, false)
    }

    pub fn num_variables(&self) -> usize {
        self.domains.num_domains()
    }

    /// Add a new propagator to the [`State`]. The constructor for that propagator registers the
    /// dependency arcs, after which the propagator is scheduled for a full propagation.
    ///
    /// This does _not_ propagate; an explicit call to [`State::propagate`] is necessary to run
    /// the new propagator for the first time.
    pub fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorHandle<Constructor::PropagatorImpl>, EngineError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        self.check_engine_is_not_propagating()?;
        Ok(self.install_propagator(constructor, None))
    }

    /// Add a propagator which stays passive until `reification` is fixed to 1.
    ///
    /// The activation is an event of its own: explanations which depend on the propagator also
    /// depend on whatever fixed `reification`.
    pub fn add_reified_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
        reification: DomainId,
    ) -> Result<PropagatorHandle<Constructor::PropagatorImpl>, EngineError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        self.check_engine_is_not_propagating()?;
        Ok(self.install_propagator(constructor, Some(reification)))
    }

    /// Detach a propagator for good; it is never scheduled again, not even after restoring to a
    /// world from before the removal.
    ///
    /// Rejected while propagators are waiting in the queue.
    pub fn remove_propagator(&mut self, propagator: PropagatorId) -> Result<(), EngineError> {
        self.engine
            .remove_propagator(&mut self.reversible, propagator)
    }

    fn check_engine_is_not_propagating(&self) -> Result<(), EngineError> {
        if self.engine.status() == EngineStatus::Propagating {
            return Err(EngineError::ModificationDuringPropagation);
        }
        Ok(())
    }

    fn install_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
        reification: Option<DomainId>,
    ) -> PropagatorHandle<Constructor::PropagatorImpl>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let propagator_id = self.propagators.next_id();

        self.engine
            .initialise_propagator(&mut self.reversible, propagator_id, reification);

        let constructor_context = PropagatorConstructorContext::new(
            propagator_id,
            &mut self.engine,
            &mut self.reversible,
            &self.domains,
        );
        let propagator = constructor.create(constructor_context);
        self.engine.set_priority(propagator_id, propagator.priority());

        debug!("Added {} as {propagator_id}", propagator.name());
        let handle = self.propagators.insert(propagator);
        backjump_assert_simple!(handle.propagator_id() == propagator_id);

        match reification {
            None => self.engine.schedule(propagator_id, EventMask::FULL),
            Some(variable) => {
                if self.lower_bound(variable) >= 1 {
                    self.engine
                        .activate(&mut self.reversible, &mut self.event_log, propagator_id);
                }
            }
        }

        handle
    }
}

/// Operations for retrieving propagators.
impl State {
    /// Get a reference to the propagator identified by the given handle.
    pub fn get_propagator<P: Propagator>(&self, handle: PropagatorHandle<P>) -> Option<&P> {
        self.propagators.get(handle)
    }

    /// Get an exclusive reference to the propagator identified by the given handle.
    pub fn get_propagator_mut<P: Propagator>(
        &mut self,
        handle: PropagatorHandle<P>,
    ) -> Option<&mut P> {
        self.propagators.get_mut(handle)
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.num_propagators()
    }

    pub fn propagator_status(&self, propagator: PropagatorId) -> PropagatorStatus {
        self.engine.propagator_status(&self.reversible, propagator)
    }

    pub fn is_removed(&self, propagator: PropagatorId) -> bool {
        self.engine.is_removed(propagator)
    }

    pub(crate) fn propagator(&self, propagator: PropagatorId) -> &dyn Propagator {
        &self.propagators[propagator]
    }

    pub(crate) fn scope(&self, propagator: PropagatorId) -> &[DomainId] {
        self.engine.scope(propagator)
    }
}

/// Propagation.
impl State {
    /// Run scheduled propagators until none are left (a fixpoint) or one of them reports a
    /// [`Contradiction`].
    ///
    /// On a contradiction the domains and the event log are left exactly as they were when it
    /// was raised; only the queue is emptied. Undoing the branch is up to the caller, typically
    /// through a [`ConflictAnalyzer`].
    pub fn propagate(&mut self) -> PropagationStatus {
        self.engine.set_status(EngineStatus::Propagating);

        while let Some((propagator_id, events)) = self.engine.next_propagator() {
            if self.engine.propagator_status(&self.reversible, propagator_id)
                != PropagatorStatus::Active
            {
                continue;
            }

            self.statistics.num_propagator_calls += 1;
            trace!("Propagating {propagator_id} with {events:?}");

            let propagation_status = {
                let propagator = &mut self.propagators[propagator_id];
                let context = PropagationContext::new(
                    &mut self.reversible,
                    &self.domains,
                    &mut self.event_log,
                    &mut self.engine,
                    propagator_id,
                );
                propagator.propagate(context, events)
            };

            if let Err(contradiction) = propagation_status {
                return Err(self.fail(contradiction));
            }
        }

        self.engine.set_status(EngineStatus::Fixpoint);
        Ok(())
    }

    fn fail(&mut self, contradiction: Contradiction) -> Contradiction {
        debug!("Contradiction at world {}: {contradiction}", self.world());
        self.statistics.num_contradictions += 1;
        self.engine.clear_queue();
        self.engine.set_status(EngineStatus::Contradiction);
        contradiction
    }

    pub fn engine_status(&self) -> EngineStatus {
        self.engine.status()
    }

    /// Restrict a domain as part of the problem definition; the change needs no explanation.
    ///
    /// Returns whether the domain changed. Like [`State::decide`], this does not propagate.
    pub fn post(&mut self, predicate: Predicate) -> Result<bool, Contradiction> {
        match self.engine.post(
            &mut self.reversible,
            &self.domains,
            &mut self.event_log,
            predicate,
            Cause::Root,
        ) {
            Ok(index) => Ok(index.is_some()),
            Err(contradiction) => Err(self.fail(contradiction)),
        }
    }
}

/// Search-tree operations.
impl State {
    /// The current world, i.e. the number of decisions on the current branch.
    pub fn world(&self) -> usize {
        self.reversible.world()
    }

    /// Open a world and apply the (left) decision `predicate` in it.
    ///
    /// Fails immediately if the predicate is already violated. Propagation is up to the caller.
    pub fn decide(&mut self, predicate: Predicate) -> PropagationStatus {
        self.reversible.push();
        let decision = self.decisions.push(predicate, self.world(), false);
        self.statistics.num_decisions += 1;
        trace!("{decision} at world {}: {predicate}", self.world());

        self.apply_decision(decision, predicate)
    }

    /// Open a world and apply the negation of `predicate`, the right branch of a decision whose
    /// left branch failed. The reason of that failure has to be known, which is the case after
    /// [`ConflictAnalyzer::analyse`] or [`ConflictAnalyzer::on_solution`] returned `predicate`.
    pub fn refute(&mut self, predicate: Predicate) -> PropagationStatus {
        self.reversible.push();
        let level = self.world();
        backjump_assert_simple!(
            self.refutations.get(predicate, level).is_some(),
            "the refutation of {predicate} at level {level} is not explained"
        );

        let decision = self.decisions.push(predicate, level, true);
        self.statistics.num_refutations += 1;
        trace!("{decision} at world {level}: {}", !predicate);

        self.apply_decision(decision, !predicate)
    }

    fn apply_decision(&mut self, decision: DecisionId, predicate: Predicate) -> PropagationStatus {
        self.engine
            .post(
                &mut self.reversible,
                &self.domains,
                &mut self.event_log,
                predicate,
                Cause::Decision(decision),
            )
            .map(|_| ())
            .map_err(|contradiction| self.fail(contradiction))
    }

    /// Undo every world above `world`, including the decisions and refutation reasons which
    /// belong to them.
    ///
    /// Panics if `world` is above the current world.
    pub fn restore_to(&mut self, world: usize) {
        assert!(
            world <= self.world(),
            "cannot restore to world {world}, the current world is {}",
            self.world()
        );

        self.statistics.num_restorations += 1;
        self.reversible.restore_to(world);
        self.decisions.synchronise(world);
        self.refutations.synchronise(world);
        self.engine.clear_queue();
        self.engine.set_status(EngineStatus::Idle);

        self.reversible.check_stamps();
    }

    /// The most recent decision on the current branch.
    pub fn last_decision(&self) -> Option<&Decision> {
        self.decisions.last().map(|id| self.decisions.get(id))
    }

    /// The decisions on the current branch, from the most recent one back to the root.
    pub fn decisions(&self) -> impl Iterator<Item = (DecisionId, &Decision)> + '_ {
        self.decisions
            .iter_from_last()
            .map(|id| (id, self.decisions.get(id)))
    }

    pub(crate) fn decision(&self, decision: DecisionId) -> &Decision {
        self.decisions.get(decision)
    }

    pub(crate) fn store_refutation(&mut self, predicate: Predicate, level: usize, reason: Reason) {
        self.refutations.store(predicate, level, reason);
    }

    /// Why the left branch `predicate` of the decision at `level` was refuted, if known.
    pub fn refutation_reason(&self, predicate: Predicate, level: usize) -> Option<&Reason> {
        self.refutations.get(predicate, level)
    }
}

/// Read access.
impl State {
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn reversible_store(&self) -> &ReversibleStore {
        &self.reversible
    }

    /// Reversible memory for constraint or search code. Worlds must only be opened and closed
    /// through [`State::decide`], [`State::refute`] and [`State::restore_to`].
    pub fn reversible_store_mut(&mut self) -> &mut ReversibleStore {
        &mut self.reversible
    }

    /// The values of every variable, if all of them are fixed.
    pub fn solution(&self) -> Option<Vec<i32>> {
        self.domains
            .domain_ids()
            .map(|domain| {
                self.is_fixed(domain)
                    .then(|| self.lower_bound(domain))
            })
            .collect()
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics
            .log(statistic_logger.attach_to_prefix("state"));
        self.engine
            .log_statistics(statistic_logger.attach_to_prefix("engine"));

        for propagator in self.propagators.iter() {
            propagator.log_statistics(statistic_logger.attach_to_prefix(propagator.name()));
        }
    }
}

impl ReadDomains for State {
    fn domains(&self) -> Domains<'_> {
        self.domains.view(&self.reversible)
    }
}

impl NogoodSink for State {
    /// Learned clauses are kept by a nogood propagator which is created on first use; it
    /// watches every variable occurring in one of its clauses.
    fn add_nogood(&mut self, clause: &LearnedClause) {
        let handle = match self.nogoods {
            Some(handle) => handle,
            None => {
                let handle = self.install_propagator(NogoodPropagatorConstructor, None);
                self.nogoods = Some(handle);
                handle
            }
        };
        let propagator_id = handle.propagator_id();

        for predicate in clause.predicates.iter() {
            let variable = predicate.get_domain();
            if !self.engine.scope(propagator_id).contains(&variable) {
                let local_id = LocalId::from(self.engine.scope(propagator_id).len() as u32);
                self.engine
                    .register(propagator_id, variable, DomainEvents::ANY_INT, local_id);
            }
        }

        if let Some(nogoods) = self.propagators.get_mut(handle) {
            let _ = nogoods.add_clause(clause.predicates.clone());
        }

        if self.engine.propagator_status(&self.reversible, propagator_id) == PropagatorStatus::Active
        {
            self.engine.schedule(propagator_id, EventMask::FULL);
        }
    }
}
