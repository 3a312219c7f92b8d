use enumset::EnumSet;
use log::debug;
use log::trace;

use super::DomainEvent;
use super::DomainEvents;
use super::EventMask;
use super::LocalId;
use super::Priority;
use super::PropagatorId;
use super::PropagatorStatus;
use crate::asserts::backjump_assert_moderate;
use crate::asserts::backjump_assert_simple;
use crate::basic_types::Contradiction;
use crate::basic_types::EngineError;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::event_log::Cause;
use crate::engine::event_log::EventIndex;
use crate::engine::event_log::EventKind;
use crate::engine::event_log::EventLog;
use crate::engine::predicates::Predicate;
use crate::engine::propagation::propagator_queue::PropagatorQueue;
use crate::engine::reversible::ReversibleInt;
use crate::engine::reversible::ReversibleStore;
use crate::engine::variables::DomainChange;
use crate::engine::variables::DomainId;
use crate::engine::variables::DomainStore;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// The state of the propagation loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    /// Nothing has been propagated since the last restoration.
    #[default]
    Idle,
    /// A propagator is being run.
    Propagating,
    /// The queue was emptied without a contradiction.
    Fixpoint,
    /// The last propagation call ended in a contradiction.
    Contradiction,
}

/// A subscription of a propagator to the events of one variable.
#[derive(Clone, Copy, Debug)]
struct Watcher {
    propagator: PropagatorId,
    local_id: LocalId,
    events: EnumSet<DomainEvent>,
}

crate::statistics::create_statistics_struct!(EngineStatistics {
    num_scheduled: u64,
    num_activations: u64,
    num_events: u64,
});

/// Schedules propagators in response to domain changes.
///
/// The engine does not own the propagators, the [`State`](crate::State) does; the engine only
/// knows what every propagator watches, whether it is active on the current branch and which
/// events are pending for it.
#[derive(Debug, Default)]
pub(crate) struct PropagationEngine {
    watchers: KeyedVec<DomainId, Vec<Watcher>>,
    activation_watchers: KeyedVec<DomainId, Vec<PropagatorId>>,
    statuses: KeyedVec<PropagatorId, ReversibleInt>,
    reifications: KeyedVec<PropagatorId, Option<DomainId>>,
    removed: KeyedVec<PropagatorId, bool>,
    priorities: KeyedVec<PropagatorId, Priority>,
    scopes: KeyedVec<PropagatorId, Vec<DomainId>>,
    pending: KeyedVec<PropagatorId, EventMask>,
    queue: PropagatorQueue,
    status: EngineStatus,
    statistics: EngineStatistics,
}

impl PropagationEngine {
    /// Reserve the bookkeeping of a new propagator. A propagator with a reification variable
    /// starts passive and is activated once that variable is at least one.
    pub(crate) fn initialise_propagator(
        &mut self,
        store: &mut ReversibleStore,
        propagator: PropagatorId,
        reification: Option<DomainId>,
    ) {
        backjump_assert_simple!(propagator.index() == self.statuses.len());

        let initial_status = if reification.is_some() {
            PropagatorStatus::Passive
        } else {
            PropagatorStatus::Active
        };

        let _ = self.statuses.push(store.new_int(initial_status.to_int()));
        let _ = self.reifications.push(reification);
        let _ = self.removed.push(false);
        let _ = self.priorities.push(Priority::default());
        let _ = self.scopes.push(Vec::new());
        let _ = self.pending.push(EventMask::default());

        if let Some(variable) = reification {
            self.activation_watchers.accommodate(variable, Vec::new());
            self.activation_watchers[variable].push(propagator);
        }
    }

    pub(crate) fn register(
        &mut self,
        propagator: PropagatorId,
        variable: DomainId,
        events: DomainEvents,
        local_id: LocalId,
    ) {
        self.watchers.accommodate(variable, Vec::new());
        self.watchers[variable].push(Watcher {
            propagator,
            local_id,
            events: events.events(),
        });

        if !self.scopes[propagator].contains(&variable) {
            self.scopes[propagator].push(variable);
        }
    }

    pub(crate) fn set_priority(&mut self, propagator: PropagatorId, priority: Priority) {
        self.priorities[propagator] = priority;
    }

    pub(crate) fn priority(&self, propagator: PropagatorId) -> Priority {
        self.priorities[propagator]
    }

    /// The variables `propagator` registered for, in registration order.
    pub(crate) fn scope(&self, propagator: PropagatorId) -> &[DomainId] {
        &self.scopes[propagator]
    }

    pub(crate) fn contains(&self, propagator: PropagatorId) -> bool {
        propagator.index() < self.statuses.len()
    }

    pub(crate) fn is_removed(&self, propagator: PropagatorId) -> bool {
        self.removed[propagator]
    }

    pub(crate) fn propagator_status(
        &self,
        store: &ReversibleStore,
        propagator: PropagatorId,
    ) -> PropagatorStatus {
        if self.removed[propagator] {
            return PropagatorStatus::Entailed;
        }
        PropagatorStatus::from_int(store.get(self.statuses[propagator]))
    }

    pub(crate) fn status(&self) -> EngineStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: EngineStatus) {
        self.status = status;
    }

    /// Enqueue `propagator` with `mask` merged into its pending events.
    pub(crate) fn schedule(&mut self, propagator: PropagatorId, mask: EventMask) {
        schedule(
            &mut self.queue,
            &mut self.pending,
            &self.priorities,
            &mut self.statistics,
            propagator,
            mask,
        );
    }

    /// Take the next propagator to run together with the events which fired for it.
    pub(crate) fn next_propagator(&mut self) -> Option<(PropagatorId, EventMask)> {
        let propagator = self.queue.pop()?;
        let mask = std::mem::take(&mut self.pending[propagator]);
        Some((propagator, mask))
    }

    /// Drop everything that is scheduled; used after a contradiction and on restoration.
    pub(crate) fn clear_queue(&mut self) {
        self.queue.clear();
        for mask in self.pending.iter_mut() {
            *mask = EventMask::default();
        }
    }

    /// Record `change` on `variable` in the event log and schedule every active propagator
    /// which watches one of the triggered domain events. The propagator which caused the change
    /// is not scheduled again for it.
    pub(crate) fn on_variable_update(
        &mut self,
        store: &mut ReversibleStore,
        domains: &DomainStore,
        event_log: &mut EventLog,
        variable: DomainId,
        change: DomainChange,
        cause: Cause,
    ) -> EventIndex {
        let index = event_log.append(store, variable, cause, change.kind, change.values);
        self.statistics.num_events += 1;

        let triggered = change.kind.triggered_domain_events();
        if let Some(watchers) = self.watchers.get(variable) {
            for watcher in watchers {
                if cause == Cause::Propagator(watcher.propagator) {
                    continue;
                }

                let fired = watcher.events & triggered;
                if fired.is_empty() {
                    continue;
                }

                let status = PropagatorStatus::from_int(store.get(self.statuses[watcher.propagator]));
                if status != PropagatorStatus::Active {
                    continue;
                }

                trace!(
                    "{index} schedules {} (local id {}) for {fired:?}",
                    watcher.propagator, watcher.local_id
                );
                schedule(
                    &mut self.queue,
                    &mut self.pending,
                    &self.priorities,
                    &mut self.statistics,
                    watcher.propagator,
                    EventMask {
                        full_propagation: false,
                        events: fired,
                    },
                );
            }
        }

        self.activate_reified_propagators(store, domains, event_log, variable);

        index
    }

    fn activate_reified_propagators(
        &mut self,
        store: &mut ReversibleStore,
        domains: &DomainStore,
        event_log: &mut EventLog,
        variable: DomainId,
    ) {
        if self.activation_watchers.get(variable).is_none()
            || domains.view(store).lower_bound(variable) < 1
        {
            return;
        }

        for index in 0..self.activation_watchers[variable].len() {
            let propagator = self.activation_watchers[variable][index];
            self.activate(store, event_log, propagator);
        }
    }

    /// Turn a passive reified propagator active: log the activation and schedule a full
    /// propagation. Does nothing for propagators which are not passive.
    pub(crate) fn activate(
        &mut self,
        store: &mut ReversibleStore,
        event_log: &mut EventLog,
        propagator: PropagatorId,
    ) {
        let status = PropagatorStatus::from_int(store.get(self.statuses[propagator]));
        if status != PropagatorStatus::Passive || self.removed[propagator] {
            return;
        }
        let Some(variable) = self.reifications[propagator] else {
            return;
        };

        debug!("Activating {propagator} after {variable} became true");
        store.set(self.statuses[propagator], PropagatorStatus::Active.to_int());
        let _ = event_log.append(
            store,
            variable,
            Cause::Propagator(propagator),
            EventKind::PropagatorActivation,
            [propagator.id() as i32, -1, -1],
        );
        self.statistics.num_activations += 1;

        self.schedule(propagator, EventMask::FULL);
    }

    /// Apply `predicate` to the domains, recording and scheduling the resulting change.
    ///
    /// Returns the index of the logged event, or [`None`] if the domain already satisfied the
    /// predicate. A domain wipe-out is reported as a [`Contradiction`] blamed on `cause`.
    pub(crate) fn post(
        &mut self,
        store: &mut ReversibleStore,
        domains: &DomainStore,
        event_log: &mut EventLog,
        predicate: Predicate,
        cause: Cause,
    ) -> Result<Option<EventIndex>, Contradiction> {
        let variable = predicate.get_domain();
        match domains.apply(store, predicate) {
            Ok(Some(change)) => Ok(Some(self.on_variable_update(
                store, domains, event_log, variable, change, cause,
            ))),
            Ok(None) => Ok(None),
            Err(_) => {
                trace!("{predicate} wiped out the domain of {variable} ({cause})");
                Err(Contradiction::wipe_out(cause, variable))
            }
        }
    }

    /// Mark `propagator` as entailed on the current branch; it is not scheduled again until the
    /// branch is undone.
    pub(crate) fn deactivate_propagator(
        &mut self,
        store: &mut ReversibleStore,
        propagator: PropagatorId,
    ) {
        store.set(self.statuses[propagator], PropagatorStatus::Entailed.to_int());
        self.queue.remove(propagator, self.priorities[propagator]);
        self.pending[propagator] = EventMask::default();
    }

    /// Permanently detach `propagator`; it is never scheduled again, on any branch.
    pub(crate) fn remove_propagator(
        &mut self,
        store: &mut ReversibleStore,
        propagator: PropagatorId,
    ) -> Result<(), EngineError> {
        if !self.contains(propagator) {
            return Err(EngineError::UnknownPropagator(propagator));
        }
        if self.removed[propagator] {
            return Err(EngineError::PropagatorRemoved(propagator));
        }
        if self.status == EngineStatus::Propagating || !self.queue.is_empty() {
            return Err(EngineError::ModificationDuringPropagation);
        }

        // Unlike entailment, removal survives restoration: the watchers go away for good.
        self.removed[propagator] = true;
        for watchers in self.watchers.iter_mut() {
            watchers.retain(|watcher| watcher.propagator != propagator);
        }
        for watchers in self.activation_watchers.iter_mut() {
            watchers.retain(|&watched| watched != propagator);
        }
        store.set(self.statuses[propagator], PropagatorStatus::Entailed.to_int());
        self.pending[propagator] = EventMask::default();

        debug!("Removed {propagator}");
        Ok(())
    }

    pub(crate) fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

fn schedule(
    queue: &mut PropagatorQueue,
    pending: &mut KeyedVec<PropagatorId, EventMask>,
    priorities: &KeyedVec<PropagatorId, Priority>,
    statistics: &mut EngineStatistics,
    propagator: PropagatorId,
    mask: EventMask,
) {
    pending[propagator].merge(mask);
    if !queue.is_propagator_enqueued(propagator) {
        statistics.num_scheduled += 1;
        queue.enqueue_propagator(propagator, priorities[propagator]);
    }
    backjump_assert_moderate!(queue.is_propagator_enqueued(propagator));
}
