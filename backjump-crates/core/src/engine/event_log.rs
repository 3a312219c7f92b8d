//! The record of every domain change on the current branch of the search tree.
use std::fmt::Display;

use log::trace;

use crate::containers::StorageKey;
use crate::engine::decisions::DecisionId;
use crate::engine::propagation::PropagatorId;
use crate::engine::reversible::ReversibleInt;
use crate::engine::reversible::ReversibleStore;
use crate::engine::variables::DomainId;

/// Who is responsible for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cause {
    /// The event is part of the problem definition (e.g. a root-level domain restriction) and
    /// needs no explanation.
    Root,
    /// A branching decision, possibly in its refuted form.
    Decision(DecisionId),
    /// A propagator.
    Propagator(PropagatorId),
}

impl Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cause::Root => write!(f, "root"),
            Cause::Decision(decision) => write!(f, "{decision}"),
            Cause::Propagator(propagator) => write!(f, "{propagator}"),
        }
    }
}

/// The kind of change an [`Event`] describes.
///
/// The meaning of the three values of an event depends on its kind:
///
/// | kind                 | `v1`          | `v2`     | `v3`     |
/// |----------------------|---------------|----------|----------|
/// | `Instantiate`        | value         | old lb   | old ub   |
/// | `IncreaseLowerBound` | new lb        | old lb   | -1       |
/// | `DecreaseUpperBound` | new ub        | old ub   | -1       |
/// | `Removal`            | removed value | -1       | -1       |
/// | `PropagatorActivation` | propagator id | -1     | -1       |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Instantiate,
    IncreaseLowerBound,
    DecreaseUpperBound,
    Removal,
    PropagatorActivation,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Instantiate => write!(f, "[Event:Instantiate]"),
            EventKind::IncreaseLowerBound => write!(f, "[Event:IncLow]"),
            EventKind::DecreaseUpperBound => write!(f, "[Event:DecUpp]"),
            EventKind::Removal => write!(f, "[Event:Remove]"),
            EventKind::PropagatorActivation => write!(f, "[Event:Activation]"),
        }
    }
}

/// The position of an event in the [`EventLog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventIndex(u32);

impl StorageKey for EventIndex {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        EventIndex(index as u32)
    }
}

impl Display for EventIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One domain change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub variable: DomainId,
    pub cause: Cause,
    pub kind: EventKind,
    pub values: [i32; 3],
}

/// An append-only log of the [`Event`]s on the current branch.
///
/// The number of valid entries is kept in a reversible cell, so backtracking truncates the log
/// logically. Entries beyond it are stale and are overwritten by later appends.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<Event>,
    size: ReversibleInt,
}

impl EventLog {
    pub(crate) fn new(store: &mut ReversibleStore) -> Self {
        EventLog {
            events: Vec::new(),
            size: store.new_int(0),
        }
    }

    /// The number of events on the current branch.
    pub fn len(&self, store: &ReversibleStore) -> usize {
        store.get(self.size) as usize
    }

    pub fn is_empty(&self, store: &ReversibleStore) -> bool {
        self.len(store) == 0
    }

    /// Append an event and return its index, which is larger than that of every other event on
    /// the current branch.
    pub(crate) fn append(
        &mut self,
        store: &mut ReversibleStore,
        variable: DomainId,
        cause: Cause,
        kind: EventKind,
        values: [i32; 3],
    ) -> EventIndex {
        let size = self.len(store);
        let event = Event {
            variable,
            cause,
            kind,
            values,
        };

        if size < self.events.len() {
            self.events[size] = event;
        } else {
            self.events.push(event);
        }
        let _ = store.add(self.size, 1);

        let index = EventIndex::create_from_index(size);
        trace!("{index} {kind} on {variable} by {cause}: {values:?}");
        index
    }

    pub fn event(&self, index: EventIndex) -> &Event {
        &self.events[index.index()]
    }

    pub fn variable_of(&self, index: EventIndex) -> DomainId {
        self.event(index).variable
    }

    pub fn cause_of(&self, index: EventIndex) -> Cause {
        self.event(index).cause
    }

    pub fn kind_of(&self, index: EventIndex) -> EventKind {
        self.event(index).kind
    }

    pub fn first_value_of(&self, index: EventIndex) -> i32 {
        self.event(index).values[0]
    }

    pub fn second_value_of(&self, index: EventIndex) -> i32 {
        self.event(index).values[1]
    }

    pub fn third_value_of(&self, index: EventIndex) -> i32 {
        self.event(index).values[2]
    }

    /// The indices of the current branch, newest first.
    pub fn indices_backwards(&self, store: &ReversibleStore) -> impl Iterator<Item = EventIndex> {
        (0..self.len(store)).rev().map(EventIndex::create_from_index)
    }
}
