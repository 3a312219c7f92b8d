use std::fmt::Display;

use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

use crate::engine::event_log::EventKind;

/// The kinds of domain changes a propagator can subscribe to.
#[derive(Debug, EnumSetType, Hash)]
pub enum DomainEvent {
    /// The domain collapsed to a single value.
    Assign,
    /// The lower bound increased.
    LowerBound,
    /// The upper bound decreased.
    UpperBound,
    /// Any value was removed.
    Removal,
}

impl Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::Assign => write!(f, "[Event:Assign]"),
            DomainEvent::LowerBound => write!(f, "[Event:LB]"),
            DomainEvent::UpperBound => write!(f, "[Event:UB]"),
            DomainEvent::Removal => write!(f, "[Event:Remove]"),
        }
    }
}

impl EventKind {
    /// The domain events which are implied by an event of this kind. An instantiation also
    /// moves a bound and removes values, a bound change also removes values.
    pub(crate) fn triggered_domain_events(self) -> EnumSet<DomainEvent> {
        match self {
            EventKind::Instantiate => EnumSet::all(),
            EventKind::IncreaseLowerBound => DomainEvent::LowerBound | DomainEvent::Removal,
            EventKind::DecreaseUpperBound => DomainEvent::UpperBound | DomainEvent::Removal,
            EventKind::Removal => enum_set!(DomainEvent::Removal),
            EventKind::PropagatorActivation => EnumSet::empty(),
        }
    }
}

/// The set of [`DomainEvent`]s a propagator registers for on one variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DomainEvents {
    events: EnumSet<DomainEvent>,
}

impl DomainEvents {
    /// Lower and upper bound tightening.
    pub const BOUNDS: DomainEvents =
        DomainEvents::new(enum_set!(DomainEvent::LowerBound | DomainEvent::UpperBound));
    /// Every change to the domain.
    pub const ANY_INT: DomainEvents = DomainEvents::new(enum_set!(
        DomainEvent::Assign | DomainEvent::LowerBound | DomainEvent::UpperBound | DomainEvent::Removal
    ));
    pub const LOWER_BOUND: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::LowerBound));
    pub const UPPER_BOUND: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::UpperBound));
    pub const ASSIGN: DomainEvents = DomainEvents::new(enum_set!(DomainEvent::Assign));

    pub const fn new(events: EnumSet<DomainEvent>) -> Self {
        DomainEvents { events }
    }

    pub fn events(&self) -> EnumSet<DomainEvent> {
        self.events
    }
}

/// What happened since a propagator last ran; handed to
/// [`Propagator::propagate`](super::Propagator::propagate).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EventMask {
    /// Set when the propagator has never run on this branch or was just activated, in which
    /// case it should propagate from scratch.
    pub full_propagation: bool,
    /// The union of the subscribed events which fired.
    pub events: EnumSet<DomainEvent>,
}

impl EventMask {
    pub(crate) const FULL: EventMask = EventMask {
        full_propagation: true,
        events: EnumSet::EMPTY,
    };

    pub(crate) fn merge(&mut self, other: EventMask) {
        self.full_propagation |= other.full_propagation;
        self.events |= other.events;
    }
}
