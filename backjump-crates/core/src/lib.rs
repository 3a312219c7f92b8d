//! # Backjump
//! The kernel of a constraint-programming solver that backtracks non-chronologically.
//!
//! It consists of three tightly coupled parts:
//! - a reversible memory model ([`ReversibleStore`]) in which every piece of search state lives,
//!   so that restoring an earlier search node is a matter of popping worlds;
//! - an event-driven propagation engine which drives [`Propagator`]s to a fixpoint while
//!   recording every domain change in an [`EventLog`];
//! - a conflict analyser ([`ConflictAnalyzer`]) which replays the event log backwards from a
//!   [`Contradiction`], computes a [`Reason`] for it and jumps back to the most recent decision
//!   that is actually implicated.
//!
//! The search loop itself (which variable to branch on, when to stop) is left to the caller; the
//! [`State`] only offers the operations such a loop needs.
//!
//! # Example
//! ```rust
//! # use backjump_core::State;
//! # use backjump_core::ConflictAnalyzer;
//! # use backjump_core::ConflictOutcome;
//! # use backjump_core::predicate;
//! # use backjump_core::propagators::BinaryNotEqualsArgs;
//! let mut state = State::default();
//! let x = state.new_variable(0, 1);
//! let y = state.new_variable(0, 1);
//! let z = state.new_variable(0, 1);
//!
//! state.add_propagator(BinaryNotEqualsArgs { a: x, b: y }).unwrap();
//! state.add_propagator(BinaryNotEqualsArgs { a: y, b: z }).unwrap();
//! state.add_propagator(BinaryNotEqualsArgs { a: x, b: z }).unwrap();
//!
//! let mut analyzer = ConflictAnalyzer::default();
//!
//! let contradiction = state
//!     .decide(predicate!(x == 0))
//!     .and_then(|_| state.propagate())
//!     .expect_err("three pairwise different booleans cannot exist");
//!
//! let outcome = analyzer
//!     .analyse(&mut state, contradiction)
//!     .expect("the propagators only use valid rules");
//!
//! match outcome {
//!     ConflictOutcome::Backjump { refuted, .. } => {
//!         assert_eq!(refuted, predicate!(x == 0));
//!         // The right branch: x != 0.
//!         assert!(state.refute(refuted).is_ok());
//!     }
//!     ConflictOutcome::RootInfeasible { .. } => unreachable!(),
//! }
//! ```
pub(crate) mod asserts;
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod engine;
pub mod propagators;
pub mod statistics;

#[cfg(doc)]
use crate::engine::event_log::EventLog;
#[cfg(doc)]
use crate::engine::propagation::Propagator;
#[cfg(doc)]
use crate::engine::reversible::ReversibleStore;

pub use crate::basic_types::Contradiction;
pub use crate::basic_types::EngineError;
pub use crate::basic_types::PropagationStatus;
pub use crate::basic_types::RuleStoreError;
pub use crate::engine::conflict_analysis::BackjumpStrategy;
pub use crate::engine::conflict_analysis::ConflictAnalyzer;
pub use crate::engine::conflict_analysis::ConflictOutcome;
pub use crate::engine::conflict_analysis::ExplanationOptions;
pub use crate::engine::conflict_analysis::LearnedClause;
pub use crate::engine::conflict_analysis::LiteralEncoding;
pub use crate::engine::conflict_analysis::NogoodSink;
pub use crate::engine::conflict_analysis::Reason;
pub use crate::engine::conflict_analysis::RuleKind;
pub use crate::engine::conflict_analysis::RuleStore;
pub use crate::engine::decisions::Decision;
pub use crate::engine::decisions::DecisionId;
pub use crate::engine::EngineStatus;
pub use crate::engine::State;

/// The event log, the cause of an event and the kinds of events which are recorded.
pub mod events {
    pub use crate::engine::event_log::Cause;
    pub use crate::engine::event_log::Event;
    pub use crate::engine::event_log::EventIndex;
    pub use crate::engine::event_log::EventKind;
    pub use crate::engine::event_log::EventLog;
}

/// Reversible (undoable) memory: every primitive created here is restored when a world is popped.
pub mod reversible {
    pub use crate::engine::reversible::ReversibleBool;
    pub use crate::engine::reversible::ReversibleHandle;
    pub use crate::engine::reversible::ReversibleInt;
    pub use crate::engine::reversible::ReversibleLong;
    pub use crate::engine::reversible::ReversibleStore;
    pub use crate::engine::reversible::ReversibleVector;
}

/// Integer variables and the predicates over them which are used for decisions and nogoods.
pub mod variables {
    pub use crate::engine::predicates::Predicate;
    pub use crate::engine::predicates::PredicateType;
    pub use crate::engine::variables::DomainId;
    pub use crate::engine::variables::Domains;
    pub use crate::engine::variables::MAX_DOMAIN_VALUE;
    pub use crate::engine::variables::MIN_DOMAIN_VALUE;
    pub use crate::engine::variables::ReadDomains;
}

/// Everything needed to implement a propagator.
pub mod propagation {
    pub use crate::engine::propagation::DomainEvent;
    pub use crate::engine::propagation::DomainEvents;
    pub use crate::engine::propagation::EventMask;
    pub use crate::engine::propagation::ExplainedEvent;
    pub use crate::engine::propagation::ExplanationContext;
    pub use crate::engine::propagation::LocalId;
    pub use crate::engine::propagation::PropagationContext;
    pub use crate::engine::propagation::Propagator;
    pub use crate::engine::propagation::PropagatorConstructor;
    pub use crate::engine::propagation::PropagatorConstructorContext;
    pub use crate::engine::propagation::PropagatorHandle;
    pub use crate::engine::propagation::PropagatorId;
    pub use crate::engine::propagation::PropagatorStatus;
    pub use crate::engine::propagation::Priority;
}

/// Conditions which a search loop can poll to decide when to give up.
pub mod termination {
    pub use crate::engine::termination::*;
}
