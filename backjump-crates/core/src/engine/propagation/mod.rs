//! Contains the types needed to write propagators and the engine which schedules them.
//!
//! A [`Propagator`] is created from a [`PropagatorConstructor`], which registers the propagator
//! for [`DomainEvents`] of the variables in its scope through the
//! [`PropagatorConstructorContext`]. Whenever an event on one of those variables fires, the
//! [`PropagationEngine`] schedules the propagator with an [`EventMask`] describing what happened;
//! when it runs it receives a [`PropagationContext`] through which it reads domains and posts
//! changes.
//!
//! When a conflict is analysed, every event caused by a propagator is explained by calling
//! [`Propagator::why`] with an [`ExplanationContext`], which allows adding rules to the rule store
//! of the analysis.
mod constructor;
mod contexts;
mod domain_events;
mod local_id;
mod propagation_engine;
mod propagator;
mod propagator_id;
pub(crate) mod propagator_queue;
pub(crate) mod store;

pub use constructor::*;
pub use contexts::*;
pub use domain_events::*;
pub use local_id::LocalId;
pub use propagation_engine::EngineStatus;
pub(crate) use propagation_engine::PropagationEngine;
pub use propagator::*;
pub use propagator_id::PropagatorId;
pub use store::PropagatorHandle;
