//! Storage and propagation of the clauses learned by the conflict analysis.
mod clause_id;
mod nogood_propagator;

pub use clause_id::*;
pub use nogood_propagator::*;
