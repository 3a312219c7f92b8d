pub(crate) mod conflict_analysis;
pub(crate) mod decisions;
pub(crate) mod event_log;
pub(crate) mod predicates;
pub(crate) mod propagation;
pub(crate) mod reversible;
mod state;
pub(crate) mod termination;
#[cfg(test)]
pub(crate) mod test_helper;
pub(crate) mod variables;

pub use propagation::EngineStatus;
pub use state::State;
