use thiserror::Error;

use crate::engine::propagation::PropagatorId;

/// Errors raised when the propagation engine is modified at a moment it cannot accept it.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("propagators cannot be added or removed while a fixpoint computation is in progress")]
    ModificationDuringPropagation,
    #[error("{0} is not known to the engine")]
    UnknownPropagator(PropagatorId),
    #[error("{0} has already been removed")]
    PropagatorRemoved(PropagatorId),
}
