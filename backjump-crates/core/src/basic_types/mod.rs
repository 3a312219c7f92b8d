mod engine_error;
mod propagation_status;
mod rule_store_error;
mod trail;

pub use engine_error::EngineError;
pub use propagation_status::Contradiction;
pub use propagation_status::PropagationStatus;
pub use rule_store_error::RuleStoreError;
pub(crate) use trail::Trail;
