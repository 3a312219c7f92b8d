use thiserror::Error;

use crate::engine::variables::DomainId;

/// Misuse of the rule store by a propagator explanation.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RuleStoreError {
    #[error("cannot add a removal rule for value {value} strictly inside the bounds of bounded variable {variable}")]
    RemovalRuleOnBoundedVariable { variable: DomainId, value: i32 },
    #[error("removed-value rules cannot be matched against bounded variable {variable}")]
    RemovalMatchOnBoundedVariable { variable: DomainId },
}
