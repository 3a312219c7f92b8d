//! Integer variables whose domains live in the [`ReversibleStore`](super::reversible::ReversibleStore).
mod domain_id;
mod domains;

pub use domain_id::DomainId;
pub(crate) use domains::DomainChange;
pub(crate) use domains::DomainStore;
pub use domains::Domains;
pub use domains::MAX_DOMAIN_VALUE;
pub use domains::MIN_DOMAIN_VALUE;
pub(crate) use domains::EmptyDomain;
pub use domains::ReadDomains;
