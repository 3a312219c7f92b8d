//! Propagators shipped with the kernel.
//!
//! They are deliberately small; the kernel is meant to be extended with propagators of its
//! users through the [`Propagator`](crate::propagation::Propagator) trait. The ones here are
//! used by the nogood learning of the conflict analysis and for modelling tests.
mod binary_less_or_equal;
mod binary_not_equals;
pub mod nogoods;

pub use binary_less_or_equal::*;
pub use binary_not_equals::*;
