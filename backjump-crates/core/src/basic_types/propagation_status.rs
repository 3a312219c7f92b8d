use std::fmt::Display;

use crate::engine::event_log::Cause;
use crate::engine::variables::DomainId;

/// The result of (part of) a propagation pass.
pub type PropagationStatus = Result<(), Contradiction>;

/// Signals that the current branch of the search tree is infeasible.
///
/// It names the culprit which detected the failure and, for a domain wipe-out, the variable whose
/// domain became empty. The value is small and [`Copy`] so that raising it never allocates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contradiction {
    pub cause: Cause,
    pub variable: Option<DomainId>,
    pub message: &'static str,
}

impl Contradiction {
    pub(crate) const DOMAIN_WIPE_OUT: &'static str = "domain wipe-out";

    /// A contradiction raised by `cause` without an empty domain, e.g. a violated nogood.
    pub fn new(cause: Cause, message: &'static str) -> Self {
        Contradiction {
            cause,
            variable: None,
            message,
        }
    }

    pub(crate) fn wipe_out(cause: Cause, variable: DomainId) -> Self {
        Contradiction {
            cause,
            variable: Some(variable),
            message: Contradiction::DOMAIN_WIPE_OUT,
        }
    }
}

impl Display for Contradiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.variable {
            Some(variable) => write!(f, "{} on {variable} ({})", self.message, self.cause),
            None => write!(f, "{} ({})", self.message, self.cause),
        }
    }
}
