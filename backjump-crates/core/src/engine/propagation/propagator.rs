use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::EventMask;
use super::ExplainedEvent;
use super::ExplanationContext;
use super::PropagationContext;
use crate::basic_types::PropagationStatus;
use crate::basic_types::RuleStoreError;
#[cfg(doc)]
use crate::statistics::create_statistics_struct;
#[cfg(doc)]
use crate::engine::conflict_analysis::RuleStore;
#[cfg(doc)]
use crate::propagation::PropagatorConstructorContext;
use crate::statistics::StatisticLogger;

// Needed to go from `Box<dyn Propagator>` back to the concrete type behind a
// `PropagatorHandle`.
impl_downcast!(Propagator);

/// A propagator removes values from domains which cannot be part of any solution, or reports a
/// [`Contradiction`](crate::Contradiction).
///
/// Besides filtering, a propagator has to be able to justify what it did: when the conflict
/// analysis meets an event caused by the propagator, [`Propagator::why`] is asked to add rules to
/// the [`RuleStore`] describing which earlier events made that event necessary.
pub trait Propagator: Downcast {
    /// Return the name of the propagator, used for printing.
    fn name(&self) -> &str;

    /// Remove unsupported values using [`PropagationContext::post`], or fail.
    ///
    /// The [`EventMask`] tells which of the subscribed events fired since the previous call; when
    /// [`EventMask::full_propagation`] is set the propagator has to assume nothing about what
    /// changed. Propagators are not required to reach a fixpoint on their own; they are called
    /// again when one of their own variables is changed by another propagator.
    fn propagate(&mut self, context: PropagationContext, events: EventMask) -> PropagationStatus;

    /// Add the rules which explain `event` (or, when `event` is [`None`], the failure of this
    /// propagator) to the rule store behind the [`ExplanationContext`].
    ///
    /// Returns whether new rules were added. The default is the weakest sound explanation: the
    /// event depends on the activation of the propagator and on the complete domains of every
    /// other variable in its scope.
    fn why(
        &self,
        context: &mut ExplanationContext,
        event: Option<ExplainedEvent>,
    ) -> Result<bool, RuleStoreError> {
        let mut new_rules = context.add_propagator_activation_rule();

        let explained_variable = event.map(|event| event.variable);
        for index in 0..context.scope().len() {
            let variable = context.scope()[index];
            if Some(variable) != explained_variable {
                new_rules |= context.add_full_domain_rule(variable);
            }
        }

        Ok(new_rules)
    }

    /// The [`Priority`] of the propagator. Propagators with a higher priority are run first.
    fn priority(&self) -> Priority {
        Priority::VeryLow
    }

    /// Logs statistics of the propagator using the provided [`StatisticLogger`].
    ///
    /// It is recommended to create a struct through the [`create_statistics_struct!`] macro.
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

/// The priority of a propagator, used for determining the order in which propagators will be
/// called.
///
/// Propagators with high priority are propagated before propagators with low(er) priority. If two
/// propagators have the same priority, then the order in which they are propagated is the order
/// in which they were scheduled.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
    #[default]
    VeryLow = 3,
}

impl Priority {
    pub(crate) const NUM_PRIORITIES: usize = 4;
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        ((*self) as u8).cmp(&((*other) as u8))
    }
}

/// The lifecycle of a propagator on the current branch.
///
/// A propagator which is not reified starts [`Active`](PropagatorStatus::Active); a reified one
/// starts [`Passive`](PropagatorStatus::Passive) and is activated once its reification variable
/// becomes true. An [`Entailed`](PropagatorStatus::Entailed) propagator is never scheduled again
/// on this branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropagatorStatus {
    Passive,
    Active,
    Entailed,
}

impl PropagatorStatus {
    pub(crate) fn to_int(self) -> i32 {
        match self {
            PropagatorStatus::Passive => 0,
            PropagatorStatus::Active => 1,
            PropagatorStatus::Entailed => 2,
        }
    }

    pub(crate) fn from_int(value: i32) -> Self {
        match value {
            0 => PropagatorStatus::Passive,
            1 => PropagatorStatus::Active,
            2 => PropagatorStatus::Entailed,
            _ => unreachable!("invalid propagator status {value}"),
        }
    }
}
