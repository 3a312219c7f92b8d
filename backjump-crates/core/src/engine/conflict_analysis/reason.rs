use std::collections::BTreeMap;
use std::fmt::Display;

use itertools::Itertools;

use crate::containers::HashSet;
use crate::engine::predicates::Predicate;
use crate::engine::propagation::PropagatorId;

/// A sufficient explanation of a contradiction or of a refutation: the propagators involved
/// and the (left) decisions it depends on.
///
/// Decisions are stored by level; at most one decision exists per level on a branch, so both
/// parts are duplicate-free and independent of insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reason {
    causes: HashSet<PropagatorId>,
    decisions: BTreeMap<usize, Predicate>,
}

impl Reason {
    /// A copy of the membership of both sets.
    pub fn duplicate(&self) -> Reason {
        self.clone()
    }

    pub fn add_cause(&mut self, propagator: PropagatorId) {
        let _ = self.causes.insert(propagator);
    }

    pub fn add_decision(&mut self, level: usize, predicate: Predicate) {
        let _ = self.decisions.insert(level, predicate);
    }

    pub fn remove_decision(&mut self, level: usize) -> Option<Predicate> {
        self.decisions.remove(&level)
    }

    /// Add every cause and decision of `other`.
    pub fn merge(&mut self, other: &Reason) {
        self.causes.extend(other.causes.iter().copied());
        self.decisions
            .extend(other.decisions.iter().map(|(&level, &predicate)| (level, predicate)));
    }

    pub fn contains_cause(&self, propagator: PropagatorId) -> bool {
        self.causes.contains(&propagator)
    }

    pub fn contains_decision_at(&self, level: usize) -> bool {
        self.decisions.contains_key(&level)
    }

    /// The propagators in the reason, in no particular order.
    pub fn causes(&self) -> impl Iterator<Item = PropagatorId> + '_ {
        self.causes.iter().copied()
    }

    /// The decisions in the reason by increasing level.
    pub fn decisions(&self) -> impl Iterator<Item = (usize, Predicate)> + '_ {
        self.decisions
            .iter()
            .map(|(&level, &predicate)| (level, predicate))
    }

    pub fn num_causes(&self) -> usize {
        self.causes.len()
    }

    pub fn num_decisions(&self) -> usize {
        self.decisions.len()
    }

    /// The decision with the highest level, the one conflict-directed backjumping returns to.
    pub fn deepest_decision(&self) -> Option<(usize, Predicate)> {
        self.decisions
            .last_key_value()
            .map(|(&level, &predicate)| (level, predicate))
    }

    /// Whether every level from 1 up to and including `level` has its decision in the reason,
    /// in which case nothing further back can change the backjump target.
    pub(crate) fn covers_levels_up_to(&self, level: usize) -> bool {
        self.decisions.range(1..=level).count() == level
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "decisions: [{}], causes: [{}]",
            self.decisions
                .iter()
                .map(|(level, predicate)| format!("{level}: {predicate}"))
                .join(", "),
            self.causes.iter().sorted().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::variables::DomainId;
    use crate::predicate;

    #[test]
    fn merge_is_a_set_union() {
        let x = DomainId::new(0);
        let y = DomainId::new(1);

        let mut first = Reason::default();
        first.add_cause(PropagatorId(0));
        first.add_decision(1, predicate!(x == 0));

        let mut second = Reason::default();
        second.add_cause(PropagatorId(0));
        second.add_cause(PropagatorId(1));
        second.add_decision(1, predicate!(x == 0));
        second.add_decision(3, predicate!(y == 2));

        first.merge(&second);

        assert_eq!(first.num_causes(), 2);
        assert_eq!(first.num_decisions(), 2);
        assert_eq!(first.deepest_decision(), Some((3, predicate!(y == 2))));
    }

    #[test]
    fn duplicate_is_independent_of_the_original() {
        let x = DomainId::new(0);
        let mut reason = Reason::default();
        reason.add_decision(2, predicate!(x >= 1));

        let mut copy = reason.duplicate();
        let _ = copy.remove_decision(2);

        assert!(reason.contains_decision_at(2));
        assert!(!copy.contains_decision_at(2));
    }

    #[test]
    fn level_coverage() {
        let x = DomainId::new(0);
        let mut reason = Reason::default();
        reason.add_decision(1, predicate!(x >= 1));
        reason.add_decision(3, predicate!(x >= 3));

        assert!(reason.covers_levels_up_to(1));
        assert!(!reason.covers_levels_up_to(3));

        reason.add_decision(2, predicate!(x >= 2));
        assert!(reason.covers_levels_up_to(3));
        assert!(reason.covers_levels_up_to(0));
    }
}
