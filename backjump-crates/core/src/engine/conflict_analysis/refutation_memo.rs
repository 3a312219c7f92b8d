use log::trace;

use super::Reason;
use crate::containers::HashMap;
use crate::engine::predicates::Predicate;

/// Remembers why left decisions were refuted, so that an explanation which meets the refuted
/// (right) decision can merge the stored reason instead of rescanning.
///
/// Entries are keyed by the refuted predicate together with the level of its decision; the same
/// predicate may be refuted at several levels of one branch. An entry is dropped as soon as the
/// search restores to a world above its level, so a restart forgets everything.
#[derive(Clone, Debug, Default)]
pub(crate) struct RefutationMemo {
    refutations: HashMap<(Predicate, usize), Reason>,
}

impl RefutationMemo {
    pub(crate) fn store(&mut self, predicate: Predicate, level: usize, reason: Reason) {
        trace!("Refutation of {predicate} at level {level} because of {reason}");
        let _ = self.refutations.insert((predicate, level), reason);
    }

    pub(crate) fn get(&self, predicate: Predicate, level: usize) -> Option<&Reason> {
        self.refutations.get(&(predicate, level))
    }

    pub(crate) fn len(&self) -> usize {
        self.refutations.len()
    }

    pub(crate) fn synchronise(&mut self, world: usize) {
        self.refutations.retain(|&(_, level), _| level <= world);
    }
}
