//! The chain of branching decisions from the root to the current search node.
//!
//! Decisions live in an arena and are addressed by [`DecisionId`]; the link to the previous
//! decision is a plain id used for traversal only. Slots of undone decisions are reused.
use std::fmt::Display;

use log::trace;

use crate::asserts::backjump_assert_simple;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::predicates::Predicate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecisionId(u32);

impl StorageKey for DecisionId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        DecisionId(index as u32)
    }
}

impl Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Decision({})", self.0)
    }
}

/// A branching decision.
///
/// A *left* decision applies its predicate; once it has been refuted the *right* decision at
/// the same level applies the negation of the predicate instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    predicate: Predicate,
    level: usize,
    refuted: bool,
    previous: Option<DecisionId>,
}

impl Decision {
    /// The predicate of the left branch, also for a refuted decision.
    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// The predicate which was actually applied to the domains.
    pub fn applied_predicate(&self) -> Predicate {
        if self.refuted {
            !self.predicate
        } else {
            self.predicate
        }
    }

    /// The world the decision opened.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_refuted(&self) -> bool {
        self.refuted
    }

    pub fn previous(&self) -> Option<DecisionId> {
        self.previous
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct DecisionStore {
    decisions: KeyedVec<DecisionId, Decision>,
    free: Vec<DecisionId>,
    last: Option<DecisionId>,
}

impl DecisionStore {
    pub(crate) fn push(&mut self, predicate: Predicate, level: usize, refuted: bool) -> DecisionId {
        backjump_assert_simple!(
            self.last.map_or(true, |last| self.decisions[last].level < level),
            "decisions must be pushed at increasing levels"
        );

        let decision = Decision {
            predicate,
            level,
            refuted,
            previous: self.last,
        };

        let id = match self.free.pop() {
            Some(id) => {
                self.decisions[id] = decision;
                id
            }
            None => self.decisions.push(decision),
        };

        self.last = Some(id);
        id
    }

    pub(crate) fn get(&self, id: DecisionId) -> &Decision {
        &self.decisions[id]
    }

    pub(crate) fn last(&self) -> Option<DecisionId> {
        self.last
    }

    /// The decisions from the most recent one back to the root.
    pub(crate) fn iter_from_last(&self) -> impl Iterator<Item = DecisionId> + '_ {
        std::iter::successors(self.last, |&id| self.decisions[id].previous)
    }

    pub(crate) fn at_level(&self, level: usize) -> Option<DecisionId> {
        self.iter_from_last()
            .find(|&id| self.decisions[id].level <= level)
            .filter(|&id| self.decisions[id].level == level)
    }

    /// Release every decision above `world`.
    pub(crate) fn synchronise(&mut self, world: usize) {
        while let Some(last) = self.last {
            let decision = self.decisions[last];
            if decision.level <= world {
                break;
            }

            trace!("releasing {last} at level {}", decision.level);
            self.free.push(last);
            self.last = decision.previous;
        }
    }
}
