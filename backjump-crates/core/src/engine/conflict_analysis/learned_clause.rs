use std::fmt::Display;

use itertools::Itertools;

use crate::containers::HashMap;
use crate::engine::predicates::Predicate;
use crate::engine::predicates::PredicateType;

/// Maps predicates to signed integer literals.
///
/// Only `[x >= v]` and `[x == v]` get a code of their own (starting at 1); `[x <= v]` is encoded
/// as the negation of `[x >= v + 1]` and `[x != v]` as the negation of `[x == v]`.
#[derive(Clone, Debug, Default)]
pub struct LiteralEncoding {
    codes: HashMap<Predicate, i32>,
    predicates: Vec<Predicate>,
}

impl LiteralEncoding {
    /// The literal of `predicate`, allocating a code the first time its positive form is seen.
    pub fn literal(&mut self, predicate: Predicate) -> i32 {
        let (positive, sign) = positive_form(predicate);

        let code = match self.codes.get(&positive) {
            Some(&code) => code,
            None => {
                self.predicates.push(positive);
                let code = self.predicates.len() as i32;
                let _ = self.codes.insert(positive, code);
                code
            }
        };

        sign * code
    }

    /// The predicate a literal stands for, if it was handed out by this encoding.
    pub fn predicate(&self, literal: i32) -> Option<Predicate> {
        if literal == 0 {
            return None;
        }

        let positive = *self
            .predicates
            .get(literal.unsigned_abs() as usize - 1)?;
        Some(if literal > 0 { positive } else { !positive })
    }

    pub fn num_codes(&self) -> usize {
        self.predicates.len()
    }
}

fn positive_form(predicate: Predicate) -> (Predicate, i32) {
    if predicate.is_positive_form() {
        return (predicate, 1);
    }

    let domain = predicate.get_domain();
    let value = predicate.get_right_hand_side();
    let positive = match predicate.get_predicate_type() {
        PredicateType::UpperBound => {
            Predicate::new(domain, PredicateType::LowerBound, value.saturating_add(1))
        }
        PredicateType::NotEqual => Predicate::new(domain, PredicateType::Equal, value),
        PredicateType::LowerBound | PredicateType::Equal => unreachable!(),
    };
    (positive, -1)
}

/// A disjunction forbidding a combination of left decisions from recurring: at least one of the
/// predicates has to hold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LearnedClause {
    /// The signed literals of the clause, in the order of `predicates`.
    pub literals: Vec<i32>,
    pub predicates: Vec<Predicate>,
}

impl LearnedClause {
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl Display for LearnedClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.predicates.iter().join(" \\/ "))
    }
}

/// Receives the clauses learned from conflicts.
pub trait NogoodSink {
    fn add_nogood(&mut self, clause: &LearnedClause);
}
