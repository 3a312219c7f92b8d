use std::fmt::Debug;
use std::fmt::Display;
use std::ops::Not;

use crate::engine::variables::DomainId;

/// An atomic constraint `[domain op value]`; used for branching decisions and for the literals
/// of learned nogoods.
///
/// To create a [`Predicate`], use [`Predicate::new`] or the more concise [`predicate!`] macro.
///
/// [`predicate!`]: crate::predicate
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Predicate {
    domain: DomainId,
    predicate_type: PredicateType,
    value: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PredicateType {
    LowerBound,
    UpperBound,
    NotEqual,
    Equal,
}

impl Predicate {
    pub const fn new(domain: DomainId, predicate_type: PredicateType, value: i32) -> Self {
        Predicate {
            domain,
            predicate_type,
            value,
        }
    }

    pub fn get_domain(&self) -> DomainId {
        self.domain
    }

    pub fn get_predicate_type(&self) -> PredicateType {
        self.predicate_type
    }

    pub fn get_right_hand_side(&self) -> i32 {
        self.value
    }

    /// Whether this is one of the two forms (`>=` and `==`) which nogood literals encode with a
    /// positive sign; the other two forms are their negations.
    pub(crate) fn is_positive_form(&self) -> bool {
        matches!(
            self.predicate_type,
            PredicateType::LowerBound | PredicateType::Equal
        )
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        let (predicate_type, value) = match self.predicate_type {
            PredicateType::LowerBound => {
                (PredicateType::UpperBound, self.value.saturating_sub(1))
            }
            PredicateType::UpperBound => {
                (PredicateType::LowerBound, self.value.saturating_add(1))
            }
            PredicateType::NotEqual => (PredicateType::Equal, self.value),
            PredicateType::Equal => (PredicateType::NotEqual, self.value),
        };

        Predicate::new(self.domain, predicate_type, value)
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self.predicate_type {
            PredicateType::LowerBound => ">=",
            PredicateType::UpperBound => "<=",
            PredicateType::NotEqual => "!=",
            PredicateType::Equal => "==",
        };
        write!(f, "[{} {operator} {}]", self.domain, self.value)
    }
}

impl Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// Create a [`Predicate`] over a [`DomainId`](crate::variables::DomainId).
///
/// ```rust
/// # use backjump_core::predicate;
/// # use backjump_core::variables::DomainId;
/// # use backjump_core::variables::PredicateType;
/// let x = DomainId::new(0);
/// let predicate = predicate!(x >= 3);
///
/// assert_eq!(PredicateType::LowerBound, predicate.get_predicate_type());
/// assert_eq!(predicate!(x <= 2), !predicate);
/// ```
#[macro_export]
macro_rules! predicate {
    ($($var:ident).+$([$index:expr])? >= $bound:expr) => {
        $crate::variables::Predicate::new(
            $($var).+$([$index])?,
            $crate::variables::PredicateType::LowerBound,
            $bound,
        )
    };
    ($($var:ident).+$([$index:expr])? <= $bound:expr) => {
        $crate::variables::Predicate::new(
            $($var).+$([$index])?,
            $crate::variables::PredicateType::UpperBound,
            $bound,
        )
    };
    ($($var:ident).+$([$index:expr])? == $value:expr) => {
        $crate::variables::Predicate::new(
            $($var).+$([$index])?,
            $crate::variables::PredicateType::Equal,
            $value,
        )
    };
    ($($var:ident).+$([$index:expr])? != $value:expr) => {
        $crate::variables::Predicate::new(
            $($var).+$([$index])?,
            $crate::variables::PredicateType::NotEqual,
            $value,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate;

    #[test]
    fn macro_accepts_fields_and_indices() {
        struct Holder {
            x: DomainId,
            xs: Vec<DomainId>,
        }
        let holder = Holder {
            x: DomainId::new(1),
            xs: vec![DomainId::new(2)],
        };

        assert_eq!(DomainId::new(1), predicate!(holder.x >= 2).get_domain());
        assert_eq!(DomainId::new(2), predicate!(holder.xs[0] == 5).get_domain());
    }

    #[test]
    fn negation_is_an_involution() {
        let x = DomainId::new(0);

        for predicate in [
            predicate!(x >= 3),
            predicate!(x <= 3),
            predicate!(x == 3),
            predicate!(x != 3),
        ] {
            assert_eq!(predicate, !!predicate);
            assert_ne!(predicate, !predicate);
        }
        assert_eq!(predicate!(x <= 2), !predicate!(x >= 3));
    }

    #[test]
    fn negation_saturates_at_the_ends_of_the_range() {
        let x = DomainId::new(0);

        assert_eq!(predicate!(x >= i32::MAX), !predicate!(x <= i32::MAX));
        assert_eq!(predicate!(x <= i32::MIN), !predicate!(x >= i32::MIN));
    }
}
