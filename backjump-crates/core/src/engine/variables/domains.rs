use crate::asserts::backjump_assert_moderate;
use crate::containers::KeyedVec;
use crate::engine::event_log::EventKind;
use crate::engine::predicates::Predicate;
use crate::engine::predicates::PredicateType;
use crate::engine::reversible::ReversibleBool;
use crate::engine::reversible::ReversibleInt;
use crate::engine::reversible::ReversibleStore;
use crate::engine::variables::DomainId;

/// The smallest value a domain may contain.
///
/// One value of headroom is kept at either end of the `i32` range: a predicate whose bound is
/// moved past the range by negation saturates at `i32::MIN` or `i32::MAX`, which no domain
/// contains, so its truth is unchanged.
pub const MIN_DOMAIN_VALUE: i32 = i32::MIN + 1;
/// The largest value a domain may contain; see [`MIN_DOMAIN_VALUE`].
pub const MAX_DOMAIN_VALUE: i32 = i32::MAX - 1;

/// Raised when a domain operation would leave a domain without values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EmptyDomain;

/// How a domain changed; becomes an [`Event`](crate::events::Event) in the event log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DomainChange {
    pub(crate) kind: EventKind,
    pub(crate) values: [i32; 3],
}

#[derive(Clone, Debug)]
enum Representation {
    /// Only the bounds are stored; removing a value strictly inside them has no effect.
    Bounded,
    /// A presence flag per value of the initial domain, so holes can be represented.
    Enumerated {
        offset: i32,
        present: Vec<ReversibleBool>,
        size: ReversibleInt,
    },
}

#[derive(Clone, Debug)]
struct IntegerDomain {
    lower_bound: ReversibleInt,
    upper_bound: ReversibleInt,
    representation: Representation,
}

/// The storage of all integer domains. Every cell lives in the [`ReversibleStore`].
#[derive(Clone, Debug, Default)]
pub(crate) struct DomainStore {
    domains: KeyedVec<DomainId, IntegerDomain>,
}

impl DomainStore {
    pub(crate) fn grow(
        &mut self,
        store: &mut ReversibleStore,
        lower_bound: i32,
        upper_bound: i32,
        enumerated: bool,
    ) -> DomainId {
        assert!(
            lower_bound <= upper_bound,
            "cannot create an empty domain [{lower_bound}, {upper_bound}]"
        );
        assert!(
            MIN_DOMAIN_VALUE <= lower_bound && upper_bound <= MAX_DOMAIN_VALUE,
            "the domain [{lower_bound}, {upper_bound}] exceeds [{MIN_DOMAIN_VALUE}, {MAX_DOMAIN_VALUE}]"
        );

        let representation = if enumerated {
            let size = i32::try_from(i64::from(upper_bound) - i64::from(lower_bound) + 1)
                .unwrap_or_else(|_| {
                    panic!("[{lower_bound}, {upper_bound}] has too many values to enumerate")
                });
            Representation::Enumerated {
                offset: lower_bound,
                present: (lower_bound..=upper_bound)
                    .map(|_| store.new_bool(true))
                    .collect(),
                size: store.new_int(size),
            }
        } else {
            Representation::Bounded
        };

        self.domains.push(IntegerDomain {
            lower_bound: store.new_int(lower_bound),
            upper_bound: store.new_int(upper_bound),
            representation,
        })
    }

    pub(crate) fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn domain_ids(&self) -> impl Iterator<Item = DomainId> + '_ {
        self.domains.keys()
    }

    pub(crate) fn view<'a>(&'a self, store: &'a ReversibleStore) -> Domains<'a> {
        Domains {
            domains: self,
            store,
        }
    }

    /// Make `predicate` true, reporting the resulting change if the domain changed.
    pub(crate) fn apply(
        &self,
        store: &mut ReversibleStore,
        predicate: Predicate,
    ) -> Result<Option<DomainChange>, EmptyDomain> {
        let domain = predicate.get_domain();
        let value = predicate.get_right_hand_side();

        match predicate.get_predicate_type() {
            PredicateType::LowerBound => self.tighten_lower_bound(store, domain, value),
            PredicateType::UpperBound => self.tighten_upper_bound(store, domain, value),
            PredicateType::Equal => self.instantiate(store, domain, value),
            PredicateType::NotEqual => self.remove(store, domain, value),
        }
    }

    fn tighten_lower_bound(
        &self,
        store: &mut ReversibleStore,
        domain: DomainId,
        value: i32,
    ) -> Result<Option<DomainChange>, EmptyDomain> {
        let old_lower_bound = self.view(store).lower_bound(domain);
        let upper_bound = self.view(store).upper_bound(domain);

        if value <= old_lower_bound {
            return Ok(None);
        }
        if value > upper_bound {
            return Err(EmptyDomain);
        }

        let integer_domain = &self.domains[domain];
        let new_lower_bound = match &integer_domain.representation {
            Representation::Bounded => value,
            Representation::Enumerated {
                offset,
                present,
                size,
            } => {
                let is_present = |store: &ReversibleStore, v: i32| store.get(present[(v - offset) as usize]);
                let new_lower_bound = (value..=upper_bound)
                    .find(|&v| is_present(store, v))
                    .unwrap_or(upper_bound);
                let num_removed = (old_lower_bound..new_lower_bound)
                    .filter(|&v| is_present(store, v))
                    .count() as i32;
                let _ = store.add(*size, -num_removed);
                new_lower_bound
            }
        };
        store.set(integer_domain.lower_bound, new_lower_bound);

        let change = if new_lower_bound == upper_bound {
            DomainChange {
                kind: EventKind::Instantiate,
                values: [new_lower_bound, old_lower_bound, upper_bound],
            }
        } else {
            DomainChange {
                kind: EventKind::IncreaseLowerBound,
                values: [new_lower_bound, old_lower_bound, -1],
            }
        };
        Ok(Some(change))
    }

    fn tighten_upper_bound(
        &self,
        store: &mut ReversibleStore,
        domain: DomainId,
        value: i32,
    ) -> Result<Option<DomainChange>, EmptyDomain> {
        let lower_bound = self.view(store).lower_bound(domain);
        let old_upper_bound = self.view(store).upper_bound(domain);

        if value >= old_upper_bound {
            return Ok(None);
        }
        if value < lower_bound {
            return Err(EmptyDomain);
        }

        let integer_domain = &self.domains[domain];
        let new_upper_bound = match &integer_domain.representation {
            Representation::Bounded => value,
            Representation::Enumerated {
                offset,
                present,
                size,
            } => {
                let is_present = |store: &ReversibleStore, v: i32| store.get(present[(v - offset) as usize]);
                let new_upper_bound = (lower_bound..=value)
                    .rev()
                    .find(|&v| is_present(store, v))
                    .unwrap_or(lower_bound);
                let num_removed = (new_upper_bound + 1..=old_upper_bound)
                    .filter(|&v| is_present(store, v))
                    .count() as i32;
                let _ = store.add(*size, -num_removed);
                new_upper_bound
            }
        };
        store.set(integer_domain.upper_bound, new_upper_bound);

        let change = if new_upper_bound == lower_bound {
            DomainChange {
                kind: EventKind::Instantiate,
                values: [new_upper_bound, lower_bound, old_upper_bound],
            }
        } else {
            DomainChange {
                kind: EventKind::DecreaseUpperBound,
                values: [new_upper_bound, old_upper_bound, -1],
            }
        };
        Ok(Some(change))
    }

    fn instantiate(
        &self,
        store: &mut ReversibleStore,
        domain: DomainId,
        value: i32,
    ) -> Result<Option<DomainChange>, EmptyDomain> {
        let domains = self.view(store);
        if !domains.contains(domain, value) {
            return Err(EmptyDomain);
        }
        if domains.is_fixed(domain) {
            return Ok(None);
        }

        let old_lower_bound = domains.lower_bound(domain);
        let old_upper_bound = domains.upper_bound(domain);

        let integer_domain = &self.domains[domain];
        store.set(integer_domain.lower_bound, value);
        store.set(integer_domain.upper_bound, value);
        if let Representation::Enumerated { size, .. } = &integer_domain.representation {
            store.set(*size, 1);
        }

        Ok(Some(DomainChange {
            kind: EventKind::Instantiate,
            values: [value, old_lower_bound, old_upper_bound],
        }))
    }

    fn remove(
        &self,
        store: &mut ReversibleStore,
        domain: DomainId,
        value: i32,
    ) -> Result<Option<DomainChange>, EmptyDomain> {
        let domains = self.view(store);
        if !domains.contains(domain, value) {
            return Ok(None);
        }
        if domains.is_fixed(domain) {
            return Err(EmptyDomain);
        }

        let lower_bound = domains.lower_bound(domain);
        let upper_bound = domains.upper_bound(domain);
        // The domain is not fixed, so stepping over a bound stays inside the other bound.
        if value == lower_bound {
            return self.tighten_lower_bound(store, domain, value + 1);
        }
        if value == upper_bound {
            return self.tighten_upper_bound(store, domain, value - 1);
        }

        match &self.domains[domain].representation {
            Representation::Bounded => Ok(None),
            Representation::Enumerated {
                offset,
                present,
                size,
            } => {
                store.set(present[(value - offset) as usize], false);
                let remaining = store.add(*size, -1);
                backjump_assert_moderate!(remaining > 1);

                Ok(Some(DomainChange {
                    kind: EventKind::Removal,
                    values: [value, -1, -1],
                }))
            }
        }
    }
}

/// Read access to the current domains.
#[derive(Clone, Copy, Debug)]
pub struct Domains<'a> {
    domains: &'a DomainStore,
    store: &'a ReversibleStore,
}

impl Domains<'_> {
    pub fn lower_bound(&self, domain: DomainId) -> i32 {
        self.store.get(self.domains.domains[domain].lower_bound)
    }

    pub fn upper_bound(&self, domain: DomainId) -> i32 {
        self.store.get(self.domains.domains[domain].upper_bound)
    }

    pub fn is_fixed(&self, domain: DomainId) -> bool {
        self.lower_bound(domain) == self.upper_bound(domain)
    }

    /// Whether the domain can represent holes.
    pub fn is_enumerated(&self, domain: DomainId) -> bool {
        matches!(
            self.domains.domains[domain].representation,
            Representation::Enumerated { .. }
        )
    }

    pub fn contains(&self, domain: DomainId, value: i32) -> bool {
        let lower_bound = self.lower_bound(domain);
        let upper_bound = self.upper_bound(domain);
        if value < lower_bound || value > upper_bound {
            return false;
        }

        match &self.domains.domains[domain].representation {
            Representation::Bounded => true,
            Representation::Enumerated {
                offset, present, ..
            } => self.store.get(present[(value - offset) as usize]),
        }
    }

    pub fn size(&self, domain: DomainId) -> usize {
        match &self.domains.domains[domain].representation {
            Representation::Bounded => {
                (self.upper_bound(domain) - self.lower_bound(domain) + 1) as usize
            }
            Representation::Enumerated { size, .. } => self.store.get(*size) as usize,
        }
    }

    /// The values in the domain, in increasing order.
    pub fn values(&self, domain: DomainId) -> impl Iterator<Item = i32> + '_ {
        (self.lower_bound(domain)..=self.upper_bound(domain))
            .filter(move |&value| self.contains(domain, value))
    }

    /// Whether `predicate` is known to hold (`Some(true)`), known to be violated
    /// (`Some(false)`), or neither.
    pub fn evaluate(&self, predicate: Predicate) -> Option<bool> {
        let domain = predicate.get_domain();
        let value = predicate.get_right_hand_side();

        match predicate.get_predicate_type() {
            PredicateType::LowerBound => {
                if self.lower_bound(domain) >= value {
                    Some(true)
                } else if self.upper_bound(domain) < value {
                    Some(false)
                } else {
                    None
                }
            }
            PredicateType::UpperBound => {
                if self.upper_bound(domain) <= value {
                    Some(true)
                } else if self.lower_bound(domain) > value {
                    Some(false)
                } else {
                    None
                }
            }
            PredicateType::Equal => {
                if !self.contains(domain, value) {
                    Some(false)
                } else if self.is_fixed(domain) {
                    Some(true)
                } else {
                    None
                }
            }
            PredicateType::NotEqual => self.evaluate(!predicate).map(|holds| !holds),
        }
    }
}

/// Gives read access to the domains; implemented by the contexts handed to propagators.
pub trait ReadDomains {
    fn domains(&self) -> Domains<'_>;

    fn lower_bound(&self, domain: DomainId) -> i32 {
        self.domains().lower_bound(domain)
    }

    fn upper_bound(&self, domain: DomainId) -> i32 {
        self.domains().upper_bound(domain)
    }

    fn is_fixed(&self, domain: DomainId) -> bool {
        self.domains().is_fixed(domain)
    }

    fn contains(&self, domain: DomainId, value: i32) -> bool {
        self.domains().contains(domain, value)
    }

    fn evaluate(&self, predicate: Predicate) -> Option<bool> {
        self.domains().evaluate(predicate)
    }
}
