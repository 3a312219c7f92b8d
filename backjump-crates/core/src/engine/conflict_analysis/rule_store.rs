use enumset::EnumSet;
use enumset::EnumSetType;
use log::trace;

use crate::basic_types::RuleStoreError;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::engine::event_log::Event;
use crate::engine::event_log::EventKind;
use crate::engine::propagation::PropagatorId;
use crate::engine::variables::DomainId;
use crate::engine::variables::Domains;

/// What about the domain of a variable is relevant to the explanation under construction.
#[derive(Debug, EnumSetType, Hash)]
pub enum RuleKind {
    LowerBound,
    UpperBound,
    RemovedValue,
    FullDomain,
}

#[derive(Clone, Debug, Default)]
struct VariableRules {
    kinds: EnumSet<RuleKind>,
    removed_values: HashSet<i32>,
}

/// Decides, during the backward scan over the event log, which events are relevant to the
/// explanation being built.
///
/// Rules are only ever added within one scan; [`RuleStore::reset`] clears them before the next
/// analysis.
#[derive(Clone, Debug, Default)]
pub struct RuleStore {
    rules: HashMap<DomainId, VariableRules>,
    wanted_activations: HashSet<PropagatorId>,
}

impl RuleStore {
    pub fn reset(&mut self) {
        self.rules.clear();
        self.wanted_activations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.wanted_activations.is_empty()
    }

    /// The kinds of rules registered for `variable`.
    pub fn rule_kinds(&self, variable: DomainId) -> EnumSet<RuleKind> {
        self.rules
            .get(&variable)
            .map(|rules| rules.kinds)
            .unwrap_or_default()
    }

    fn add_kind(&mut self, variable: DomainId, kind: RuleKind) -> bool {
        let rules = self.rules.entry(variable).or_default();
        if rules.kinds.contains(RuleKind::FullDomain) {
            return false;
        }

        let is_new = rules.kinds.insert(kind);
        if is_new {
            trace!("New {kind:?} rule on {variable}");
        }
        is_new
    }

    pub fn add_full_domain_rule(&mut self, variable: DomainId) -> bool {
        self.add_kind(variable, RuleKind::FullDomain)
    }

    pub fn add_lower_bound_rule(&mut self, variable: DomainId) -> bool {
        self.add_kind(variable, RuleKind::LowerBound)
    }

    pub fn add_upper_bound_rule(&mut self, variable: DomainId) -> bool {
        self.add_kind(variable, RuleKind::UpperBound)
    }

    pub fn add_bounds_rule(&mut self, variable: DomainId) -> bool {
        let lower = self.add_lower_bound_rule(variable);
        let upper = self.add_upper_bound_rule(variable);
        lower || upper
    }

    /// The removal of `value` from `variable` is relevant.
    ///
    /// A bounded variable only records its bounds, so the removal of a value can only be
    /// observed as a bound change: a value at or below the lower bound becomes a lower-bound
    /// rule, one at or above the upper bound an upper-bound rule. Any other value is an error.
    pub fn add_removal_rule(
        &mut self,
        domains: Domains,
        variable: DomainId,
        value: i32,
    ) -> Result<bool, RuleStoreError> {
        if !domains.is_enumerated(variable) {
            return if value <= domains.lower_bound(variable) {
                Ok(self.add_lower_bound_rule(variable))
            } else if value >= domains.upper_bound(variable) {
                Ok(self.add_upper_bound_rule(variable))
            } else {
                Err(RuleStoreError::RemovalRuleOnBoundedVariable { variable, value })
            };
        }

        let rules = self.rules.entry(variable).or_default();
        if rules.kinds.contains(RuleKind::FullDomain) {
            return Ok(false);
        }

        let _ = rules.kinds.insert(RuleKind::RemovedValue);
        let is_new = rules.removed_values.insert(value);
        if is_new {
            trace!("New removal rule on {variable} for {value}");
        }
        Ok(is_new)
    }

    pub fn add_propagator_activation_rule(&mut self, propagator: PropagatorId) -> bool {
        self.wanted_activations.insert(propagator)
    }

    /// Whether `event` is relevant given the current rules.
    ///
    /// Bound and removal rules are evaluated against the values recorded in the event and,
    /// for removals, against the current bounds of the variable.
    pub fn matches(&self, domains: Domains, event: &Event) -> Result<bool, RuleStoreError> {
        if event.kind == EventKind::PropagatorActivation {
            let propagator = PropagatorId(event.values[0] as u32);
            return Ok(self.wanted_activations.contains(&propagator));
        }

        let Some(rules) = self.rules.get(&event.variable) else {
            return Ok(false);
        };

        if rules.kinds.contains(RuleKind::FullDomain) {
            return Ok(true);
        }

        for kind in rules.kinds {
            let matched = match kind {
                RuleKind::FullDomain => true,
                RuleKind::LowerBound => matches_lower_bound(domains, event),
                RuleKind::UpperBound => matches_upper_bound(domains, event),
                RuleKind::RemovedValue => {
                    if !domains.is_enumerated(event.variable) {
                        return Err(RuleStoreError::RemovalMatchOnBoundedVariable {
                            variable: event.variable,
                        });
                    }
                    matches_removed_values(&rules.removed_values, event)
                }
            };

            if matched {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Account for a matched activation event: the activation now depends on the complete
    /// domain of the reification variable, and the propagator is no longer wanted.
    pub(crate) fn explain_activation(&mut self, event: &Event) {
        let propagator = PropagatorId(event.values[0] as u32);
        let _ = self.wanted_activations.remove(&propagator);
        let _ = self.add_full_domain_rule(event.variable);
    }
}

fn matches_lower_bound(domains: Domains, event: &Event) -> bool {
    let [v1, v2, _] = event.values;
    match event.kind {
        EventKind::Instantiate => v1 > v2,
        EventKind::IncreaseLowerBound => true,
        EventKind::DecreaseUpperBound => false,
        EventKind::Removal => v1 < domains.lower_bound(event.variable),
        EventKind::PropagatorActivation => false,
    }
}

fn matches_upper_bound(domains: Domains, event: &Event) -> bool {
    let [v1, _, v3] = event.values;
    match event.kind {
        EventKind::Instantiate => v1 < v3,
        EventKind::DecreaseUpperBound => true,
        EventKind::IncreaseLowerBound => false,
        EventKind::Removal => v1 > domains.upper_bound(event.variable),
        EventKind::PropagatorActivation => false,
    }
}

fn matches_removed_values(removed_values: &HashSet<i32>, event: &Event) -> bool {
    let [v1, v2, v3] = event.values;
    let intersects = |from: i32, to: i32| {
        removed_values
            .iter()
            .any(|&value| from <= value && value <= to)
    };

    match event.kind {
        EventKind::Instantiate => intersects(v2, v3),
        EventKind::DecreaseUpperBound => intersects(v1, v2),
        EventKind::IncreaseLowerBound => intersects(v2, v1),
        EventKind::Removal => removed_values.contains(&v1),
        EventKind::PropagatorActivation => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::event_log::Cause;
    use crate::engine::reversible::ReversibleStore;
    use crate::engine::variables::DomainStore;

    fn event(variable: DomainId, kind: EventKind, values: [i32; 3]) -> Event {
        Event {
            variable,
            cause: Cause::Root,
            kind,
            values,
        }
    }

    fn inc_low(variable: DomainId, new: i32, old: i32) -> Event {
        event(variable, EventKind::IncreaseLowerBound, [new, old, -1])
    }

    fn dec_upp(variable: DomainId, new: i32, old: i32) -> Event {
        event(variable, EventKind::DecreaseUpperBound, [new, old, -1])
    }

    fn inst(variable: DomainId, value: i32, old_lb: i32, old_ub: i32) -> Event {
        event(variable, EventKind::Instantiate, [value, old_lb, old_ub])
    }

    fn remove(variable: DomainId, value: i32) -> Event {
        event(variable, EventKind::Removal, [value, -1, -1])
    }

    fn setup(enumerated: bool) -> (ReversibleStore, DomainStore, DomainId) {
        let mut store = ReversibleStore::default();
        let mut domains = DomainStore::default();
        let x = domains.grow(&mut store, 0, 6, enumerated);
        (store, domains, x)
    }

    #[test]
    fn lower_bound_rule() {
        let (store, domains, x) = setup(true);
        let domains = domains.view(&store);
        let mut rules = RuleStore::default();
        assert!(rules.add_lower_bound_rule(x));

        assert!(rules.matches(domains, &inc_low(x, 1, 0)).unwrap());
        assert!(!rules.matches(domains, &dec_upp(x, 4, 6)).unwrap());
        assert!(rules.matches(domains, &inst(x, 3, 1, 4)).unwrap());
        assert!(rules.matches(domains, &inst(x, 3, 1, 3)).unwrap());
        assert!(!rules.matches(domains, &inst(x, 3, 3, 4)).unwrap());
        assert!(!rules.matches(domains, &remove(x, 3)).unwrap());
        assert!(rules.matches(domains, &remove(x, -1)).unwrap());
    }

    #[test]
    fn upper_bound_rule() {
        let (store, domains, x) = setup(true);
        let domains = domains.view(&store);
        let mut rules = RuleStore::default();
        assert!(rules.add_upper_bound_rule(x));

        assert!(rules.matches(domains, &dec_upp(x, 4, 6)).unwrap());
        assert!(!rules.matches(domains, &inc_low(x, 1, 0)).unwrap());
        assert!(rules.matches(domains, &inst(x, 3, 1, 4)).unwrap());
        assert!(rules.matches(domains, &inst(x, 3, 3, 4)).unwrap());
        assert!(!rules.matches(domains, &inst(x, 3, 1, 3)).unwrap());
        assert!(!rules.matches(domains, &remove(x, -1)).unwrap());
        assert!(rules.matches(domains, &remove(x, 7)).unwrap());
    }

    #[test]
    fn bounds_rule() {
        let (store, domains, x) = setup(true);
        let domains = domains.view(&store);
        let mut rules = RuleStore::default();
        assert!(rules.add_bounds_rule(x));
        assert!(!rules.add_bounds_rule(x));

        assert!(rules.matches(domains, &dec_upp(x, 4, 6)).unwrap());
        assert!(rules.matches(domains, &inc_low(x, 1, 0)).unwrap());
        assert!(rules.matches(domains, &inst(x, 3, 1, 4)).unwrap());
        assert!(rules.matches(domains, &remove(x, -1)).unwrap());
        assert!(rules.matches(domains, &remove(x, 7)).unwrap());
        assert!(!rules.matches(domains, &remove(x, 3)).unwrap());
    }

    #[test]
    fn removed_value_rule() {
        let (store, domains, x) = setup(true);
        let domains = domains.view(&store);
        let mut rules = RuleStore::default();
        assert!(rules.add_removal_rule(domains, x, 8).unwrap());
        assert!(rules.add_removal_rule(domains, x, -2).unwrap());
        assert!(!rules.add_removal_rule(domains, x, 8).unwrap());

        assert!(rules.matches(domains, &remove(x, 8)).unwrap());
        assert!(!rules.matches(domains, &remove(x, 3)).unwrap());
        assert!(!rules.matches(domains, &dec_upp(x, 4, 6)).unwrap());
        assert!(rules.matches(domains, &dec_upp(x, 6, 8)).unwrap());
        assert!(!rules.matches(domains, &inc_low(x, 1, 0)).unwrap());
        assert!(rules.matches(domains, &inc_low(x, 0, -3)).unwrap());
        assert!(rules.matches(domains, &inst(x, 3, 1, 9)).unwrap());
        assert!(rules.matches(domains, &inst(x, 3, -2, 4)).unwrap());
        assert!(!rules.matches(domains, &inst(x, 3, 1, 3)).unwrap());
    }

    #[test]
    fn removal_rules_on_bounded_variables_become_bound_rules() {
        let (store, domains, x) = setup(false);
        let domains = domains.view(&store);
        let mut rules = RuleStore::default();

        assert!(rules.add_removal_rule(domains, x, 8).unwrap());
        assert_eq!(rules.rule_kinds(x), EnumSet::only(RuleKind::UpperBound));

        assert!(rules.add_removal_rule(domains, x, -2).unwrap());
        assert_eq!(
            rules.rule_kinds(x),
            RuleKind::UpperBound | RuleKind::LowerBound
        );

        assert_eq!(
            rules.add_removal_rule(domains, x, 3),
            Err(RuleStoreError::RemovalRuleOnBoundedVariable {
                variable: x,
                value: 3
            })
        );
    }

    #[test]
    fn full_domain_rule_matches_everything_and_absorbs_other_rules() {
        let (store, domains, x) = setup(true);
        let domains = domains.view(&store);
        let mut rules = RuleStore::default();
        assert!(rules.add_full_domain_rule(x));
        assert!(!rules.add_lower_bound_rule(x));
        assert!(!rules.add_removal_rule(domains, x, 3).unwrap());

        assert!(rules.matches(domains, &remove(x, 3)).unwrap());
        assert!(rules.matches(domains, &dec_upp(x, 4, 6)).unwrap());
    }

    #[test]
    fn variables_without_rules_never_match() {
        let (mut store, mut domain_store, x) = setup(true);
        let y = domain_store.grow(&mut store, 0, 6, true);
        let domains = domain_store.view(&store);
        let mut rules = RuleStore::default();
        let _ = rules.add_full_domain_rule(x);

        assert!(!rules.matches(domains, &inc_low(y, 1, 0)).unwrap());
    }

    #[test]
    fn activation_events_match_wanted_propagators_once() {
        let (store, domains, x) = setup(true);
        let domains = domains.view(&store);
        let mut rules = RuleStore::default();
        let activation = event(x, EventKind::PropagatorActivation, [4, -1, -1]);

        assert!(!rules.matches(domains, &activation).unwrap());
        assert!(rules.add_propagator_activation_rule(PropagatorId(4)));
        assert!(rules.matches(domains, &activation).unwrap());

        rules.explain_activation(&activation);
        assert!(!rules.matches(domains, &activation).unwrap());
        assert!(rules.rule_kinds(x).contains(RuleKind::FullDomain));
    }

    #[test]
    fn reset_forgets_all_rules() {
        let (store, domains, x) = setup(true);
        let domains = domains.view(&store);
        let mut rules = RuleStore::default();
        let _ = rules.add_full_domain_rule(x);
        let _ = rules.add_propagator_activation_rule(PropagatorId(0));

        rules.reset();

        assert!(rules.is_empty());
        assert!(!rules.matches(domains, &remove(x, 3)).unwrap());
    }
}
