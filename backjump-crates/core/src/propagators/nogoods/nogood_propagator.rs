use log::trace;

use super::ClauseId;
use crate::basic_types::PropagationStatus;
use crate::basic_types::RuleStoreError;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::event_log::EventIndex;
use crate::engine::predicates::Predicate;
use crate::engine::predicates::PredicateType;
use crate::engine::propagation::EventMask;
use crate::engine::propagation::ExplainedEvent;
use crate::engine::propagation::ExplanationContext;
use crate::engine::propagation::Priority;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::variables::ReadDomains;
use crate::statistics::create_statistics_struct;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// Creates an empty [`NogoodPropagator`]. The variables of the clauses are registered when the
/// clauses are added.
#[derive(Clone, Copy, Debug, Default)]
pub struct NogoodPropagatorConstructor;

impl PropagatorConstructor for NogoodPropagatorConstructor {
    type PropagatorImpl = NogoodPropagator;

    fn create(self, _: PropagatorConstructorContext) -> Self::PropagatorImpl {
        NogoodPropagator::default()
    }
}

/// Keeps a set of clauses, each a disjunction of [`Predicate`]s of which at least one has to
/// hold.
///
/// A clause with every predicate but one violated forces the remaining one; a clause with all
/// predicates violated is a contradiction. Clauses are never deleted.
#[derive(Clone, Debug, Default)]
pub struct NogoodPropagator {
    clauses: KeyedVec<ClauseId, Vec<Predicate>>,
    /// The clause (and position in it) responsible for each event posted by this propagator.
    justifications: HashMap<EventIndex, Justification>,
    /// The clause which failed during the last call to [`Propagator::propagate`], if any.
    conflict: Option<Justification>,
    statistics: NogoodStatistics,
}

#[derive(Clone, Copy, Debug)]
struct Justification {
    clause: ClauseId,
    /// The position of the predicate which was forced; [`None`] if every predicate was violated.
    propagated: Option<usize>,
}

create_statistics_struct!(NogoodStatistics {
    num_clauses: u64,
    num_propagations: u64,
    num_conflicts: u64,
});

enum ClauseState {
    Satisfied,
    Unit(usize),
    Violated,
    Open,
}

impl NogoodPropagator {
    pub fn add_clause(&mut self, clause: Vec<Predicate>) -> ClauseId {
        self.statistics.num_clauses += 1;
        self.clauses.push(clause)
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn clause(&self, clause: ClauseId) -> &[Predicate] {
        &self.clauses[clause]
    }

    fn clause_state<Context: ReadDomains>(&self, context: &Context, clause: ClauseId) -> ClauseState {
        let mut unassigned = None;

        for (position, &predicate) in self.clauses[clause].iter().enumerate() {
            match context.evaluate(predicate) {
                Some(true) => return ClauseState::Satisfied,
                Some(false) => {}
                None if unassigned.is_some() => return ClauseState::Open,
                None => unassigned = Some(position),
            }
        }

        match unassigned {
            Some(position) => ClauseState::Unit(position),
            None => ClauseState::Violated,
        }
    }
}

impl Propagator for NogoodPropagator {
    fn name(&self) -> &str {
        "Nogoods"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContext, _: EventMask) -> PropagationStatus {
        self.conflict = None;

        // Posting does not reschedule this propagator, so unit propagation runs to a fixpoint
        // here.
        let mut changed = true;
        while changed {
            changed = false;

            for index in 0..self.clauses.len() {
                let clause = ClauseId::create_from_index(index);

                match self.clause_state(&context, clause) {
                    ClauseState::Satisfied | ClauseState::Open => {}
                    ClauseState::Violated => {
                        trace!("{clause} is violated");
                        self.statistics.num_conflicts += 1;
                        self.conflict = Some(Justification {
                            clause,
                            propagated: None,
                        });
                        return Err(context.contradiction("violated nogood"));
                    }
                    ClauseState::Unit(position) => {
                        let justification = Justification {
                            clause,
                            propagated: Some(position),
                        };
                        // Kept in case the post empties the domain.
                        self.conflict = Some(justification);

                        let predicate = self.clauses[clause][position];
                        if let Some(event) = context.post_tracked(predicate)? {
                            trace!("{clause} forces {predicate}");
                            self.statistics.num_propagations += 1;
                            let _ = self.justifications.insert(event, justification);
                            changed = true;
                        }
                        self.conflict = None;
                    }
                }
            }
        }

        Ok(())
    }

    /// A forced predicate is explained by the violation of the other predicates of its clause,
    /// and a failure by the violation of all of them.
    fn why(
        &self,
        context: &mut ExplanationContext,
        event: Option<ExplainedEvent>,
    ) -> Result<bool, RuleStoreError> {
        let justification = match event {
            Some(event) => self.justifications.get(&event.index).copied(),
            None => self.conflict,
        };

        let mut new_rules = context.add_propagator_activation_rule();

        let Some(justification) = justification else {
            for index in 0..context.scope().len() {
                let variable = context.scope()[index];
                new_rules |= context.add_full_domain_rule(variable);
            }
            return Ok(new_rules);
        };

        for (position, &predicate) in self.clauses[justification.clause].iter().enumerate() {
            if Some(position) != justification.propagated {
                new_rules |= add_violation_rule(context, predicate)?;
            }
        }

        Ok(new_rules)
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

/// Adds the rule which matches the events that made `predicate` false.
fn add_violation_rule(
    context: &mut ExplanationContext,
    predicate: Predicate,
) -> Result<bool, RuleStoreError> {
    let variable = predicate.get_domain();

    match predicate.get_predicate_type() {
        PredicateType::LowerBound => Ok(context.add_upper_bound_rule(variable)),
        PredicateType::UpperBound => Ok(context.add_lower_bound_rule(variable)),
        PredicateType::Equal => {
            context.add_removal_rule(variable, predicate.get_right_hand_side())
        }
        PredicateType::NotEqual => Ok(context.add_bounds_rule(variable)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::conflict_analysis::ConflictAnalyzer;
    use crate::engine::conflict_analysis::ConflictOutcome;
    use crate::engine::conflict_analysis::LearnedClause;
    use crate::engine::conflict_analysis::LiteralEncoding;
    use crate::engine::conflict_analysis::NogoodSink;
    use crate::engine::State;
    use crate::predicate;

    fn clause(predicates: Vec<Predicate>) -> LearnedClause {
        let mut encoding = LiteralEncoding::default();
        LearnedClause {
            literals: predicates
                .iter()
                .map(|&predicate| encoding.literal(predicate))
                .collect(),
            predicates,
        }
    }

    #[test]
    fn unit_clauses_are_propagated_to_a_fixpoint() {
        let mut state = State::default();
        let x = state.new_variable(0, 1);
        let y = state.new_variable(0, 1);
        let z = state.new_variable(0, 5);

        state.add_nogood(&clause(vec![predicate!(x != 1), predicate!(y != 1)]));
        state.add_nogood(&clause(vec![predicate!(y == 1), predicate!(z >= 3)]));
        state.propagate().expect("both clauses can be satisfied");
        assert_eq!(state.num_propagators(), 1);

        state.decide(predicate!(x == 1)).expect("1 is in the domain");
        state.propagate().expect("y and z can follow");

        assert_eq!(state.lower_bound(y), 0);
        assert_eq!(state.upper_bound(y), 0);
        assert_eq!(state.lower_bound(z), 3);
    }

    #[test]
    fn violated_clause_is_a_contradiction() {
        let mut state = State::default();
        let x = state.new_bounded_variable(0, 10);
        let y = state.new_bounded_variable(0, 10);

        state.add_nogood(&clause(vec![predicate!(x <= 2), predicate!(y <= 2)]));
        state.propagate().expect("satisfiable");

        state.decide(predicate!(x >= 5)).expect("in bounds");
        state.propagate().expect("y is forced down");
        assert_eq!(state.upper_bound(y), 2);

        state.restore_to(0);
        assert_eq!(state.upper_bound(y), 10);

        state.decide(predicate!(y >= 5)).expect("in bounds");
        state.decide(predicate!(x >= 5)).expect("in bounds");
        let contradiction = state.propagate().expect_err("both predicates are false");
        assert_eq!(contradiction.message, "violated nogood");
    }

    #[test]
    fn propagated_values_are_explained_by_the_other_predicates() {
        let mut state = State::default();
        let x = state.new_variable(0, 1);
        let y = state.new_variable(0, 1);
        let z = state.new_variable(0, 1);

        state.add_nogood(&clause(vec![predicate!(x != 1), predicate!(y != 1)]));
        state.propagate().expect("satisfiable");

        state.decide(predicate!(x == 1)).expect("in the domain");
        state.propagate().expect("y is forced to 0");
        state.decide(predicate!(z == 0)).expect("in the domain");
        state.propagate().expect("z is unconstrained");

        let contradiction = state
            .decide(predicate!(y == 1))
            .and_then(|_| state.propagate())
            .expect_err("y is 0");

        let mut analyzer = ConflictAnalyzer::default();
        match analyzer.analyse(&mut state, contradiction) {
            Ok(ConflictOutcome::Backjump {
                target_world,
                reason,
                ..
            }) => {
                assert_eq!(target_world, 3);
                assert!(reason.contains_decision_at(1));
                assert!(!reason.contains_decision_at(2));
                assert_eq!(reason.num_causes(), 1);
            }
            other => panic!("expected a backjump, got {other:?}"),
        }
    }
}
