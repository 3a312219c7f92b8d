//! A depth-first search loop and small models used by the integration tests of the kernel.
#![allow(
    dead_code,
    reason = "is used in integration tests but unable to find a way to silence these warnings"
)]

use backjump_core::predicate;
use backjump_core::propagation::DomainEvents;
use backjump_core::propagation::EventMask;
use backjump_core::propagation::ExplainedEvent;
use backjump_core::propagation::ExplanationContext;
use backjump_core::propagation::LocalId;
use backjump_core::propagation::PropagationContext;
use backjump_core::propagation::Propagator;
use backjump_core::propagation::PropagatorConstructor;
use backjump_core::propagation::PropagatorConstructorContext;
use backjump_core::propagators::BinaryLessOrEqualArgs;
use backjump_core::propagators::BinaryNotEqualsArgs;
use backjump_core::termination::TerminationCondition;
use backjump_core::variables::DomainId;
use backjump_core::variables::Predicate;
use backjump_core::variables::ReadDomains;
use backjump_core::ConflictAnalyzer;
use backjump_core::ConflictOutcome;
use backjump_core::PropagationStatus;
use backjump_core::Reason;
use backjump_core::RuleStoreError;
use backjump_core::State;
use rand::rngs::SmallRng;
use rand::Rng;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum Constraint {
    NotEquals(usize, usize),
    /// `x + offset <= y`
    LessOrEqual(usize, usize, i32),
}

/// A set of variables with their initial bounds and binary constraints between them.
#[derive(Clone, Debug, Default)]
pub(crate) struct Model {
    pub(crate) domains: Vec<(i32, i32)>,
    pub(crate) constraints: Vec<Constraint>,
}

impl Model {
    pub(crate) fn random(rng: &mut SmallRng, num_variables: usize, num_constraints: usize) -> Model {
        let domains = (0..num_variables)
            .map(|_| (0, rng.gen_range(1..4)))
            .collect();

        let constraints = (0..num_constraints)
            .map(|_| {
                let x = rng.gen_range(0..num_variables);
                let y = (x + rng.gen_range(1..num_variables)) % num_variables;
                if rng.gen_bool(0.7) {
                    Constraint::NotEquals(x, y)
                } else {
                    Constraint::LessOrEqual(x, y, rng.gen_range(-1..=1))
                }
            })
            .collect();

        Model {
            domains,
            constraints,
        }
    }

    /// `num_pigeons` variables which all have to take a different hole.
    pub(crate) fn pigeonhole(num_pigeons: usize, num_holes: i32) -> Model {
        let mut model = Model {
            domains: vec![(0, num_holes - 1); num_pigeons],
            constraints: vec![],
        };
        for i in 0..num_pigeons {
            for j in i + 1..num_pigeons {
                model.constraints.push(Constraint::NotEquals(i, j));
            }
        }
        model
    }

    pub(crate) fn build(&self) -> (State, Vec<DomainId>) {
        let mut state = State::default();
        let variables: Vec<DomainId> = self
            .domains
            .iter()
            .map(|&(lower_bound, upper_bound)| state.new_variable(lower_bound, upper_bound))
            .collect();

        for constraint in self.constraints.iter() {
            let result = match *constraint {
                Constraint::NotEquals(a, b) => state
                    .add_propagator(BinaryNotEqualsArgs {
                        a: variables[a],
                        b: variables[b],
                    })
                    .map(|_| ()),
                Constraint::LessOrEqual(x, y, offset) => state
                    .add_propagator(BinaryLessOrEqualArgs {
                        x: variables[x],
                        y: variables[y],
                        offset,
                    })
                    .map(|_| ()),
            };
            result.expect("the state is not propagating");
        }

        (state, variables)
    }

    /// Whether no assignment satisfies the model together with `predicates`.
    pub(crate) fn is_infeasible_with(&self, predicates: impl IntoIterator<Item = Predicate>) -> bool {
        let (mut state, variables) = self.build();
        for predicate in predicates {
            if state.post(predicate).is_err() {
                return true;
            }
        }

        let mut analyzer = ConflictAnalyzer::default();
        let result = search(
            &mut state,
            &variables,
            &mut analyzer,
            &mut None::<backjump_core::termination::Indefinite>,
            false,
        );
        result.solutions.is_empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct SearchResult {
    pub(crate) solutions: Vec<Vec<i32>>,
    pub(crate) num_decisions: u64,
    pub(crate) num_conflicts: u64,
    /// The reason of every analysed conflict, in the order they were found.
    pub(crate) reasons: Vec<Reason>,
    pub(crate) stopped: bool,
}

/// Depth-first search branching on `[x == lb(x)]` for the first unfixed variable, using the
/// analyser to recover from conflicts.
pub(crate) fn search(
    state: &mut State,
    variables: &[DomainId],
    analyzer: &mut ConflictAnalyzer,
    termination: &mut impl TerminationCondition,
    all_solutions: bool,
) -> SearchResult {
    let mut result = SearchResult::default();
    let mut status = state.propagate();

    loop {
        if termination.should_stop() {
            result.stopped = true;
            break;
        }

        match status {
            Err(contradiction) => {
                result.num_conflicts += 1;
                termination.conflict_has_been_analysed();

                match analyzer
                    .analyse(state, contradiction)
                    .expect("the propagators use valid rules")
                {
                    ConflictOutcome::RootInfeasible { reason } => {
                        result.reasons.push(reason);
                        break;
                    }
                    ConflictOutcome::Backjump {
                        refuted, reason, ..
                    } => {
                        result.reasons.push(reason);
                        status = state.refute(refuted).and_then(|_| state.propagate());
                    }
                }
            }
            Ok(()) => {
                let unfixed = variables
                    .iter()
                    .copied()
                    .find(|&variable| !state.is_fixed(variable));

                match unfixed {
                    Some(variable) => {
                        result.num_decisions += 1;
                        termination.decision_has_been_made();

                        let value = state.lower_bound(variable);
                        status = state
                            .decide(predicate!(variable == value))
                            .and_then(|_| state.propagate());
                    }
                    None => {
                        result
                            .solutions
                            .push(state.solution().expect("every variable is fixed"));
                        if !all_solutions {
                            break;
                        }

                        match analyzer.on_solution(state) {
                            Some(refuted) => {
                                status = state.refute(refuted).and_then(|_| state.propagate());
                            }
                            None => break,
                        }
                    }
                }
            }
        }
    }

    result
}

/// Fails whenever `watched` changes while `condition` holds, without ever filtering. The failure
/// is explained by `condition` alone.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tripwire {
    pub(crate) condition: Predicate,
    pub(crate) watched: DomainId,
}

impl PropagatorConstructor for Tripwire {
    type PropagatorImpl = Tripwire;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        context.register(self.watched, DomainEvents::ANY_INT, LocalId::from(0));
        self
    }
}

impl Propagator for Tripwire {
    fn name(&self) -> &str {
        "Tripwire"
    }

    fn propagate(&mut self, context: PropagationContext, _: EventMask) -> PropagationStatus {
        if context.evaluate(self.condition) == Some(true) {
            return Err(context.contradiction("tripwire"));
        }
        Ok(())
    }

    fn why(
        &self,
        context: &mut ExplanationContext,
        _: Option<ExplainedEvent>,
    ) -> Result<bool, RuleStoreError> {
        Ok(context.add_full_domain_rule(self.condition.get_domain()))
    }
}

/// Forbids two predicates from holding together, but only notices once both do.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ForbiddenPair {
    pub(crate) first: Predicate,
    pub(crate) second: Predicate,
}

impl PropagatorConstructor for ForbiddenPair {
    type PropagatorImpl = ForbiddenPair;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        context.register(self.first.get_domain(), DomainEvents::ANY_INT, LocalId::from(0));
        context.register(self.second.get_domain(), DomainEvents::ANY_INT, LocalId::from(1));
        self
    }
}

impl Propagator for ForbiddenPair {
    fn name(&self) -> &str {
        "ForbiddenPair"
    }

    fn propagate(&mut self, context: PropagationContext, _: EventMask) -> PropagationStatus {
        if context.evaluate(self.first) == Some(true) && context.evaluate(self.second) == Some(true)
        {
            return Err(context.contradiction("forbidden pair"));
        }
        Ok(())
    }
}
