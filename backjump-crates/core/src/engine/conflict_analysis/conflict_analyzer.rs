use log::debug;
use log::trace;

use super::BackjumpStrategy;
use super::ExplanationOptions;
use super::LearnedClause;
use super::LiteralEncoding;
use super::NogoodSink;
use super::Reason;
use super::RuleStore;
use crate::asserts::backjump_assert_advanced;
use crate::basic_types::Contradiction;
use crate::basic_types::RuleStoreError;
use crate::engine::decisions::DecisionId;
use crate::engine::event_log::Cause;
use crate::engine::event_log::EventKind;
use crate::engine::predicates::Predicate;
use crate::engine::propagation::EngineStatus;
use crate::engine::propagation::ExplainedEvent;
use crate::engine::propagation::ExplanationContext;
use crate::engine::propagation::PropagatorId;
use crate::engine::variables::ReadDomains;
use crate::engine::State;
use crate::statistics::create_statistics_struct;
use crate::statistics::CumulativeMovingAverage;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// What the search loop should do after a conflict has been analysed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConflictOutcome {
    /// No decision is implicated: the problem has no (further) solutions.
    RootInfeasible { reason: Reason },
    /// The state has been restored to `target_world - 1` and the refutation of `refuted` has
    /// been recorded; the caller continues with [`State::refute`] on `refuted`.
    Backjump {
        /// The level of the decision which is refuted.
        target_world: usize,
        refuted: Predicate,
        /// The explanation of the conflict, including the refuted decision.
        reason: Reason,
        /// The clause learned from the conflict, if nogood learning is enabled. It has already
        /// been added to the state.
        nogood: Option<LearnedClause>,
    },
}

create_statistics_struct!(AnalysisStatistics {
    num_conflicts: u64,
    num_root_conflicts: u64,
    num_backjumps: u64,
    /// Levels skipped over, i.e. not refuted, by backjumps.
    num_skipped_levels: u64,
    num_early_stops: u64,
    num_nogoods: u64,
    num_solutions: u64,
    average_reason_decisions: CumulativeMovingAverage,
    average_reason_causes: CumulativeMovingAverage,
});

/// Turns contradictions into backjumps.
///
/// A contradiction is explained by scanning the event log of the current branch backwards,
/// newest event first. The [`RuleStore`] decides which events are relevant; relevant events
/// caused by propagators are explained in turn through [`Propagator::why`], which adds rules for
/// earlier events, and relevant events caused by decisions end up in the [`Reason`]. The most
/// recent decision in the reason is the one to refute.
///
/// [`Propagator::why`]: crate::propagation::Propagator::why
#[derive(Debug, Default)]
pub struct ConflictAnalyzer {
    options: ExplanationOptions,
    rule_store: RuleStore,
    encoding: LiteralEncoding,
    statistics: AnalysisStatistics,
}

impl ConflictAnalyzer {
    pub fn new(options: ExplanationOptions) -> Self {
        ConflictAnalyzer {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &ExplanationOptions {
        &self.options
    }

    /// The encoding of the literals of learned clauses.
    pub fn literal_encoding(&self) -> &LiteralEncoding {
        &self.encoding
    }

    /// Analyse `contradiction`, restore the state to just above the decision which has to be
    /// refuted and record why it is refuted.
    ///
    /// Must not be called while the state is propagating.
    pub fn analyse(
        &mut self,
        state: &mut State,
        contradiction: Contradiction,
    ) -> Result<ConflictOutcome, RuleStoreError> {
        assert_ne!(
            state.engine_status(),
            EngineStatus::Propagating,
            "conflicts cannot be analysed during propagation"
        );
        self.statistics.num_conflicts += 1;

        let current_level = state.world();
        let reason = match self.options.strategy {
            BackjumpStrategy::ConflictDirected => self.explain(state, contradiction)?,
            BackjumpStrategy::Chronological => self.path_reason(state, usize::MAX),
        };
        self.statistics
            .average_reason_decisions
            .add_term(reason.num_decisions() as u64);
        self.statistics
            .average_reason_causes
            .add_term(reason.num_causes() as u64);

        backjump_assert_advanced!(
            reason.decisions().all(|(level, _)| level <= current_level),
            "{reason} contains decisions above level {current_level}"
        );

        let Some(target_world) = self.target_world(&reason) else {
            debug!("{contradiction} does not depend on any decision");
            self.statistics.num_root_conflicts += 1;
            return Ok(ConflictOutcome::RootInfeasible { reason });
        };

        let decision = self.identify_refuted_decision(state, target_world);
        let refuted = state.decision(decision).predicate();

        let nogood = self.options.learn_nogoods.then(|| {
            self.statistics.num_nogoods += 1;
            self.learn_clause(state, &reason)
        });

        let mut refutation_reason = reason.duplicate();
        let _ = refutation_reason.remove_decision(target_world);

        debug!(
            "Backjump from world {current_level} to {target_world}, refuting {refuted} because of {reason}"
        );
        self.statistics.num_backjumps += 1;
        self.statistics.num_skipped_levels += (current_level - target_world) as u64;

        state.restore_to(target_world - 1);
        state.store_refutation(refuted, target_world, refutation_reason);
        if let Some(clause) = &nogood {
            state.add_nogood(clause);
        }

        Ok(ConflictOutcome::Backjump {
            target_world,
            refuted,
            reason,
            nogood,
        })
    }

    /// The level of the most recent decision in `reason`, if any decision is in it.
    pub fn target_world(&self, reason: &Reason) -> Option<usize> {
        reason.deepest_decision().map(|(level, _)| level)
    }

    /// The left decision at `target_world` on the current branch.
    ///
    /// Panics if there is no decision at that level or if it has already been refuted; either
    /// means that a reason was built from stale information.
    pub fn identify_refuted_decision(&self, state: &State, target_world: usize) -> DecisionId {
        let decision = state
            .decisions
            .at_level(target_world)
            .unwrap_or_else(|| panic!("there is no decision at level {target_world}"));

        assert!(
            !state.decision(decision).is_refuted(),
            "the decision at level {target_world} is already refuted, it cannot be the target of a backjump"
        );

        decision
    }

    /// Compute a [`Reason`] for `contradiction` by scanning the event log of the current branch
    /// backwards.
    pub fn explain(
        &mut self,
        state: &State,
        contradiction: Contradiction,
    ) -> Result<Reason, RuleStoreError> {
        self.rule_store.reset();
        let mut reason = Reason::default();

        if let Some(variable) = contradiction.variable {
            let _ = self.rule_store.add_full_domain_rule(variable);
        }
        match contradiction.cause {
            Cause::Root => {}
            Cause::Decision(decision) => explain_decision(state, decision, &mut reason),
            Cause::Propagator(propagator) => {
                self.explain_propagation(state, propagator, None, &mut reason)?;
            }
        }

        let current_level = state.world();
        let domains = state.domains();

        for index in state.event_log.indices_backwards(&state.reversible) {
            if self.options.partial_explanations
                && current_level > 0
                && reason.covers_levels_up_to(current_level)
            {
                trace!("Every decision up to level {current_level} is implicated, stopping at {index}");
                self.statistics.num_early_stops += 1;
                break;
            }

            let event = state.event_log.event(index);
            if !self.rule_store.matches(domains, event)? {
                continue;
            }
            trace!("{index} {} on {} is relevant", event.kind, event.variable);

            if event.kind == EventKind::PropagatorActivation {
                self.rule_store.explain_activation(event);
                continue;
            }

            match event.cause {
                Cause::Root => {}
                Cause::Decision(decision) => explain_decision(state, decision, &mut reason),
                Cause::Propagator(propagator) => {
                    let explained = ExplainedEvent::new(index, event);
                    self.explain_propagation(state, propagator, Some(explained), &mut reason)?;
                }
            }
        }

        debug!("Explained {contradiction}: {reason}");
        Ok(reason)
    }

    fn explain_propagation(
        &mut self,
        state: &State,
        propagator: PropagatorId,
        event: Option<ExplainedEvent>,
        reason: &mut Reason,
    ) -> Result<(), RuleStoreError> {
        if self.options.record_causes {
            reason.add_cause(propagator);
        }

        let mut context = ExplanationContext::new(
            &mut self.rule_store,
            state.domains(),
            propagator,
            state.scope(propagator),
        );
        let _ = state.propagator(propagator).why(&mut context, event)?;
        Ok(())
    }

    /// Call when the current branch ended in a solution. The most recent left decision is
    /// refuted: its reason consists of the decisions above it, holding everything else fixed
    /// the same choice cannot be retried.
    ///
    /// Returns the predicate to refute after the state has been restored, or [`None`] when
    /// every decision on the branch has already been refuted and the search tree is exhausted.
    pub fn on_solution(&mut self, state: &mut State) -> Option<Predicate> {
        self.statistics.num_solutions += 1;

        let (_, decision) = state
            .decisions()
            .find(|(_, decision)| !decision.is_refuted())?;
        let level = decision.level();
        let predicate = decision.predicate();

        let reason = self.path_reason(state, level);
        debug!("Solution found, refuting {predicate} at level {level} because of {reason}");

        state.restore_to(level - 1);
        state.store_refutation(predicate, level, reason);

        Some(predicate)
    }

    /// The reason made of every decision on the branch strictly above `below_level`: left
    /// decisions directly, refuted ones through their recorded reasons.
    fn path_reason(&self, state: &State, below_level: usize) -> Reason {
        let mut reason = Reason::default();
        for (id, decision) in state.decisions() {
            if decision.level() < below_level {
                explain_decision(state, id, &mut reason);
            }
        }
        reason
    }

    /// The clause forbidding the left decisions of `reason` from being taken together again.
    ///
    /// Built from the most recent decision back to the root.
    pub fn learn_clause(&mut self, state: &State, reason: &Reason) -> LearnedClause {
        let mut clause = LearnedClause::default();

        for (_, decision) in state.decisions() {
            if decision.is_refuted() || !reason.contains_decision_at(decision.level()) {
                continue;
            }

            let negated = !decision.predicate();
            clause.literals.push(self.encoding.literal(negated));
            clause.predicates.push(negated);
        }

        trace!("Learned {clause}");
        clause
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

fn explain_decision(state: &State, decision: DecisionId, reason: &mut Reason) {
    let decision = state.decision(decision);

    if !decision.is_refuted() {
        reason.add_decision(decision.level(), decision.predicate());
        return;
    }

    let refutation = state
        .refutation_reason(decision.predicate(), decision.level())
        .unwrap_or_else(|| {
            panic!(
                "the refutation of {} at level {} was never explained",
                decision.predicate(),
                decision.level()
            )
        });
    reason.merge(refutation);
}
