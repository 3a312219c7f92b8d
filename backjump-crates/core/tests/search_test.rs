#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use backjump_core::termination::Combinator;
use backjump_core::termination::ConflictBudget;
use backjump_core::termination::DecisionBudget;
use backjump_core::termination::Indefinite;
use backjump_core::BackjumpStrategy;
use backjump_core::ConflictAnalyzer;
use backjump_core::ExplanationOptions;
use helpers::init_logging;
use helpers::search;
use helpers::Constraint;
use helpers::Model;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn analyzer(strategy: BackjumpStrategy, learn_nogoods: bool) -> ConflictAnalyzer {
    ConflictAnalyzer::new(ExplanationOptions {
        strategy,
        learn_nogoods,
        ..Default::default()
    })
}

/// Free variables followed by a pigeonhole problem which fails as soon as its first pigeon is
/// placed.
fn padded_pigeonhole() -> Model {
    let mut model = Model::pigeonhole(3, 2);
    let num_free = 2;

    model.domains = [vec![(0, 2); num_free], model.domains].concat();
    for constraint in model.constraints.iter_mut() {
        if let Constraint::NotEquals(a, b) = constraint {
            *a += num_free;
            *b += num_free;
        }
    }
    model
}

#[test]
fn backjumping_skips_unrelated_decisions() {
    init_logging();
    let model = padded_pigeonhole();

    let (mut state, variables) = model.build();
    let conflict_directed = search(
        &mut state,
        &variables,
        &mut analyzer(BackjumpStrategy::ConflictDirected, false),
        &mut Indefinite,
        false,
    );

    let (mut state, variables) = model.build();
    let chronological = search(
        &mut state,
        &variables,
        &mut analyzer(BackjumpStrategy::Chronological, false),
        &mut Indefinite,
        false,
    );

    assert!(conflict_directed.solutions.is_empty());
    assert!(chronological.solutions.is_empty());

    // The free variables are decided once and then jumped over.
    assert_eq!(conflict_directed.num_decisions, 3);
    assert!(conflict_directed.num_decisions < chronological.num_decisions);
    assert!(conflict_directed.num_conflicts < chronological.num_conflicts);
}

#[test]
fn all_strategies_find_the_same_solutions() {
    init_logging();
    let mut rng = SmallRng::seed_from_u64(7);

    for _ in 0..25 {
        let model = Model::random(&mut rng, 6, 7);

        let mut expected = None;
        for (strategy, learn_nogoods) in [
            (BackjumpStrategy::Chronological, false),
            (BackjumpStrategy::ConflictDirected, false),
            (BackjumpStrategy::ConflictDirected, true),
        ] {
            let (mut state, variables) = model.build();
            let mut result = search(
                &mut state,
                &variables,
                &mut analyzer(strategy, learn_nogoods),
                &mut Indefinite,
                true,
            );
            result.solutions.sort();

            let num_solutions = result.solutions.len();
            result.solutions.dedup();
            assert_eq!(
                result.solutions.len(),
                num_solutions,
                "{strategy} found a solution twice for {model:?}"
            );

            match &expected {
                None => expected = Some(result.solutions),
                Some(solutions) => assert_eq!(
                    solutions, &result.solutions,
                    "{strategy} (nogoods: {learn_nogoods}) disagrees on {model:?}"
                ),
            }
        }
    }
}

#[test]
fn all_permutations_are_enumerated() {
    let model = Model::pigeonhole(3, 3);
    let (mut state, variables) = model.build();

    let result = search(
        &mut state,
        &variables,
        &mut ConflictAnalyzer::default(),
        &mut Indefinite,
        true,
    );

    assert_eq!(result.solutions.len(), 6);
    assert_eq!(result.num_conflicts, 0);
}

#[test]
fn decision_budget_stops_the_search() {
    let model = Model::pigeonhole(4, 4);
    let (mut state, variables) = model.build();

    let result = search(
        &mut state,
        &variables,
        &mut ConflictAnalyzer::default(),
        &mut DecisionBudget::new(2),
        true,
    );

    assert!(result.stopped);
    assert_eq!(result.num_decisions, 2);
}

#[test]
fn combined_budgets_stop_at_the_first_exhausted_one() {
    let model = padded_pigeonhole();
    let (mut state, variables) = model.build();

    let result = search(
        &mut state,
        &variables,
        &mut analyzer(BackjumpStrategy::Chronological, false),
        &mut Combinator::new(DecisionBudget::new(100), ConflictBudget::new(1)),
        false,
    );

    assert!(result.stopped);
    assert_eq!(result.num_conflicts, 1);
}
