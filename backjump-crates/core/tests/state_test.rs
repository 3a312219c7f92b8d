#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use backjump_core::predicate;
use backjump_core::variables::DomainId;
use backjump_core::variables::ReadDomains;
use backjump_core::State;
use helpers::Model;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

#[derive(Debug, PartialEq, Eq)]
struct Snapshot {
    values: Vec<Vec<i32>>,
    num_events: usize,
}

fn snapshot(state: &State, variables: &[DomainId]) -> Snapshot {
    Snapshot {
        values: variables
            .iter()
            .map(|&variable| state.domains().values(variable).collect())
            .collect(),
        num_events: state.event_log().len(state.reversible_store()),
    }
}

#[test]
fn restoring_a_world_restores_everything_observed_in_it() {
    let mut rng = SmallRng::seed_from_u64(11);

    for _ in 0..20 {
        let model = Model::random(&mut rng, 8, 6);
        let (mut state, variables) = model.build();
        if state.propagate().is_err() {
            continue;
        }

        // snapshots[w] is the state at world w just before the decision opening world w + 1
        let mut snapshots = vec![];

        for _ in 0..40 {
            if state.world() > 0 && rng.gen_bool(0.3) {
                let world = rng.gen_range(0..state.world());
                state.restore_to(world);
                snapshots.truncate(world + 1);
                assert_eq!(
                    snapshots.last(),
                    Some(&snapshot(&state, &variables)),
                    "world {world} differs after restoring"
                );
                snapshots.truncate(world);
                continue;
            }

            let variable = variables[rng.gen_range(0..variables.len())];
            if state.is_fixed(variable) {
                continue;
            }
            let value = rng.gen_range(state.lower_bound(variable)..=state.upper_bound(variable));

            snapshots.push(snapshot(&state, &variables));
            let status = match rng.gen_range(0..3) {
                0 => state.decide(predicate!(variable <= value)),
                1 => state.decide(predicate!(variable >= value)),
                _ => state.decide(predicate!(variable != value)),
            };
            if status.and_then(|_| state.propagate()).is_err() {
                let world = state.world() - 1;
                state.restore_to(world);
                assert_eq!(snapshots.pop(), Some(snapshot(&state, &variables)));
            }
        }
    }
}

#[test]
fn stamps_never_exceed_the_current_world() {
    let mut state = State::default();
    let x = state.new_variable(0, 10);
    let counter = state.reversible_store_mut().new_int(0);

    for world in 1..=5 {
        state
            .decide(predicate!(x >= world))
            .expect("the bound is in the domain");
        state.reversible_store_mut().set(counter, world);
        assert!(state.reversible_store().last_write_world(counter) <= state.world());
    }

    state.restore_to(2);
    assert!(state.reversible_store().last_write_world(counter) <= 2);
    assert_eq!(state.reversible_store().get(counter), 2);
    assert_eq!(state.lower_bound(x), 2);
}
