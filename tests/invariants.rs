//! World invariants checked at tick boundaries under a busy vent.

mod common;

use std::collections::BTreeMap;

use common::SimulationBuilder;
use lexivent_core::simulation::Simulation;
use lexivent_core::token::{ChainId, TokenId};

fn check_capacity(sim: &Simulation) {
    for key in sim.grid.occupied_keys() {
        let cell = sim.grid.cell(key);
        assert!(
            cell.current_mass <= sim.grid.capacity(),
            "cell {key:?} over capacity at tick {}",
            sim.tick()
        );
        let summed: u32 = cell
            .tokens
            .iter()
            .filter_map(|&id| sim.grid.token(id))
            .map(|t| t.mass)
            .sum();
        assert_eq!(
            summed,
            cell.current_mass,
            "cell {key:?} mass accounting drifted at tick {}",
            sim.tick()
        );
    }
}

fn check_chain_consistency(sim: &Simulation) {
    let mut owner: BTreeMap<TokenId, ChainId> = BTreeMap::new();
    for chain in sim.bonding.chains.iter() {
        assert!(!chain.is_empty(), "empty chain survived tick {}", sim.tick());
        for &member in &chain.members {
            let token = sim
                .grid
                .token(member)
                .unwrap_or_else(|| panic!("chain member missing from grid at tick {}", sim.tick()));
            assert_eq!(
                token.chain,
                Some(chain.id),
                "token {member:?} back-pointer mismatch at tick {}",
                sim.tick()
            );
            assert!(
                owner.insert(member, chain.id).is_none(),
                "token {member:?} in two chains at tick {}",
                sim.tick()
            );
        }
    }
    // And the reverse direction: a token claiming a chain is listed there.
    for (id, token) in sim.grid.tokens() {
        if let Some(chain_id) = token.chain {
            assert_eq!(
                owner.get(&id),
                Some(&chain_id),
                "token {id:?} claims chain {chain_id:?} that does not list it (tick {})",
                sim.tick()
            );
        }
    }
}

#[test]
fn invariants_hold_under_load() {
    let (mut sim, _) = SimulationBuilder::new()
        .with_seed(7)
        .with_capacity(25)
        .with_spawn_rate(1)
        .build();

    for _ in 0..400 {
        sim.step();
        check_capacity(&sim);
        check_chain_consistency(&sim);
    }
    assert!(sim.grid.token_count() > 0);
}

#[test]
fn invariants_hold_with_roomy_cells() {
    let (mut sim, _) = SimulationBuilder::new()
        .with_seed(11)
        .with_spawn_rate(2)
        .build();

    for _ in 0..400 {
        sim.step();
        check_capacity(&sim);
        check_chain_consistency(&sim);
    }
}
