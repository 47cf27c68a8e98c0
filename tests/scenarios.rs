mod common;

use common::SimulationBuilder;
use lexivent_core::token::Token;

#[test]
fn declaration_pair_bonds_in_flight() {
    // Two compatible tokens sharing a cell rise in lockstep and bond on the
    // first bonding pass.
    let (mut sim, ids) = SimulationBuilder::new()
        .with_config(|c| c.damage.max_altitude = Some(100_000))
        .with_token("int", 5.0, 5.0, 2.0, 5)
        .with_token("count", 5.0, 5.0, 2.0, 5)
        .build();

    sim.step();

    assert_eq!(sim.bonding.chains.len(), 1);
    let chain = sim.bonding.chains.iter().next().unwrap();
    assert_eq!(chain.members, ids);
    assert_eq!(
        sim.bonding.chains.code_string(&sim.grid, chain.id),
        "int count"
    );
}

#[test]
fn incompatible_neighbors_stay_free() {
    // Two identifiers score nothing in the strength table.
    let (mut sim, ids) = SimulationBuilder::new()
        .with_token("x", 5.0, 5.0, 2.0, 5)
        .with_token("y", 5.0, 5.0, 2.0, 5)
        .build();

    sim.step();

    assert!(sim.bonding.chains.is_empty());
    for id in ids {
        assert_eq!(sim.grid.token(id).unwrap().chain, None);
    }
}

#[test]
fn depleted_token_sinks_through_the_floor() {
    let (mut sim, ids) = SimulationBuilder::new()
        .with_token("free", 5.0, 5.0, 0.0, 0)
        .build();

    sim.step();

    assert!(!sim.grid.contains(ids[0]));
    assert_eq!(sim.grid.token_count(), 0);
}

#[test]
fn saturated_cell_rejects_admission() {
    let (mut sim, _) = SimulationBuilder::new()
        .with_capacity(3)
        .with_token("int", 5.0, 5.0, 2.0, 5)
        .build();

    // "int" fills the 3-mass cell exactly; even a 1-mass token is refused.
    assert!(sim.grid.insert(Token::new("x", 5.0, 5.0, 2.0, 5)).is_none());
    assert_eq!(sim.grid.token_count(), 1);
}

#[test]
fn mismatched_link_is_torn_at_validation() {
    // Build an illegitimate chain by hand: "int ;" has no bond strength, so
    // the first validation pass (10 ticks in) drops the ';'.
    let (mut sim, ids) = SimulationBuilder::new()
        .with_grid_size(40)
        .with_config(|c| c.damage.max_altitude = Some(100_000))
        .with_token("int", 5.0, 5.0, 2.0, 30)
        .with_token(";", 5.0, 5.0, 2.0, 30)
        .build();
    let (a, b) = (ids[0], ids[1]);
    let chain_id = sim.bonding.chains.start(&mut sim.grid, a);
    sim.bonding.chains.append(&mut sim.grid, chain_id, b);

    for _ in 0..9 {
        sim.step();
    }
    assert_eq!(sim.bonding.chains.get(chain_id).unwrap().len(), 2);

    sim.step();
    let chain = sim.bonding.chains.get(chain_id).unwrap();
    assert_eq!(chain.members, vec![a]);
    assert!(!chain.is_valid);
    assert_eq!(sim.grid.token(b).unwrap().chain, None);
}

#[test]
fn vent_population_reaches_equilibrium_pressure() {
    // With a fast vent the world fills up, but tokens keep dying at the
    // floor, so the population stays finite and the run keeps moving.
    let (mut sim, _) = SimulationBuilder::new()
        .with_seed(3)
        .with_spawn_rate(1)
        .build();

    sim.run(500);

    assert_eq!(sim.vent.tokens_spawned(), 500);
    assert!(sim.grid.token_count() > 0);
    assert!(sim.grid.token_count() < 500, "floor culling must recycle tokens");
}
