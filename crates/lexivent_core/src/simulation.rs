//! The simulation coordinator.
//!
//! Owns the grid, the subsystem engines and the single seeded RNG, and runs
//! them in a fixed order each tick. Two simulations built from the same
//! config and seed replay identically.

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::bonding::BondingEngine;
use crate::config::SimConfig;
use crate::damage::DamageSystem;
use crate::grid::Grid;
use crate::metrics::Metrics;
use crate::physics::PhysicsEngine;
use crate::snapshot::WorldSnapshot;
use crate::stats::{self, StatsSample};
use crate::vent::Vent;

/// Cadence of default-value insertion near lonely `=` tokens.
pub const DEFAULT_VALUE_INTERVAL: u64 = 50;
/// Cadence of the low-altitude repair pass.
pub const REPAIR_INTERVAL: u64 = 20;
/// Cadence of statistics collection.
pub const STATS_INTERVAL: u64 = 10;

pub struct Simulation {
    pub grid: Grid,
    pub bonding: BondingEngine,
    pub physics: PhysicsEngine,
    pub damage: DamageSystem,
    pub vent: Vent,
    rng: ChaCha8Rng,
    tick: u64,
    running: bool,
    history: Vec<StatsSample>,
    metrics: Metrics,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            grid: Grid::new(&config.grid),
            bonding: BondingEngine::new(),
            physics: PhysicsEngine::new(),
            damage: DamageSystem::new(config.max_altitude()),
            vent: Vent::new(&config.vent, config.vent_position()),
            rng,
            tick: 0,
            running: false,
            history: Vec::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Requests a stop; `run` checks this at each tick boundary.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn history(&self) -> &[StatsSample] {
        &self.history
    }

    pub fn latest_stats(&self) -> Option<&StatsSample> {
        self.history.last()
    }

    /// Collects a fresh sample of the current state, outside the cadence.
    pub fn current_stats(&self) -> StatsSample {
        stats::collect(
            self.tick,
            &self.grid,
            &self.bonding.chains,
            &self.vent,
            self.damage.max_altitude(),
        )
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(
            self.tick,
            &self.grid,
            &self.bonding.chains,
            self.latest_stats().cloned(),
        )
    }

    /// Executes one simulation tick: spawn, physics, spillover, bonding,
    /// default values, damage, repair, statistics.
    pub fn step(&mut self) {
        self.tick += 1;

        if let Some(token) = self.vent.update(&mut self.rng) {
            // A saturated floor cell swallows the spawn.
            let _ = self.grid.insert(token);
        }

        self.physics
            .step(&mut self.grid, &self.bonding.chains, &mut self.rng);
        self.grid.settle_overflow(&self.bonding.chains);

        self.bonding.update(&mut self.grid, self.tick);

        if self.tick % DEFAULT_VALUE_INTERVAL == 0 {
            self.bonding
                .insert_default_values(&mut self.grid, &mut self.rng);
        }

        self.damage
            .apply(&mut self.grid, &mut self.bonding.chains, &mut self.rng);
        // Damage tear-out may have emptied a chain.
        self.bonding.chains.prune_empty();
        if self.tick % REPAIR_INTERVAL == 0 {
            self.damage.repair(&mut self.grid, &mut self.rng);
        }

        if self.tick % STATS_INTERVAL == 0 {
            let sample = self.current_stats();
            self.history.push(sample);
        }
    }

    /// Runs for up to `num_ticks` ticks, honoring `stop` between ticks.
    pub fn run(&mut self, num_ticks: u64) {
        self.running = true;
        for _ in 0..num_ticks {
            if !self.running {
                break;
            }
            let started = Instant::now();
            self.step();
            self.metrics.record_tick(
                started.elapsed(),
                self.grid.token_count(),
                self.bonding.chains.len(),
            );
        }
        self.running = false;
        tracing::info!(
            ticks = self.tick,
            tokens = self.grid.token_count(),
            chains = self.bonding.chains.len(),
            elapsed_ms = self.metrics.elapsed().as_millis() as u64,
            "run finished"
        );
    }
}
