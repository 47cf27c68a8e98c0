//! Altitude-driven damage and low-altitude repair.
//!
//! The higher a token climbs, the more likely its metadata corrupts: the
//! damaged flag blocks bonding, and corruption may degrade the kind to
//! `Unknown`. Low altitudes are protective and slowly repair damage.

use rand::Rng;

use crate::chain::ChainRegistry;
use crate::grid::Grid;
use crate::token::TokenKind;

/// Chance that a damaged, chained token is torn out of its chain.
const CHAIN_BREAK_CHANCE: f64 = 0.7;

/// Chance that a fresh damage hit also corrupts the kind classification.
const KIND_CORRUPTION_CHANCE: f64 = 0.3;

/// Applies altitude-based damage and repair across the population.
#[derive(Clone, Debug)]
pub struct DamageSystem {
    max_altitude: f64,
}

impl DamageSystem {
    pub fn new(max_altitude: f64) -> Self {
        Self { max_altitude }
    }

    pub fn max_altitude(&self) -> f64 {
        self.max_altitude
    }

    /// Damage probability per tick at altitude `z`: a cubic curve from 0 at
    /// the floor to a 50% cap at the ceiling.
    pub fn damage_probability(&self, z: f64) -> f64 {
        if z <= 0.0 {
            return 0.0;
        }
        let normalized = (z / self.max_altitude).min(1.0);
        (normalized.powi(3) * 0.5).min(0.5)
    }

    /// Repair probability at altitude `z`: 10% at the floor, fading to zero
    /// at half the ceiling.
    pub fn repair_probability(&self, z: f64) -> f64 {
        let half = self.max_altitude / 2.0;
        if z >= half {
            return 0.0;
        }
        (1.0 - z / half) * 0.1
    }

    /// One damage pass. A damaged token still in a chain usually tears out
    /// of it; the bonding engine re-syncs membership on its next pass.
    pub fn apply<R: Rng>(&self, grid: &mut Grid, chains: &mut ChainRegistry, rng: &mut R) {
        for id in grid.token_ids() {
            let Some(token) = grid.token(id) else {
                continue;
            };
            let probability = self.damage_probability(token.z);
            if probability <= 0.0 {
                continue;
            }
            if rng.gen::<f64>() < probability {
                let token = grid.token_mut(id).expect("token present");
                token.damaged = true;
                if rng.gen::<f64>() < KIND_CORRUPTION_CHANCE {
                    token.kind = TokenKind::Unknown;
                }
            }
            let chained_and_damaged = grid
                .token(id)
                .is_some_and(|t| t.damaged && t.chain.is_some());
            if chained_and_damaged && rng.gen::<f64>() < CHAIN_BREAK_CHANCE {
                chains.detach(grid, id);
            }
        }
    }

    /// One repair pass: tokens sheltering at low altitude may heal, which
    /// also restores the kind classified from the value.
    pub fn repair<R: Rng>(&self, grid: &mut Grid, rng: &mut R) {
        for id in grid.token_ids() {
            let Some(token) = grid.token(id) else {
                continue;
            };
            if !token.damaged {
                continue;
            }
            let probability = self.repair_probability(token.z);
            if rng.gen::<f64>() < probability {
                let token = grid.token_mut(id).expect("token present");
                token.damaged = false;
                token.restore_kind();
            }
        }
    }
}
