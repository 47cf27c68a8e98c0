//! Physics: vertical motion, collisions, gravity pull and relocation.
//!
//! Tokens rise one unit per tick while they have energy and sink one unit
//! once depleted. Each token's move is proposed against the grid; a failed
//! relocation reverts the position for this tick while keeping the energy
//! and velocity changes already applied.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chain::ChainRegistry;
use crate::grid::{CellKey, Grid};
use crate::token::TokenId;

/// Magnitude of the gravity pull toward the lowest reachable cell.
const GRAVITY_PULL: f64 = 0.1;

/// Advances token positions and resolves collisions each tick.
#[derive(Debug, Default)]
pub struct PhysicsEngine;

impl PhysicsEngine {
    pub fn new() -> Self {
        Self
    }

    /// One physics pass over a snapshot of the population. Tokens culled
    /// mid-pass (out of bounds, below the floor) are skipped when their
    /// turn comes.
    pub fn step<R: Rng>(&self, grid: &mut Grid, chains: &ChainRegistry, rng: &mut R) {
        let (size_x, size_y, _) = grid.size();
        for id in grid.token_ids() {
            if !grid.contains(id) {
                continue;
            }
            let (old_x, old_y, old_z) = grid.token(id).expect("token present").position();

            // Vertical motion plus velocity integration; energy and
            // velocity changes here persist even if the move fails.
            grid.token_mut(id).expect("token present").advance();

            self.resolve_collision(grid, chains, id, old_z, rng);
            self.apply_gravity_pull(grid, id);

            let (mut new_x, mut new_y, new_z) = grid.token(id).expect("token present").position();
            new_x = new_x.clamp(0.0, (size_x - 1) as f64);
            new_y = new_y.clamp(0.0, (size_y - 1) as f64);

            // Restore the committed position before proposing the move, so
            // the grid resolves the correct source cell; on failure the
            // token simply stays here for this tick.
            {
                let token = grid.token_mut(id).expect("token present");
                token.x = old_x;
                token.y = old_y;
                token.z = old_z;
            }

            if new_z < 0.0 {
                // Sank through the floor.
                grid.remove(id);
                continue;
            }

            grid.move_token(id, new_x, new_y, new_z, chains);
        }
    }

    /// Rising/sinking collision: a token that climbed this tick loses one
    /// energy for each sinking token below it in its cell, and each such
    /// sinker is shoved to a random horizontal neighbor with capacity.
    fn resolve_collision<R: Rng>(
        &self,
        grid: &mut Grid,
        chains: &ChainRegistry,
        id: TokenId,
        old_z: f64,
        rng: &mut R,
    ) {
        let (z, energy) = match grid.token(id) {
            Some(t) => (t.z, t.energy),
            None => return,
        };
        if energy <= 0 || z <= old_z {
            return;
        }
        let Some(key) = grid
            .token(id)
            .and_then(|t| grid.key_for(t.x, t.y, t.z))
        else {
            return;
        };

        let residents = grid.cell(key).tokens.clone();
        for other in residents {
            if other == id {
                continue;
            }
            let sinking_below = grid
                .token(other)
                .is_some_and(|t| t.energy <= 0 && t.z < z);
            if !sinking_below {
                continue;
            }
            if let Some(token) = grid.token_mut(id) {
                token.energy -= 1;
            }
            self.push_aside(grid, chains, other, key, rng);
        }
    }

    /// Moves a token to a random same-altitude neighbor that can take it.
    /// No-op when every neighbor is full.
    fn push_aside<R: Rng>(
        &self,
        grid: &mut Grid,
        chains: &ChainRegistry,
        id: TokenId,
        from: CellKey,
        rng: &mut R,
    ) {
        let Some(mass) = grid.token(id).map(|t| t.mass) else {
            return;
        };
        let open: Vec<CellKey> = grid
            .horizontal_neighbors(from)
            .into_iter()
            .filter(|&key| grid.cell(key).can_accept(mass, grid.capacity()))
            .collect();
        if let Some(&target) = open.choose(rng) {
            grid.move_token(
                id,
                target.0 as f64,
                target.1 as f64,
                target.2 as f64,
                chains,
            );
        }
    }

    /// Weak attraction toward the lowest-altitude 26-neighbor with spare
    /// capacity. Only sinking tokens feel it; risers resist gravity.
    fn apply_gravity_pull(&self, grid: &mut Grid, id: TokenId) {
        let Some(token) = grid.token(id) else {
            return;
        };
        if token.energy > 0 {
            return;
        }
        let (x, y, z, mass) = (token.x, token.y, token.z, token.mass);
        let Some(key) = grid.key_for(x, y, z) else {
            return;
        };

        let mut lowest: Option<CellKey> = None;
        let mut lowest_z = key.2;
        for neighbor in grid.neighbors_26(key) {
            if neighbor.2 < lowest_z && grid.cell(neighbor).can_accept(mass, grid.capacity()) {
                lowest_z = neighbor.2;
                lowest = Some(neighbor);
            }
        }

        if let Some(target) = lowest {
            let dx = target.0 as f64 - x;
            let dy = target.1 as f64 - y;
            let dz = target.2 as f64 - z;
            let distance = (dx * dx + dy * dy + dz * dz).sqrt();
            if distance > 0.0 {
                let token = grid.token_mut(id).expect("token present");
                token.vx += GRAVITY_PULL * dx / distance;
                token.vy += GRAVITY_PULL * dy / distance;
                token.vz += GRAVITY_PULL * dz / distance;
            }
        }
    }
}
