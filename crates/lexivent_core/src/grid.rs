//! 3D spatial grid with capacity-bounded cells.
//!
//! The grid owns the authoritative token arena: every live token lives in
//! exactly one cell, and cells index tokens by id. All relocation goes
//! through [`Grid::move_token`], which handles out-of-bounds culling,
//! mutual-exclusion repulsion, and capacity spillover.
//!
//! The arena is a `BTreeMap` keyed by monotonically assigned ids, so
//! full-population iteration is deterministic in spawn order.

use std::collections::BTreeMap;

use crate::chain::ChainRegistry;
use crate::config::GridConfig;
use crate::token::{mutually_exclusive, Token, TokenId};

/// Integer cell coordinates.
pub type CellKey = (usize, usize, usize);

/// Spillover may chase capacity through a run of nearly-full neighbors;
/// bound the recursion so adjacent saturated cells cannot ping-pong forever.
const SPILLOVER_DEPTH_LIMIT: usize = 8;

/// A single capacity-bounded cell.
#[derive(Clone, Debug, Default)]
pub struct Cell {
    /// Member tokens in admission order.
    pub tokens: Vec<TokenId>,
    /// Running sum of member masses; always equals the sum over `tokens`.
    pub current_mass: u32,
}

impl Cell {
    pub fn can_accept(&self, mass: u32, capacity: u32) -> bool {
        self.current_mass + mass <= capacity
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn add(&mut self, id: TokenId, mass: u32) {
        self.tokens.push(id);
        self.current_mass += mass;
    }

    fn remove(&mut self, id: TokenId, mass: u32) {
        if let Some(pos) = self.tokens.iter().position(|&t| t == id) {
            self.tokens.remove(pos);
            self.current_mass = self.current_mass.saturating_sub(mass);
        }
    }
}

/// The full 3D grid plus the global token arena.
#[derive(Clone, Debug)]
pub struct Grid {
    size_x: usize,
    size_y: usize,
    size_z: usize,
    capacity: u32,
    cells: Vec<Cell>,
    tokens: BTreeMap<TokenId, Token>,
    next_token_id: u64,
}

impl Grid {
    pub fn new(config: &GridConfig) -> Self {
        let cell_count = config.size_x * config.size_y * config.size_z;
        Self {
            size_x: config.size_x,
            size_y: config.size_y,
            size_z: config.size_z,
            capacity: config.cell_capacity,
            cells: vec![Cell::default(); cell_count],
            tokens: BTreeMap::new(),
            next_token_id: 0,
        }
    }

    pub fn size(&self) -> (usize, usize, usize) {
        (self.size_x, self.size_y, self.size_z)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    fn idx(&self, key: CellKey) -> usize {
        (key.0 * self.size_y + key.1) * self.size_z + key.2
    }

    fn key_of_idx(&self, idx: usize) -> CellKey {
        let z = idx % self.size_z;
        let rest = idx / self.size_z;
        (rest / self.size_y, rest % self.size_y, z)
    }

    /// Bounds-checked cell lookup by integer coordinates.
    pub fn cell_at(&self, x: i64, y: i64, z: i64) -> Option<&Cell> {
        self.key_at(x, y, z).map(|key| &self.cells[self.idx(key)])
    }

    fn key_at(&self, x: i64, y: i64, z: i64) -> Option<CellKey> {
        if x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.size_x
            && (y as usize) < self.size_y
            && (z as usize) < self.size_z
        {
            Some((x as usize, y as usize, z as usize))
        } else {
            None
        }
    }

    /// Cell key for a continuous position (floored coordinates).
    pub fn key_for(&self, x: f64, y: f64, z: f64) -> Option<CellKey> {
        self.key_at(x.floor() as i64, y.floor() as i64, z.floor() as i64)
    }

    pub fn cell(&self, key: CellKey) -> &Cell {
        &self.cells[self.idx(key)]
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.get_mut(&id)
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.tokens.contains_key(&id)
    }

    /// All live tokens in id (spawn) order.
    pub fn tokens(&self) -> impl Iterator<Item = (TokenId, &Token)> {
        self.tokens.iter().map(|(&id, t)| (id, t))
    }

    /// Snapshot of live ids; safe to iterate while tokens are removed.
    pub fn token_ids(&self) -> Vec<TokenId> {
        self.tokens.keys().copied().collect()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn total_mass(&self) -> u64 {
        self.tokens.values().map(|t| u64::from(t.mass)).sum()
    }

    /// Admits a new token at its current position.
    ///
    /// Fails (returning `None`) when the position is out of bounds or the
    /// target cell lacks capacity; the token is dropped in that case.
    pub fn insert(&mut self, token: Token) -> Option<TokenId> {
        let key = self.key_for(token.x, token.y, token.z)?;
        let idx = self.idx(key);
        if !self.cells[idx].can_accept(token.mass, self.capacity) {
            return None;
        }
        let id = TokenId(self.next_token_id);
        self.next_token_id += 1;
        self.cells[idx].add(id, token.mass);
        self.tokens.insert(id, token);
        Some(id)
    }

    /// Removes a token from its cell and the arena. Idempotent: removing an
    /// absent token is a no-op.
    pub fn remove(&mut self, id: TokenId) -> Option<Token> {
        let token = self.tokens.remove(&id)?;
        if let Some(key) = self.key_for(token.x, token.y, token.z) {
            let idx = self.idx(key);
            self.cells[idx].remove(id, token.mass);
        }
        Some(token)
    }

    /// Bonded mass of a token: the total mass of its chain, or its own mass
    /// when free. Used to settle repulsion conflicts.
    pub fn bonded_mass(&self, id: TokenId, chains: &ChainRegistry) -> u32 {
        let Some(token) = self.tokens.get(&id) else {
            return 0;
        };
        match token.chain {
            Some(chain_id) => {
                let mass = chains.total_mass(self, chain_id);
                if mass == 0 {
                    token.mass
                } else {
                    mass
                }
            }
            None => token.mass,
        }
    }

    /// Relocates a token to a new continuous position.
    ///
    /// - Out of bounds: the token is culled from the simulation; returns
    ///   `false`.
    /// - Destination holds a mutually exclusive resident: the lighter bonded
    ///   mass is redirected to a horizontal neighbor with headroom, or the
    ///   move fails.
    /// - Destination full: spillover recurses into a neighbor with headroom.
    ///
    /// On success the token's coordinates are set to the exact (non-floored)
    /// target. On failure the position is untouched.
    pub fn move_token(
        &mut self,
        id: TokenId,
        x: f64,
        y: f64,
        z: f64,
        chains: &ChainRegistry,
    ) -> bool {
        self.move_token_inner(id, x, y, z, chains, 0)
    }

    fn move_token_inner(
        &mut self,
        id: TokenId,
        x: f64,
        y: f64,
        z: f64,
        chains: &ChainRegistry,
        depth: usize,
    ) -> bool {
        if depth > SPILLOVER_DEPTH_LIMIT {
            return false;
        }
        let Some(token) = self.tokens.get(&id) else {
            return false;
        };
        let mass = token.mass;
        let old_key = self.key_for(token.x, token.y, token.z);

        let Some(mut key) = self.key_for(x, y, z) else {
            // Out of bounds: the token leaves the simulation.
            self.remove(id);
            return false;
        };
        let (mut x, mut y, mut z) = (x, y, z);

        if let Some(rival) = self.exclusive_resident(key, id) {
            if self.bonded_mass(id, chains) < self.bonded_mass(rival, chains) {
                match self.adjacent_with_headroom(key) {
                    Some(alt) => {
                        key = alt;
                        x = alt.0 as f64;
                        y = alt.1 as f64;
                        z = alt.2 as f64;
                    }
                    None => return false,
                }
            }
        }

        if old_key == Some(key) {
            let token = self.tokens.get_mut(&id).expect("token present");
            token.x = x;
            token.y = y;
            token.z = z;
            return true;
        }

        let idx = self.idx(key);
        if self.cells[idx].can_accept(mass, self.capacity) {
            if let Some(old) = old_key {
                let old_idx = self.idx(old);
                self.cells[old_idx].remove(id, mass);
            }
            self.cells[idx].add(id, mass);
            let token = self.tokens.get_mut(&id).expect("token present");
            token.x = x;
            token.y = y;
            token.z = z;
            true
        } else {
            match self.adjacent_with_headroom(key) {
                Some(alt) => self.move_token_inner(
                    id,
                    alt.0 as f64,
                    alt.1 as f64,
                    alt.2 as f64,
                    chains,
                    depth + 1,
                ),
                None => false,
            }
        }
    }

    /// First resident of `key` that is mutually exclusive with `id`.
    fn exclusive_resident(&self, key: CellKey, id: TokenId) -> Option<TokenId> {
        let mover = self.tokens.get(&id)?;
        let cell = &self.cells[self.idx(key)];
        cell.tokens
            .iter()
            .copied()
            .filter(|&other| other != id)
            .find(|&other| {
                self.tokens
                    .get(&other)
                    .is_some_and(|t| mutually_exclusive(mover, t))
            })
    }

    /// First of the 8 same-altitude neighbors that still has headroom
    /// (strictly below capacity). Scan order is fixed for determinism.
    pub fn adjacent_with_headroom(&self, key: CellKey) -> Option<CellKey> {
        let (cx, cy, cz) = (key.0 as i64, key.1 as i64, key.2 as i64);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if let Some(neighbor) = self.key_at(cx + dx, cy + dy, cz) {
                    if self.cells[self.idx(neighbor)].current_mass < self.capacity {
                        return Some(neighbor);
                    }
                }
            }
        }
        None
    }

    /// The 8 same-altitude neighbor keys, in scan order.
    pub fn horizontal_neighbors(&self, key: CellKey) -> Vec<CellKey> {
        let (cx, cy, cz) = (key.0 as i64, key.1 as i64, key.2 as i64);
        let mut neighbors = Vec::with_capacity(8);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if let Some(neighbor) = self.key_at(cx + dx, cy + dy, cz) {
                    neighbors.push(neighbor);
                }
            }
        }
        neighbors
    }

    /// All 26 neighbor keys (including vertical), in scan order. Used by the
    /// gravity direction search.
    pub fn neighbors_26(&self, key: CellKey) -> Vec<CellKey> {
        let (cx, cy, cz) = (key.0 as i64, key.1 as i64, key.2 as i64);
        let mut neighbors = Vec::with_capacity(26);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    if let Some(neighbor) = self.key_at(cx + dx, cy + dy, cz + dz) {
                        neighbors.push(neighbor);
                    }
                }
            }
        }
        neighbors
    }

    /// Keys of cells currently holding tokens, in x,y,z order.
    pub fn occupied_keys(&self) -> Vec<CellKey> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(idx, _)| self.key_of_idx(idx))
            .collect()
    }

    /// Grid-wide spillover sweep: drains every over-capacity cell by moving
    /// its lightest member to a neighbor with headroom, or removing it from
    /// the simulation when nowhere has room. Run once per tick after
    /// movement so bonding never observes over-capacity cells.
    pub fn settle_overflow(&mut self, chains: &ChainRegistry) {
        for key in self.occupied_keys() {
            loop {
                let cell = &self.cells[self.idx(key)];
                if cell.current_mass <= self.capacity || cell.tokens.is_empty() {
                    break;
                }
                let lightest = self.lightest_in(cell);
                match self.adjacent_with_headroom(key) {
                    Some(alt) => {
                        let moved = self.move_token(
                            lightest,
                            alt.0 as f64,
                            alt.1 as f64,
                            alt.2 as f64,
                            chains,
                        );
                        if !moved && self.contains(lightest) {
                            // Nowhere downstream had room either.
                            self.remove(lightest);
                        }
                    }
                    None => {
                        self.remove(lightest);
                        break;
                    }
                }
            }
        }
    }

    /// First member with minimal mass, in admission order.
    fn lightest_in(&self, cell: &Cell) -> TokenId {
        let mut best = cell.tokens[0];
        let mut best_mass = self.tokens.get(&best).map_or(u32::MAX, |t| t.mass);
        for &id in &cell.tokens[1..] {
            let mass = self.tokens.get(&id).map_or(u32::MAX, |t| t.mass);
            if mass < best_mass {
                best = id;
                best_mass = mass;
            }
        }
        best
    }
}
