//! Bonding engine: token combination, grammar validation, and repair.
//!
//! Acts as a deliberately shallow "AST validator": bonds form from the
//! pairwise strength table, and validation only ever looks at adjacent
//! pairs. There is no lookahead and no bracket-depth tracking; invalid
//! links are repaired locally by reconnecting or dropping a member.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chain::ChainRegistry;
use crate::grid::Grid;
use crate::token::{bond_strength, ChainId, Token, TokenId, TokenKind, BOND_BREAK_THRESHOLD, BOND_FORM_THRESHOLD};

/// Chains are re-validated at most once per this many ticks.
pub const VALIDATION_INTERVAL: u64 = 10;

/// Energy given to literals spawned by default-value insertion.
const DEFAULT_VALUE_ENERGY: i32 = 10;

/// Small literals inserted where an assignment is missing its value.
const DEFAULT_VALUES: &[u32] = &[0, 1, 2, 5, 10];

/// Manages chain formation, validation and energy generation.
#[derive(Debug, Default)]
pub struct BondingEngine {
    pub chains: ChainRegistry,
}

impl BondingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// One bonding pass: re-sync membership, attempt combinations in every
    /// occupied cell, run throttled validation, and drop emptied chains.
    pub fn update(&mut self, grid: &mut Grid, tick: u64) {
        self.chains.purge_missing(grid);
        self.combine(grid);
        self.validate(grid, tick);
        self.chains.prune_empty();
    }

    /// Attempts bonds between cell-mates.
    ///
    /// Free (unchained, undamaged) pairs above the formation threshold start
    /// new chains; chains with a tail in the cell extend onto free tokens
    /// the same way. A token chained earlier in this pass is no longer free.
    fn combine(&mut self, grid: &mut Grid) {
        for key in grid.occupied_keys() {
            let cell_tokens = grid.cell(key).tokens.clone();
            if cell_tokens.len() < 2 {
                continue;
            }
            let free: Vec<TokenId> = cell_tokens
                .iter()
                .copied()
                .filter(|&id| {
                    grid.token(id)
                        .is_some_and(|t| t.chain.is_none() && !t.damaged)
                })
                .collect();

            for i in 0..free.len() {
                let a_id = free[i];
                if grid.token(a_id).is_none_or(|t| t.chain.is_some()) {
                    continue;
                }
                for &b_id in &free[i + 1..] {
                    if grid.token(b_id).is_none_or(|t| t.chain.is_some()) {
                        continue;
                    }
                    if pair_strength(grid, a_id, b_id) > BOND_FORM_THRESHOLD {
                        let chain_id = self.chains.start(grid, a_id);
                        let energy = self.chains.append(grid, chain_id, b_id);
                        self.distribute_energy(grid, chain_id, energy);
                        break;
                    }
                }
            }

            // Extension: chains represented in this cell (including ones
            // just created above) grow at the tail.
            let mut chain_ids: Vec<ChainId> = cell_tokens
                .iter()
                .filter_map(|&id| grid.token(id).and_then(|t| t.chain))
                .collect();
            chain_ids.sort_unstable();
            chain_ids.dedup();

            for chain_id in chain_ids {
                let Some(tail) = self.chains.get(chain_id).and_then(|c| c.tail()) else {
                    continue;
                };
                for &cand_id in &free {
                    if grid.token(cand_id).is_none_or(|t| t.chain.is_some()) {
                        continue;
                    }
                    if pair_strength(grid, tail, cand_id) > BOND_FORM_THRESHOLD {
                        let energy = self.chains.append(grid, chain_id, cand_id);
                        self.distribute_energy(grid, chain_id, energy);
                        break;
                    }
                }
            }
        }
    }

    /// Hands generated energy to the lowest-energy members, one unit each.
    fn distribute_energy(&mut self, grid: &mut Grid, chain_id: ChainId, amount: i32) {
        if amount <= 0 {
            return;
        }
        let Some(chain) = self.chains.get(chain_id) else {
            return;
        };
        let mut members = chain.members.clone();
        // Stable sort keeps chain order among equal-energy members.
        members.sort_by_key(|&id| grid.token(id).map_or(i32::MAX, |t| t.energy));
        for &id in members.iter().take(amount as usize) {
            if let Some(token) = grid.token_mut(id) {
                token.energy += 1;
            }
        }
    }

    /// Throttled grammar validation over all chains.
    fn validate(&mut self, grid: &mut Grid, tick: u64) {
        for chain_id in self.chains.ids() {
            {
                let Some(chain) = self.chains.get_mut(chain_id) else {
                    continue;
                };
                if tick.saturating_sub(chain.last_validated_tick) < VALIDATION_INTERVAL {
                    continue;
                }
                chain.last_validated_tick = tick;
            }

            let members = self
                .chains
                .get(chain_id)
                .map(|c| c.members.clone())
                .unwrap_or_default();
            let mut errors: Vec<(TokenId, TokenId)> = Vec::new();
            for pair in members.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let strength = pair_strength(grid, a, b);
                let grammar_ok = match (grid.token(a), grid.token(b)) {
                    (Some(ta), Some(tb)) => grammar_rule_holds(ta, tb),
                    _ => false,
                };
                if strength < BOND_BREAK_THRESHOLD || !grammar_ok {
                    errors.push((a, b));
                }
            }

            if let Some(chain) = self.chains.get_mut(chain_id) {
                chain.is_valid = errors.is_empty();
            }
            for (a, b) in errors {
                self.repair(grid, chain_id, a, b);
            }
        }
    }

    /// Repairs one invalid link (a, b): reconnect `a` to another free token
    /// in its cell when possible, otherwise drop `b` from the chain.
    fn repair(&mut self, grid: &mut Grid, chain_id: ChainId, a: TokenId, b: TokenId) {
        // An earlier repair or external damage may already have reshaped the
        // chain; only act if the link still exists.
        let still_linked = self
            .chains
            .get(chain_id)
            .map(|chain| {
                chain
                    .members
                    .windows(2)
                    .any(|pair| pair[0] == a && pair[1] == b)
            })
            .unwrap_or(false);
        if !still_linked {
            return;
        }

        let candidate = self.reconnect_candidate(grid, a, b);
        match candidate {
            Some(other) => self.chains.replace_member(grid, chain_id, b, other),
            None => self.chains.remove_member(grid, chain_id, b),
        }
    }

    /// First free, undamaged cell-mate of `a` (excluding `a` and `b`) that
    /// `a` bonds to above the formation threshold.
    fn reconnect_candidate(&self, grid: &Grid, a: TokenId, b: TokenId) -> Option<TokenId> {
        let token_a = grid.token(a)?;
        let key = grid.key_for(token_a.x, token_a.y, token_a.z)?;
        grid.cell(key)
            .tokens
            .iter()
            .copied()
            .filter(|&id| id != a && id != b)
            .find(|&id| {
                grid.token(id).is_some_and(|t| {
                    t.chain.is_none()
                        && !t.damaged
                        && bond_strength(token_a, t).unwrap_or(0) > BOND_FORM_THRESHOLD
                })
            })
    }

    /// Spawns small literal tokens where a chain reads `= <punctuation>`,
    /// i.e. an assignment missing its value. Admission follows the normal
    /// grid rules; a saturated cell silently swallows the spawn.
    pub fn insert_default_values<R: Rng>(&mut self, grid: &mut Grid, rng: &mut R) {
        let mut spawn_points: Vec<(f64, f64, f64)> = Vec::new();
        for chain in self.chains.iter() {
            for pair in chain.members.windows(2) {
                let (Some(a), Some(b)) = (grid.token(pair[0]), grid.token(pair[1])) else {
                    continue;
                };
                if a.kind == TokenKind::Operator
                    && a.value == "="
                    && b.kind == TokenKind::Punctuation
                {
                    spawn_points.push((a.x, a.y, a.z));
                }
            }
        }
        for (x, y, z) in spawn_points {
            let value = DEFAULT_VALUES.choose(rng).copied().unwrap_or(0);
            let _ = grid.insert(Token::new(&value.to_string(), x, y, z, DEFAULT_VALUE_ENERGY));
        }
    }
}

fn pair_strength(grid: &Grid, a: TokenId, b: TokenId) -> u8 {
    match (grid.token(a), grid.token(b)) {
        (Some(ta), Some(tb)) => bond_strength(ta, tb).unwrap_or(0),
        _ => 0,
    }
}

/// Local grammar rules checked during validation, beyond raw bond strength:
/// a type keyword must be followed by an identifier or punctuation, and a
/// non-increment/decrement operator by an operand or punctuation.
fn grammar_rule_holds(a: &Token, b: &Token) -> bool {
    if matches!(a.value.as_str(), "int" | "float" | "char" | "void")
        && !matches!(b.kind, TokenKind::Identifier | TokenKind::Punctuation)
    {
        return false;
    }
    if a.kind == TokenKind::Operator
        && !matches!(a.value.as_str(), "++" | "--")
        && !matches!(
            b.kind,
            TokenKind::Identifier | TokenKind::Literal | TokenKind::Punctuation
        )
    {
        return false;
    }
    true
}
