//! Chain model: ordered sequences of bonded tokens.
//!
//! Chains are indexed by an arena-style registry rather than linked through
//! raw next/prev pointers on the tokens themselves: a chain is an ordered
//! `Vec<TokenId>` and each token carries only its own `ChainId`. Order in the
//! member list is the bond order, so cycles and dangling links cannot occur.

use std::collections::BTreeMap;

use crate::grid::Grid;
use crate::token::{ChainId, TokenId};

/// Energy generated by each successful bond.
pub const BOND_ENERGY: i32 = 1;

/// An ordered sequence of bonded tokens forming a candidate statement.
#[derive(Clone, Debug)]
pub struct Chain {
    pub id: ChainId,
    /// Bond order, head first. Membership and linkage are the same thing.
    pub members: Vec<TokenId>,
    pub is_valid: bool,
    pub last_validated_tick: u64,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn head(&self) -> Option<TokenId> {
        self.members.first().copied()
    }

    pub fn tail(&self) -> Option<TokenId> {
        self.members.last().copied()
    }
}

/// Registry of all live chains, keyed by monotonically assigned ids.
///
/// Ids are owned by the registry, not by a global counter, so independent
/// simulations never share state. BTreeMap keeps iteration deterministic.
#[derive(Clone, Debug, Default)]
pub struct ChainRegistry {
    chains: BTreeMap<ChainId, Chain>,
    next_id: u64,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn get(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(&id)
    }

    pub fn get_mut(&mut self, id: ChainId) -> Option<&mut Chain> {
        self.chains.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chain> {
        self.chains.values()
    }

    pub fn ids(&self) -> Vec<ChainId> {
        self.chains.keys().copied().collect()
    }

    /// Starts a new single-member chain.
    ///
    /// The head must be free; its `chain` field is claimed here.
    pub fn start(&mut self, grid: &mut Grid, head: TokenId) -> ChainId {
        let id = ChainId(self.next_id);
        self.next_id += 1;
        self.chains.insert(
            id,
            Chain {
                id,
                members: vec![head],
                is_valid: true,
                last_validated_tick: 0,
            },
        );
        if let Some(token) = grid.token_mut(head) {
            token.chain = Some(id);
        }
        id
    }

    /// Appends a free token to the chain's tail. Returns the energy
    /// generated by the new bond.
    pub fn append(&mut self, grid: &mut Grid, id: ChainId, token: TokenId) -> i32 {
        let Some(chain) = self.chains.get_mut(&id) else {
            return 0;
        };
        chain.members.push(token);
        if let Some(t) = grid.token_mut(token) {
            t.chain = Some(id);
        }
        BOND_ENERGY
    }

    /// Removes a token from the chain's membership, clearing its chain link.
    /// Remaining members keep their order. No-op if the token is not a
    /// member.
    pub fn remove_member(&mut self, grid: &mut Grid, id: ChainId, token: TokenId) {
        if let Some(chain) = self.chains.get_mut(&id) {
            chain.members.retain(|&m| m != token);
        }
        if let Some(t) = grid.token_mut(token) {
            if t.chain == Some(id) {
                t.chain = None;
            }
        }
    }

    /// Swaps `old` out of the chain for `new` at the same position
    /// (grammar-repair reconnection).
    pub fn replace_member(&mut self, grid: &mut Grid, id: ChainId, old: TokenId, new: TokenId) {
        if let Some(chain) = self.chains.get_mut(&id) {
            if let Some(pos) = chain.members.iter().position(|&m| m == old) {
                chain.members[pos] = new;
            }
        }
        if let Some(t) = grid.token_mut(old) {
            if t.chain == Some(id) {
                t.chain = None;
            }
        }
        if let Some(t) = grid.token_mut(new) {
            t.chain = Some(id);
        }
    }

    /// Tears a token out of whatever chain it belongs to (external damage).
    pub fn detach(&mut self, grid: &mut Grid, token: TokenId) {
        let Some(chain_id) = grid.token(token).and_then(|t| t.chain) else {
            return;
        };
        self.remove_member(grid, chain_id, token);
    }

    /// Drops a token from its chain when it leaves the simulation entirely.
    pub fn forget_token(&mut self, grid: &mut Grid, token: TokenId) {
        self.detach(grid, token);
    }

    /// Total mass of all chain members.
    pub fn total_mass(&self, grid: &Grid, id: ChainId) -> u32 {
        self.chains
            .get(&id)
            .map(|chain| {
                chain
                    .members
                    .iter()
                    .filter_map(|&m| grid.token(m))
                    .map(|t| t.mass)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// The code fragment this chain represents, members joined by spaces.
    pub fn code_string(&self, grid: &Grid, id: ChainId) -> String {
        self.chains
            .get(&id)
            .map(|chain| {
                chain
                    .members
                    .iter()
                    .filter_map(|&m| grid.token(m))
                    .map(|t| t.value.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    /// Drops member ids whose tokens no longer exist in the grid (culled by
    /// physics or spillover since the last pass). External subsystems may
    /// shrink chains at any time; the bonding engine re-syncs here.
    pub fn purge_missing(&mut self, grid: &Grid) {
        for chain in self.chains.values_mut() {
            chain.members.retain(|&m| grid.contains(m));
        }
    }

    /// Discards chains that have lost all members.
    pub fn prune_empty(&mut self) {
        self.chains.retain(|_, chain| !chain.members.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::token::Token;

    fn small_grid() -> Grid {
        let mut config = SimConfig::default();
        config.grid.size_x = 10;
        config.grid.size_y = 10;
        config.grid.size_z = 10;
        Grid::new(&config.grid)
    }

    #[test]
    fn start_and_append_track_membership() {
        let mut grid = small_grid();
        let a = grid.insert(Token::new("int", 1.0, 1.0, 1.0, 10)).unwrap();
        let b = grid.insert(Token::new("x", 1.0, 1.0, 1.0, 10)).unwrap();

        let mut chains = ChainRegistry::new();
        let cid = chains.start(&mut grid, a);
        let energy = chains.append(&mut grid, cid, b);

        assert_eq!(energy, BOND_ENERGY);
        assert_eq!(grid.token(a).unwrap().chain, Some(cid));
        assert_eq!(grid.token(b).unwrap().chain, Some(cid));
        assert_eq!(chains.code_string(&grid, cid), "int x");
        assert_eq!(chains.total_mass(&grid, cid), 4);
    }

    #[test]
    fn chain_ids_are_monotonic() {
        let mut grid = small_grid();
        let a = grid.insert(Token::new("x", 1.0, 1.0, 1.0, 10)).unwrap();
        let b = grid.insert(Token::new("y", 2.0, 2.0, 2.0, 10)).unwrap();

        let mut chains = ChainRegistry::new();
        let c1 = chains.start(&mut grid, a);
        let c2 = chains.start(&mut grid, b);
        assert!(c2 > c1);
    }

    #[test]
    fn remove_member_clears_link_and_prunes() {
        let mut grid = small_grid();
        let a = grid.insert(Token::new("x", 1.0, 1.0, 1.0, 10)).unwrap();
        let mut chains = ChainRegistry::new();
        let cid = chains.start(&mut grid, a);

        chains.remove_member(&mut grid, cid, a);
        assert_eq!(grid.token(a).unwrap().chain, None);
        assert!(chains.get(cid).unwrap().is_empty());

        chains.prune_empty();
        assert!(chains.get(cid).is_none());
    }

    #[test]
    fn detach_is_noop_for_free_tokens() {
        let mut grid = small_grid();
        let a = grid.insert(Token::new("x", 1.0, 1.0, 1.0, 10)).unwrap();
        let mut chains = ChainRegistry::new();
        chains.detach(&mut grid, a);
        assert_eq!(grid.token(a).unwrap().chain, None);
    }
}
