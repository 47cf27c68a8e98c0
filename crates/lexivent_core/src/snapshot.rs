use serde::{Deserialize, Serialize};

use crate::chain::ChainRegistry;
use crate::grid::Grid;
use crate::stats::StatsSample;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TokenSnapshot {
    pub id: u64,
    pub value: String,
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub energy: i32,
    pub mass: u32,
    pub damaged: bool,
    pub chain: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChainSnapshot {
    pub id: u64,
    pub code: String,
    pub length: usize,
    pub is_valid: bool,
    pub total_mass: u32,
}

/// A self-contained view of the world at one tick, for rendering and export.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub tokens: Vec<TokenSnapshot>,
    pub chains: Vec<ChainSnapshot>,
    pub stats: Option<StatsSample>,
}

impl WorldSnapshot {
    pub fn capture(
        tick: u64,
        grid: &Grid,
        chains: &ChainRegistry,
        stats: Option<StatsSample>,
    ) -> Self {
        let (size_x, size_y, size_z) = grid.size();
        let tokens = grid
            .token_ids()
            .into_iter()
            .filter_map(|id| {
                grid.token(id).map(|t| TokenSnapshot {
                    id: id.0,
                    value: t.value.clone(),
                    kind: format!("{:?}", t.kind),
                    x: t.x,
                    y: t.y,
                    z: t.z,
                    energy: t.energy,
                    mass: t.mass,
                    damaged: t.damaged,
                    chain: t.chain.map(|c| c.0),
                })
            })
            .collect();
        let chain_views = chains
            .iter()
            .map(|chain| ChainSnapshot {
                id: chain.id.0,
                code: chains.code_string(grid, chain.id),
                length: chain.len(),
                is_valid: chain.is_valid,
                total_mass: chains.total_mass(grid, chain.id),
            })
            .collect();
        Self {
            tick,
            size_x,
            size_y,
            size_z,
            tokens,
            chains: chain_views,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::token::Token;

    #[test]
    fn capture_lists_tokens_and_chains() {
        let mut grid = Grid::new(&GridConfig {
            size_x: 10,
            size_y: 10,
            size_z: 10,
            cell_capacity: 1000,
        });
        let a = grid.insert(Token::new("(", 1.0, 1.0, 1.0, 5)).unwrap();
        let b = grid.insert(Token::new(")", 1.0, 1.0, 1.0, 5)).unwrap();
        let mut chains = ChainRegistry::new();
        let cid = chains.start(&mut grid, a);
        chains.append(&mut grid, cid, b);

        let snapshot = WorldSnapshot::capture(7, &grid, &chains, None);
        assert_eq!(snapshot.tick, 7);
        assert_eq!(snapshot.tokens.len(), 2);
        assert_eq!(snapshot.chains.len(), 1);
        assert_eq!(snapshot.chains[0].code, "( )");
        assert!(snapshot.chains[0].is_valid);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"code\":\"( )\""));
    }
}
