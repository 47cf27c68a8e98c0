use lexivent_core::config::SimConfig;
use lexivent_core::simulation::Simulation;
use lexivent_core::token::{Token, TokenId};

/// Builds a small, quiet simulation for scenario tests: a cubic grid, a
/// fixed seed and a vent slowed down enough that tests control the
/// population themselves unless they ask otherwise.
#[allow(dead_code)]
pub struct SimulationBuilder {
    config: SimConfig,
    tokens: Vec<Token>,
}

#[allow(dead_code)]
impl SimulationBuilder {
    pub fn new() -> Self {
        let mut config = SimConfig::default();
        config.grid.size_x = 20;
        config.grid.size_y = 20;
        config.grid.size_z = 20;
        config.vent.spawn_rate = 1_000_000;
        config.seed = Some(0);
        Self {
            config,
            tokens: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_grid_size(mut self, size: usize) -> Self {
        self.config.grid.size_x = size;
        self.config.grid.size_y = size;
        self.config.grid.size_z = size;
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.config.grid.cell_capacity = capacity;
        self
    }

    pub fn with_spawn_rate(mut self, rate: u64) -> Self {
        self.config.vent.spawn_rate = rate;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_token(mut self, value: &str, x: f64, y: f64, z: f64, energy: i32) -> Self {
        self.tokens.push(Token::new(value, x, y, z, energy));
        self
    }

    /// Builds the simulation and seeds it with the staged tokens, returning
    /// their ids in staging order.
    pub fn build(self) -> (Simulation, Vec<TokenId>) {
        let mut sim = Simulation::new(&self.config);
        let ids = self
            .tokens
            .into_iter()
            .map(|token| {
                sim.grid
                    .insert(token)
                    .expect("seed token should fit in an empty grid")
            })
            .collect();
        (sim, ids)
    }
}
