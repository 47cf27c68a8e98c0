//! # Lexivent Core
//!
//! The core simulation engine for Lexivent - a 3D code-token biochemistry
//! simulation.
//!
//! This crate contains the deterministic simulation logic, including:
//! - Token physics (buoyant rise, energy-depleted sinking, gravity pull)
//! - A capacity-bounded 3D cell grid with spillover relocation
//! - Bonding chemistry: pairwise bond strengths and shallow grammar checks
//! - Altitude-driven damage and low-altitude repair
//! - The hydrothermal vent token source
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! The simulation follows an arena-oriented design:
//! - **Grid-owned tokens**: the grid is the single owner of all token state
//! - **Indexed chains**: chains are ordered id lists in a registry, never
//!   pointer links between tokens
//! - **Deterministic simulation**: one seeded RNG and ordered collections
//!   make runs reproducible
//!
//! ## Example
//!
//! ```
//! use lexivent_core::config::SimConfig;
//! use lexivent_core::simulation::Simulation;
//!
//! let mut config = SimConfig::default();
//! config.grid.size_x = 20;
//! config.grid.size_y = 20;
//! config.grid.size_z = 20;
//! config.seed = Some(42);
//!
//! let mut sim = Simulation::new(&config);
//! sim.run(100);
//! assert_eq!(sim.tick(), 100);
//! ```

/// Chain formation, validation and grammar repair
pub mod bonding;
/// Ordered token chains and their registry
pub mod chain;
/// Configuration management for simulation parameters
pub mod config;
/// Altitude-based damage and repair
pub mod damage;
/// The capacity-bounded 3D cell grid
pub mod grid;
/// Metrics collection and logging setup
pub mod metrics;
/// Token movement, collisions and gravity
pub mod physics;
/// Serializable world snapshots for rendering and export
pub mod snapshot;
/// The tick coordinator
pub mod simulation;
/// Per-interval statistics samples
pub mod stats;
/// Tokens, kinds and the bond-strength table
pub mod token;
/// The hydrothermal vent token source
pub mod vent;

pub use config::SimConfig;
pub use simulation::Simulation;
pub use snapshot::WorldSnapshot;
pub use stats::StatsSample;
