//! Lexivent: a 3D code-token biochemistry simulation.
//!
//! The simulation engine lives in `lexivent_core`; this crate adds the
//! text renderer and the CLI front end.

pub mod render;

pub use lexivent_core::config::SimConfig;
pub use lexivent_core::simulation::Simulation;
pub use lexivent_core::snapshot::WorldSnapshot;
pub use lexivent_core::stats::StatsSample;
