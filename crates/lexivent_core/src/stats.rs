//! Per-interval statistics samples.
//!
//! A [`StatsSample`] is a serializable snapshot of the population, the chain
//! registry and the damage distribution. The simulation collects one on a
//! fixed cadence and keeps the whole run history for export.

use serde::{Deserialize, Serialize};

use crate::chain::ChainRegistry;
use crate::grid::Grid;
use crate::vent::Vent;

/// Altitude bands used for the damage breakdown: quarters of the ceiling.
pub const ZONE_LABELS: [&str; 4] = ["low", "medium", "high", "very_high"];

/// Token and damage counts inside one altitude band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneSample {
    pub label: String,
    pub total: usize,
    pub damaged: usize,
}

/// One statistics snapshot for a single tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsSample {
    pub tick: u64,
    pub total_tokens: usize,
    pub total_mass: u64,
    pub vent_spawned: u64,
    pub rising_tokens: usize,
    pub sinking_tokens: usize,
    pub total_energy: i64,
    pub average_altitude: f64,
    pub total_chains: usize,
    pub valid_chains: usize,
    pub average_chain_length: f64,
    pub longest_chain: usize,
    pub damaged_tokens: usize,
    pub zones: Vec<ZoneSample>,
}

/// Collects a full sample from the current world state.
pub fn collect(
    tick: u64,
    grid: &Grid,
    chains: &ChainRegistry,
    vent: &Vent,
    max_altitude: f64,
) -> StatsSample {
    let mut rising_tokens = 0;
    let mut sinking_tokens = 0;
    let mut total_energy: i64 = 0;
    let mut altitude_sum = 0.0;
    let mut damaged_tokens = 0;
    let mut zones: Vec<ZoneSample> = ZONE_LABELS
        .iter()
        .map(|&label| ZoneSample {
            label: label.to_string(),
            total: 0,
            damaged: 0,
        })
        .collect();
    let zone_height = (max_altitude / ZONE_LABELS.len() as f64).max(f64::MIN_POSITIVE);

    for (_, token) in grid.tokens() {
        if token.is_rising() {
            rising_tokens += 1;
        } else {
            sinking_tokens += 1;
        }
        total_energy += i64::from(token.energy);
        altitude_sum += token.z;
        if token.damaged {
            damaged_tokens += 1;
        }
        let zone = ((token.z / zone_height) as usize).min(ZONE_LABELS.len() - 1);
        zones[zone].total += 1;
        if token.damaged {
            zones[zone].damaged += 1;
        }
    }

    let total_tokens = grid.token_count();
    let average_altitude = if total_tokens > 0 {
        altitude_sum / total_tokens as f64
    } else {
        0.0
    };

    let total_chains = chains.len();
    let valid_chains = chains.iter().filter(|c| c.is_valid).count();
    let total_chain_length: usize = chains.iter().map(|c| c.len()).sum();
    let average_chain_length = if total_chains > 0 {
        total_chain_length as f64 / total_chains as f64
    } else {
        0.0
    };
    let longest_chain = chains.iter().map(|c| c.len()).max().unwrap_or(0);

    StatsSample {
        tick,
        total_tokens,
        total_mass: grid.total_mass(),
        vent_spawned: vent.tokens_spawned(),
        rising_tokens,
        sinking_tokens,
        total_energy,
        average_altitude,
        total_chains,
        valid_chains,
        average_chain_length,
        longest_chain,
        damaged_tokens,
        zones,
    }
}
