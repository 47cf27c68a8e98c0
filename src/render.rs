//! Plain-text rendering of simulation state.
//!
//! Everything here formats a [`WorldSnapshot`] or a [`StatsSample`] into a
//! terminal-friendly report. The renderer never touches the live grid, so it
//! can run on exported snapshots as easily as on a running simulation.

use std::fmt::Write as _;

use lexivent_core::snapshot::WorldSnapshot;
use lexivent_core::stats::StatsSample;

/// Lists the longest chains, longest first, with validity markers.
pub fn chain_report(snapshot: &WorldSnapshot, max_chains: usize) -> String {
    let mut chains: Vec<_> = snapshot.chains.iter().collect();
    chains.sort_by(|a, b| b.length.cmp(&a.length).then(a.id.cmp(&b.id)));

    let mut out = String::new();
    let _ = writeln!(out, "=== Top {max_chains} Token Chains ===");
    if chains.is_empty() {
        let _ = writeln!(out, "(no chains)");
        return out;
    }
    for (i, chain) in chains.iter().take(max_chains).enumerate() {
        let status = if chain.is_valid { "ok" } else { "!!" };
        let _ = writeln!(out, "{}. [{status}] \"{}\"", i + 1, chain.code);
        let _ = writeln!(out, "   length: {}, mass: {}", chain.length, chain.total_mass);
    }
    out
}

/// Renders one horizontal layer of the grid as an ASCII map.
///
/// `.` empty, `o` free token, `#` chained token, `x` damaged token; damage
/// wins when markers overlap in a cell.
pub fn horizontal_slice(snapshot: &WorldSnapshot, z_level: usize) -> String {
    let mut cells = vec![b'.'; snapshot.size_x * snapshot.size_y];
    for token in &snapshot.tokens {
        if token.z < 0.0 || token.z as usize != z_level {
            continue;
        }
        let (x, y) = (token.x as usize, token.y as usize);
        if x >= snapshot.size_x || y >= snapshot.size_y {
            continue;
        }
        let idx = y * snapshot.size_x + x;
        let mark = if token.damaged {
            b'x'
        } else if token.chain.is_some() {
            b'#'
        } else {
            b'o'
        };
        // x beats #, # beats o
        let rank = |m: u8| match m {
            b'x' => 3,
            b'#' => 2,
            b'o' => 1,
            _ => 0,
        };
        if rank(mark) > rank(cells[idx]) {
            cells[idx] = mark;
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "=== Slice z={z_level} (tick {}) ===", snapshot.tick);
    for y in (0..snapshot.size_y).rev() {
        let row = &cells[y * snapshot.size_x..(y + 1) * snapshot.size_x];
        out.push_str(std::str::from_utf8(row).unwrap_or(""));
        out.push('\n');
    }
    out
}

/// The end-of-run statistics block.
pub fn summary(stats: &StatsSample) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Final Statistics (tick {}) ===", stats.tick);
    let _ = writeln!(
        out,
        "Tokens: {} (spawned: {}), total mass: {}",
        stats.total_tokens, stats.vent_spawned, stats.total_mass
    );
    let _ = writeln!(
        out,
        "  rising: {}, sinking: {}, avg altitude: {:.1}, total energy: {}",
        stats.rising_tokens, stats.sinking_tokens, stats.average_altitude, stats.total_energy
    );
    let _ = writeln!(
        out,
        "Chains: {} (valid: {}), avg length: {:.1}, longest: {}",
        stats.total_chains, stats.valid_chains, stats.average_chain_length, stats.longest_chain
    );
    let _ = writeln!(out, "Damage: {} tokens damaged", stats.damaged_tokens);
    for zone in &stats.zones {
        let pct = if zone.total > 0 {
            zone.damaged as f64 / zone.total as f64 * 100.0
        } else {
            0.0
        };
        let _ = writeln!(
            out,
            "  {}: {}/{} ({pct:.1}%)",
            zone.label, zone.damaged, zone.total
        );
    }
    out
}
