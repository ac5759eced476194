//! Model adapters feeding the solver and decoding its result
//!
//! Both adapters reduce their input to the same two tables — a pattern
//! catalog and a compatibility table — hand them to a `WaveExecutor`, and
//! decode solved waves back into cell grids.

/// Exemplar-driven model learning patterns from overlapping windows
pub mod overlapping;
/// Explicit tile sets with labeled sides
pub mod tiled;

pub use overlapping::{Overlapping, OverlappingOptions};
pub use tiled::{SideLabels, Tile, TileId, TileSet, Tiled, TiledOptions};

use crate::algorithm::wave::CompatibilityTable;
use crate::io::configuration::MAX_SUPPORT_ENTRIES;
use crate::io::error::{invalid_parameter, GenerationError, Result};
use crate::spatial::direction::Direction;

/// Reject tables where some pattern has an empty side
///
/// An asymmetric or open adjacency table is a construction bug, not a
/// run-time condition, so it is caught before any wave is built.
pub(crate) fn ensure_every_side_supported(table: &CompatibilityTable) -> Result<()> {
    for (pattern, sides) in table.iter().enumerate() {
        for dir in Direction::ALL {
            if sides[dir].is_empty() {
                return Err(GenerationError::UnsupportedSide {
                    pattern,
                    direction: dir,
                });
            }
        }
    }
    Ok(())
}

/// Reject configurations whose support table would be excessive
pub(crate) fn ensure_support_budget(
    wave_size: (usize, usize),
    num_patterns: usize,
) -> Result<()> {
    let cells = wave_size.0 * wave_size.1;
    let entries = cells.saturating_mul(num_patterns);
    if entries > MAX_SUPPORT_ENTRIES {
        return Err(invalid_parameter(
            "output_size",
            &format!("{}x{}", wave_size.0, wave_size.1),
            &format!(
                "support table would need {entries} entries for {num_patterns} patterns \
                 (limit {MAX_SUPPORT_ENTRIES})"
            ),
        ));
    }
    Ok(())
}
