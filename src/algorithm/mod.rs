//! Constraint solver core: wave state, entropy ordering, and propagation

/// Flat possibility bitmap backing the wave
pub mod bitset;
/// Per-cell entropy bookkeeping and the minimum-entropy queue
pub mod entropy;
/// Run loop driving waves to a terminal state
pub mod executor;
/// Wave state, observation, and constraint propagation
pub mod wave;

pub use executor::WaveExecutor;
pub use wave::{CellChoice, CompatibilityTable, Observation, Wave};
