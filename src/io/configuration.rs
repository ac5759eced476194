//! Algorithm constants and runtime configuration defaults

/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default side length of extracted windows
pub const DEFAULT_PATTERN_SIZE: usize = 3;

/// Default output dimensions in cells
pub const DEFAULT_OUTPUT_SIZE: (usize, usize) = (32, 32);

/// Default number of fresh-seed retries before the CLI gives up on a file
pub const DEFAULT_ATTEMPTS: usize = 20;

// Safety limit: the support table holds four counters per entry, so this
// caps per-wave memory at a few gigabytes even for dense catalogs
/// Maximum `cells × patterns` entries in one wave's support table
pub const MAX_SUPPORT_ENTRIES: usize = 1 << 28;

/// Maximum allowed output dimension in pixels
pub const MAX_OUTPUT_DIMENSION: usize = 10_000;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";

/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
