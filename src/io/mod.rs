//! Input/output: errors, configuration, imaging, CLI, and progress display

/// Command-line interface and batch processing
pub mod cli;
/// Algorithm constants and runtime configuration defaults
pub mod configuration;
/// Error types for model construction and file handling
pub mod error;
/// PNG import and export for RGB cell grids
pub mod image;
/// Progress display for batch generation runs
pub mod progress;
