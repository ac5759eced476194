//! Error types for model construction and file handling

use std::fmt;
use std::path::PathBuf;

use crate::spatial::direction::Direction;

/// Main error type for all generation operations
///
/// Contradictions are deliberately not represented here: a run that fails to
/// converge returns `None` and is retried, while these errors abort the call.
#[derive(Debug)]
pub enum GenerationError {
    /// Failed to load an exemplar image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save a generated image to disk
    ImageExport {
        /// Path where the export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General filesystem operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Model option validation failed
    InvalidParameter {
        /// Name of the invalid option
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Input data cannot produce a usable pattern catalog
    InvalidSourceData {
        /// Description of what is wrong with the input
        reason: String,
    },

    /// Tile index exceeds the registered tile set
    InvalidTileIndex {
        /// The offending tile index
        index: usize,
        /// Number of registered tiles
        tile_count: usize,
    },

    /// A pattern has no compatible neighbor on one of its sides
    ///
    /// Such a pattern could survive at a grid edge yet never participate in
    /// a consistent interior, so the table is rejected before any wave runs.
    UnsupportedSide {
        /// Pattern id with the open side
        pattern: usize,
        /// The side with empty compatibility
        direction: Direction,
    },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "filesystem error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "invalid option '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "invalid source data: {reason}")
            }
            Self::InvalidTileIndex { index, tile_count } => {
                write!(
                    f,
                    "tile index {index} is out of bounds ({tile_count} tiles registered)"
                )
            }
            Self::UnsupportedSide { pattern, direction } => {
                write!(
                    f,
                    "pattern {pattern} has no compatible neighbor on its {direction} side"
                )
            }
        }
    }
}

impl std::error::Error for GenerationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<image::ImageError> for GenerationError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Convenience type alias for generation results
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GenerationError {
    GenerationError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_parameter_and_reason() {
        let err = invalid_parameter("pattern_size", &1, &"must be at least 2");
        let message = err.to_string();
        assert!(message.contains("pattern_size"));
        assert!(message.contains("must be at least 2"));
    }
}
