//! Toroidal boundary handling on selected axes

use std::fmt;

/// Which axes of a grid wrap around toroidally
///
/// Used both when extracting windows from an exemplar and when the solver
/// steps across the edge of the output grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Wrapping {
    /// No axis wraps; steps off the grid are dropped
    #[default]
    None,
    /// Only the x axis wraps
    Horizontal,
    /// Only the y axis wraps
    Vertical,
    /// Both axes wrap
    Both,
}

impl Wrapping {
    /// Whether the x axis wraps
    pub const fn horizontal(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    /// Whether the y axis wraps
    pub const fn vertical(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }

    /// Combine per-axis flags into a wrapping mode
    pub const fn from_axes(horizontal: bool, vertical: bool) -> Self {
        match (horizontal, vertical) {
            (false, false) => Self::None,
            (true, false) => Self::Horizontal,
            (false, true) => Self::Vertical,
            (true, true) => Self::Both,
        }
    }
}

impl fmt::Display for Wrapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Both => "both",
        };
        write!(f, "{name}")
    }
}
