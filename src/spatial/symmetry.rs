//! The dihedral group D4 and flag sets over it
//!
//! Square patterns and tiles are transformed by the eight symmetries of the
//! square. Tiles declare their own symmetry closure; the set algebra here
//! computes which additional symmetries still produce distinct images.

use crate::spatial::direction::{ByDirection, Direction};

/// One symmetry of the square
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Symmetry {
    /// Identity
    Rotation0 = 0,
    /// Quarter turn clockwise
    Rotation90,
    /// Half turn
    Rotation180,
    /// Three-quarter turn clockwise
    Rotation270,
    /// Mirror across the horizontal axis
    FlipHorizontal,
    /// Mirror across the vertical axis
    FlipVertical,
    /// Mirror across the main diagonal
    FlipMainDiagonal,
    /// Mirror across the anti-diagonal
    FlipAntiDiagonal,
}

use Symmetry::{
    FlipAntiDiagonal as A, FlipHorizontal as H, FlipMainDiagonal as D, FlipVertical as V,
    Rotation0 as R0, Rotation90 as R90, Rotation180 as R180, Rotation270 as R270,
};

/// Composition table: `COMPOSITIONS[s1][s2]` is `s1` applied after `s2`
const COMPOSITIONS: [[Symmetry; 8]; 8] = [
    [R0, R90, R180, R270, H, V, D, A],
    [R90, R180, R270, R0, A, D, H, V],
    [R180, R270, R0, R90, V, H, A, D],
    [R270, R0, R90, R180, D, A, V, H],
    [H, D, V, A, R0, R180, R90, R270],
    [V, A, H, D, R180, R0, R270, R90],
    [D, V, A, H, R270, R90, R0, R180],
    [A, H, D, V, R90, R270, R180, R0],
];

impl Symmetry {
    /// All eight symmetries, identity first
    pub const ALL: [Self; 8] = [R0, R90, R180, R270, H, V, D, A];

    /// The seven non-identity symmetries
    pub const TRANSFORMS: [Self; 7] = [R90, R180, R270, H, V, D, A];

    /// Numeric index of the symmetry
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether the symmetry reverses orientation (any mirror)
    ///
    /// Reflections also reverse the reading direction of a tile side, which
    /// swaps which of its two edge labels applies.
    pub const fn is_reflection(self) -> bool {
        (self as u8) >= 4
    }

    /// Bit flag of the symmetry; the identity carries no flag
    pub const fn flag(self) -> u8 {
        match self {
            R0 => 0,
            _ => 1 << ((self as u8) - 1),
        }
    }

    /// `self` applied after `other`, i.e. `self(other(x))`
    pub const fn compose(self, other: Self) -> Self {
        COMPOSITIONS[self.index()][other.index()]
    }

    /// Where each original side ends up after the transform
    ///
    /// The side that was in direction `dir` becomes the side in direction
    /// `side_mapping()[dir]` of the transformed square.
    pub const fn side_mapping(self) -> ByDirection<Direction> {
        use Direction::{East, North, South, West};
        match self {
            R0 => ByDirection::nesw(North, East, South, West),
            R90 => ByDirection::nesw(West, North, East, South),
            R180 => ByDirection::nesw(South, West, North, East),
            R270 => ByDirection::nesw(East, South, West, North),
            H => ByDirection::nesw(South, East, North, West),
            V => ByDirection::nesw(North, West, South, East),
            D => ByDirection::nesw(West, South, East, North),
            A => ByDirection::nesw(East, North, West, South),
        }
    }

    /// The original side that faces `dir` after the transform
    pub fn source_side(self, dir: Direction) -> Direction {
        // the mapping is a bijection over four directions so the scan always hits
        self.side_mapping()
            .position_of(&dir)
            .unwrap_or(Direction::North)
    }
}

/// A set of symmetries, stored as bit flags
///
/// The identity is implicit and never a member; `iter` yields only the
/// non-identity symmetries present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SymmetrySet(u8);

impl SymmetrySet {
    /// The empty set
    pub const NONE: Self = Self(0);

    /// The three non-trivial rotations
    pub const ALL_ROTATIONS: Self = Self(
        Symmetry::Rotation90.flag() | Symmetry::Rotation180.flag() | Symmetry::Rotation270.flag(),
    );

    /// All four mirrors
    pub const ALL_FLIPS: Self = Self(
        Symmetry::FlipHorizontal.flag()
            | Symmetry::FlipVertical.flag()
            | Symmetry::FlipMainDiagonal.flag()
            | Symmetry::FlipAntiDiagonal.flag(),
    );

    /// The full group minus the identity
    pub const ALL: Self = Self(Self::ALL_ROTATIONS.0 | Self::ALL_FLIPS.0);

    /// Membership test; always false for the identity
    pub const fn contains(self, s: Symmetry) -> bool {
        self.0 & s.flag() != 0
    }

    /// The set with `s` inserted
    #[must_use]
    pub const fn with(self, s: Symmetry) -> Self {
        Self(self.0 | s.flag())
    }

    /// Set union
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of symmetries in the set
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the members in canonical order
    pub fn iter(self) -> impl Iterator<Item = Symmetry> {
        Symmetry::TRANSFORMS
            .into_iter()
            .filter(move |&s| self.contains(s))
    }

    /// Conventional single-character tile symmetry classes
    ///
    /// `X` fully symmetric, `I` two-fold with axis mirrors, `T` one vertical
    /// mirror, `/` diagonal two-fold, `L` one anti-diagonal mirror. Any other
    /// character means no symmetry.
    pub fn from_char(c: char) -> Self {
        match c {
            'X' => Self::ALL,
            'I' => Self::NONE
                .with(Symmetry::Rotation180)
                .with(Symmetry::FlipHorizontal)
                .with(Symmetry::FlipVertical),
            'T' => Self::NONE.with(Symmetry::FlipVertical),
            '/' => Self::NONE
                .with(Symmetry::Rotation180)
                .with(Symmetry::FlipMainDiagonal)
                .with(Symmetry::FlipAntiDiagonal),
            'L' => Self::NONE.with(Symmetry::FlipAntiDiagonal),
            _ => Self::NONE,
        }
    }

    /// Closure considering only pairs drawn from the two given sets
    pub fn biclosure(self, other: Self) -> Self {
        let mut current = self.union(other);
        loop {
            let mut next = current;
            for s1 in self.iter() {
                for s2 in other.iter() {
                    next = next.with(s1.compose(s2)).with(s2.compose(s1));
                }
            }
            if next == current {
                return next;
            }
            current = next;
        }
    }

    /// Smallest superset closed under composition
    pub fn closure(self) -> Self {
        let mut current = self;
        loop {
            let next = current.biclosure(current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    /// Whether the set equals its own closure
    pub fn is_closed(self) -> bool {
        self.closure() == self
    }

    /// Symmetries producing images not obtainable from any composition of
    /// the set's members
    ///
    /// Given something whose own symmetries are `self`, these are exactly the
    /// transforms needed to generate every remaining distinct image.
    pub fn missing(self) -> Self {
        let closed = self.closure();
        let mut reachable = closed;
        let mut missing = Self::NONE;

        for s in Symmetry::TRANSFORMS {
            if !reachable.contains(s) {
                missing = missing.with(s);
                reachable = reachable.union(closed.biclosure(missing));
            }
        }

        missing
    }
}
