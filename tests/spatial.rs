//! Tests for the symmetry algebra, window transforms, and overlap checks

use ndarray::Array2;

use wavetile::spatial::direction::{ByDirection, Direction};
use wavetile::spatial::grid::{overlap_equal_when_offset, window, SquareGrid};
use wavetile::spatial::symmetry::{Symmetry, SymmetrySet};
use wavetile::spatial::wrapping::Wrapping;

/// 2x2 grid laid out as
/// ```text
/// a b
/// c d
/// ```
fn abcd() -> SquareGrid<char> {
    SquareGrid::from_fn(2, |x, y| match (x, y) {
        (0, 0) => 'a',
        (1, 0) => 'b',
        (0, 1) => 'c',
        _ => 'd',
    })
}

fn cells(grid: &SquareGrid<char>) -> Vec<char> {
    let mut out = Vec::new();
    for y in 0..grid.side() {
        for x in 0..grid.side() {
            out.push(*grid.get(x, y));
        }
    }
    out
}

#[test]
fn transforms_match_their_diagrams() {
    let grid = abcd();

    assert_eq!(cells(&grid.transformed(Symmetry::Rotation0)), vec!['a', 'b', 'c', 'd']);
    assert_eq!(cells(&grid.transformed(Symmetry::Rotation90)), vec!['b', 'd', 'a', 'c']);
    assert_eq!(cells(&grid.transformed(Symmetry::Rotation180)), vec!['d', 'c', 'b', 'a']);
    assert_eq!(cells(&grid.transformed(Symmetry::Rotation270)), vec!['c', 'a', 'd', 'b']);
    assert_eq!(
        cells(&grid.transformed(Symmetry::FlipHorizontal)),
        vec!['c', 'd', 'a', 'b']
    );
    assert_eq!(
        cells(&grid.transformed(Symmetry::FlipVertical)),
        vec!['b', 'a', 'd', 'c']
    );
    assert_eq!(
        cells(&grid.transformed(Symmetry::FlipMainDiagonal)),
        vec!['a', 'c', 'b', 'd']
    );
    assert_eq!(
        cells(&grid.transformed(Symmetry::FlipAntiDiagonal)),
        vec!['d', 'b', 'c', 'a']
    );
}

#[test]
fn composition_matches_sequential_transforms() {
    let grid = abcd();
    for s1 in Symmetry::ALL {
        for s2 in Symmetry::ALL {
            let sequential = grid.transformed(s2).transformed(s1);
            let composed = grid.transformed(s1.compose(s2));
            assert_eq!(
                cells(&sequential),
                cells(&composed),
                "{s1:?} after {s2:?} disagrees with the composition table"
            );
        }
    }
}

#[test]
fn side_mapping_tracks_the_transforms() {
    // rotate a quarter turn: the north side ends up facing west
    let mapping = Symmetry::Rotation90.side_mapping();
    assert_eq!(mapping[Direction::North], Direction::West);
    assert_eq!(mapping[Direction::East], Direction::North);

    // every mapping is a bijection
    for s in Symmetry::ALL {
        let mapping = s.side_mapping();
        for dir in Direction::ALL {
            assert_eq!(mapping[s.source_side(dir)], dir);
        }
    }
}

#[test]
fn symmetry_classes_are_closed() {
    for class in ['X', 'I', 'T', '/', 'L'] {
        assert!(
            SymmetrySet::from_char(class).is_closed(),
            "class {class} must be closed"
        );
    }
}

#[test]
fn missing_symmetries_complete_each_class() {
    assert_eq!(
        SymmetrySet::from_char('I').missing(),
        SymmetrySet::NONE.with(Symmetry::Rotation90)
    );
    assert_eq!(
        SymmetrySet::from_char('/').missing(),
        SymmetrySet::NONE.with(Symmetry::Rotation90)
    );
    assert_eq!(SymmetrySet::from_char('T').missing(), SymmetrySet::ALL_ROTATIONS);
    assert_eq!(SymmetrySet::from_char('L').missing(), SymmetrySet::ALL_ROTATIONS);
    assert_eq!(SymmetrySet::from_char('X').missing(), SymmetrySet::NONE);
    assert_eq!(SymmetrySet::NONE.missing(), SymmetrySet::ALL);
}

#[test]
fn symmetry_images_count_follows_the_set() {
    let grid = abcd();
    assert_eq!(grid.symmetry_images(SymmetrySet::NONE).len(), 1);
    assert_eq!(grid.symmetry_images(SymmetrySet::ALL_ROTATIONS).len(), 4);
    assert_eq!(grid.symmetry_images(SymmetrySet::ALL).len(), 8);
}

#[test]
fn windows_wrap_only_on_requested_axes() {
    let source = Array2::from_shape_fn((3, 2), |(x, y)| (x * 10 + y) as i32);

    let inside = window(&source, (1, 0), 2, Wrapping::None);
    assert_eq!(*inside.get(0, 0), 10);
    assert_eq!(*inside.get(1, 1), 21);

    let wrapped = window(&source, (2, 0), 2, Wrapping::Both);
    assert_eq!(*wrapped.get(0, 0), 20);
    assert_eq!(*wrapped.get(1, 0), 0);
    assert_eq!(*wrapped.get(1, 1), 1);
}

#[test]
fn overlap_comparison_honours_the_offset() {
    // two windows of a horizontal gradient agree when shifted by one column
    let left = SquareGrid::from_fn(3, |x, _| x as i32);
    let right = SquareGrid::from_fn(3, |x, _| x as i32 + 1);

    assert!(overlap_equal_when_offset(&left, &right, (1, 0)));
    assert!(!overlap_equal_when_offset(&left, &right, (0, 0)));
    assert!(!overlap_equal_when_offset(&left, &right, (-1, 0)));

    // disjoint placements are trivially compatible
    assert!(overlap_equal_when_offset(&left, &right, (3, 0)));
}

#[test]
fn by_direction_round_trips_through_indexing() {
    let mut slots = ByDirection::nesw(1, 2, 3, 4);
    assert_eq!(slots[Direction::North], 1);
    assert_eq!(slots[Direction::West], 4);

    slots[Direction::South] = 30;
    assert_eq!(slots[Direction::South], 30);

    let doubled = ByDirection::from_fn(|dir| slots[dir] * 2);
    assert_eq!(doubled[Direction::East], 4);
    assert_eq!(slots.position_of(&30), Some(Direction::South));
}

#[test]
fn opposites_and_offsets_are_consistent() {
    for dir in Direction::ALL {
        assert_eq!(dir.opposite().opposite(), dir);
        let (dx, dy) = dir.offset();
        let (ox, oy) = dir.opposite().offset();
        assert_eq!((dx + ox, dy + oy), (0, 0));
    }
}
