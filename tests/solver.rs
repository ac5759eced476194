//! Validates the wave's bookkeeping: supports, aggregates, entropy queue,
//! ban/propagate cascades, and terminal states

use std::sync::Arc;

use wavetile::algorithm::bitset::PlacementBitset;
use wavetile::algorithm::entropy::EntropyQueue;
use wavetile::algorithm::wave::{CellChoice, CompatibilityTable, Observation, Wave};
use wavetile::analysis::catalog::FrequencySet;
use wavetile::spatial::direction::{ByDirection, Direction};
use wavetile::spatial::wrapping::Wrapping;

/// Two patterns that must alternate horizontally and stack vertically
fn alternating_table() -> CompatibilityTable {
    vec![
        // pattern 0: N, E, S, W
        ByDirection::nesw(vec![0], vec![1], vec![0], vec![1]),
        // pattern 1
        ByDirection::nesw(vec![1], vec![0], vec![1], vec![0]),
    ]
}

fn alternating_wave(size: (usize, usize), wrapping: Wrapping, seed: u64) -> Wave {
    Wave::new(
        Arc::new(alternating_table()),
        Arc::new(FrequencySet::from_counts(&[1.0, 1.0])),
        size,
        wrapping,
        seed,
    )
}

/// Brute-force recount of one support counter from the possibility bits
///
/// The counter for `(x, y, pattern, dir)` tracks the patterns at the
/// `opposite(dir)` neighbor that still permit `pattern` here.
fn recount_support(
    wave: &Wave,
    table: &CompatibilityTable,
    x: usize,
    y: usize,
    pattern: usize,
    dir: Direction,
) -> Option<i32> {
    let (nx, ny) = wave.neighbor(x, y, dir.opposite())?;
    let count = table[pattern][dir.opposite()]
        .iter()
        .filter(|&&k| wave.allows(nx, ny, k))
        .count();
    Some(count as i32)
}

fn assert_supports_accurate(wave: &Wave, table: &CompatibilityTable) {
    let (width, height) = wave.size();
    for x in 0..width {
        for y in 0..height {
            for pattern in 0..wave.num_patterns() {
                if !wave.allows(x, y, pattern) {
                    continue;
                }
                for dir in Direction::ALL {
                    if let Some(expected) = recount_support(wave, table, x, y, pattern, dir) {
                        assert_eq!(
                            wave.support(x, y, pattern, dir),
                            expected,
                            "support mismatch at ({x}, {y}) pattern {pattern} dir {dir}"
                        );
                    }
                }
            }
        }
    }
}

fn assert_aggregates_accurate(wave: &Wave, weights: &FrequencySet) {
    let (width, height) = wave.size();
    for x in 0..width {
        for y in 0..height {
            let memo = wave.memo(x, y);
            let allowed = wave.allowed_at(x, y);

            let p_sum: f64 = allowed.iter().map(|&i| weights.frequency(i)).sum();
            let plogp_sum: f64 = allowed.iter().map(|&i| weights.plogp(i)).sum();

            assert_eq!(memo.remaining as usize, allowed.len());
            assert!((memo.p_sum - p_sum).abs() < 1e-9);
            assert!((memo.plogp_sum - plogp_sum).abs() < 1e-9);
        }
    }
}

#[test]
fn fresh_wave_has_full_supports_and_queue() {
    let wave = alternating_wave((4, 3), Wrapping::None, 1);
    let table = alternating_table();

    assert_eq!(wave.queue_len(), 12);
    assert!(!wave.has_contradiction());
    assert_supports_accurate(&wave, &table);

    // untouched counters hold the full compatibility size
    assert_eq!(wave.support(1, 1, 0, Direction::East), 1);
    assert_eq!(wave.support(1, 1, 1, Direction::North), 1);
}

#[test]
fn ban_updates_aggregates_and_is_idempotent() {
    let weights = FrequencySet::from_counts(&[1.0, 1.0]);
    let mut wave = alternating_wave((4, 4), Wrapping::None, 2);

    wave.ban(1, 1, 0);
    let memo_after_one = wave.memo(1, 1);
    assert_eq!(memo_after_one.remaining, 1);
    assert!(!wave.allows(1, 1, 0));

    // a second ban of the same pattern changes nothing
    wave.ban(1, 1, 0);
    assert_eq!(wave.memo(1, 1), memo_after_one);

    wave.propagate();
    assert_aggregates_accurate(&wave, &weights);
}

#[test]
fn propagation_restores_support_accuracy() {
    let table = alternating_table();
    let weights = FrequencySet::from_counts(&[1.0, 1.0]);
    let mut wave = alternating_wave((5, 4), Wrapping::None, 3);

    wave.collapse(2, 1, 0);
    wave.propagate();

    assert!(!wave.has_contradiction());
    assert_supports_accurate(&wave, &table);
    assert_aggregates_accurate(&wave, &weights);
}

#[test]
fn propagation_leaves_arc_consistent_state() {
    // even width: the horizontal alternation cycle must close on the torus
    let table = alternating_table();
    let mut wave = alternating_wave((6, 4), Wrapping::Both, 4);

    wave.collapse(2, 2, 1);
    wave.propagate();
    assert!(!wave.has_contradiction());

    let (width, height) = wave.size();
    for x in 0..width {
        for y in 0..height {
            for pattern in wave.allowed_at(x, y) {
                for dir in Direction::ALL {
                    let Some((nx, ny)) = wave.neighbor(x, y, dir) else {
                        continue;
                    };
                    let supported = table[pattern][dir]
                        .iter()
                        .any(|&k| wave.allows(nx, ny, k));
                    assert!(
                        supported,
                        "pattern {pattern} at ({x}, {y}) lost all {dir} neighbors"
                    );
                }
            }
        }
    }
}

#[test]
fn queue_holds_exactly_the_undecided_cells() {
    let mut wave = alternating_wave((4, 1), Wrapping::None, 5);

    wave.collapse(0, 0, 0);
    wave.propagate();

    // the whole row is forced by the alternation constraint
    assert!(!wave.has_contradiction());
    let (width, _) = wave.size();
    for x in 0..width {
        let undecided = wave.memo(x, 0).remaining >= 2;
        assert_eq!(wave.queue_contains(x, 0), undecided);
    }
    assert_eq!(wave.queue_len(), 0);
}

#[test]
fn odd_wrapped_cycle_contradicts_deterministically() {
    for seed in 0..8 {
        let mut wave = alternating_wave((3, 1), Wrapping::Horizontal, seed);
        wave.collapse(0, 0, 0);
        wave.propagate();
        assert!(wave.has_contradiction(), "seed {seed} escaped the odd cycle");
        assert_eq!(wave.pick_cell(), CellChoice::Contradiction);

        let mut scratch = Vec::new();
        assert_eq!(wave.observe_once(&mut scratch), Observation::Contradiction);
    }
}

#[test]
fn even_wrapped_cycle_solves_to_alternation() {
    let mut wave = alternating_wave((6, 1), Wrapping::Horizontal, 9);
    let mut scratch = Vec::new();

    loop {
        match wave.observe_once(&mut scratch) {
            Observation::Unfinished => {}
            Observation::Finished => break,
            Observation::Contradiction => panic!("even cycle must be satisfiable"),
        }
    }

    let ids = wave.probe_all();
    for x in 0..6 {
        assert_ne!(ids[[x, 0]], ids[[(x + 1) % 6, 0]]);
    }
}

#[test]
fn single_column_solves_without_wrapping() {
    let mut wave = alternating_wave((1, 5), Wrapping::None, 11);
    let mut scratch = Vec::new();

    loop {
        match wave.observe_once(&mut scratch) {
            Observation::Unfinished => {}
            Observation::Finished => break,
            Observation::Contradiction => panic!("vertical chain must be satisfiable"),
        }
    }

    // vertically the same pattern stacks
    let ids = wave.probe_all();
    for y in 1..5 {
        assert_eq!(ids[[0, y]], ids[[0, 0]]);
    }
}

#[test]
fn single_pattern_finishes_without_observations() {
    let table: CompatibilityTable = vec![ByDirection::nesw(vec![0], vec![0], vec![0], vec![0])];
    let mut wave = Wave::new(
        Arc::new(table),
        Arc::new(FrequencySet::from_counts(&[1.0])),
        (3, 3),
        Wrapping::Both,
        0,
    );

    assert_eq!(wave.queue_len(), 0);
    let mut scratch = Vec::new();
    assert_eq!(wave.observe_once(&mut scratch), Observation::Finished);
    assert!(wave.probe_all().iter().all(|&id| id == 0));
}

#[test]
fn reset_restores_the_initial_state() {
    let table = alternating_table();
    let mut wave = alternating_wave((4, 4), Wrapping::None, 13);

    wave.collapse(1, 1, 0);
    wave.propagate();
    wave.reset();

    assert!(!wave.has_contradiction());
    assert_eq!(wave.queue_len(), 16);
    let (width, height) = wave.size();
    for x in 0..width {
        for y in 0..height {
            assert_eq!(wave.allowed_at(x, y), vec![0, 1]);
            assert_eq!(wave.memo(x, y).remaining, 2);
            assert!(wave.queue_contains(x, y));
        }
    }
    assert_supports_accurate(&wave, &table);

    // a reset wave solves like a fresh one
    let mut scratch = Vec::new();
    loop {
        match wave.observe_once(&mut scratch) {
            Observation::Unfinished => {}
            Observation::Finished => break,
            Observation::Contradiction => panic!("alternation without wrapping is satisfiable"),
        }
    }
}

#[test]
fn sampling_only_returns_surviving_patterns() {
    let mut wave = alternating_wave((2, 2), Wrapping::None, 17);
    let mut scratch = Vec::new();

    wave.ban(0, 0, 0);
    wave.propagate();
    for _ in 0..32 {
        assert_eq!(wave.sample_pattern_at(0, 0, &mut scratch), 1);
    }
}

#[test]
fn entropy_queue_orders_and_rekeys() {
    let mut queue = EntropyQueue::with_capacity(8);
    queue.push(3, 0.9);
    queue.push(1, 0.5);
    queue.push(6, 0.7);
    assert_eq!(queue.peek(), Some(1));
    assert_eq!(queue.len(), 3);

    // keys only decrease over a run
    queue.update(6, 0.1);
    assert_eq!(queue.peek(), Some(6));

    queue.remove(6);
    assert_eq!(queue.peek(), Some(1));
    assert!(!queue.contains(6));

    // removing an absent cell is a no-op
    queue.remove(6);
    assert_eq!(queue.len(), 2);

    queue.remove(1);
    queue.remove(3);
    assert!(queue.is_empty());
}

#[test]
fn entropy_queue_breaks_ties_by_flat_index() {
    let mut queue = EntropyQueue::with_capacity(8);
    queue.push(5, 0.25);
    queue.push(2, 0.25);
    queue.push(7, 0.25);
    assert_eq!(queue.peek(), Some(2));
    queue.remove(2);
    assert_eq!(queue.peek(), Some(5));
    queue.remove(5);
    assert_eq!(queue.peek(), Some(7));
}

#[test]
fn placement_bitset_tracks_possibilities() {
    let mut bits = PlacementBitset::new_all_allowed(4, 3);
    assert_eq!(bits.count_allowed(2), 3);
    assert_eq!(bits.first_allowed(2), Some(0));

    assert!(bits.forbid(2, 0));
    assert!(!bits.forbid(2, 0));
    assert_eq!(bits.count_allowed(2), 2);
    assert_eq!(bits.first_allowed(2), Some(1));
    assert_eq!(bits.allowed_at(2), vec![1, 2]);

    // neighboring cells are untouched
    assert_eq!(bits.count_allowed(1), 3);
    assert_eq!(bits.count_allowed(3), 3);

    bits.allow_all();
    assert_eq!(bits.count_allowed(2), 3);
}
