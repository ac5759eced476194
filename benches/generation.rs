//! Performance measurement for full wave runs at varying output sizes

// Criterion macros generate undocumented functions
#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;

use wavetile::model::overlapping::{Overlapping, OverlappingOptions};
use wavetile::model::tiled::{SideLabels, TileSet, Tiled, TiledOptions};
use wavetile::spatial::direction::ByDirection;
use wavetile::spatial::grid::SquareGrid;
use wavetile::spatial::symmetry::SymmetrySet;
use wavetile::spatial::wrapping::Wrapping;

/// Striped exemplar with a handful of colors; wrapping keeps it seamless
fn striped_exemplar() -> Array2<u8> {
    Array2::from_shape_fn((6, 6), |(x, y)| ((x + 2 * y) % 3) as u8)
}

/// Measures observation and propagation cost as the output grows
fn bench_overlapping_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlapping_solve");

    // multiples of the stripe period keep the toroidal runs satisfiable
    for size in &[15usize, 30, 45] {
        let options = OverlappingOptions::default()
            .with_pattern_size(3)
            .with_input_wrapping(Wrapping::Both)
            .with_output_wrapping(Wrapping::Both)
            .with_output_size((*size, *size))
            .with_seed(7);

        let Ok(model) = Overlapping::new(&striped_exemplar(), options) else {
            group.finish();
            return;
        };

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            let mut seed = 0u64;
            b.iter(|| {
                seed = seed.wrapping_add(1);
                black_box(model.next_seeded(black_box(seed)))
            });
        });
    }

    group.finish();
}

/// Measures the tiled pipeline on a forced periodic configuration
fn bench_tiled_solve(c: &mut Criterion) {
    let mut tiles = TileSet::new();
    for i in 0..4u8 {
        let sides = ByDirection::nesw(
            SideLabels::uniform(10 + i32::from(i)),
            SideLabels::uniform(1 + i32::from(i)),
            SideLabels::uniform(10 + i32::from(i)),
            SideLabels::uniform(1 + i32::from((i + 3) % 4)),
        );
        if tiles
            .add_filtered(
                SquareGrid::filled(1, i),
                sides,
                SymmetrySet::NONE,
                1.0,
                SymmetrySet::NONE,
            )
            .is_err()
        {
            return;
        }
    }

    let options = TiledOptions {
        output_size: (32, 32),
        output_wrapping: Wrapping::Both,
        seed: 7,
    };
    let Ok(model) = Tiled::new(&tiles, options) else {
        return;
    };

    c.bench_function("tiled_solve_32", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(model.next_seeded(black_box(seed)))
        });
    });
}

criterion_group!(benches, bench_overlapping_solve, bench_tiled_solve);
criterion_main!(benches);
