//! Run loop driving waves from observation to a terminal state
//!
//! The executor owns the model's master RNG and the shared solver inputs.
//! Each run gets a child seed drawn from the master generator, so a fixed
//! model seed yields a reproducible sequence of runs, sequential or not.

use std::sync::Arc;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithm::wave::{CompatibilityTable, Observation, Wave};
use crate::analysis::catalog::FrequencySet;
use crate::spatial::wrapping::Wrapping;

/// Shared solver inputs plus the master RNG for one model
pub struct WaveExecutor {
    compatibility: Arc<CompatibilityTable>,
    weights: Arc<FrequencySet>,
    wave_size: (usize, usize),
    wrapping: Wrapping,
    rng: StdRng,
}

impl WaveExecutor {
    /// Bundle the immutable solver inputs and seed the master RNG
    pub fn new(
        compatibility: CompatibilityTable,
        weights: FrequencySet,
        wave_size: (usize, usize),
        wrapping: Wrapping,
        seed: u64,
    ) -> Self {
        Self {
            compatibility: Arc::new(compatibility),
            weights: Arc::new(weights),
            wave_size,
            wrapping,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The shared adjacency table
    pub fn compatibility(&self) -> &CompatibilityTable {
        &self.compatibility
    }

    /// Wave grid dimensions
    pub const fn wave_size(&self) -> (usize, usize) {
        self.wave_size
    }

    /// Wrapping mode applied during propagation
    pub const fn wrapping(&self) -> Wrapping {
        self.wrapping
    }

    /// Draw the next child seed, advancing the master RNG once
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }

    /// Build a fresh wave for the given child seed
    pub fn spawn_wave(&self, seed: u64) -> Wave {
        Wave::new(
            Arc::clone(&self.compatibility),
            Arc::clone(&self.weights),
            self.wave_size,
            self.wrapping,
            seed,
        )
    }

    /// Run one wave to a terminal state
    ///
    /// Returns the grid of committed pattern ids, or `None` when the run hit
    /// a contradiction. A contradiction is an expected outcome; callers
    /// typically retry with a fresh seed.
    pub fn solve(&self, seed: u64) -> Option<Array2<usize>> {
        let mut wave = self.spawn_wave(seed);
        let mut scratch = Vec::with_capacity(self.weights.len());

        loop {
            match wave.observe_once(&mut scratch) {
                Observation::Unfinished => {}
                Observation::Finished => return Some(wave.probe_all()),
                Observation::Contradiction => {
                    log::debug!("wave run hit a contradiction (seed {seed})");
                    return None;
                }
            }
        }
    }

    /// Run `tries` independent waves concurrently, keeping the successes
    ///
    /// Child seeds are drawn from the master RNG up front, in the same order
    /// sequential runs would draw them, so the multiset of outputs matches a
    /// sequential sweep over the same seeds. May return fewer than `tries`
    /// results.
    pub fn solve_parallel(&mut self, tries: usize) -> Vec<Array2<usize>> {
        let seeds: Vec<u64> = (0..tries).map(|_| self.rng.random()).collect();
        let shared = &*self;

        std::thread::scope(|scope| {
            let handles: Vec<_> = seeds
                .iter()
                .map(|&seed| scope.spawn(move || shared.solve(seed)))
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok().flatten())
                .collect()
        })
    }
}
