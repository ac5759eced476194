//! The wave: solver state, observation, and constraint propagation
//!
//! A wave tracks, for every cell of the output grid, which patterns can
//! still be placed there. Observation commits the lowest-entropy cell to one
//! pattern sampled from the surviving distribution; propagation then cascades
//! the implied bans through per-(cell, pattern, direction) support counters
//! until the state is arc-consistent again.

use std::sync::Arc;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::algorithm::bitset::PlacementBitset;
use crate::algorithm::entropy::{EntropyMemo, EntropyQueue};
use crate::analysis::catalog::FrequencySet;
use crate::math::approx::approximate_ln;
use crate::spatial::direction::{ByDirection, Direction};
use crate::spatial::wrapping::Wrapping;

/// `table[pattern][direction]` lists, in ascending order, the patterns that
/// may lie immediately adjacent in that direction
pub type CompatibilityTable = Vec<ByDirection<Vec<usize>>>;

/// Outcome of a single observe/propagate step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// A cell was committed; undecided cells remain
    Unfinished,
    /// Every cell is decided
    Finished,
    /// Some cell has no surviving pattern
    Contradiction,
}

/// Outcome of querying for the next cell to observe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellChoice {
    /// Flat index of the minimum-entropy undecided cell
    Chosen(usize),
    /// No undecided cells remain
    Finished,
    /// The wave already recorded a contradiction
    Contradiction,
}

/// Solver state over one output grid
///
/// The catalog weights and the compatibility table are shared read-only
/// between every wave built from the same model; all mutable state is owned
/// exclusively by the wave.
pub struct Wave {
    rng: StdRng,
    width: usize,
    height: usize,
    wrapping: Wrapping,
    noise_max: f64,
    contradiction: bool,
    compatibility: Arc<CompatibilityTable>,
    weights: Arc<FrequencySet>,
    initial_memo: EntropyMemo,
    memos: Vec<EntropyMemo>,
    allowed: PlacementBitset,
    supports: Vec<ByDirection<i32>>,
    propagation_queue: Vec<(u32, u32, u32)>,
    entropy_queue: EntropyQueue,
    pending_memo_updates: Vec<usize>,
}

impl Wave {
    /// Build a fresh wave with every pattern allowed everywhere
    pub fn new(
        compatibility: Arc<CompatibilityTable>,
        weights: Arc<FrequencySet>,
        size: (usize, usize),
        wrapping: Wrapping,
        seed: u64,
    ) -> Self {
        let (width, height) = size;
        let cells = width * height;
        let num_patterns = weights.len();

        let mut noise_max = f64::MAX;
        let mut base_plogp = 0.0;
        for &plogp in weights.plogps() {
            noise_max = noise_max.min(plogp.abs());
            base_plogp += plogp;
        }
        noise_max *= 0.5;

        // frequencies are normalized, so ln(p_sum) starts at zero and the
        // initial entropy collapses to the negated plogp sum
        let initial_memo = EntropyMemo {
            plogp_sum: base_plogp,
            p_sum: 1.0,
            remaining: num_patterns as u32,
            entropy: -base_plogp,
            needs_update: false,
        };

        let mut wave = Self {
            rng: StdRng::seed_from_u64(seed),
            width,
            height,
            wrapping,
            noise_max,
            contradiction: false,
            supports: initial_supports(&compatibility, cells),
            compatibility,
            weights,
            initial_memo,
            memos: vec![initial_memo; cells],
            allowed: PlacementBitset::new_all_allowed(cells, num_patterns),
            propagation_queue: Vec::new(),
            entropy_queue: EntropyQueue::with_capacity(cells),
            pending_memo_updates: Vec::new(),
        };
        wave.seed_noise_and_queue();
        wave
    }

    /// Return a terminal wave to the fresh state
    ///
    /// All possibility bits come back, supports are rebuilt, and noise is
    /// redrawn from the wave's own RNG, which is reused rather than reseeded.
    pub fn reset(&mut self) {
        let cells = self.width * self.height;
        self.contradiction = false;
        self.allowed.allow_all();
        self.supports = initial_supports(&self.compatibility, cells);
        self.memos.fill(self.initial_memo);
        self.propagation_queue.clear();
        self.pending_memo_updates.clear();
        self.entropy_queue.clear();
        self.seed_noise_and_queue();
    }

    fn seed_noise_and_queue(&mut self) {
        for memo in &mut self.memos {
            memo.entropy += self.rng.random::<f64>() * self.noise_max;
        }
        // decided-from-birth cells (single-pattern catalogs) never queue
        if self.initial_memo.remaining >= 2 {
            for cell in 0..self.memos.len() {
                self.entropy_queue.push(cell, self.memos[cell].entropy);
            }
        }
    }

    /// Grid dimensions `(width, height)`
    pub const fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of patterns in the catalog
    pub fn num_patterns(&self) -> usize {
        self.weights.len()
    }

    /// Flat index of `(x, y)`
    pub const fn flat_index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// Coordinates of a flat index
    pub const fn coords(&self, cell: usize) -> (usize, usize) {
        (cell / self.height, cell % self.height)
    }

    /// Whether `pattern` can still be placed at `(x, y)`
    pub fn allows(&self, x: usize, y: usize, pattern: usize) -> bool {
        self.allowed.allows(self.flat_index(x, y), pattern)
    }

    /// Ids of the patterns still possible at `(x, y)`, ascending
    pub fn allowed_at(&self, x: usize, y: usize) -> Vec<usize> {
        self.allowed.allowed_at(self.flat_index(x, y))
    }

    /// Support counter for `(x, y, pattern)` from direction `dir`
    pub fn support(&self, x: usize, y: usize, pattern: usize, dir: Direction) -> i32 {
        self.supports[self.flat_index(x, y) * self.num_patterns() + pattern][dir]
    }

    /// Memoized entropy aggregates of a cell
    pub fn memo(&self, x: usize, y: usize) -> EntropyMemo {
        self.memos[self.flat_index(x, y)]
    }

    /// Whether any cell has run out of patterns
    pub const fn has_contradiction(&self) -> bool {
        self.contradiction
    }

    /// Whether `(x, y)` currently sits in the entropy queue
    pub fn queue_contains(&self, x: usize, y: usize) -> bool {
        self.entropy_queue.contains(self.flat_index(x, y))
    }

    /// Number of cells in the entropy queue
    pub fn queue_len(&self) -> usize {
        self.entropy_queue.len()
    }

    /// One observation step: pick, sample, commit, propagate
    ///
    /// `scratch` is a caller-provided cumulative-sum buffer, reused across
    /// steps to keep the hot loop allocation-free.
    pub fn observe_once(&mut self, scratch: &mut Vec<f64>) -> Observation {
        let cell = match self.pick_cell() {
            CellChoice::Contradiction => return Observation::Contradiction,
            CellChoice::Finished => return Observation::Finished,
            CellChoice::Chosen(cell) => cell,
        };

        let (x, y) = self.coords(cell);
        let pattern = self.sample_pattern_at(x, y, scratch);
        log::trace!("observed ({x}, {y}) as pattern {pattern}");

        self.collapse(x, y, pattern);
        self.propagate();

        Observation::Unfinished
    }

    /// The minimum-entropy cell among those still undecided
    ///
    /// Ties on entropy are already broken by per-cell noise; exact ties fall
    /// back to the flat index, so the choice is deterministic in the seed.
    pub fn pick_cell(&self) -> CellChoice {
        if self.contradiction {
            return CellChoice::Contradiction;
        }
        match self.entropy_queue.peek() {
            None => CellChoice::Finished,
            Some(cell) => CellChoice::Chosen(cell),
        }
    }

    /// Sample a surviving pattern at `(x, y)` by catalog frequency
    ///
    /// Builds the cumulative distribution over all patterns (banned ones
    /// contribute nothing) and draws uniformly from it. The final index is
    /// clamped as a fallback against floating-point underflow.
    pub fn sample_pattern_at(&mut self, x: usize, y: usize, cdf: &mut Vec<f64>) -> usize {
        let cell = self.flat_index(x, y);
        let num_patterns = self.num_patterns();

        cdf.clear();
        let mut total = 0.0;
        for pattern in 0..num_patterns {
            if self.allowed.allows(cell, pattern) {
                total += self.weights.frequency(pattern);
            }
            cdf.push(total);
        }

        let draw = self.rng.random::<f64>() * total;
        let pattern = cdf.partition_point(|&bound| bound <= draw);
        pattern.min(num_patterns - 1)
    }

    /// Commit `(x, y)` to `keep` by banning every other surviving pattern
    ///
    /// The cell leaves the entropy queue immediately; its memo ends up
    /// holding the degenerate sums of the single kept pattern.
    pub fn collapse(&mut self, x: usize, y: usize, keep: usize) {
        for pattern in 0..self.num_patterns() {
            if pattern != keep {
                self.ban(x, y, pattern);
            }
        }
        self.entropy_queue.remove(self.flat_index(x, y));
    }

    /// Ban one pattern at one cell
    ///
    /// Idempotent: banning an already-banned pattern changes nothing. The
    /// cell's entropy memo is marked dirty and refreshed in the flush that
    /// follows propagation.
    pub fn ban(&mut self, x: usize, y: usize, pattern: usize) {
        let cell = self.flat_index(x, y);
        let num_patterns = self.num_patterns();
        if !self.allowed.forbid(cell, pattern) {
            return;
        }

        // zeroed counters are the banned sentinel; later decrements push
        // them negative without retriggering
        self.supports[cell * num_patterns + pattern] = ByDirection::default();
        self.propagation_queue
            .push((x as u32, y as u32, pattern as u32));

        let plogp = self.weights.plogp(pattern);
        let frequency = self.weights.frequency(pattern);
        let memo = &mut self.memos[cell];
        memo.plogp_sum -= plogp;
        memo.p_sum -= frequency;
        memo.remaining -= 1;
        if memo.remaining == 0 {
            self.contradiction = true;
        }
        memo.needs_update = true;
        self.pending_memo_updates.push(cell);
    }

    /// Cascade queued bans until the wave is arc-consistent again
    ///
    /// Even after a contradiction the cascade is allowed to finish, so the
    /// caller always sees one consistent terminal state.
    pub fn propagate(&mut self) {
        let compatibility = Arc::clone(&self.compatibility);
        let num_patterns = self.num_patterns();

        while let Some((x, y, pattern)) = self.propagation_queue.pop() {
            for dir in Direction::ALL {
                let Some((nx, ny)) = self.neighbor(x as usize, y as usize, dir) else {
                    continue;
                };
                let neighbor_cell = self.flat_index(nx, ny);

                for &supported in &compatibility[pattern as usize][dir] {
                    let counter = &mut self.supports[neighbor_cell * num_patterns + supported][dir];
                    *counter -= 1;
                    if *counter == 0 {
                        self.ban(nx, ny, supported);
                    }
                }
            }
        }

        self.flush_memo_updates();
    }

    /// Refresh dirty entropy memos and re-key the entropy queue
    fn flush_memo_updates(&mut self) {
        while let Some(cell) = self.pending_memo_updates.pop() {
            if !self.memos[cell].needs_update {
                continue;
            }
            self.memos[cell].needs_update = false;

            let memo = self.memos[cell];
            if memo.remaining == 0 {
                self.contradiction = true;
            }

            if memo.remaining <= 1 {
                self.entropy_queue.remove(cell);
            } else {
                let entropy = approximate_ln(memo.p_sum) - memo.plogp_sum / memo.p_sum
                    + self.rng.random::<f64>() * self.noise_max;
                self.memos[cell].entropy = entropy;
                self.entropy_queue.update(cell, entropy);
            }
        }
    }

    /// The neighbor of `(x, y)` one step along `dir` under the wrapping rule
    pub fn neighbor(&self, x: usize, y: usize, dir: Direction) -> Option<(usize, usize)> {
        let (dx, dy) = dir.offset();
        let mut nx = x as i32 + dx;
        let mut ny = y as i32 + dy;

        if self.wrapping.horizontal() {
            nx = nx.rem_euclid(self.width as i32);
        } else if nx < 0 || nx >= self.width as i32 {
            return None;
        }

        if self.wrapping.vertical() {
            ny = ny.rem_euclid(self.height as i32);
        } else if ny < 0 || ny >= self.height as i32 {
            return None;
        }

        Some((nx as usize, ny as usize))
    }

    /// The unique surviving pattern at `(x, y)` after completion
    ///
    /// Falls back to pattern 0 if the wave is garbage.
    pub fn probe(&self, x: usize, y: usize) -> usize {
        self.allowed
            .first_allowed(self.flat_index(x, y))
            .unwrap_or(0)
    }

    /// Probe a rectangular sub-region into a grid of pattern ids
    pub fn probe_sub(&self, start: (usize, usize), size: (usize, usize)) -> Array2<usize> {
        Array2::from_shape_fn(size, |(x, y)| self.probe(start.0 + x, start.1 + y))
    }

    /// Probe every cell into a grid of pattern ids
    pub fn probe_all(&self) -> Array2<usize> {
        self.probe_sub((0, 0), (self.width, self.height))
    }
}

/// Initial support counters: each pattern at each cell is supported from
/// direction `d` by everything compatible with it on its `opposite(d)` side
fn initial_supports(compatibility: &CompatibilityTable, cells: usize) -> Vec<ByDirection<i32>> {
    let per_cell: Vec<ByDirection<i32>> = compatibility
        .iter()
        .map(|sides| ByDirection::from_fn(|dir| sides[dir.opposite()].len() as i32))
        .collect();

    let mut supports = Vec::with_capacity(cells * per_cell.len());
    for _ in 0..cells {
        supports.extend_from_slice(&per_cell);
    }
    supports
}
