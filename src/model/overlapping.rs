//! Overlapping model: patterns learned from an exemplar image
//!
//! Every `S×S` window of the exemplar (and, optionally, its symmetry
//! images) becomes a pattern; two patterns may abut when they agree on their
//! overlap. The solved wave is decoded by stamping each committed pattern's
//! stride-sized block, with seam fill-in along non-wrapping edges.

use ndarray::Array2;

use crate::algorithm::executor::WaveExecutor;
use crate::algorithm::wave::CompatibilityTable;
use crate::analysis::catalog::PatternCatalog;
use crate::analysis::overlap::{compatibilities, gather_patterns};
use crate::io::configuration::{DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, DEFAULT_SEED};
use crate::io::error::{invalid_parameter, Result};
use crate::model::{ensure_every_side_supported, ensure_support_budget};
use crate::spatial::symmetry::SymmetrySet;
use crate::spatial::wrapping::Wrapping;

/// Options for the overlapping model
#[derive(Clone, Copy, Debug)]
pub struct OverlappingOptions {
    /// Whether the exemplar wraps when windows are extracted
    pub input_wrapping: Wrapping,
    /// Whether the output grid wraps during propagation
    pub output_wrapping: Wrapping,
    /// Which symmetry images of each window join the catalog
    pub symmetries: SymmetrySet,
    /// Side length of extracted windows; patterns are square
    pub pattern_size: usize,
    /// Cell dimensions of the decoded output
    pub output_size: (usize, usize),
    /// Give every distinct pattern the same weight
    pub equal_frequencies: bool,
    /// Spacing of wave cells in output cells
    ///
    /// `(1, 1)` is the densest sampling; larger strides speed up observation
    /// but may produce more artifacts.
    pub stride: (usize, usize),
    /// Master RNG seed
    pub seed: u64,
}

impl Default for OverlappingOptions {
    fn default() -> Self {
        Self {
            input_wrapping: Wrapping::None,
            output_wrapping: Wrapping::None,
            symmetries: SymmetrySet::NONE,
            pattern_size: DEFAULT_PATTERN_SIZE,
            output_size: DEFAULT_OUTPUT_SIZE,
            equal_frequencies: false,
            stride: (1, 1),
            seed: DEFAULT_SEED,
        }
    }
}

const fn ceil_to_multiple(value: i64, multiple: i64) -> i64 {
    (value - 1).div_euclid(multiple) * multiple + multiple
}

impl OverlappingOptions {
    /// Wave dimensions before dividing by the stride
    fn unstrided_wave_size(&self) -> (i64, i64) {
        let (out_w, out_h) = (self.output_size.0 as i64, self.output_size.1 as i64);
        let pattern = self.pattern_size as i64;

        let width = if self.output_wrapping.horizontal() {
            out_w
        } else {
            out_w - pattern + self.stride.0 as i64
        };
        let height = if self.output_wrapping.vertical() {
            out_h
        } else {
            out_h - pattern + self.stride.1 as i64
        };

        (width, height)
    }

    /// Wave grid dimensions implied by the output size, stride, and wrapping
    pub fn wave_size(&self) -> (usize, usize) {
        let (width, height) = self.unstrided_wave_size();
        (
            (width / self.stride.0 as i64) as usize,
            (height / self.stride.1 as i64) as usize,
        )
    }

    /// Whether the output size is reachable with this stride and wrapping
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check every option, reporting the first offender
    ///
    /// # Errors
    ///
    /// Returns an `InvalidParameter` error describing the failing option.
    pub fn validate(&self) -> Result<()> {
        if self.pattern_size < 2 {
            return Err(invalid_parameter(
                "pattern_size",
                &self.pattern_size,
                &"must be at least 2",
            ));
        }
        if self.stride.0 < 1 || self.stride.1 < 1 {
            return Err(invalid_parameter(
                "stride",
                &format!("{:?}", self.stride),
                &"both components must be at least 1",
            ));
        }
        if self.stride.0 > self.pattern_size || self.stride.1 > self.pattern_size {
            return Err(invalid_parameter(
                "stride",
                &format!("{:?}", self.stride),
                &"stride beyond the pattern size would leave unconstrained gaps",
            ));
        }

        let (width, height) = self.unstrided_wave_size();
        if width <= 0 || height <= 0 {
            return Err(invalid_parameter(
                "output_size",
                &format!("{:?}", self.output_size),
                &"output is smaller than a single pattern",
            ));
        }
        if width % self.stride.0 as i64 != 0 || height % self.stride.1 as i64 != 0 {
            return Err(invalid_parameter(
                "output_size",
                &format!("{:?}", self.output_size),
                &format!(
                    "dimensions must divide exactly by the stride {:?} under the given wrapping",
                    self.stride
                ),
            ));
        }

        Ok(())
    }

    /// Round the output size up to the nearest valid size covering `size`
    pub fn set_output_size_at_least(&mut self, size: (usize, usize)) {
        let stride = (self.stride.0 as i64, self.stride.1 as i64);
        let pattern = self.pattern_size as i64;

        let dw = if self.output_wrapping.horizontal() {
            0
        } else {
            stride.0 - pattern
        };
        let dh = if self.output_wrapping.vertical() {
            0
        } else {
            stride.1 - pattern
        };

        self.output_size = (
            (ceil_to_multiple(size.0 as i64, stride.0) - dw) as usize,
            (ceil_to_multiple(size.1 as i64, stride.1) - dh) as usize,
        );
    }

    /// Builder-style output size
    #[must_use]
    pub const fn with_output_size(mut self, size: (usize, usize)) -> Self {
        self.output_size = size;
        self
    }

    /// Builder-style input wrapping
    #[must_use]
    pub const fn with_input_wrapping(mut self, wrapping: Wrapping) -> Self {
        self.input_wrapping = wrapping;
        self
    }

    /// Builder-style output wrapping
    #[must_use]
    pub const fn with_output_wrapping(mut self, wrapping: Wrapping) -> Self {
        self.output_wrapping = wrapping;
        self
    }

    /// Builder-style symmetry set
    #[must_use]
    pub const fn with_symmetries(mut self, symmetries: SymmetrySet) -> Self {
        self.symmetries = symmetries;
        self
    }

    /// Builder-style pattern size
    #[must_use]
    pub const fn with_pattern_size(mut self, pattern_size: usize) -> Self {
        self.pattern_size = pattern_size;
        self
    }

    /// Builder-style stride
    #[must_use]
    pub const fn with_stride(mut self, stride: (usize, usize)) -> Self {
        self.stride = stride;
        self
    }

    /// Builder-style equal-frequency flag
    #[must_use]
    pub const fn with_equal_frequencies(mut self, equal: bool) -> Self {
        self.equal_frequencies = equal;
        self
    }

    /// Builder-style seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Overlapping-window model over an exemplar grid
pub struct Overlapping<C> {
    catalog: PatternCatalog<C>,
    executor: WaveExecutor,
    options: OverlappingOptions,
}

impl<C: Copy + Ord + Send + Sync> Overlapping<C> {
    /// Learn patterns and adjacency from the exemplar and build the model
    ///
    /// # Errors
    ///
    /// Returns an error when the options are inconsistent, the exemplar
    /// yields no patterns, some pattern has an open side, or the wave would
    /// exceed the support-table budget.
    pub fn new(exemplar: &Array2<C>, options: OverlappingOptions) -> Result<Self> {
        options.validate()?;

        let catalog = gather_patterns(
            exemplar,
            options.pattern_size,
            options.input_wrapping,
            options.symmetries,
            options.equal_frequencies,
        )?;
        log::info!("gathered {} patterns", catalog.len());

        let table = compatibilities(catalog.elements(), options.stride);
        ensure_every_side_supported(&table)?;

        let wave_size = options.wave_size();
        ensure_support_budget(wave_size, catalog.len())?;

        let executor = WaveExecutor::new(
            table,
            catalog.weights().clone(),
            wave_size,
            options.output_wrapping,
            options.seed,
        );

        Ok(Self {
            catalog,
            executor,
            options,
        })
    }

    /// The options the model was built with
    pub const fn options(&self) -> &OverlappingOptions {
        &self.options
    }

    /// The learned pattern catalog
    pub const fn catalog(&self) -> &PatternCatalog<C> {
        &self.catalog
    }

    /// The adjacency table shared by every run
    pub fn compatibility(&self) -> &CompatibilityTable {
        self.executor.compatibility()
    }

    /// Run one wave with a fresh child seed drawn from the master RNG
    pub fn next(&mut self) -> Option<Array2<C>> {
        let seed = self.executor.next_seed();
        self.next_seeded(seed)
    }

    /// Run one wave with an explicit seed; the master RNG is untouched
    pub fn next_seeded(&self, seed: u64) -> Option<Array2<C>> {
        self.executor.solve(seed).map(|ids| self.decode(&ids))
    }

    /// Run `tries` waves concurrently and decode the successes
    pub fn next_parallel(&mut self, tries: usize) -> Vec<Array2<C>> {
        self.executor
            .solve_parallel(tries)
            .into_iter()
            .map(|ids| self.decode(&ids))
            .collect()
    }

    /// Expand a solved wave into the output grid
    ///
    /// Each wave cell stamps its pattern's top-left `sx×sy` block. On
    /// non-wrapping axes the trailing `S − stride` ring is recovered from
    /// the last column/row of committed patterns, and the corner from the
    /// corner cell.
    fn decode(&self, ids: &Array2<usize>) -> Array2<C> {
        let (wave_w, wave_h) = ids.dim();
        let (sx, sy) = self.options.stride;
        let pattern_size = self.options.pattern_size;

        let fill = *self.catalog.element(0).get(0, 0);
        let mut out = Array2::from_elem(self.options.output_size, fill);

        for x in 0..wave_w {
            for y in 0..wave_h {
                let pattern = self.catalog.element(ids[[x, y]]);
                for xx in 0..sx {
                    for yy in 0..sy {
                        out[[x * sx + xx, y * sy + yy]] = *pattern.get(xx, yy);
                    }
                }
            }
        }

        if !self.options.output_wrapping.horizontal() {
            for dx in sx..pattern_size {
                for y in 0..wave_h {
                    let pattern = self.catalog.element(ids[[wave_w - 1, y]]);
                    for yy in 0..sy {
                        out[[wave_w * sx + dx - sx, y * sy + yy]] = *pattern.get(dx, yy);
                    }
                }
            }
        }

        if !self.options.output_wrapping.vertical() {
            for x in 0..wave_w {
                let pattern = self.catalog.element(ids[[x, wave_h - 1]]);
                for dy in sy..pattern_size {
                    for xx in 0..sx {
                        out[[x * sx + xx, wave_h * sy + dy - sy]] = *pattern.get(xx, dy);
                    }
                }
            }
        }

        if self.options.output_wrapping == Wrapping::None {
            let pattern = self.catalog.element(ids[[wave_w - 1, wave_h - 1]]);
            for dx in sx..pattern_size {
                for dy in sy..pattern_size {
                    out[[wave_w * sx + dx - sx, wave_h * sy + dy - sy]] = *pattern.get(dx, dy);
                }
            }
        }

        out
    }
}
