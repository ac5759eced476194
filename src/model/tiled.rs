//! Tiled model: explicit tile sets with labeled sides
//!
//! Each tile carries a square bitmap, a per-side pair of edge labels, its
//! own symmetry closure, and a weight. The distinct symmetry images of every
//! tile become the solver's patterns; two oriented images may abut when
//! their facing edge labels agree and the pair is not explicitly forbidden.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use ndarray::Array2;

use crate::algorithm::executor::WaveExecutor;
use crate::algorithm::wave::CompatibilityTable;
use crate::analysis::catalog::PatternCatalog;
use crate::io::configuration::{DEFAULT_OUTPUT_SIZE, DEFAULT_SEED};
use crate::io::error::{invalid_parameter, GenerationError, Result};
use crate::model::{ensure_every_side_supported, ensure_support_budget};
use crate::spatial::direction::{ByDirection, Direction};
use crate::spatial::grid::SquareGrid;
use crate::spatial::symmetry::{Symmetry, SymmetrySet};
use crate::spatial::wrapping::Wrapping;

/// Index of a tile within its tile set
pub type TileId = usize;

/// Integer tag naming the connection class of one tile edge
pub type SideLabel = i32;

/// Edge labels for one tile side, read in both directions
///
/// Two abutting sides meet back-to-back, so one of them is always read
/// mirrored; sides whose decoration is symmetric use the same label twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SideLabels {
    /// Label of the side read in its native orientation
    pub normal: SideLabel,
    /// Label of the side read end-to-start
    pub reversed: SideLabel,
}

impl SideLabels {
    /// Distinct labels for the two reading directions
    pub const fn new(normal: SideLabel, reversed: SideLabel) -> Self {
        Self { normal, reversed }
    }

    /// The same label regardless of reading direction
    pub const fn uniform(label: SideLabel) -> Self {
        Self {
            normal: label,
            reversed: label,
        }
    }

    /// The label seen when the side is read mirrored or not
    pub const fn read(self, mirrored: bool) -> SideLabel {
        if mirrored {
            self.reversed
        } else {
            self.normal
        }
    }
}

/// One registered tile with its pre-rendered distinct images
#[derive(Clone, Debug)]
pub struct Tile<C> {
    id: TileId,
    images: Vec<SquareGrid<C>>,
    orientations: Vec<Symmetry>,
    connectivity: ByDirection<SideLabels>,
    symmetries: SymmetrySet,
    allowed_images: SymmetrySet,
    weight: f64,
}

impl<C: Clone> Tile<C> {
    fn new(
        id: TileId,
        base: SquareGrid<C>,
        connectivity: ByDirection<SideLabels>,
        symmetries: SymmetrySet,
        weight: f64,
        allowed_images: SymmetrySet,
    ) -> Self {
        // only the symmetries missing from the tile's own closure yield
        // genuinely distinct images
        let mut images = Vec::new();
        let mut orientations = Vec::new();
        images.push(base.clone());
        orientations.push(Symmetry::Rotation0);

        for symmetry in symmetries.missing().iter() {
            if allowed_images.contains(symmetry) {
                images.push(base.transformed(symmetry));
                orientations.push(symmetry);
            }
        }

        Self {
            id,
            images,
            orientations,
            connectivity,
            symmetries,
            allowed_images,
            weight,
        }
    }

    /// Id of the tile within its set
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Relative weight shared by all of the tile's images
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// The tile's own symmetry closure
    pub const fn symmetries(&self) -> SymmetrySet {
        self.symmetries
    }

    /// Number of distinct pre-rendered images
    pub fn num_images(&self) -> usize {
        self.images.len()
    }

    /// Pre-rendered image `i`; image 0 is the base bitmap
    pub fn image(&self, i: usize) -> &SquareGrid<C> {
        &self.images[i]
    }

    /// The symmetry that produced image `i`
    pub fn orientation(&self, i: usize) -> Symmetry {
        self.orientations[i]
    }

    /// Edge labels of the base bitmap
    pub const fn connectivity(&self) -> &ByDirection<SideLabels> {
        &self.connectivity
    }

    /// Label of the side facing `dir` once the tile is transformed
    ///
    /// `mirrored` selects the end-to-start reading; a reflecting orientation
    /// flips the reading direction once more.
    pub fn side_label(&self, dir: Direction, orientation: Symmetry, mirrored: bool) -> SideLabel {
        let source = orientation.source_side(dir);
        let read_mirrored = mirrored != orientation.is_reflection();
        self.connectivity[source].read(read_mirrored)
    }
}

/// A collection of tiles plus explicit abutment exclusions
#[derive(Clone, Debug, Default)]
pub struct TileSet<C> {
    tiles: Vec<Tile<C>>,
    tile_side: usize,
    incompatible: HashSet<(TileId, TileId, SideLabel)>,
}

impl<C: Clone> TileSet<C> {
    /// An empty tile set
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            tile_side: 0,
            incompatible: HashSet::new(),
        }
    }

    /// Register a tile, using every distinct symmetry image
    ///
    /// # Errors
    ///
    /// Returns an error for an empty bitmap, a bitmap whose side differs
    /// from previously registered tiles, or a non-positive weight.
    pub fn add(
        &mut self,
        base: SquareGrid<C>,
        connectivity: ByDirection<SideLabels>,
        symmetries: SymmetrySet,
        weight: f64,
    ) -> Result<TileId> {
        self.add_filtered(base, connectivity, symmetries, weight, SymmetrySet::ALL)
    }

    /// Register a tile, keeping only images produced by `allowed_images`
    ///
    /// The base image is always kept. See [`TileSet::add`] for errors.
    pub fn add_filtered(
        &mut self,
        base: SquareGrid<C>,
        connectivity: ByDirection<SideLabels>,
        symmetries: SymmetrySet,
        weight: f64,
        allowed_images: SymmetrySet,
    ) -> Result<TileId> {
        if base.side() == 0 {
            return Err(GenerationError::InvalidSourceData {
                reason: "tile bitmap is empty".to_string(),
            });
        }
        if self.tiles.is_empty() {
            self.tile_side = base.side();
        } else if base.side() != self.tile_side {
            return Err(GenerationError::InvalidSourceData {
                reason: format!(
                    "tile bitmap is {}x{} but the set holds {}x{} tiles",
                    base.side(),
                    base.side(),
                    self.tile_side,
                    self.tile_side
                ),
            });
        }
        if weight <= 0.0 {
            return Err(invalid_parameter(
                "weight",
                &weight,
                &"tile weight must be positive",
            ));
        }

        let id = self.tiles.len();
        self.tiles.push(Tile::new(
            id,
            base,
            connectivity,
            symmetries,
            weight,
            allowed_images,
        ));
        Ok(id)
    }

    /// Forbid two tiles from abutting along edges carrying `label`
    ///
    /// Rules out otherwise label-compatible pairs, e.g. two different via
    /// tiles meeting along a shared track label.
    ///
    /// # Errors
    ///
    /// Returns an error when either tile id is unknown.
    pub fn declare_incompatible(&mut self, a: TileId, b: TileId, label: SideLabel) -> Result<()> {
        for id in [a, b] {
            if id >= self.tiles.len() {
                return Err(GenerationError::InvalidTileIndex {
                    index: id,
                    tile_count: self.tiles.len(),
                });
            }
        }
        self.incompatible.insert((a.min(b), a.max(b), label));
        Ok(())
    }

    /// Whether two tiles may abut along edges carrying `label`
    pub fn allows_abutment(&self, a: TileId, b: TileId, label: SideLabel) -> bool {
        !self.incompatible.contains(&(a.min(b), a.max(b), label))
    }

    /// Number of registered tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the set holds no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Side length shared by every tile bitmap
    pub const fn tile_side(&self) -> usize {
        self.tile_side
    }

    /// All registered tiles in id order
    pub fn tiles(&self) -> &[Tile<C>] {
        &self.tiles
    }

    /// The tile registered under `id`, if any
    pub fn tile(&self, id: TileId) -> Option<&Tile<C>> {
        self.tiles.get(id)
    }

    /// Restrict the set to the given tiles
    ///
    /// Returns the reduced set together with the mapping from old to new
    /// tile ids. Exclusions between surviving tiles are carried over.
    ///
    /// # Errors
    ///
    /// Returns an error when any requested id is unknown.
    pub fn subset(&self, ids: &[TileId]) -> Result<(Self, BTreeMap<TileId, TileId>)> {
        let mut reduced = Self::new();
        let mut id_map = BTreeMap::new();

        for &old_id in ids {
            let tile = self
                .tiles
                .get(old_id)
                .ok_or(GenerationError::InvalidTileIndex {
                    index: old_id,
                    tile_count: self.tiles.len(),
                })?;
            let new_id = reduced.add_filtered(
                tile.images[0].clone(),
                tile.connectivity,
                tile.symmetries,
                tile.weight,
                tile.allowed_images,
            )?;
            id_map.insert(old_id, new_id);
        }

        for &(a, b, label) in &self.incompatible {
            if let (Some(&new_a), Some(&new_b)) = (id_map.get(&a), id_map.get(&b)) {
                reduced.incompatible.insert((new_a, new_b, label));
            }
        }

        Ok((reduced, id_map))
    }
}

/// Options for the tiled model
#[derive(Clone, Copy, Debug)]
pub struct TiledOptions {
    /// Wave dimensions in cells; the decoded output is `size · tile_side`
    pub output_size: (usize, usize),
    /// Whether the output grid wraps during propagation
    pub output_wrapping: Wrapping,
    /// Master RNG seed
    pub seed: u64,
}

impl Default for TiledOptions {
    fn default() -> Self {
        Self {
            output_size: DEFAULT_OUTPUT_SIZE,
            output_wrapping: Wrapping::None,
            seed: DEFAULT_SEED,
        }
    }
}

/// Tile-set model with side-label adjacency
pub struct Tiled<C> {
    catalog: PatternCatalog<C>,
    executor: WaveExecutor,
    options: TiledOptions,
    tile_side: usize,
}

impl<C: Copy + Ord + Send + Sync> Tiled<C> {
    /// Flatten the tile set into solver tables and build the model
    ///
    /// # Errors
    ///
    /// Returns an error for an empty tile set, an invalid output size, a
    /// pattern with an open side, or a wave exceeding the support budget.
    pub fn new(tiles: &TileSet<C>, options: TiledOptions) -> Result<Self> {
        if tiles.is_empty() {
            return Err(GenerationError::InvalidSourceData {
                reason: "tile set holds no tiles".to_string(),
            });
        }
        if options.output_size.0 == 0 || options.output_size.1 == 0 {
            return Err(invalid_parameter(
                "output_size",
                &format!("{:?}", options.output_size),
                &"both dimensions must be at least 1",
            ));
        }

        let catalog = PatternCatalog::from_entries(flatten_patterns(tiles))?;
        log::info!("gathered {} patterns from {} tiles", catalog.len(), tiles.len());

        let table = compute_compatibilities(tiles, catalog.len());
        ensure_every_side_supported(&table)?;
        ensure_support_budget(options.output_size, catalog.len())?;

        let executor = WaveExecutor::new(
            table,
            catalog.weights().clone(),
            options.output_size,
            options.output_wrapping,
            options.seed,
        );

        Ok(Self {
            tile_side: tiles.tile_side(),
            catalog,
            executor,
            options,
        })
    }

    /// The options the model was built with
    pub const fn options(&self) -> &TiledOptions {
        &self.options
    }

    /// The flattened pattern catalog; one pattern per distinct tile image
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

    /// Expand every wave cell into its tile-sized block
    fn decode(&self, ids: &Array2<usize>) -> Array2<C> {
        let (wave_w, wave_h) = ids.dim();
        let side = self.tile_side;

        let fill = *self.catalog.element(0).get(0, 0);
        let mut out = Array2::from_elem((wave_w * side, wave_h * side), fill);

        for x in 0..wave_w {
            for y in 0..wave_h {
                let image = self.catalog.element(ids[[x, y]]);
                for xx in 0..side {
                    for yy in 0..side {
                        out[[x * side + xx, y * side + yy]] = *image.get(xx, yy);
                    }
                }
            }
        }

        out
    }
}

/// One catalog entry per distinct tile image, weights replicated per image
fn flatten_patterns<C: Clone>(tiles: &TileSet<C>) -> Vec<(SquareGrid<C>, f64)> {
    let mut entries = Vec::new();
    for tile in tiles.tiles() {
        for i in 0..tile.num_images() {
            entries.push((tile.image(i).clone(), tile.weight()));
        }
    }
    entries
}

/// Whether two oriented tiles may sit side by side across `dir`
///
/// The facing sides meet back-to-back, so the second side is read mirrored.
fn sides_compatible<C: Clone>(
    tiles: &TileSet<C>,
    first: &Tile<C>,
    first_orientation: Symmetry,
    second: &Tile<C>,
    second_orientation: Symmetry,
    dir: Direction,
) -> bool {
    let first_label = first.side_label(dir, first_orientation, false);
    let second_label = second.side_label(dir.opposite(), second_orientation, true);

    first_label == second_label && tiles.allows_abutment(first.id(), second.id(), first_label)
}

/// Adjacency over flattened pattern ids, consistent with `flatten_patterns`
fn compute_compatibilities<C: Clone>(
    tiles: &TileSet<C>,
    num_patterns: usize,
) -> CompatibilityTable {
    let mut base_index = Vec::with_capacity(tiles.len());
    let mut next = 0;
    for tile in tiles.tiles() {
        base_index.push(next);
        next += tile.num_images();
    }

    // sets during construction keep the lists deduplicated and sorted
    let mut sets: Vec<ByDirection<BTreeSet<usize>>> = vec![ByDirection::default(); num_patterns];

    for first in tiles.tiles() {
        for second in tiles.tiles().iter().skip(first.id()) {
            for i in 0..first.num_images() {
                for j in 0..second.num_images() {
                    for dir in Direction::ALL {
                        if sides_compatible(
                            tiles,
                            first,
                            first.orientation(i),
                            second,
                            second.orientation(j),
                            dir,
                        ) {
                            let first_pattern = base_index[first.id()] + i;
                            let second_pattern = base_index[second.id()] + j;
                            sets[first_pattern][dir].insert(second_pattern);
                            sets[second_pattern][dir.opposite()].insert(first_pattern);
                        }
                    }
                }
            }
        }
    }

    sets.into_iter()
        .map(|sides| ByDirection::from_fn(|dir| sides[dir].iter().copied().collect()))
        .collect()
}
