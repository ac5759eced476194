//! Command-line interface for batch synthesis from PNG exemplars

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use crate::io::configuration::{
    DEFAULT_ATTEMPTS, DEFAULT_PATTERN_SIZE, DEFAULT_SEED, MAX_OUTPUT_DIMENSION, OUTPUT_SUFFIX,
};
use crate::io::error::{invalid_parameter, Result};
use crate::io::image::{load_exemplar, save_grid};
use crate::io::progress::ProgressManager;
use crate::model::overlapping::{Overlapping, OverlappingOptions};
use crate::spatial::symmetry::SymmetrySet;
use crate::spatial::wrapping::Wrapping;

#[derive(Parser)]
#[command(name = "wavetile")]
#[command(
    author,
    version,
    about = "Synthesize textures from PNG exemplars with wave function collapse"
)]
/// Command-line arguments for the synthesis tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input PNG file or directory to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Master seed for reproducible generation
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Output width in pixels
    #[arg(short = 'w', long, default_value_t = 64)]
    pub width: usize,

    /// Output height in pixels
    #[arg(short = 'H', long, default_value_t = 64)]
    pub height: usize,

    /// Side length of the learned patterns
    #[arg(short, long, default_value_t = DEFAULT_PATTERN_SIZE)]
    pub pattern_size: usize,

    /// Sampling stride along both axes
    #[arg(long, default_value_t = 1)]
    pub stride: usize,

    /// Learn rotated copies of every window (90°, 180°, 270°)
    #[arg(short = 'r', long)]
    pub rotate: bool,

    /// Learn mirrored copies of every window
    #[arg(short = 'm', long)]
    pub mirror: bool,

    /// Treat the exemplar as toroidal when extracting windows
    #[arg(long)]
    pub wrap_input: bool,

    /// Generate a toroidal output
    #[arg(long)]
    pub wrap_output: bool,

    /// Give every distinct pattern the same weight
    #[arg(short, long)]
    pub equal_frequencies: bool,

    /// Fresh-seed retries before giving up on a file
    #[arg(short, long, default_value_t = DEFAULT_ATTEMPTS)]
    pub attempts: usize,

    /// Number of variants to generate per file (runs in parallel)
    #[arg(short = 'n', long, default_value_t = 1)]
    pub variants: usize,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    fn model_options(&self) -> OverlappingOptions {
        let mut symmetries = SymmetrySet::NONE;
        if self.rotate {
            symmetries = symmetries.union(SymmetrySet::ALL_ROTATIONS);
        }
        if self.mirror {
            symmetries = symmetries.union(SymmetrySet::ALL_FLIPS);
        }

        let mut options = OverlappingOptions::default()
            .with_pattern_size(self.pattern_size)
            .with_stride((self.stride, self.stride))
            .with_symmetries(symmetries)
            .with_equal_frequencies(self.equal_frequencies)
            .with_input_wrapping(Wrapping::from_axes(self.wrap_input, self.wrap_input))
            .with_output_wrapping(Wrapping::from_axes(self.wrap_output, self.wrap_output))
            .with_seed(self.seed);
        options.set_output_size_at_least((self.width, self.height));
        options
    }
}

/// Orchestrates batch processing of PNG files with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress = cli.should_show_progress().then(ProgressManager::new);
        Self { cli, progress }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation or file processing fails.
    pub fn process(&mut self) -> Result<()> {
        if self.cli.width > MAX_OUTPUT_DIMENSION || self.cli.height > MAX_OUTPUT_DIMENSION {
            return Err(invalid_parameter(
                "width/height",
                &format!("{}x{}", self.cli.width, self.cli.height),
                &format!("output dimensions are capped at {MAX_OUTPUT_DIMENSION}"),
            ));
        }

        let files = self.collect_files()?;
        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress {
            pm.start_batch(files.len());
        }

        for file in &files {
            self.process_file(file)?;
        }

        if let Some(ref mut pm) = self.progress {
            pm.finish();
        }

        Ok(())
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        if self.cli.target.is_file() {
            if self.cli.target.extension().and_then(|s| s.to_str()) == Some("png") {
                if self.should_process_file(&self.cli.target) {
                    Ok(vec![self.cli.target.clone()])
                } else {
                    Ok(vec![])
                }
            } else {
                Err(invalid_parameter(
                    "target",
                    &self.cli.target.display(),
                    &"target file must be a PNG image",
                ))
            }
        } else if self.cli.target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(&self.cli.target)? {
                let path = entry?.path();
                if path.extension().and_then(|s| s.to_str()) == Some("png")
                    && self.should_process_file(&path)
                {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &self.cli.target.display(),
                &"target must be a PNG file or directory",
            ))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = output_path_for(input_path, None);
        if output_path.exists() {
            log::info!("skipping {} (output exists)", input_path.display());
            false
        } else {
            true
        }
    }

    fn process_file(&mut self, input_path: &Path) -> Result<()> {
        let started = Instant::now();
        let exemplar = load_exemplar(input_path)?;

        let options = self.cli.model_options();
        let mut model = Overlapping::new(&exemplar, options)?;

        if let Some(ref mut pm) = self.progress {
            let name = input_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            pm.start_file(&name, self.cli.attempts);
        }

        let solved = if self.cli.variants > 1 {
            self.generate_variants(&mut model, input_path)?
        } else {
            self.generate_single(&mut model, input_path)?
        };

        if let Some(ref mut pm) = self.progress {
            pm.finish_file(solved);
        }

        if solved {
            log::info!(
                "finished {} in {:.2}s",
                input_path.display(),
                started.elapsed().as_secs_f64()
            );
        } else {
            log::warn!(
                "gave up on {} after {} attempts",
                input_path.display(),
                self.cli.attempts
            );
        }

        Ok(())
    }

    /// Retry with fresh child seeds until one run converges
    fn generate_single(
        &mut self,
        model: &mut Overlapping<crate::io::image::Rgb8>,
        input_path: &Path,
    ) -> Result<bool> {
        for _ in 0..self.cli.attempts {
            if let Some(ref mut pm) = self.progress {
                pm.record_attempt();
            }
            if let Some(result) = model.next() {
                save_grid(&result, output_path_for(input_path, None))?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Collect parallel variants, padding with retries up to the attempt cap
    fn generate_variants(
        &mut self,
        model: &mut Overlapping<crate::io::image::Rgb8>,
        input_path: &Path,
    ) -> Result<bool> {
        let wanted = self.cli.variants;
        let mut results = Vec::new();
        let mut attempts = 0;

        while results.len() < wanted && attempts < self.cli.attempts {
            let batch = wanted - results.len();
            attempts += 1;
            if let Some(ref mut pm) = self.progress {
                pm.record_attempt();
            }
            results.extend(model.next_parallel(batch));
        }

        for (index, result) in results.iter().enumerate() {
            save_grid(result, output_path_for(input_path, Some(index)))?;
        }

        Ok(!results.is_empty())
    }
}

fn output_path_for(input_path: &Path, variant: Option<usize>) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let extension = input_path.extension().unwrap_or_default();
    let output_name = match variant {
        Some(index) => format!(
            "{}{}_{}.{}",
            stem.to_string_lossy(),
            OUTPUT_SUFFIX,
            index,
            extension.to_string_lossy()
        ),
        None => format!(
            "{}{}.{}",
            stem.to_string_lossy(),
            OUTPUT_SUFFIX,
            extension.to_string_lossy()
        ),
    };

    input_path
        .parent()
        .map_or_else(|| PathBuf::from(&output_name), |p| p.join(&output_name))
}
