//! Progress display for batch generation runs

use std::sync::LazyLock;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::io::configuration::PROGRESS_BAR_WIDTH;

static FILE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] attempt {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] files: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// Coordinates a batch bar over files and a per-file attempt bar
pub struct ProgressManager {
    multi: MultiProgress,
    batch_bar: Option<ProgressBar>,
    attempt_bar: Option<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create an idle progress manager
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            batch_bar: None,
            attempt_bar: None,
        }
    }

    /// Show the file-level bar for a batch of `files` inputs
    pub fn start_batch(&mut self, files: usize) {
        if files > 1 {
            let bar = self.multi.add(ProgressBar::new(files as u64));
            bar.set_style(BATCH_STYLE.clone());
            bar.enable_steady_tick(Duration::from_millis(250));
            self.batch_bar = Some(bar);
        }
    }

    /// Begin the attempt bar for one file
    pub fn start_file(&mut self, name: &str, max_attempts: usize) {
        let bar = self.multi.add(ProgressBar::new(max_attempts as u64));
        bar.set_style(FILE_STYLE.clone());
        let width = usize::from(PROGRESS_BAR_WIDTH);
        bar.set_message(format!("{name:<width$.width$}"));
        self.attempt_bar = Some(bar);
    }

    /// Record one fresh-seed retry
    pub fn record_attempt(&mut self) {
        if let Some(bar) = &self.attempt_bar {
            bar.inc(1);
        }
    }

    /// Close the attempt bar and advance the batch bar
    pub fn finish_file(&mut self, solved: bool) {
        if let Some(bar) = self.attempt_bar.take() {
            if solved {
                bar.finish_and_clear();
            } else {
                bar.abandon_with_message("no convergent run".to_string());
            }
        }
        if let Some(bar) = &self.batch_bar {
            bar.inc(1);
        }
    }

    /// Close the batch bar
    pub fn finish(&mut self) {
        if let Some(bar) = self.batch_bar.take() {
            bar.finish();
        }
    }
}
