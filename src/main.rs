//! CLI entry point for exemplar-driven texture synthesis

use clap::Parser;
use wavetile::io::cli::{Cli, FileProcessor};

fn main() -> wavetile::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli);
    processor.process()
}
