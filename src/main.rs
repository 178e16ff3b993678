//! # unitpack CLI
//!
//! Command-line access to unit-annotated Data Packages: converting
//! instrument CSV files, listing package contents, and rescaling columns.
//!
//! ```bash
//! # Convert an EC-Lab export into a Data Package
//! unitpack convert measurement.mpt --device eclab --metadata measurement.yaml
//!
//! # List the packages below a directory
//! unitpack info data/
//!
//! # Rewrite packages with the current density in uA / cm2
//! unitpack rescale data/ -u 'j=uA / cm2' -o rescaled/
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::init_logging(args.verbosity());
    cli::dispatch(args)
}
