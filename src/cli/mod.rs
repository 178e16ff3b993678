use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use unitpack::loaders::Device;

mod config;
mod convert;
mod info;
mod rescale;

/// unitpack - Unit-Annotated Tabular Data Packages
#[derive(Parser)]
#[command(name = "unitpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an instrument CSV file into a unit-annotated Data Package
    Convert {
        /// Input CSV file path
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory (defaults to the input file's directory)
        #[arg(short, long, value_name = "DIR")]
        outdir: Option<PathBuf>,

        /// Instrument format of the input (generic, eclab, gamry)
        #[arg(short, long)]
        device: Option<Device>,

        /// YAML file with metadata to attach to the package
        #[arg(short, long, value_name = "FILE")]
        metadata: Option<PathBuf>,

        /// Load field annotations and defaults from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Basename of the written package (defaults to the input stem)
        #[arg(long)]
        basename: Option<String>,
    },

    /// Display the entries of a Data Package or a directory of them
    Info {
        /// Data Package descriptor or directory path
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Rewrite Data Packages with columns converted to different units
    Rescale {
        /// Data Package descriptor or directory path
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Target unit as a name=unit pair, e.g. -u 'j=uA / cm2'; repeatable
        #[arg(short, long = "unit", value_name = "NAME=UNIT")]
        units: Vec<String>,

        /// Output directory for the rewritten packages
        #[arg(short, long, value_name = "DIR")]
        outdir: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

/// Load a single descriptor or a whole directory as a collection
fn load_collection(path: &std::path::Path) -> Result<unitpack::collection::Collection> {
    use anyhow::Context;
    use unitpack::collection::Collection;
    use unitpack::entry::Entry;

    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    if path.is_file() {
        let entry = Entry::from_local(path)
            .with_context(|| format!("Failed to load Data Package: {}", path.display()))?;
        Ok(Collection::new(vec![entry]))
    } else {
        Collection::from_local(path)
            .with_context(|| format!("Failed to load Data Packages below: {}", path.display()))
    }
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            input,
            outdir,
            device,
            metadata,
            config,
            basename,
        } => convert::run(input, outdir, device, metadata, config, basename),
        Commands::Info { path } => info::run(path),
        Commands::Rescale {
            path,
            units,
            outdir,
        } => rescale::run(path, units, outdir),
    }
}
