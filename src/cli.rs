use crate::config::{CliOverrides, Config, DownloadPolicy};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "imgharvest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Download the images linked from text files in a directory")]
#[command(
    long_about = "imgharvest scans a directory for .txt, .csv, .log and .rtf files, finds the \
                  image URLs inside each one, and downloads them into a folder named after \
                  the file it came from."
)]
#[command(after_help = "EXAMPLES:\n  \
    imgharvest\n  \
    imgharvest ~/exports\n  \
    imgharvest ./data --overwrite --timeout 60\n  \
    imgharvest ./data --dry-run\n  \
    imgharvest ./data --output-format json --quiet")]
pub struct Cli {
    /// Directory to scan (defaults to the current directory)
    pub directory: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Re-download images that already exist on disk
    #[arg(long, help = "Overwrite images that already exist")]
    pub overwrite: bool,

    /// Per-request timeout in seconds
    #[arg(
        long,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Per-request download timeout (seconds)"
    )]
    pub timeout: Option<u64>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "List the images that would be downloaded without fetching them")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        let policy = self.overwrite.then_some(DownloadPolicy::Overwrite);

        CliOverrides::new()
            .with_policy(policy)
            .with_timeout(self.timeout)
    }

    /// The directory to scan, resolved against the current directory.
    pub fn target_directory(&self) -> Result<PathBuf> {
        let cwd = std::env::current_dir()?;

        Ok(match &self.directory {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd,
        })
    }
}
