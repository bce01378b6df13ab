use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use addon_validator::config::{ValidateOptions, DEFAULT_TIMEOUT};

mod validate;

#[derive(Parser)]
#[command(
    name = "addon-validator",
    version,
    about = "Validate add-on submission metadata against the package it points at"
)]
pub struct Cli {
    /// The json (.json) file containing add-on metadata
    file: PathBuf,

    /// Directory for the downloaded package and its unpacked contents
    #[arg(long, env = "ADDON_VALIDATOR_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Download timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Validate against this schema document instead of the bundled one
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Report schema violations as warnings and keep validating
    #[arg(long)]
    lenient_schema: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Output format for validation results.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Status lines on stdout, discrepancies on stderr (default)
    #[default]
    Text,
    /// JSON object with the digest and every diagnostic
    Json,
}

impl Cli {
    fn options(&self) -> ValidateOptions {
        let mut options = ValidateOptions::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_lenient_schema(self.lenient_schema);
        if let Some(dir) = &self.scratch_dir {
            options = options.with_scratch_dir(dir);
        }
        if let Some(schema) = &self.schema {
            options = options.with_schema(schema);
        }
        options
    }
}

pub fn run() {
    let cli = Cli::parse();
    addon_validator::logging::init_logging(cli.verbose);
    validate::run(&cli.file, &cli.options(), cli.format);
}
