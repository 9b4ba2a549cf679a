//! Command-line interface components.

use crate::config::DecoderConfig;
use crate::error::{DecoderError, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Decode BRFSS fixed-width survey records using labels from the codebook
#[derive(Parser, Debug)]
#[command(name = "brfss-decoder")]
#[command(about = "Extract codebook labels and decode fixed-width BRFSS survey records to CSV")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode a fixed-width records file to CSV
    Decode(DecodeArgs),
    /// Parse a codebook and report the fields it describes
    Inspect(InspectArgs),
}

/// Logging flags shared by every command
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct LogArgs {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and hide progress bars
    #[arg(short, long)]
    pub quiet: bool,
}

impl LogArgs {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct DecodeArgs {
    /// Tab-delimited field position table (Variable Name, Starting Column, Field Length)
    #[arg(short, long, value_name = "PATH")]
    pub positions: PathBuf,

    /// Codebook report converted to plain text
    #[arg(short, long, value_name = "PATH")]
    pub codebook: PathBuf,

    /// Fixed-width response records, one per line
    #[arg(short, long, value_name = "PATH")]
    pub records: PathBuf,

    /// Output CSV path (defaults to <records>_decoded.csv)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Comma-separated fields to decode (defaults to the built-in list)
    #[arg(short, long, value_delimiter = ',', value_name = "LIST")]
    pub fields: Vec<String>,

    /// Running page header text of the codebook
    #[arg(long, value_name = "TEXT")]
    pub page_header: Option<String>,

    /// Position table delimiter (single character)
    #[arg(long, value_name = "CHAR")]
    pub separator: Option<char>,

    #[command(flatten)]
    pub log: LogArgs,
}

impl DecodeArgs {
    /// Build the run configuration from defaults and flags
    pub fn to_config(&self) -> Result<DecoderConfig> {
        let mut config = DecoderConfig::default();
        if !self.fields.is_empty() {
            config = config.with_fields(self.fields.iter().map(|f| f.trim().to_string()));
        }
        if let Some(page_header) = &self.page_header {
            config = config.with_page_header(page_header.clone());
        }
        if let Some(separator) = self.separator {
            let separator = u8::try_from(separator)
                .ok()
                .filter(u8::is_ascii)
                .ok_or_else(|| {
                    DecoderError::configuration(format!(
                        "separator must be a single ASCII character, got {:?}",
                        separator
                    ))
                })?;
            config = config.with_table_separator(separator);
        }
        if self.log.quiet {
            config = config.without_progress();
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(ClapArgs, Debug)]
pub struct InspectArgs {
    /// Codebook report converted to plain text
    #[arg(short, long, value_name = "PATH")]
    pub codebook: PathBuf,

    /// Print the value labels of one field
    #[arg(long, value_name = "NAME")]
    pub field: Option<String>,

    /// List parse diagnostics
    #[arg(long)]
    pub diagnostics: bool,

    /// Running page header text of the codebook
    #[arg(long, value_name = "TEXT")]
    pub page_header: Option<String>,

    #[command(flatten)]
    pub log: LogArgs,
}

impl InspectArgs {
    pub fn to_config(&self) -> Result<DecoderConfig> {
        let mut config = DecoderConfig::default().without_progress();
        if let Some(page_header) = &self.page_header {
            config = config.with_page_header(page_header.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

impl Commands {
    pub fn log_args(&self) -> &LogArgs {
        match self {
            Commands::Decode(args) => &args.log,
            Commands::Inspect(args) => &args.log,
        }
    }
}
