//! Main processing pipeline.
//!
//! Orchestrates a complete decoding run: position table loading, codebook
//! parsing, record decoding and CSV output, with progress reporting and a
//! summary at the end.

use crate::codebook::{self, ParseOutcome};
use crate::config::DecoderConfig;
use crate::decoder::{RecordDecoder, write_csv};
use crate::error::{DecoderError, Result};
use crate::models::{FieldDictionary, ProcessingStats};
use crate::positions::load_position_table;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Input files for a decoding run
#[derive(Debug, Clone)]
pub struct DecodeInputs {
    /// Tab-delimited field position table
    pub positions: PathBuf,
    /// Codebook report as plain text
    pub codebook: PathBuf,
    /// Fixed-width response records
    pub records: PathBuf,
}

impl DecodeInputs {
    fn verify(&self) -> Result<()> {
        for path in [&self.positions, &self.codebook, &self.records] {
            if !path.exists() {
                return Err(DecoderError::FileNotFound { path: path.clone() });
            }
        }
        Ok(())
    }
}

/// Main processor for a decoding run
pub struct DecodeProcessor {
    inputs: DecodeInputs,
    output_path: PathBuf,
    config: DecoderConfig,
}

impl DecodeProcessor {
    /// Create a new processor, defaulting the output next to the records file
    pub fn new(inputs: DecodeInputs, output_path: Option<PathBuf>) -> Result<Self> {
        inputs.verify()?;
        let output_path = output_path.unwrap_or_else(|| default_output_path(&inputs.records));

        Ok(Self {
            inputs,
            output_path,
            config: DecoderConfig::default(),
        })
    }

    /// Configure the processor
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Main processing entry point
    pub fn run(&self) -> Result<ProcessingStats> {
        self.config.validate()?;
        let start_time = Instant::now();

        println!("{}", "Starting codebook decoding".bright_green().bold());
        println!(
            "  {} {}",
            "Records:".bright_cyan(),
            self.inputs.records.display()
        );
        println!("  {} {}", "Output:".bright_cyan(), self.output_path.display());

        // Step 1: Field positions
        println!("\n{}", "Loading field positions...".bright_yellow());
        let mut dictionary =
            load_position_table(&self.inputs.positions, self.config.table_separator)?;
        println!(
            "  {} {} fields",
            "Found".bright_green(),
            dictionary.len().to_string().bright_white().bold()
        );

        // Step 2: Codebook labels
        println!("\n{}", "Parsing codebook...".bright_yellow());
        let outcome = codebook::parse_codebook_file(&self.inputs.codebook, &self.config.page_header)?;
        let diagnostics = outcome.diagnostics.len();
        report_parse(&outcome);
        dictionary.merge_codebook(outcome.fields);
        debug!(
            "{} of {} fields have a record position",
            dictionary.positioned().count(),
            dictionary.len()
        );

        // Step 3: Decode records
        println!("\n{}", "Decoding records...".bright_yellow());
        let decoder = RecordDecoder::new(&dictionary, &self.config.fields_of_interest);
        if decoder.is_empty() {
            return Err(DecoderError::configuration(
                "none of the requested fields have a position in the record layout",
            ));
        }
        info!("Decoding columns: {}", decoder.column_names().join(", "));
        let mut df = self.decode_all(&decoder)?;

        // Step 4: Write output
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        write_csv(&mut df, &self.output_path)?;
        info!("Wrote decoded records to {}", self.output_path.display());

        let stats = ProcessingStats {
            fields_loaded: dictionary.len(),
            fields_with_codebook: dictionary.with_codebook_count(),
            columns_written: df.width(),
            records_decoded: df.height(),
            diagnostics,
            output_path: self.output_path.clone(),
            processing_time: start_time.elapsed(),
        };
        print_summary(&stats);
        Ok(stats)
    }

    fn decode_all(&self, decoder: &RecordDecoder<'_>) -> Result<polars::prelude::DataFrame> {
        let file = File::open(&self.inputs.records)?;
        let total_bytes = file.metadata().map(|m| m.len()).unwrap_or(0);

        let pb = if self.config.show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {pos} records {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("({} bytes)", total_bytes));
            Some(pb)
        } else {
            None
        };

        let df = decoder.decode_records(BufReader::new(file), &self.inputs.records, |decoded| {
            if let Some(pb) = &pb {
                if decoded % 1000 == 0 {
                    pb.set_position(decoded as u64);
                }
            }
        })?;

        if let Some(pb) = pb {
            pb.set_position(df.height() as u64);
            pb.finish_with_message("decoded");
        }
        Ok(df)
    }
}

/// Parse a codebook on its own and report what was found
pub fn inspect_codebook(path: &Path, config: &DecoderConfig) -> Result<ParseOutcome> {
    config.validate()?;
    let outcome = codebook::parse_codebook_file(path, &config.page_header)?;
    report_parse(&outcome);
    Ok(outcome)
}

/// Default output: `<records stem>_decoded.csv` beside the records file
pub fn default_output_path(records: &Path) -> PathBuf {
    let stem = records
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    records
        .with_file_name(format!("{}{}", stem, crate::constants::DEFAULT_OUTPUT_SUFFIX))
}

fn report_parse(outcome: &ParseOutcome) {
    println!(
        "  {} {} fields with labels from {} lines",
        "Found".bright_green(),
        outcome
            .fields
            .with_codebook_count()
            .to_string()
            .bright_white()
            .bold(),
        outcome.lines_read
    );

    let warnings = outcome.warning_count();
    if warnings > 0 {
        warn!("Codebook parse produced {} warnings", warnings);
        println!(
            "  {} {}",
            "Warnings:".bright_red(),
            warnings.to_string().bright_red().bold()
        );
    }
    debug!(
        "{} diagnostics in total ({} informational)",
        outcome.diagnostics.len(),
        outcome.diagnostics.len() - warnings
    );
}

fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Processing Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time.as_millis().to_string().bright_white()
    );
    println!(
        "  {} {} ({} with labels)",
        "Fields loaded:".bright_cyan(),
        stats.fields_loaded.to_string().bright_white(),
        stats.fields_with_codebook
    );
    println!(
        "  {} {} x {}",
        "Records decoded:".bright_cyan(),
        stats.records_decoded.to_string().bright_white().bold(),
        stats.columns_written
    );
    if stats.diagnostics > 0 {
        println!(
            "  {} {}",
            "Parse diagnostics:".bright_yellow(),
            stats.diagnostics
        );
    }
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        stats.output_path.display()
    );
}

/// Codebook fields sorted by name, with entry counts, for reporting
pub fn field_summary(dictionary: &FieldDictionary) -> Vec<(String, usize)> {
    dictionary
        .iter()
        .map(|spec| (spec.name.clone(), spec.codebook.len()))
        .collect()
}
