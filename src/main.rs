use anyhow::{Context, Result};
use brfss_decoder::cli::{Args, Commands, DecodeArgs, InspectArgs, LogArgs};
use brfss_decoder::codebook::Diagnostic;
use brfss_decoder::processor::{DecodeInputs, DecodeProcessor, field_summary, inspect_codebook};
use clap::Parser;
use colored::*;
use std::process;
use tracing::debug;

fn main() {
    let args = Args::parse();
    setup_logging(args.command.log_args());

    let result = match args.command {
        Commands::Decode(decode) => run_decode(decode),
        Commands::Inspect(inspect) => run_inspect(inspect),
    };

    if let Err(error) = result {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

/// Set up structured logging based on CLI arguments
fn setup_logging(log: &LogArgs) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = log.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("brfss_decoder={}", log_level)));

    if log.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let config = args.to_config().context("Invalid decode options")?;
    let inputs = DecodeInputs {
        positions: args.positions,
        codebook: args.codebook,
        records: args.records,
    };

    let processor = DecodeProcessor::new(inputs, args.output)
        .context("Failed to set up decoding")?
        .with_config(config);
    processor
        .run()
        .with_context(|| format!("Failed to decode into {}", processor.output_path().display()))?;
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let config = args.to_config().context("Invalid inspect options")?;
    let outcome = inspect_codebook(&args.codebook, &config)
        .with_context(|| format!("Failed to parse codebook {}", args.codebook.display()))?;

    match &args.field {
        Some(name) => {
            let spec = outcome
                .fields
                .get(name)
                .with_context(|| format!("Field {} not found in codebook", name))?;

            println!("\n{}", spec.name.bright_green().bold());
            if let Some(location) = &spec.location {
                println!("  {} {}", "Column:".bright_cyan(), location);
            }
            if let Some(description) = &spec.description {
                println!("  {} {}", "Description:".bright_cyan(), description);
            }
            for (key, label) in &spec.codebook {
                println!("  {:>6} {}", format!("{:?}", key).bright_white(), label);
            }
        }
        None => {
            println!();
            for (name, entries) in field_summary(&outcome.fields) {
                println!("  {:<12} {} labels", name.bright_cyan(), entries);
            }
        }
    }

    if args.diagnostics {
        println!("\n{}", "Diagnostics".bright_yellow().bold());
        outcome.diagnostics.iter().for_each(print_diagnostic);
    }
    Ok(())
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    if diagnostic.is_warning() {
        println!("  {}", diagnostic.to_string().bright_red());
    } else {
        println!("  {}", diagnostic);
    }
}
