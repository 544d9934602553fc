//! Command implementation for the parish-markers CLI
//!
//! Sets up logging, turns the arguments into a configuration, runs the
//! processor against Nominatim and reports the outcome.

use crate::app::services::geocoding::NominatimGeocoder;
use crate::cli::args::Args;
use crate::processor::{MarkerProcessor, RunStats};
use anyhow::{Context, Result};
use colored::*;
use indicatif::HumanDuration;
use tracing::debug;

/// Main command runner
///
/// 1. Set up logging
/// 2. Build and validate the configuration
/// 3. Generate the markers for the input
/// 4. Report the run
pub fn run(args: Args) -> Result<RunStats> {
    setup_logging(&args);
    execute(&args)
}

/// Everything `run` does after logging is set up
fn execute(args: &Args) -> Result<RunStats> {
    let input = args.input.as_deref().context("No input file given")?;

    let config = args.to_config();
    config.validate().context("Invalid configuration")?;
    debug!("Configuration: {:?}", config);

    let geocoder =
        NominatimGeocoder::new(&config.geocoder).context("Failed to set up the geocoder")?;
    let processor = MarkerProcessor::new(config, geocoder);

    let stats = processor
        .process(input)
        .with_context(|| format!("Failed to generate markers from {}", input.display()))?;

    report_stats(&stats, args.quiet);
    Ok(stats)
}

/// Set up logging based on verbosity flags; `RUST_LOG` takes precedence
///
/// An already installed subscriber is kept.
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parish_markers={}", log_level)));

    let installed = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
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
            .try_init()
    };

    match installed {
        Ok(()) => debug!("Logging initialized at level: {}", log_level),
        Err(e) => debug!("Keeping existing logger: {}", e),
    }
}

/// Print the result lines, then a summary unless quiet
fn report_stats(stats: &RunStats, quiet: bool) {
    println!(
        "Generated {} with {} markers.",
        stats.output_path.display(),
        stats.markers
    );
    println!("Coordinate cache: {}", stats.cache_path.display());

    if quiet {
        return;
    }

    println!("\n{}", "Run Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Records:".bright_cyan(),
        stats.records.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Locations:".bright_cyan(),
        stats.locations.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Cache hits:".bright_cyan(),
        stats.cache_hits.to_string().bright_white()
    );
    println!(
        "  {} {} found, {} not found",
        "Geocoded:".bright_cyan(),
        stats.found.to_string().bright_white(),
        stats.not_found.to_string().bright_white()
    );
    if stats.failed > 0 {
        println!(
            "  {} {}",
            "Geocoding failed:".bright_red(),
            stats.failed.to_string().bright_red().bold()
        );
    }
    if stats.unresolved_locations > 0 {
        println!(
            "  {} {}",
            "Without coordinates:".bright_yellow(),
            stats.unresolved_locations.to_string().bright_yellow()
        );
    }
    println!(
        "  {} {}",
        "Markers:".bright_cyan(),
        stats.markers.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Time elapsed:".bright_cyan(),
        HumanDuration(stats.elapsed).to_string().bright_white()
    );
}
