use clap::Parser;
use parish_markers::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Without an input file, show usage and fail
    if args.input.is_none() {
        show_usage();
        process::exit(1);
    }

    match commands::run(args) {
        Ok(_stats) => {
            // Success - stats have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show usage when no input file is given
fn show_usage() {
    println!("Parish Markers - Business map marker generator");
    println!("==============================================");
    println!();
    println!("Reads a table of businesses tagged with province, canton and parish,");
    println!("geocodes every distinct parish and writes one JSON map marker per parish.");
    println!();
    println!("USAGE:");
    println!("    parish-markers [OPTIONS] <INPUT>");
    println!();
    println!("EXAMPLES:");
    println!("    # Generate markers.json, caching coordinates in parroquia_coords_cache.csv:");
    println!("    parish-markers librerias.csv");
    println!();
    println!("    # Semicolon-separated export with custom output locations:");
    println!("    parish-markers --delimiter ';' --cache coords.csv --output web/markers.json \\");
    println!("                   librerias.csv");
    println!();
    println!("For all options, use:");
    println!("    parish-markers --help");
}
