//! Command-line argument definitions for parish-markers
//!
//! This module defines the CLI interface using the clap derive API. Every
//! option overrides the matching [`MarkerConfig`] default.

use crate::config::MarkerConfig;
use crate::constants::{
    DEFAULT_CACHE_FILE, DEFAULT_COUNTRY, DEFAULT_OUTPUT_FILE, DEFAULT_USER_AGENT,
    NOMINATIM_BASE_URL,
};
use crate::{Error, Result};
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the parish marker generator
///
/// Reads a table of businesses tagged with province, canton and parish,
/// geocodes each distinct parish once and writes one map marker per parish.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "parish-markers",
    version,
    about = "Generate map markers from a table of businesses grouped by parish",
    long_about = "Reads a delimited table of businesses, each tagged with an Ecuadorian province, \
                  canton and parish, geocodes every distinct parish through Nominatim and writes \
                  a JSON array with one marker per parish listing the businesses registered there. \
                  Geocoding results are cached on disk so interrupted runs resume where they stopped."
)]
pub struct Args {
    /// Input table with one business per row
    ///
    /// Must contain the province, canton, parish and trade name columns of
    /// the business registry export.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Geocode cache file
    ///
    /// Created on first use and updated after every new lookup. Queries
    /// already in the cache, including failed ones, are never looked up again.
    #[arg(
        long = "cache",
        value_name = "FILE",
        default_value = DEFAULT_CACHE_FILE,
        help = "Geocode cache file"
    )]
    pub cache: PathBuf,

    /// Marker JSON output file
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        default_value = DEFAULT_OUTPUT_FILE,
        help = "Marker JSON output file"
    )]
    pub output: PathBuf,

    /// Country appended to every geocoding query
    #[arg(
        long = "country",
        value_name = "NAME",
        default_value = DEFAULT_COUNTRY,
        help = "Country appended to every geocoding query"
    )]
    pub country: String,

    /// Field delimiter of the input table
    ///
    /// A single ASCII character, or `tab`. Spanish-locale spreadsheet
    /// exports usually use `;`.
    #[arg(
        short = 'd',
        long = "delimiter",
        value_name = "CHAR",
        default_value = ",",
        help = "Field delimiter of the input table"
    )]
    pub delimiter: Delimiter,

    /// User agent sent to the geocoding service
    ///
    /// Nominatim's usage policy asks for an agent that identifies the application.
    #[arg(
        long = "user-agent",
        value_name = "AGENT",
        default_value = DEFAULT_USER_AGENT,
        help = "User agent sent to the geocoding service"
    )]
    pub user_agent: String,

    /// Base URL of a Nominatim-compatible service
    #[arg(
        long = "nominatim-url",
        value_name = "URL",
        default_value = NOMINATIM_BASE_URL,
        help = "Base URL of a Nominatim-compatible service"
    )]
    pub nominatim_url: String,

    /// Hide the geocoding progress bar
    #[arg(long = "no-progress", help = "Hide the geocoding progress bar")]
    pub no_progress: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only warnings and errors are logged and the progress bar is hidden.
    /// Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Only log warnings and errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Single-byte field delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter(pub u8);

impl FromStr for Delimiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tab" | "\\t" | "\t" => Ok(Delimiter(b'\t')),
            _ if s.len() == 1 && s.is_ascii() => Ok(Delimiter(s.as_bytes()[0])),
            _ => Err(Error::configuration(format!(
                "Delimiter must be a single ASCII character or 'tab', got '{}'",
                s
            ))),
        }
    }
}

impl Args {
    /// Determine the log level from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress bar is shown unless disabled or quiet
    pub fn show_progress(&self) -> bool {
        !(self.no_progress || self.quiet)
    }

    /// Build the run configuration from defaults and these arguments
    pub fn to_config(&self) -> MarkerConfig {
        let mut config = MarkerConfig::default()
            .with_cache_path(&self.cache)
            .with_output_path(&self.output)
            .with_country(self.country.trim())
            .with_delimiter(self.delimiter.0);

        config.geocoder.user_agent = self.user_agent.clone();
        config.geocoder.base_url = self.nominatim_url.clone();

        if !self.show_progress() {
            config = config.without_progress();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_DELIMITER;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("parish-markers").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["librerias.csv"]);
        assert_eq!(args.input, Some(PathBuf::from("librerias.csv")));

        let config = args.to_config();
        let defaults = MarkerConfig::default();
        assert_eq!(config.cache_path, defaults.cache_path);
        assert_eq!(config.output_path, defaults.output_path);
        assert_eq!(config.country, "Ecuador");
        assert_eq!(config.delimiter, DEFAULT_DELIMITER);
        assert_eq!(config.geocoder.user_agent, "mapa_librerias_script_v1");
        assert!(config.show_progress);
    }

    #[test]
    fn test_input_is_optional() {
        let args = parse(&[]);
        assert!(args.input.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "--cache",
            "coords.csv",
            "--output",
            "out/markers.json",
            "--country",
            "Peru",
            "--delimiter",
            ";",
            "--user-agent",
            "my-map/1.0",
            "--nominatim-url",
            "http://localhost:8080",
            "--no-progress",
            "negocios.csv",
        ]);

        let config = args.to_config();
        assert_eq!(config.cache_path, PathBuf::from("coords.csv"));
        assert_eq!(config.output_path, PathBuf::from("out/markers.json"));
        assert_eq!(config.country, "Peru");
        assert_eq!(config.delimiter, b';');
        assert_eq!(config.geocoder.user_agent, "my-map/1.0");
        assert_eq!(config.geocoder.base_url, "http://localhost:8080");
        assert!(!config.show_progress);
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse(&["in.csv"]).get_log_level(), "info");
        assert_eq!(parse(&["-v", "in.csv"]).get_log_level(), "debug");
        assert_eq!(parse(&["-vv", "in.csv"]).get_log_level(), "trace");
        assert_eq!(parse(&["-q", "in.csv"]).get_log_level(), "warn");
    }

    #[test]
    fn test_quiet_hides_progress() {
        let args = parse(&["-q", "in.csv"]);
        assert!(!args.show_progress());
        assert!(!args.to_config().show_progress);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["parish-markers", "-q", "-v", "in.csv"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_delimiter_parsing() {
        assert_eq!("|".parse::<Delimiter>().unwrap(), Delimiter(b'|'));
        assert_eq!("tab".parse::<Delimiter>().unwrap(), Delimiter(b'\t'));
        assert!(";;".parse::<Delimiter>().is_err());
        assert!("ñ".parse::<Delimiter>().is_err());
        assert!("".parse::<Delimiter>().is_err());
    }
}
