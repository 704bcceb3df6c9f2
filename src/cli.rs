//! Command-line argument parsing for the `clearsky-loss` binary.

use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{StudyConfig, SUPPORTED_TIMEZONES};
use crate::sim::types::ReferenceOrientation;

/// Default port for `--serve`.
#[cfg(feature = "api")]
pub const DEFAULT_PORT: u16 = 3000;

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Help,
    Run(CliOptions),
}

/// Parsed CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub overrides: Overrides,
    pub series_out: Option<PathBuf>,
    pub verbose: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: u16,
}

/// Individual fields set on the command line, applied on top of the
/// loaded study.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tilt: Option<f64>,
    pub azimuth: Option<f64>,
    pub timezone: Option<String>,
    pub year: Option<i32>,
    pub reference: Option<ReferenceOrientation>,
}

impl Overrides {
    /// Writes every set field into `study`.
    pub fn apply(&self, study: &mut StudyConfig) {
        if let Some(v) = self.latitude {
            study.site.latitude = v;
        }
        if let Some(v) = self.longitude {
            study.site.longitude = v;
        }
        if let Some(v) = self.tilt {
            study.panel.tilt = v;
        }
        if let Some(v) = self.azimuth {
            study.panel.azimuth = v;
        }
        if let Some(v) = &self.timezone {
            study.site.timezone.clone_from(v);
        }
        if let Some(v) = self.year {
            study.simulation.year = v;
        }
        if let Some(v) = self.reference {
            study.simulation.reference = v;
        }
    }
}

pub fn parse_args() -> Result<CliCommand, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(args)
}

/// Parses arguments without the program name.
///
/// # Errors
///
/// Returns a message for unknown flags, missing or malformed values,
/// repeated flags, and `--scenario` combined with `--preset`.
pub fn parse_args_from(args: Vec<String>) -> Result<CliCommand, String> {
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut overrides = Overrides::default();
    let mut series_out = None;
    let mut verbose = false;
    #[cfg(feature = "api")]
    let mut serve = false;
    #[cfg(feature = "api")]
    let mut port = DEFAULT_PORT;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--scenario" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --scenario (expected a TOML file path)")?;
                if scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--latitude" => {
                i += 1;
                overrides.latitude = Some(args.parse_at(i, flag, "degrees")?);
            }
            "--longitude" => {
                i += 1;
                overrides.longitude = Some(args.parse_at(i, flag, "degrees")?);
            }
            "--tilt" => {
                i += 1;
                overrides.tilt = Some(args.parse_at(i, flag, "degrees")?);
            }
            "--azimuth" => {
                i += 1;
                overrides.azimuth = Some(args.parse_at(i, flag, "degrees")?);
            }
            "--timezone" => {
                i += 1;
                let tz =
                    args.next_or_err(i, "missing value for --timezone (expected an IANA name)")?;
                overrides.timezone = Some(tz.to_string());
            }
            "--year" => {
                i += 1;
                overrides.year = Some(args.parse_at(i, flag, "a year")?);
            }
            "--reference" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --reference")?;
                let reference = value
                    .parse::<ReferenceOrientation>()
                    .map_err(|e| e.to_string())?;
                overrides.reference = Some(reference);
            }
            "--series-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --series-out (expected a file path)")?;
                if series_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--series-out provided more than once".to_string());
                }
            }
            "--verbose" | "-v" => verbose = true,
            #[cfg(feature = "api")]
            "--serve" => serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                port = args.parse_at(i, flag, "a u16")?;
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(CliCommand::Run(CliOptions {
        scenario,
        preset,
        overrides,
        series_out,
        verbose,
        #[cfg(feature = "api")]
        serve,
        #[cfg(feature = "api")]
        port,
    }))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
    fn parse_at<T: FromStr>(&self, index: usize, flag: &str, expected: &str) -> Result<T, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }

    fn parse_at<T: FromStr>(&self, index: usize, flag: &str, expected: &str) -> Result<T, String> {
        let missing = format!("missing value for {flag} (expected {expected})");
        let raw = self.next_or_err(index, &missing)?;
        raw.parse::<T>()
            .map_err(|_| format!("{flag} value \"{raw}\" is not valid (expected {expected})"))
    }
}

pub fn print_help() {
    eprintln!("clearsky-loss: clear-sky yield loss of a tilted solar panel");
    eprintln!();
    eprintln!("Usage: clearsky-loss [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load study from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        StudyConfig::PRESETS.join(", ")
    );
    eprintln!("  --latitude <deg>         Override site latitude");
    eprintln!("  --longitude <deg>        Override site longitude");
    eprintln!("  --tilt <deg>             Override panel tilt");
    eprintln!("  --azimuth <deg>          Override panel azimuth (0 = north, 90 = east)");
    eprintln!(
        "  --timezone <iana>        Override timezone (e.g. {})",
        SUPPORTED_TIMEZONES.join(", ")
    );
    eprintln!("  --year <year>            Override simulated year");
    eprintln!("  --reference <kind>       latitude_tilt, horizontal or equator_facing");
    eprintln!("  --series-out <path>      Export per-timestamp series to CSV");
    eprintln!("  --verbose                Debug logging on stderr");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server with this study as defaults");
        eprintln!("  --port <u16>             API server port (default: {DEFAULT_PORT})");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the maringa preset is used.");
}
