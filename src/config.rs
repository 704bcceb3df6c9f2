//! TOML-based study configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::LossError;
use crate::sim::clock::{MAX_INTERVAL_MINUTES, TimeSeries};
use crate::sim::pipeline::{LossRequest, ModelOptions};
use crate::sim::types::{
    ELEVATION_RANGE_M, Location, ReferenceOrientation, SurfaceOrientation, parse_timezone,
};
use crate::solar::{DEFAULT_DELTA_T, LinkeTurbidity, SkyModel, SurfaceType};

/// Timezones offered as a menu by the front ends. Any IANA identifier is
/// accepted.
pub const SUPPORTED_TIMEZONES: &[&str] = &[
    "America/Noronha",
    "America/Bahia",
    "America/Manaus",
    "America/Rio_Branco",
];

/// Years a study may cover.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2200;

/// Top-level study configuration parsed from TOML.
///
/// All fields have defaults matching the Maringá study. Load from TOML
/// with [`StudyConfig::from_toml_file`] or use [`StudyConfig::maringa`] for
/// the built-in default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Where the panel is.
    #[serde(default)]
    pub site: SiteConfig,
    /// Candidate panel orientation.
    #[serde(default)]
    pub panel: PanelConfig,
    /// Time span and reference plane.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Physical model options.
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Display name.
    pub name: String,
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// IANA timezone identifier.
    pub timezone: String,
    /// Meters above sea level.
    pub elevation_m: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Maringá".to_string(),
            latitude: -23.54,
            longitude: -51.68,
            timezone: "America/Bahia".to_string(),
            elevation_m: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Degrees from horizontal.
    pub tilt: f64,
    /// Degrees clockwise from north.
    pub azimuth: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            tilt: 23.54,
            azimuth: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Calendar year simulated, local time.
    pub year: i32,
    /// Sampling interval (1..=1440).
    pub interval_minutes: u32,
    /// Plane the candidate is compared against.
    pub reference: ReferenceOrientation,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            year: 2017,
            interval_minutes: 60,
            reference: ReferenceOrientation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub sky_model: SkyModel,
    /// Ground surface used to look up the albedo.
    pub surface_type: SurfaceType,
    /// Explicit albedo, overrides `surface_type` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub albedo: Option<f64>,
    /// One value, or twelve monthly values starting with January.
    pub linke_turbidity: LinkeTurbidity,
    /// TT − UT in seconds.
    pub delta_t: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            sky_model: SkyModel::default(),
            surface_type: SurfaceType::default(),
            albedo: None,
            linke_turbidity: LinkeTurbidity::default(),
            delta_t: DEFAULT_DELTA_T,
        }
    }
}

impl ModelConfig {
    /// Albedo the transposition will use.
    pub fn effective_albedo(&self) -> f64 {
        self.albedo.unwrap_or_else(|| self.surface_type.albedo())
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"site.latitude"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl StudyConfig {
    /// Returns the default study: Maringá, panel at latitude tilt.
    pub fn maringa() -> Self {
        Self::default()
    }

    /// Manaus, near the equator.
    pub fn manaus() -> Self {
        Self::site_preset("Manaus", -3.10, -60.02, "America/Manaus", 92.0)
    }

    /// Rio Branco, in the far west.
    pub fn rio_branco() -> Self {
        Self::site_preset("Rio Branco", -9.97, -67.81, "America/Rio_Branco", 153.0)
    }

    /// Fernando de Noronha, offshore in the Atlantic.
    pub fn noronha() -> Self {
        Self::site_preset("Fernando de Noronha", -3.85, -32.42, "America/Noronha", 45.0)
    }

    /// A site with the panel at its latitude tilt and every other field
    /// at its default.
    fn site_preset(
        name: &str,
        latitude: f64,
        longitude: f64,
        timezone: &str,
        elevation_m: f64,
    ) -> Self {
        Self {
            site: SiteConfig {
                name: name.to_string(),
                latitude,
                longitude,
                timezone: timezone.to_string(),
                elevation_m,
            },
            panel: PanelConfig {
                tilt: latitude.abs(),
                azimuth: 0.0,
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["maringa", "manaus", "rio_branco", "noronha"];

    /// Loads a study from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "maringa" => Ok(Self::maringa()),
            "manaus" => Ok(Self::manaus()),
            "rio_branco" => Ok(Self::rio_branco()),
            "noronha" => Ok(Self::noronha()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a study from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a study from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let site = &self.site;
        if !(-90.0..=90.0).contains(&site.latitude) {
            errors.push(ConfigError::new("site.latitude", "must be in [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&site.longitude) {
            errors.push(ConfigError::new("site.longitude", "must be in [-180, 180]"));
        }
        if !ELEVATION_RANGE_M.contains(&site.elevation_m) {
            errors.push(ConfigError::new("site.elevation_m", "must be in [-500, 9000]"));
        }
        if parse_timezone(&site.timezone).is_err() {
            errors.push(ConfigError::new(
                "site.timezone",
                format!("unknown IANA timezone \"{}\"", site.timezone),
            ));
        }

        let panel = &self.panel;
        if !(0.0..=90.0).contains(&panel.tilt) {
            errors.push(ConfigError::new("panel.tilt", "must be in [0, 90]"));
        }
        if !(0.0..=360.0).contains(&panel.azimuth) {
            errors.push(ConfigError::new("panel.azimuth", "must be in [0, 360]"));
        }

        let sim = &self.simulation;
        if !YEAR_RANGE.contains(&sim.year) {
            errors.push(ConfigError::new("simulation.year", "must be in [1900, 2200]"));
        }
        if sim.interval_minutes == 0 || sim.interval_minutes > MAX_INTERVAL_MINUTES {
            errors.push(ConfigError::new(
                "simulation.interval_minutes",
                "must be in [1, 1440]",
            ));
        }

        let model = &self.model;
        if model.albedo.is_some_and(|a| !(0.0..=1.0).contains(&a)) {
            errors.push(ConfigError::new("model.albedo", "must be in [0, 1]"));
        }
        if !model.linke_turbidity.is_valid() {
            errors.push(ConfigError::new(
                "model.linke_turbidity",
                "every value must be in (0, 10]",
            ));
        }
        if !model.delta_t.is_finite() {
            errors.push(ConfigError::new("model.delta_t", "must be finite"));
        }

        errors
    }

    /// Builds the pipeline request this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for the first field the domain constructors
    /// reject. Call [`StudyConfig::validate`] first to report every problem.
    pub fn to_request(&self) -> Result<LossRequest, LossError> {
        let timezone = parse_timezone(&self.site.timezone)?;
        let location = Location::new(
            self.site.name.clone(),
            self.site.latitude,
            self.site.longitude,
            timezone,
            self.site.elevation_m,
        )?;
        let series = TimeSeries::year(
            self.simulation.year,
            timezone,
            self.simulation.interval_minutes,
        )?;
        let candidate = SurfaceOrientation::try_new(self.panel.tilt, self.panel.azimuth)?;
        let model = ModelOptions {
            sky_model: self.model.sky_model,
            albedo: self.model.effective_albedo(),
            linke_turbidity: self.model.linke_turbidity,
            delta_t: self.model.delta_t,
        };
        model.validate()?;

        Ok(LossRequest {
            location,
            series,
            candidate,
            reference: self.simulation.reference,
            model,
        })
    }
}
