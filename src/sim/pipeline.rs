//! The loss pipeline: sun position, clear-sky irradiance, two
//! transpositions and one aggregation.
//!
//! [`run`] is the only entry point the front ends call. It holds no state
//! between calls; two concurrent requests share nothing.

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::error::LossError;
use crate::solar::atmosphere::{extraterrestrial_dni, relative_airmass};
use crate::solar::transposition::{SkyModel, SurfaceType, TranspositionInputs, transpose};
use crate::solar::{
    ClearSkyIrradiance, DEFAULT_DELTA_T, LinkeTurbidity, PoaIrradiance, SolarPosition,
    clearsky_series, solar_positions,
};

use super::clock::TimeSeries;
use super::loss::LossReport;
use super::types::{Location, ReferenceOrientation, SurfaceOrientation};

/// Physical model knobs shared by both orientations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOptions {
    pub sky_model: SkyModel,
    /// Ground reflectance, 0..=1.
    pub albedo: f64,
    pub linke_turbidity: LinkeTurbidity,
    /// TT − UT in seconds.
    pub delta_t: f64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            sky_model: SkyModel::default(),
            albedo: SurfaceType::default().albedo(),
            linke_turbidity: LinkeTurbidity::default(),
            delta_t: DEFAULT_DELTA_T,
        }
    }
}

impl ModelOptions {
    /// # Errors
    ///
    /// Returns `InvalidInput` for an albedo outside [0, 1], any Linke
    /// turbidity value outside (0, 10], or a non-finite ΔT.
    pub fn validate(&self) -> Result<(), LossError> {
        if !(0.0..=1.0).contains(&self.albedo) {
            return Err(LossError::invalid("albedo", self.albedo, "must be within [0, 1]"));
        }
        if !self.linke_turbidity.is_valid() {
            return Err(LossError::invalid(
                "linke_turbidity",
                self.linke_turbidity,
                "every value must be within (0, 10]",
            ));
        }
        if !self.delta_t.is_finite() {
            return Err(LossError::invalid("delta_t", self.delta_t, "must be finite"));
        }
        Ok(())
    }
}

/// Everything one loss calculation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct LossRequest {
    pub location: Location,
    pub series: TimeSeries,
    pub candidate: SurfaceOrientation,
    pub reference: ReferenceOrientation,
    pub model: ModelOptions,
}

/// Per-timestamp intermediates and the final report of one run.
#[derive(Debug, Clone)]
pub struct LossRun {
    pub location: Location,
    pub candidate: SurfaceOrientation,
    /// Reference plane after resolving [`ReferenceOrientation`].
    pub reference: SurfaceOrientation,
    pub timestamps: Vec<DateTime<Tz>>,
    pub positions: Vec<SolarPosition>,
    pub irradiance: Vec<ClearSkyIrradiance>,
    pub reference_poa: Vec<PoaIrradiance>,
    pub candidate_poa: Vec<PoaIrradiance>,
    pub report: LossReport,
}

impl LossRun {
    /// One-line summary for the candidate plane.
    pub fn headline(&self) -> String {
        format!(
            "For the panel angle of {:.2}° and azimuth of {:.2}°, we have a loss of {:.2}%",
            self.candidate.tilt, self.candidate.azimuth, self.report.loss_pct
        )
    }
}

/// Computes the relative clear-sky loss of `request.candidate` against the
/// reference plane.
///
/// # Errors
///
/// * `InvalidInput` if the candidate orientation, model options or series
///   timezone are unusable.
/// * `ComputationFailure` if any stage produces a non-finite value.
/// * `DegenerateResult` if the reference plane receives no irradiance.
pub fn run(request: LossRequest) -> Result<LossRun, LossError> {
    let LossRequest {
        location,
        series,
        candidate,
        reference,
        model,
    } = request;

    candidate.validate()?;
    model.validate()?;
    if let Some(tz) = series.timezone().filter(|tz| *tz != location.timezone) {
        return Err(LossError::invalid(
            "timezone",
            tz,
            format!("series timezone differs from location timezone {}", location.timezone),
        ));
    }

    let reference_plane = reference.resolve(location.latitude);
    info!(
        site = %location.name,
        timesteps = series.len(),
        candidate = %candidate,
        reference = %reference_plane,
        model = model.sky_model.as_str(),
        "computing clear-sky loss"
    );

    let timestamps = series.timestamps();
    let positions = solar_positions(&location, timestamps, model.delta_t)?;
    let irradiance = clearsky_series(
        timestamps,
        &positions,
        location.elevation_m,
        model.linke_turbidity,
    )?;
    let dni_extra: Vec<f64> = timestamps
        .iter()
        .map(|t| extraterrestrial_dni(t.ordinal()))
        .collect();
    let airmass: Vec<f64> = positions
        .iter()
        .map(|p| relative_airmass(p.apparent_zenith))
        .collect();

    let inputs = TranspositionInputs {
        positions: &positions,
        irradiance: &irradiance,
        dni_extra: &dni_extra,
        airmass: &airmass,
    };
    let reference_poa = transpose(reference_plane, &inputs, model.sky_model, model.albedo)?;
    let candidate_poa = transpose(candidate, &inputs, model.sky_model, model.albedo)?;
    debug!("both orientations transposed");

    let report = LossReport::from_series(&reference_poa, &candidate_poa, series.interval_hours())?;
    info!(
        loss_pct = report.loss_pct,
        reference_kwh_m2 = report.reference_kwh_m2,
        candidate_kwh_m2 = report.candidate_kwh_m2,
        "loss computed"
    );

    Ok(LossRun {
        location,
        candidate,
        reference: reference_plane,
        timestamps: timestamps.to_vec(),
        positions,
        irradiance,
        reference_poa,
        candidate_poa,
        report,
    })
}
