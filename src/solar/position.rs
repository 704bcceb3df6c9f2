//! Solar position from NREL's Solar Position Algorithm.
//!
//! Reda, I. and Andreas, A. (2003). "Solar position algorithm for solar
//! radiation applications". Solar Energy, 76(5), 577-589.
//!
//! The astronomy comes from the `solar-positioning` crate. This module adds
//! the site-pressure refraction model and the per-series bookkeeping.

use chrono::{DateTime, TimeZone};
use solar_positioning::{RefractionCorrection, spa};
use tracing::debug;

use crate::error::{LossError, Stage, ensure_finite};
use crate::sim::types::Location;

use super::atmosphere::site_pressure;
use super::types::SolarPosition;

/// Default ΔT (TT − UT) in seconds.
pub const DEFAULT_DELTA_T: f64 = 67.0;

/// Air temperature assumed for the refraction correction, °C.
pub const REFRACTION_TEMPERATURE_C: f64 = 12.0;

/// Refraction conditions at a site elevation, using the standard barometric
/// formula for pressure.
///
/// # Errors
///
/// Returns `InvalidInput` on `elevation_m` when the derived pressure is
/// outside what the refraction model accepts.
pub fn refraction_at(elevation_m: f64) -> Result<RefractionCorrection, LossError> {
    let pressure_hpa = site_pressure(elevation_m) / 100.0;
    RefractionCorrection::new(pressure_hpa, REFRACTION_TEMPERATURE_C)
        .map_err(|e| LossError::invalid("elevation_m", elevation_m, e.to_string()))
}

/// Computes the sun position seen from a site at `datetime`.
///
/// `datetime` may carry any timezone; the instant is what matters. The
/// geometric zenith is computed from the same time-dependent terms as the
/// apparent one, without refraction.
///
/// # Errors
///
/// Returns the underlying algorithm error for out-of-range coordinates or
/// dates.
pub fn solar_position<Tz: TimeZone>(
    datetime: &DateTime<Tz>,
    latitude: f64,
    longitude: f64,
    elevation_m: f64,
    delta_t: f64,
    refraction: RefractionCorrection,
) -> solar_positioning::Result<SolarPosition> {
    let parts = spa::spa_time_dependent_parts(datetime.clone(), delta_t)?;
    let geometric =
        spa::spa_with_time_dependent_parts(latitude, longitude, elevation_m, None, &parts)?;
    let apparent = spa::spa_with_time_dependent_parts(
        latitude,
        longitude,
        elevation_m,
        Some(refraction),
        &parts,
    )?;

    Ok(SolarPosition {
        apparent_zenith: apparent.zenith_angle(),
        zenith: geometric.zenith_angle(),
        azimuth: apparent.azimuth(),
    })
}

/// Computes one [`SolarPosition`] per timestamp for `location`.
///
/// # Errors
///
/// * `InvalidInput` if the site elevation gives an unusable pressure.
/// * `ComputationFailure` if the algorithm rejects a timestamp or any angle
///   comes out non-finite.
pub fn solar_positions<Tz: TimeZone>(
    location: &Location,
    timestamps: &[DateTime<Tz>],
    delta_t: f64,
) -> Result<Vec<SolarPosition>, LossError> {
    let refraction = refraction_at(location.elevation_m)?;
    let positions = timestamps
        .iter()
        .enumerate()
        .map(|(index, dt)| {
            solar_position(
                dt,
                location.latitude,
                location.longitude,
                location.elevation_m,
                delta_t,
                refraction,
            )
            .map_err(|e| LossError::ComputationFailure {
                stage: Stage::Position,
                index,
                detail: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    ensure_finite(
        Stage::Position,
        "apparent zenith",
        positions.iter().map(|p| p.apparent_zenith),
    )?;
    ensure_finite(Stage::Position, "azimuth", positions.iter().map(|p| p.azimuth))?;

    debug!(
        count = positions.len(),
        daylight = positions.iter().filter(|p| p.is_daylight()).count(),
        "solar positions computed"
    );
    Ok(positions)
}
