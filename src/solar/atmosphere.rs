//! Extraterrestrial radiation, site pressure and air mass.
//!
//! References:
//! - Spencer, J. W. (1971). "Fourier series representation of the position of the sun"
//! - Kasten, F. and Young, A. T. (1989). "Revised optical air mass tables and
//!   approximation formula"

use std::f64::consts::PI;

/// Solar constant in W/m² used for the extraterrestrial beam.
pub const SOLAR_CONSTANT: f64 = 1366.1;

/// Standard sea-level pressure in Pa.
pub const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;

/// Largest relative air mass the model returns (sun on the horizon).
pub const MAX_RELATIVE_AIRMASS: f64 = 37.919_608;

/// Top-of-atmosphere direct normal irradiance for a day of year (1..=366).
///
/// Follows the Earth-Sun distance: highest near perihelion in early
/// January, lowest near aphelion in early July.
pub fn extraterrestrial_dni(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (f64::from(day_of_year) - 1.0) / 365.0;

    let eccentricity_correction = 1.000_110
        + 0.034_221 * b.cos()
        + 0.001_280 * b.sin()
        + 0.000_719 * (2.0 * b).cos()
        + 0.000_077 * (2.0 * b).sin();

    SOLAR_CONSTANT * eccentricity_correction
}

/// Atmospheric pressure in Pa at `altitude_m` above sea level.
pub fn site_pressure(altitude_m: f64) -> f64 {
    100.0 * ((44_331.514 - altitude_m) / 11_880.516).powf(1.0 / 0.190_263_2)
}

/// Relative (sea-level) optical air mass for an apparent zenith angle.
///
/// The zenith is clamped to [0, 90] so the result saturates at
/// [`MAX_RELATIVE_AIRMASS`] for the horizon and below instead of
/// diverging or going negative.
pub fn relative_airmass(apparent_zenith_deg: f64) -> f64 {
    let z = apparent_zenith_deg.clamp(0.0, 90.0);
    1.0 / (z.to_radians().cos() + 0.505_72 * (6.079_95 + (90.0 - z)).powf(-1.636_4))
}

/// Pressure-corrected air mass.
pub fn absolute_airmass(relative: f64, pressure_pa: f64) -> f64 {
    relative * pressure_pa / SEA_LEVEL_PRESSURE_PA
}
