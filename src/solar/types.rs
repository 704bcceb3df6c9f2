//! Per-timestamp value records shared by the solar models.

/// Sun position for one timestamp.
///
/// Azimuth follows the compass convention: 0 = north, 90 = east,
/// 180 = south, 270 = west.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// Refraction-corrected zenith angle in degrees (>= 90 below the horizon).
    pub apparent_zenith: f64,
    /// Geometric zenith angle in degrees, without refraction.
    pub zenith: f64,
    /// Sun azimuth in degrees, in [0, 360).
    pub azimuth: f64,
}

impl SolarPosition {
    /// Apparent elevation above the horizon in degrees.
    pub fn apparent_elevation(&self) -> f64 {
        90.0 - self.apparent_zenith
    }

    /// Whether the refraction-corrected sun is above the horizon.
    pub fn is_daylight(&self) -> bool {
        self.apparent_zenith < 90.0
    }
}

/// Clear-sky irradiance components for one timestamp (W/m²).
///
/// Satisfies `ghi == dni * cos(apparent_zenith) + dhi` up to rounding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClearSkyIrradiance {
    /// Direct normal irradiance.
    pub dni: f64,
    /// Global horizontal irradiance.
    pub ghi: f64,
    /// Diffuse horizontal irradiance.
    pub dhi: f64,
}

impl ClearSkyIrradiance {
    /// All three components zero, used for night-time timestamps.
    pub const DARK: Self = Self {
        dni: 0.0,
        ghi: 0.0,
        dhi: 0.0,
    };
}

/// Plane-of-array irradiance on one surface for one timestamp (W/m²).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoaIrradiance {
    /// Total irradiance on the plane, floored at zero.
    pub poa_global: f64,
    /// Beam component on the plane.
    pub poa_direct: f64,
    /// Sky diffuse plus ground reflected.
    pub poa_diffuse: f64,
    /// Sky diffuse component.
    pub poa_sky_diffuse: f64,
    /// Ground reflected component.
    pub poa_ground_diffuse: f64,
}
