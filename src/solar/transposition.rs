//! Plane-of-array transposition of horizontal irradiance.
//!
//! The beam and ground-reflected terms are shared by every sky model; the
//! models only differ in how the sky diffuse dome is weighted.
//!
//! References:
//! - Loutzenhiser, P. G. et al. (2007). "Empirical validation of models to
//!   compute solar irradiance on inclined surfaces for building energy
//!   simulation"
//! - Perez, R. et al. (1990). "Modeling daylight availability and irradiance
//!   components from direct and global irradiance"

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LossError, Stage, ensure_finite};
use crate::sim::types::SurfaceOrientation;

use super::types::{ClearSkyIrradiance, PoaIrradiance, SolarPosition};

/// Sky diffuse model used by [`transpose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyModel {
    /// Uniform sky radiance.
    #[default]
    Isotropic,
    /// Isotropic with horizon and circumsolar brightening under clear skies.
    Klucher,
    /// Circumsolar share weighted by the anisotropy index.
    HayDavies,
    /// Hay-Davies plus horizon brightening.
    Reindl,
    /// Perez 1990, all-sites composite coefficients.
    Perez,
}

impl SkyModel {
    pub fn as_str(self) -> &'static str {
        match self {
            SkyModel::Isotropic => "isotropic",
            SkyModel::Klucher => "klucher",
            SkyModel::HayDavies => "hay_davies",
            SkyModel::Reindl => "reindl",
            SkyModel::Perez => "perez",
        }
    }
}

/// Ground surface context that sets the reflectance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    #[default]
    Urban,
    Grass,
    FreshGrass,
    Soil,
    Sand,
    Snow,
    FreshSnow,
    Asphalt,
    Concrete,
    Aluminum,
    Copper,
    FreshSteel,
    DirtySteel,
    Sea,
}

impl SurfaceType {
    /// Broadband reflectance of the surface.
    pub fn albedo(self) -> f64 {
        match self {
            SurfaceType::Urban => 0.18,
            SurfaceType::Grass => 0.20,
            SurfaceType::FreshGrass => 0.26,
            SurfaceType::Soil => 0.17,
            SurfaceType::Sand => 0.40,
            SurfaceType::Snow => 0.65,
            SurfaceType::FreshSnow => 0.75,
            SurfaceType::Asphalt => 0.12,
            SurfaceType::Concrete => 0.30,
            SurfaceType::Aluminum => 0.85,
            SurfaceType::Copper => 0.74,
            SurfaceType::FreshSteel => 0.35,
            SurfaceType::DirtySteel => 0.08,
            SurfaceType::Sea => 0.06,
        }
    }
}

/// Per-timestamp inputs shared by both orientations of a run.
///
/// All slices must have the same length.
#[derive(Debug, Clone, Copy)]
pub struct TranspositionInputs<'a> {
    pub positions: &'a [SolarPosition],
    pub irradiance: &'a [ClearSkyIrradiance],
    /// Extraterrestrial DNI (W/m²).
    pub dni_extra: &'a [f64],
    /// Relative air mass.
    pub airmass: &'a [f64],
}

impl TranspositionInputs<'_> {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn check_lengths(&self) -> Result<(), LossError> {
        let n = self.positions.len();
        for (name, len) in [
            ("irradiance", self.irradiance.len()),
            ("dni_extra", self.dni_extra.len()),
            ("airmass", self.airmass.len()),
        ] {
            if len != n {
                return Err(LossError::ComputationFailure {
                    stage: Stage::Transposition,
                    index: len.min(n),
                    detail: format!("{name} has {len} values, positions has {n}"),
                });
            }
        }
        Ok(())
    }
}

/// Cosine of the angle of incidence between the sun and the surface normal.
///
/// Clamped to [-1, 1]; negative when the sun is behind the plane.
pub fn aoi_projection(orientation: SurfaceOrientation, position: &SolarPosition) -> f64 {
    let tilt = orientation.tilt.to_radians();
    let zenith = position.apparent_zenith.to_radians();
    let projection = tilt.cos() * zenith.cos()
        + tilt.sin() * zenith.sin() * (position.azimuth - orientation.azimuth).to_radians().cos();
    projection.clamp(-1.0, 1.0)
}

/// Ground-reflected irradiance on a tilted plane.
pub fn ground_diffuse(tilt_deg: f64, ghi: f64, albedo: f64) -> f64 {
    ghi * albedo * (1.0 - tilt_deg.to_radians().cos()) * 0.5
}

/// Plane-of-array irradiance for one timestamp.
pub fn total_irradiance(
    orientation: SurfaceOrientation,
    position: &SolarPosition,
    irradiance: &ClearSkyIrradiance,
    dni_extra: f64,
    airmass: f64,
    sky_model: SkyModel,
    albedo: f64,
) -> PoaIrradiance {
    let cos_aoi = aoi_projection(orientation, position);

    let poa_direct = if position.is_daylight() {
        floor_zero(irradiance.dni * cos_aoi)
    } else {
        0.0
    };

    let poa_sky_diffuse = match sky_model {
        SkyModel::Isotropic => isotropic(orientation.tilt, irradiance.dhi),
        SkyModel::Klucher => klucher(orientation.tilt, position, irradiance, cos_aoi),
        SkyModel::HayDavies => {
            hay_davies(orientation.tilt, position, irradiance, dni_extra, cos_aoi)
        }
        SkyModel::Reindl => reindl(orientation.tilt, position, irradiance, dni_extra, cos_aoi),
        SkyModel::Perez => perez(
            orientation.tilt,
            position,
            irradiance,
            dni_extra,
            airmass,
            cos_aoi,
        ),
    };
    let poa_ground_diffuse = ground_diffuse(orientation.tilt, irradiance.ghi, albedo);
    let poa_diffuse = poa_sky_diffuse + poa_ground_diffuse;

    PoaIrradiance {
        poa_global: floor_zero(poa_direct + poa_diffuse),
        poa_direct,
        poa_diffuse,
        poa_sky_diffuse,
        poa_ground_diffuse,
    }
}

/// Transposes a whole run onto one surface orientation.
///
/// # Errors
///
/// Returns `ComputationFailure` if the input slices differ in length or any
/// resulting POA global value is non-finite.
pub fn transpose(
    orientation: SurfaceOrientation,
    inputs: &TranspositionInputs<'_>,
    sky_model: SkyModel,
    albedo: f64,
) -> Result<Vec<PoaIrradiance>, LossError> {
    inputs.check_lengths()?;

    let poa: Vec<PoaIrradiance> = (0..inputs.len())
        .map(|i| {
            total_irradiance(
                orientation,
                &inputs.positions[i],
                &inputs.irradiance[i],
                inputs.dni_extra[i],
                inputs.airmass[i],
                sky_model,
                albedo,
            )
        })
        .collect();

    ensure_finite(
        Stage::Transposition,
        "poa_global",
        poa.iter().map(|p| p.poa_global),
    )?;

    debug!(
        tilt = orientation.tilt,
        azimuth = orientation.azimuth,
        model = sky_model.as_str(),
        "transposed {} timesteps",
        poa.len()
    );
    Ok(poa)
}

/// Clamps negatives to zero but lets NaN through, so bad inputs stay visible.
fn floor_zero(x: f64) -> f64 {
    if x < 0.0 { 0.0 } else { x }
}

fn isotropic(tilt_deg: f64, dhi: f64) -> f64 {
    dhi * (1.0 + tilt_deg.to_radians().cos()) * 0.5
}

fn klucher(
    tilt_deg: f64,
    position: &SolarPosition,
    irradiance: &ClearSkyIrradiance,
    cos_aoi: f64,
) -> f64 {
    let f = if irradiance.ghi > 0.0 {
        1.0 - (irradiance.dhi / irradiance.ghi).powi(2)
    } else {
        0.0
    };
    let tilt = tilt_deg.to_radians();
    let term1 = 0.5 * (1.0 + tilt.cos());
    let term2 = 1.0 + f * (0.5 * tilt).sin().powi(3);
    let term3 = 1.0 + f * cos_aoi.powi(2) * position.apparent_zenith.to_radians().sin().powi(3);
    irradiance.dhi * term1 * term2 * term3
}

/// Ratio of tilted to horizontal beam projection, and the anisotropy index.
fn beam_ratio(
    position: &SolarPosition,
    irradiance: &ClearSkyIrradiance,
    dni_extra: f64,
    cos_aoi: f64,
) -> (f64, f64) {
    let cos_zenith = position.apparent_zenith.to_radians().cos();
    let rb = cos_aoi.max(0.0) / cos_zenith.max(0.01745);
    let ai = if dni_extra > 0.0 {
        irradiance.dni / dni_extra
    } else {
        0.0
    };
    (rb, ai)
}

fn hay_davies(
    tilt_deg: f64,
    position: &SolarPosition,
    irradiance: &ClearSkyIrradiance,
    dni_extra: f64,
    cos_aoi: f64,
) -> f64 {
    let (rb, ai) = beam_ratio(position, irradiance, dni_extra, cos_aoi);
    let isotropic_share = (1.0 - ai) * 0.5 * (1.0 + tilt_deg.to_radians().cos());
    (irradiance.dhi * (ai * rb + isotropic_share)).max(0.0)
}

fn reindl(
    tilt_deg: f64,
    position: &SolarPosition,
    irradiance: &ClearSkyIrradiance,
    dni_extra: f64,
    cos_aoi: f64,
) -> f64 {
    let (rb, ai) = beam_ratio(position, irradiance, dni_extra, cos_aoi);
    let beam_horizontal = (irradiance.dni * position.apparent_zenith.to_radians().cos()).max(0.0);
    let hb_to_ghi = if irradiance.ghi > 0.0 {
        beam_horizontal / irradiance.ghi
    } else {
        0.0
    };
    let tilt = tilt_deg.to_radians();
    let term2 = 0.5 * (1.0 + tilt.cos());
    let term3 = 1.0 + hb_to_ghi.sqrt() * (0.5 * tilt).sin().powi(3);
    (irradiance.dhi * (ai * rb + (1.0 - ai) * term2 * term3)).max(0.0)
}

/// Perez 1990 all-sites composite coefficients:
/// `[f11, f12, f13, f21, f22, f23]` per sky clearness bin.
const PEREZ_COEFFICIENTS: [[f64; 6]; 8] = [
    [-0.0080, 0.5880, -0.0620, -0.0600, 0.0720, -0.0220],
    [0.1300, 0.6830, -0.1510, -0.0190, 0.0660, -0.0290],
    [0.3300, 0.4870, -0.2210, 0.0550, -0.0640, -0.0260],
    [0.5680, 0.1870, -0.2950, 0.1090, -0.1520, -0.0140],
    [0.8730, -0.3920, -0.3620, 0.2260, -0.4620, 0.0010],
    [1.1320, -1.2370, -0.4120, 0.2880, -0.8230, 0.0560],
    [1.0600, -1.6000, -0.3590, 0.2640, -1.1270, 0.1310],
    [0.6780, -0.3270, -0.2500, 0.1560, -1.3770, 0.2510],
];

/// Upper edges of the first seven sky clearness bins.
const PEREZ_CLEARNESS_BINS: [f64; 7] = [1.065, 1.230, 1.500, 1.950, 2.800, 4.500, 6.200];

fn perez(
    tilt_deg: f64,
    position: &SolarPosition,
    irradiance: &ClearSkyIrradiance,
    dni_extra: f64,
    airmass: f64,
    cos_aoi: f64,
) -> f64 {
    const KAPPA: f64 = 1.041;

    if irradiance.dhi <= 0.0 || dni_extra <= 0.0 {
        return 0.0;
    }

    let z = position.apparent_zenith.clamp(0.0, 90.0).to_radians();
    let z3 = KAPPA * z.powi(3);
    let clearness = ((irradiance.dhi + irradiance.dni) / irradiance.dhi + z3) / (1.0 + z3);
    let brightness = irradiance.dhi * airmass / dni_extra;

    let bin = PEREZ_CLEARNESS_BINS
        .iter()
        .position(|&edge| clearness < edge)
        .unwrap_or(PEREZ_CLEARNESS_BINS.len());
    let c = PEREZ_COEFFICIENTS[bin];

    let f1 = (c[0] + c[1] * brightness + c[2] * z).max(0.0);
    let f2 = c[3] + c[4] * brightness + c[5] * z;

    let tilt = tilt_deg.to_radians();
    let a = cos_aoi.max(0.0);
    let b = z.cos().max(85.0_f64.to_radians().cos());

    let sky = irradiance.dhi
        * (0.5 * (1.0 - f1) * (1.0 + tilt.cos()) + f1 * a / b + f2 * tilt.sin());
    sky.max(0.0)
}
