//! Ineichen-Perez clear-sky irradiance.
//!
//! References:
//! - Ineichen, P. and Perez, R. (2002). "A new airmass independent formulation
//!   for the Linke turbidity coefficient"
//! - Ineichen, P. (2008). "Comparison and validation of three global-to-beam
//!   irradiance models against ground measurements"

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LossError, Stage, ensure_finite};

use super::atmosphere::{absolute_airmass, extraterrestrial_dni, relative_airmass, site_pressure};
use super::types::{ClearSkyIrradiance, SolarPosition};

/// Default Linke turbidity factor for a clear, moderately polluted atmosphere.
pub const DEFAULT_LINKE_TURBIDITY: f64 = 3.0;

/// Linke turbidity for a run: one value for the whole year, or one per
/// calendar month (January first).
///
/// Deserializes from either a number or a 12-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkeTurbidity {
    Constant(f64),
    Monthly([f64; 12]),
}

impl Default for LinkeTurbidity {
    fn default() -> Self {
        LinkeTurbidity::Constant(DEFAULT_LINKE_TURBIDITY)
    }
}

impl LinkeTurbidity {
    /// Turbidity for a calendar month, 1..=12.
    pub fn for_month(&self, month: u32) -> f64 {
        match self {
            LinkeTurbidity::Constant(tl) => *tl,
            LinkeTurbidity::Monthly(values) => values[(month.clamp(1, 12) - 1) as usize],
        }
    }

    pub fn values(&self) -> &[f64] {
        match self {
            LinkeTurbidity::Constant(tl) => std::slice::from_ref(tl),
            LinkeTurbidity::Monthly(values) => values,
        }
    }

    /// Whether every value is in (0, 10].
    pub fn is_valid(&self) -> bool {
        self.values().iter().all(|tl| *tl > 0.0 && *tl <= 10.0)
    }
}

impl fmt::Display for LinkeTurbidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkeTurbidity::Constant(tl) => write!(f, "{tl}"),
            LinkeTurbidity::Monthly(values) => write!(f, "{values:?}"),
        }
    }
}

/// Clear-sky irradiance for a single sun position.
///
/// # Arguments
/// * `apparent_zenith_deg` - Refraction-corrected zenith in degrees
/// * `airmass_absolute` - Pressure-corrected air mass
/// * `linke_turbidity` - Linke turbidity factor (typical 2-7)
/// * `altitude_m` - Site elevation in meters
/// * `dni_extra` - Extraterrestrial direct normal irradiance (W/m²)
///
/// Returns [`ClearSkyIrradiance::DARK`] when the sun is on or below the
/// horizon.
pub fn ineichen(
    apparent_zenith_deg: f64,
    airmass_absolute: f64,
    linke_turbidity: f64,
    altitude_m: f64,
    dni_extra: f64,
) -> ClearSkyIrradiance {
    if apparent_zenith_deg >= 90.0 {
        return ClearSkyIrradiance::DARK;
    }

    let tl = linke_turbidity;
    let cos_zenith = apparent_zenith_deg.to_radians().cos().max(0.0);

    let fh1 = (-altitude_m / 8000.0).exp();
    let fh2 = (-altitude_m / 1250.0).exp();
    let cg1 = 5.09e-5 * altitude_m + 0.868;
    let cg2 = 3.92e-5 * altitude_m + 0.0387;

    let ghi_exp = (-cg2 * airmass_absolute * (fh1 + fh2 * (tl - 1.0))).exp();
    let ghi = cg1 * dni_extra * cos_zenith * ghi_exp.max(0.0);

    let b = 0.664 + 0.163 / fh1;
    let bnci = dni_extra * (b * (-0.09 * airmass_absolute * (tl - 1.0)).exp()).max(0.0);

    // DNI can not exceed what the global irradiance implies
    let bnci_2 = if cos_zenith > 0.0 {
        let ratio = (1.0 - (0.1 - 0.2 * (-tl).exp()) / (0.1 + 0.882 / fh1)) / cos_zenith;
        ghi * ratio.clamp(0.0, 1e20)
    } else {
        0.0
    };

    let dni = bnci.min(bnci_2);
    let dhi = ghi - dni * cos_zenith;

    ClearSkyIrradiance { dni, ghi, dhi }
}

/// Clear-sky irradiance for every timestamp of a series.
///
/// `positions` must line up with `timestamps`. The day of year for the
/// extraterrestrial beam and the month for a monthly turbidity are taken in
/// the timestamps' own timezone.
///
/// # Errors
///
/// Returns `ComputationFailure` if any component is non-finite.
pub fn clearsky_series<Tz: TimeZone>(
    timestamps: &[DateTime<Tz>],
    positions: &[SolarPosition],
    altitude_m: f64,
    linke_turbidity: LinkeTurbidity,
) -> Result<Vec<ClearSkyIrradiance>, LossError> {
    let pressure = site_pressure(altitude_m);
    let irradiance: Vec<ClearSkyIrradiance> = timestamps
        .iter()
        .zip(positions)
        .map(|(dt, pos)| {
            let am = absolute_airmass(relative_airmass(pos.apparent_zenith), pressure);
            ineichen(
                pos.apparent_zenith,
                am,
                linke_turbidity.for_month(dt.month()),
                altitude_m,
                extraterrestrial_dni(dt.ordinal()),
            )
        })
        .collect();

    ensure_finite(Stage::ClearSky, "dni", irradiance.iter().map(|c| c.dni))?;
    ensure_finite(Stage::ClearSky, "ghi", irradiance.iter().map(|c| c.ghi))?;
    ensure_finite(Stage::ClearSky, "dhi", irradiance.iter().map(|c| c.dhi))?;

    debug!(
        count = irradiance.len(),
        peak_ghi = irradiance.iter().map(|c| c.ghi).fold(0.0, f64::max),
        "clear-sky irradiance computed"
    );
    Ok(irradiance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solar::atmosphere::SEA_LEVEL_PRESSURE_PA;

    fn at(zenith: f64, altitude_m: f64) -> ClearSkyIrradiance {
        let am = absolute_airmass(relative_airmass(zenith), site_pressure(altitude_m));
        ineichen(zenith, am, DEFAULT_LINKE_TURBIDITY, altitude_m, 1366.1)
    }

    #[test]
    fn overhead_sun_is_bright() {
        let c = at(0.0, 0.0);
        assert!(c.ghi > 950.0 && c.ghi < 1150.0, "ghi = {}", c.ghi);
        assert!(c.dni > 800.0 && c.dni < 1100.0, "dni = {}", c.dni);
        assert!(c.dhi > 0.0 && c.dhi < 200.0, "dhi = {}", c.dhi);
    }

    #[test]
    fn matches_reference_values() {
        // (zenith, absolute air mass, Linke turbidity, altitude, I0) -> (ghi, dni, dhi)
        let cases = [
            ((30.0, 1.1, 3.0, 600.0, 1366.1), (916.619079218, 941.052410307, 101.643785600)),
            ((60.0, 1.9, 2.5, 0.0, 1400.0), (505.572661880, 895.853532701, 57.645895529)),
            ((85.0, 9.0, 4.5, 1600.0, 1320.0), (21.282184150, 66.896666981, 15.451755452)),
        ];
        for ((z, am, tl, alt, i0), (ghi, dni, dhi)) in cases {
            let c = ineichen(z, am, tl, alt, i0);
            assert!((c.ghi - ghi).abs() < 1e-6, "zenith {z}: ghi = {}", c.ghi);
            assert!((c.dni - dni).abs() < 1e-6, "zenith {z}: dni = {}", c.dni);
            assert!((c.dhi - dhi).abs() < 1e-6, "zenith {z}: dhi = {}", c.dhi);
        }
    }

    #[test]
    fn night_is_dark() {
        for z in [90.0, 95.0, 120.0, 180.0] {
            assert_eq!(at(z, 600.0), ClearSkyIrradiance::DARK, "zenith {z}");
        }
    }

    #[test]
    fn closure_relation_holds() {
        for z in [0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 85.0, 89.5] {
            let c = at(z, 600.0);
            let direct_horizontal = c.dni * z.to_radians().cos();
            assert!(
                (c.ghi - c.dhi - direct_horizontal).abs() < 1e-9,
                "zenith {z}: ghi={} dhi={} dni={}",
                c.ghi,
                c.dhi,
                c.dni
            );
        }
    }

    #[test]
    fn components_are_non_negative() {
        for z in 0..90 {
            let c = at(f64::from(z), 600.0);
            assert!(c.dni >= 0.0 && c.ghi >= 0.0 && c.dhi >= 0.0, "zenith {z}: {c:?}");
        }
    }

    #[test]
    fn higher_turbidity_dims_the_beam() {
        let am = absolute_airmass(relative_airmass(30.0), SEA_LEVEL_PRESSURE_PA);
        let clear = ineichen(30.0, am, 2.0, 0.0, 1366.1);
        let hazy = ineichen(30.0, am, 6.0, 0.0, 1366.1);
        assert!(hazy.dni < clear.dni);
        assert!(hazy.ghi < clear.ghi);
    }

    #[test]
    fn series_follows_positions() {
        use chrono::TimeZone;
        use chrono_tz::America::Bahia;

        let times = vec![
            Bahia.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap(),
            Bahia.with_ymd_and_hms(2017, 1, 1, 12, 0, 0).unwrap(),
        ];
        let positions = vec![
            SolarPosition {
                apparent_zenith: 130.0,
                zenith: 130.0,
                azimuth: 180.0,
            },
            SolarPosition {
                apparent_zenith: 10.0,
                zenith: 10.01,
                azimuth: 0.0,
            },
        ];
        let series = clearsky_series(&times, &positions, 600.0, LinkeTurbidity::default())
            .expect("finite irradiance");
        assert_eq!(series[0], ClearSkyIrradiance::DARK);
        assert!(series[1].ghi > 900.0);
    }

    #[test]
    fn monthly_turbidity_follows_the_local_month() {
        use chrono::TimeZone;
        use chrono_tz::America::Bahia;

        let mut monthly = [3.0; 12];
        monthly[6] = 6.0;
        let tl = LinkeTurbidity::Monthly(monthly);
        assert_eq!(tl.for_month(1), 3.0);
        assert_eq!(tl.for_month(7), 6.0);
        assert_eq!(LinkeTurbidity::Constant(2.5).for_month(7), 2.5);

        let times = vec![
            Bahia.with_ymd_and_hms(2017, 6, 30, 12, 0, 0).unwrap(),
            Bahia.with_ymd_and_hms(2017, 7, 1, 12, 0, 0).unwrap(),
        ];
        let sun = SolarPosition {
            apparent_zenith: 40.0,
            zenith: 40.01,
            azimuth: 0.0,
        };
        let series = clearsky_series(&times, &[sun, sun], 600.0, tl).expect("finite irradiance");
        assert!(series[1].dni < series[0].dni);
        assert!(series[1].ghi < series[0].ghi);
    }

    #[test]
    fn turbidity_validity() {
        assert!(LinkeTurbidity::default().is_valid());
        assert!(!LinkeTurbidity::Constant(0.0).is_valid());
        let mut monthly = [3.0; 12];
        monthly[11] = 10.5;
        assert!(!LinkeTurbidity::Monthly(monthly).is_valid());
    }
}
