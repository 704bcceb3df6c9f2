//! Core value types: where the panel is and how it is pointed.

use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::LossError;

/// Elevations the barometric formula is trusted for, in meters.
pub const ELEVATION_RANGE_M: std::ops::RangeInclusive<f64> = -500.0..=9_000.0;

/// A validated site on the Earth's surface.
///
/// # Examples
///
/// ```
/// use chrono_tz::Tz;
/// use clearsky_loss::sim::types::Location;
///
/// let site = Location::new("Maringá", -23.54, -51.68, Tz::America__Bahia, 600.0).unwrap();
/// assert_eq!(site.timezone, Tz::America__Bahia);
/// assert!(Location::new("nowhere", 91.0, 0.0, Tz::UTC, 0.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Display name, used only in reports.
    pub name: String,
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Timezone the timestamps of a run are expressed in.
    pub timezone: Tz,
    /// Meters above sea level.
    pub elevation_m: f64,
}

impl Location {
    /// Creates a location after range-checking every coordinate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if latitude is outside [-90, 90], longitude is
    /// outside [-180, 180], or elevation is non-finite or outside
    /// [`ELEVATION_RANGE_M`].
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timezone: Tz,
        elevation_m: f64,
    ) -> Result<Self, LossError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LossError::invalid(
                "latitude",
                latitude,
                "must be within [-90, 90]",
            ));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LossError::invalid(
                "longitude",
                longitude,
                "must be within [-180, 180]",
            ));
        }
        if !ELEVATION_RANGE_M.contains(&elevation_m) {
            return Err(LossError::invalid(
                "elevation_m",
                elevation_m,
                "must be within [-500, 9000]",
            ));
        }
        Ok(Self {
            name: name.into(),
            latitude,
            longitude,
            timezone,
            elevation_m,
        })
    }
}

/// Parses an IANA timezone identifier.
///
/// # Errors
///
/// Returns `InvalidInput` for unknown identifiers.
pub fn parse_timezone(name: &str) -> Result<Tz, LossError> {
    name.parse::<Tz>()
        .map_err(|_| LossError::invalid("timezone", name, "unknown IANA timezone"))
}

/// Tilt and azimuth of a fixed plane.
///
/// Tilt is measured from horizontal (0 = flat, 90 = vertical). Azimuth is
/// the compass bearing of the surface normal: 0 = north, 90 = east,
/// 180 = south, 270 = west.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceOrientation {
    pub tilt: f64,
    pub azimuth: f64,
}

impl SurfaceOrientation {
    /// Builds an orientation without range checks.
    pub const fn new(tilt: f64, azimuth: f64) -> Self {
        Self { tilt, azimuth }
    }

    /// Builds an orientation, rejecting tilt outside [0, 90] and azimuth
    /// outside [0, 360].
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the offending field.
    pub fn try_new(tilt: f64, azimuth: f64) -> Result<Self, LossError> {
        let orientation = Self::new(tilt, azimuth);
        orientation.validate()?;
        Ok(orientation)
    }

    /// Checks both angles against their physical range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for the first field that is out of range.
    pub fn validate(&self) -> Result<(), LossError> {
        if !(0.0..=90.0).contains(&self.tilt) {
            return Err(LossError::invalid("tilt", self.tilt, "must be within [0, 90]"));
        }
        if !(0.0..=360.0).contains(&self.azimuth) {
            return Err(LossError::invalid(
                "azimuth",
                self.azimuth,
                "must be within [0, 360]",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for SurfaceOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tilt {:.2}° / azimuth {:.2}°", self.tilt, self.azimuth)
    }
}

/// How the reference plane of a comparison is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceOrientation {
    /// Tilt equal to |latitude|, azimuth 0.
    #[default]
    LatitudeTilt,
    /// Flat plane.
    Horizontal,
    /// Tilt equal to |latitude|, facing the equator.
    EquatorFacing,
}

impl ReferenceOrientation {
    pub const ALL: [ReferenceOrientation; 3] = [
        ReferenceOrientation::LatitudeTilt,
        ReferenceOrientation::Horizontal,
        ReferenceOrientation::EquatorFacing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceOrientation::LatitudeTilt => "latitude_tilt",
            ReferenceOrientation::Horizontal => "horizontal",
            ReferenceOrientation::EquatorFacing => "equator_facing",
        }
    }

    /// Concrete plane for a site at `latitude`.
    pub fn resolve(self, latitude: f64) -> SurfaceOrientation {
        let tilt = latitude.abs();
        match self {
            ReferenceOrientation::LatitudeTilt => SurfaceOrientation::new(tilt, 0.0),
            ReferenceOrientation::Horizontal => SurfaceOrientation::new(0.0, 0.0),
            ReferenceOrientation::EquatorFacing => {
                let azimuth = if latitude < 0.0 { 0.0 } else { 180.0 };
                SurfaceOrientation::new(tilt, azimuth)
            }
        }
    }
}

impl FromStr for ReferenceOrientation {
    type Err = LossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                LossError::invalid(
                    "reference",
                    s,
                    "expected latitude_tilt, horizontal or equator_facing",
                )
            })
    }
}

impl fmt::Display for ReferenceOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_accepts_extremes() {
        assert!(Location::new("pole", -90.0, 180.0, Tz::UTC, 0.0).is_ok());
        assert!(Location::new("pole", 90.0, -180.0, Tz::UTC, 8_848.0).is_ok());
    }

    #[test]
    fn location_rejects_out_of_range() {
        let cases = [
            (91.0, 0.0, 0.0, "latitude"),
            (f64::NAN, 0.0, 0.0, "latitude"),
            (0.0, -180.5, 0.0, "longitude"),
            (0.0, 0.0, 20_000.0, "elevation_m"),
            (0.0, 0.0, f64::INFINITY, "elevation_m"),
        ];
        for (lat, lon, elev, expected) in cases {
            match Location::new("x", lat, lon, Tz::UTC, elev) {
                Err(LossError::InvalidInput { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected {expected} error, got {other:?}"),
            }
        }
    }

    #[test]
    fn timezone_parsing() {
        assert_eq!(parse_timezone("America/Manaus"), Ok(Tz::America__Manaus));
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(LossError::InvalidInput { field: "timezone", .. })
        ));
    }

    #[test]
    fn orientation_ranges() {
        assert!(SurfaceOrientation::try_new(0.0, 0.0).is_ok());
        assert!(SurfaceOrientation::try_new(90.0, 360.0).is_ok());
        assert!(SurfaceOrientation::try_new(-1.0, 0.0).is_err());
        assert!(SurfaceOrientation::try_new(10.0, 361.0).is_err());
        assert!(SurfaceOrientation::try_new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn reference_resolution() {
        let south = -23.54;
        assert_eq!(
            ReferenceOrientation::LatitudeTilt.resolve(south),
            SurfaceOrientation::new(23.54, 0.0)
        );
        assert_eq!(
            ReferenceOrientation::Horizontal.resolve(south),
            SurfaceOrientation::new(0.0, 0.0)
        );
        assert_eq!(
            ReferenceOrientation::EquatorFacing.resolve(south),
            SurfaceOrientation::new(23.54, 0.0)
        );
        assert_eq!(
            ReferenceOrientation::EquatorFacing.resolve(40.0),
            SurfaceOrientation::new(40.0, 180.0)
        );
        assert_eq!(
            ReferenceOrientation::LatitudeTilt.resolve(40.0),
            SurfaceOrientation::new(40.0, 0.0)
        );
    }

    #[test]
    fn reference_round_trips_through_str() {
        for r in ReferenceOrientation::ALL {
            assert_eq!(r.as_str().parse::<ReferenceOrientation>(), Ok(r));
        }
        assert!("sideways".parse::<ReferenceOrientation>().is_err());
    }
}
