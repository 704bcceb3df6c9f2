//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::TimeZone;
use chrono_tz::Tz;

use clearsky_loss::sim::clock::TimeSeries;
use clearsky_loss::sim::pipeline::{LossRequest, ModelOptions};
use clearsky_loss::sim::types::{Location, ReferenceOrientation, SurfaceOrientation};

/// Maringá at 600 m, timezone America/Bahia.
pub fn maringa() -> Location {
    Location::new("Maringá", -23.54, -51.68, Tz::America__Bahia, 600.0)
        .expect("Maringá should be a valid location")
}

/// Hourly 2017 series in the location's timezone (8760 points).
pub fn year_2017(location: &Location) -> TimeSeries {
    TimeSeries::year(2017, location.timezone, 60).expect("2017 should be a valid year")
}

/// Hourly series covering `[start_day, end_day)` of a month in 2017.
pub fn days_2017(location: &Location, month: u32, start_day: u32, end_day: u32) -> TimeSeries {
    let tz = location.timezone;
    let start = tz
        .with_ymd_and_hms(2017, month, start_day, 0, 0, 0)
        .single()
        .expect("start should exist");
    let end = tz
        .with_ymd_and_hms(2017, month, end_day, 0, 0, 0)
        .single()
        .expect("end should exist");
    TimeSeries::range(start, end, 60).expect("range should be valid")
}

/// Request with default model options and the latitude-tilt reference.
pub fn request(
    location: Location,
    series: TimeSeries,
    tilt: f64,
    azimuth: f64,
) -> LossRequest {
    LossRequest {
        location,
        series,
        candidate: SurfaceOrientation::new(tilt, azimuth),
        reference: ReferenceOrientation::LatitudeTilt,
        model: ModelOptions::default(),
    }
}
