//! End-to-end tests of the loss pipeline.

mod common;

use chrono::TimeZone;
use chrono_tz::Tz;

use clearsky_loss::error::LossError;
use clearsky_loss::sim::clock::TimeSeries;
use clearsky_loss::sim::pipeline::run;
use clearsky_loss::sim::types::{Location, ReferenceOrientation};
use clearsky_loss::solar::SkyModel;

#[test]
fn maringa_year_gives_finite_bounded_loss() {
    let site = common::maringa();
    let series = common::year_2017(&site);
    let result = run(common::request(site, series, 30.0, 90.0)).expect("run should succeed");

    assert_eq!(result.report.timesteps, 8760);
    assert!(result.report.loss_pct.is_finite());
    assert!(
        result.report.loss_pct > 0.0 && result.report.loss_pct < 100.0,
        "loss = {}",
        result.report.loss_pct
    );
    // clear-sky annual insolation on a tilted plane in the tropics
    assert!(
        result.report.reference_kwh_m2 > 1800.0 && result.report.reference_kwh_m2 < 3200.0,
        "reference = {} kWh/m²",
        result.report.reference_kwh_m2
    );
}

#[test]
fn default_orientation_loses_nothing() {
    let site = common::maringa();
    let series = common::year_2017(&site);
    let result = run(common::request(site, series, 23.54, 0.0)).expect("run should succeed");
    assert_eq!(result.report.loss_pct, 0.0);
    assert_eq!(
        result.headline(),
        "For the panel angle of 23.54° and azimuth of 0.00°, we have a loss of 0.00%"
    );
}

#[test]
fn runs_are_deterministic() {
    let make = || {
        let site = common::maringa();
        let series = common::year_2017(&site);
        run(common::request(site, series, 12.0, 300.0)).expect("run should succeed")
    };
    let a = make();
    let b = make();
    assert_eq!(a.report.loss_pct.to_bits(), b.report.loss_pct.to_bits());
    assert_eq!(a.report.reference_sum.to_bits(), b.report.reference_sum.to_bits());
}

#[test]
fn tilted_north_beats_horizontal_in_the_south() {
    let site = common::maringa();
    let series = common::year_2017(&site);
    let mut req = common::request(site, series, 23.54, 0.0);
    req.reference = ReferenceOrientation::Horizontal;
    let result = run(req).expect("run should succeed");
    assert!(result.report.loss_pct < 0.0, "loss = {}", result.report.loss_pct);
}

#[test]
fn flat_candidate_matches_horizontal_reference_for_any_azimuth() {
    let site = common::maringa();
    let series = common::days_2017(&site, 9, 1, 15);
    let mut req = common::request(site, series, 0.0, 123.0);
    req.reference = ReferenceOrientation::Horizontal;
    let result = run(req).expect("run should succeed");
    assert_eq!(result.report.loss_pct, 0.0);
}

#[test]
fn equator_facing_reference_in_the_north() {
    let site = Location::new("Denver", 39.74, -104.99, Tz::America__Denver, 1600.0)
        .expect("valid location");
    let series = TimeSeries::year(2017, site.timezone, 60).expect("valid year");
    let mut req = common::request(site, series, 39.74, 180.0);
    req.reference = ReferenceOrientation::EquatorFacing;
    let result = run(req).expect("run should succeed");
    assert_eq!(result.reference.azimuth, 180.0);
    assert_eq!(result.report.loss_pct, 0.0);
}

#[test]
fn polar_night_is_degenerate() {
    let site = Location::new("Pole", -89.9, 0.0, Tz::UTC, 2800.0).expect("valid location");
    let start = Tz::UTC.with_ymd_and_hms(2017, 6, 1, 0, 0, 0).unwrap();
    let end = Tz::UTC.with_ymd_and_hms(2017, 6, 8, 0, 0, 0).unwrap();
    let series = TimeSeries::range(start, end, 60).expect("valid range");
    let err = run(common::request(site, series, 10.0, 0.0)).unwrap_err();
    assert_eq!(err, LossError::DegenerateResult { timesteps: 168 });
}

#[test]
fn single_timestamp_series() {
    let site = common::maringa();
    let noon = site
        .timezone
        .with_ymd_and_hms(2017, 3, 21, 12, 0, 0)
        .unwrap();
    let series = TimeSeries::from_timestamps(vec![noon], 60).expect("valid series");
    let result = run(common::request(site.clone(), series, 60.0, 180.0)).expect("noon should run");
    assert_eq!(result.report.timesteps, 1);
    assert!(result.report.loss_pct > 0.0);

    let midnight = site
        .timezone
        .with_ymd_and_hms(2017, 3, 21, 0, 0, 0)
        .unwrap();
    let series = TimeSeries::from_timestamps(vec![midnight], 60).expect("valid series");
    let err = run(common::request(site, series, 60.0, 180.0)).unwrap_err();
    assert_eq!(err, LossError::DegenerateResult { timesteps: 1 });
}

#[test]
fn every_sky_model_produces_a_finite_loss() {
    for model in [
        SkyModel::Isotropic,
        SkyModel::Klucher,
        SkyModel::HayDavies,
        SkyModel::Reindl,
        SkyModel::Perez,
    ] {
        let site = common::maringa();
        let series = common::days_2017(&site, 6, 1, 31);
        let mut req = common::request(site, series, 45.0, 270.0);
        req.model.sky_model = model;
        let result = run(req).unwrap_or_else(|e| panic!("{}: {e}", model.as_str()));
        assert!(
            result.report.loss_pct.is_finite() && result.report.loss_pct > 0.0,
            "{}: loss = {}",
            model.as_str(),
            result.report.loss_pct
        );
    }
}

#[test]
fn poa_is_never_negative() {
    let site = common::maringa();
    let series = common::year_2017(&site);
    let result = run(common::request(site, series, 90.0, 180.0)).expect("run should succeed");
    assert!(result.candidate_poa.iter().all(|p| p.poa_global >= 0.0));
    assert!(result.reference_poa.iter().all(|p| p.poa_global >= 0.0));
    assert!(
        result
            .irradiance
            .iter()
            .all(|c| c.dni >= 0.0 && c.ghi >= 0.0 && c.dhi >= 0.0)
    );
}
