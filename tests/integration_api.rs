//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use clearsky_loss::api::{AppState, router};
use clearsky_loss::config::StudyConfig;

fn build_api_state() -> Arc<AppState> {
    Arc::new(AppState {
        defaults: StudyConfig::maringa(),
    })
}

async fn post_json(body: &str) -> (StatusCode, serde_json::Value) {
    let app = router(build_api_state());
    let req = Request::builder()
        .method("POST")
        .uri("/loss")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn full_preset_site_over_the_api() {
    let manaus = StudyConfig::manaus();
    let body = serde_json::json!({
        "name": manaus.site.name,
        "latitude": manaus.site.latitude,
        "longitude": manaus.site.longitude,
        "timezone": manaus.site.timezone,
        "elevation_m": manaus.site.elevation_m,
        "tilt": 20.0,
        "azimuth": 90.0,
    });
    let (status, json) = post_json(&body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["site"], "Manaus");
    assert_eq!(json["timezone"], "America/Manaus");
    assert_eq!(json["reference"]["tilt"], 3.1);
    assert_eq!(json["report"]["timesteps"], 8760);

    let loss = json["report"]["loss_pct"].as_f64().unwrap();
    assert!(loss > 0.0 && loss < 100.0, "loss = {loss}");
    assert!(
        json["headline"]
            .as_str()
            .unwrap()
            .starts_with("For the panel angle of 20.00° and azimuth of 90.00°")
    );
    assert!(json.get("series").is_none());
}

#[tokio::test]
async fn series_matches_the_site_timezone() {
    let body = r#"{
        "timezone": "America/Manaus",
        "latitude": -3.10,
        "longitude": -60.02,
        "interval_minutes": 180,
        "sky_model": "perez",
        "include_series": true
    }"#;
    let (status, json) = post_json(body).await;

    assert_eq!(status, StatusCode::OK);
    let series = json["series"].as_array().unwrap();
    assert_eq!(series.len(), 2920);
    assert_eq!(series[0]["timestamp"], "2017-01-01T00:00:00-04:00");
    assert_eq!(series[4]["timestamp"], "2017-01-01T12:00:00-04:00");
    assert!(series.iter().all(|r| r["candidate_poa_global"].as_f64().unwrap() >= 0.0));
}

#[tokio::test]
async fn midnight_only_sampling_is_degenerate() {
    let body = r#"{
        "timezone": "America/Manaus",
        "latitude": -3.10,
        "longitude": -60.02,
        "interval_minutes": 1440
    }"#;
    let (status, json) = post_json(body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["kind"], "degenerate_result");
    assert!(json["error"].as_str().unwrap().contains("365 timesteps"));
}

#[tokio::test]
async fn unknown_timezone_is_rejected() {
    let (status, json) = post_json(r#"{"timezone": "Mars/Olympus_Mons"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("timezone"));
}

#[tokio::test]
async fn presets_round_trip_through_loss() {
    let app = router(build_api_state());
    let req = Request::builder()
        .uri("/presets")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let noronha = json["presets"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "noronha")
        .expect("noronha preset should be listed");
    let site = &noronha["config"]["site"];
    let body = serde_json::json!({
        "latitude": site["latitude"],
        "longitude": site["longitude"],
        "timezone": site["timezone"],
        "elevation_m": site["elevation_m"],
        "tilt": noronha["config"]["panel"]["tilt"],
        "azimuth": noronha["config"]["panel"]["azimuth"],
        "interval_minutes": 120,
    });
    let (status, json) = post_json(&body.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["report"]["timesteps"], 4380);
    assert_eq!(json["report"]["loss_pct"], 0.0);
}
