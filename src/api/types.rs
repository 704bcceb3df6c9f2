//! API request and response types.
//!
//! Series field names match the CSV export columns.

use serde::{Deserialize, Serialize};

use crate::config::StudyConfig;
use crate::sim::loss::LossReport;
use crate::sim::pipeline::LossRun;
use crate::sim::types::{ReferenceOrientation, SurfaceOrientation};
use crate::solar::{LinkeTurbidity, SkyModel, SurfaceType};

/// Body of `POST /loss`. Every omitted field takes the server default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LossQuery {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub elevation_m: Option<f64>,
    pub tilt: Option<f64>,
    pub azimuth: Option<f64>,
    pub year: Option<i32>,
    pub interval_minutes: Option<u32>,
    pub reference: Option<ReferenceOrientation>,
    pub sky_model: Option<SkyModel>,
    pub surface_type: Option<SurfaceType>,
    pub albedo: Option<f64>,
    pub linke_turbidity: Option<LinkeTurbidity>,
    pub delta_t: Option<f64>,
    /// Return the per-timestamp series alongside the report.
    pub include_series: bool,
}

impl LossQuery {
    /// Copies `defaults` and overwrites every field set in the query.
    pub fn merge_into(&self, defaults: &StudyConfig) -> StudyConfig {
        let mut study = defaults.clone();
        if let Some(v) = &self.name {
            study.site.name.clone_from(v);
        }
        if let Some(v) = self.latitude {
            study.site.latitude = v;
        }
        if let Some(v) = self.longitude {
            study.site.longitude = v;
        }
        if let Some(v) = &self.timezone {
            study.site.timezone.clone_from(v);
        }
        if let Some(v) = self.elevation_m {
            study.site.elevation_m = v;
        }
        if let Some(v) = self.tilt {
            study.panel.tilt = v;
        }
        if let Some(v) = self.azimuth {
            study.panel.azimuth = v;
        }
        if let Some(v) = self.year {
            study.simulation.year = v;
        }
        if let Some(v) = self.interval_minutes {
            study.simulation.interval_minutes = v;
        }
        if let Some(v) = self.reference {
            study.simulation.reference = v;
        }
        if let Some(v) = self.sky_model {
            study.model.sky_model = v;
        }
        if let Some(v) = self.surface_type {
            study.model.surface_type = v;
        }
        if self.albedo.is_some() {
            study.model.albedo = self.albedo;
        }
        if let Some(v) = self.linke_turbidity {
            study.model.linke_turbidity = v;
        }
        if let Some(v) = self.delta_t {
            study.model.delta_t = v;
        }
        study
    }
}

/// Result of `POST /loss`.
#[derive(Debug, Serialize)]
pub struct LossResponse {
    pub site: String,
    pub timezone: String,
    pub candidate: SurfaceOrientation,
    /// Resolved reference plane.
    pub reference: SurfaceOrientation,
    pub report: LossReport,
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<SeriesRecord>>,
}

impl LossResponse {
    pub fn from_run(run: &LossRun, include_series: bool) -> Self {
        Self {
            site: run.location.name.clone(),
            timezone: run.location.timezone.to_string(),
            candidate: run.candidate,
            reference: run.reference,
            report: run.report.clone(),
            headline: run.headline(),
            series: include_series.then(|| SeriesRecord::from_run(run)),
        }
    }
}

/// One timestamp of a run.
#[derive(Debug, Serialize)]
pub struct SeriesRecord {
    /// RFC 3339 in the site timezone.
    pub timestamp: String,
    pub apparent_zenith: f64,
    pub azimuth: f64,
    pub dni: f64,
    pub ghi: f64,
    pub dhi: f64,
    pub reference_poa_global: f64,
    pub candidate_poa_global: f64,
}

impl SeriesRecord {
    fn from_run(run: &LossRun) -> Vec<Self> {
        run.timestamps
            .iter()
            .zip(&run.positions)
            .zip(&run.irradiance)
            .zip(run.reference_poa.iter().zip(&run.candidate_poa))
            .map(|(((t, pos), irr), (reference, candidate))| Self {
                timestamp: t.to_rfc3339(),
                apparent_zenith: pos.apparent_zenith,
                azimuth: pos.azimuth,
                dni: irr.dni,
                ghi: irr.ghi,
                dhi: irr.dhi,
                reference_poa_global: reference.poa_global,
                candidate_poa_global: candidate.poa_global,
            })
            .collect()
    }
}

/// A named preset as returned by `GET /presets`.
#[derive(Debug, Serialize)]
pub struct PresetEntry {
    pub name: &'static str,
    pub config: StudyConfig,
}

/// Result of `GET /presets`.
#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub presets: Vec<PresetEntry>,
    /// Timezones offered as a menu; any IANA name is accepted.
    pub timezones: Vec<&'static str>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind, e.g. `"invalid_input"`.
    pub kind: &'static str,
    /// Human-readable error message.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_keeps_defaults() {
        let defaults = StudyConfig::maringa();
        assert_eq!(LossQuery::default().merge_into(&defaults), defaults);
    }

    #[test]
    fn query_overrides_only_set_fields() {
        let query = LossQuery {
            tilt: Some(5.0),
            timezone: Some("America/Manaus".to_string()),
            sky_model: Some(SkyModel::Perez),
            albedo: Some(0.4),
            ..LossQuery::default()
        };
        let study = query.merge_into(&StudyConfig::maringa());
        assert_eq!(study.panel.tilt, 5.0);
        assert_eq!(study.panel.azimuth, 0.0);
        assert_eq!(study.site.timezone, "America/Manaus");
        assert_eq!(study.site.latitude, -23.54);
        assert_eq!(study.model.sky_model, SkyModel::Perez);
        assert_eq!(study.model.effective_albedo(), 0.4);
    }

    #[test]
    fn query_accepts_monthly_turbidity() {
        let body = r#"{
            "linke_turbidity": [2.0, 2.0, 2.5, 3.0, 3.0, 3.5, 3.5, 3.0, 3.0, 2.5, 2.0, 2.0]
        }"#;
        let query: LossQuery = serde_json::from_str(body).unwrap();
        let study = query.merge_into(&StudyConfig::maringa());
        assert_eq!(study.model.linke_turbidity.for_month(6), 3.5);
        assert_eq!(study.model.linke_turbidity.for_month(1), 2.0);
    }

    #[test]
    fn query_rejects_unknown_fields() {
        let parsed: Result<LossQuery, _> = serde_json::from_str(r#"{"tilt": 5, "seed": 1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn error_response_shape() {
        let body = ErrorResponse {
            kind: "invalid_input",
            error: "tilt out of range".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["kind"], "invalid_input");
        assert_eq!(json["error"], "tilt out of range");
    }
}
