//! Aggregation of two POA series into a relative yield loss.

use std::fmt;

use serde::Serialize;

use crate::error::{LossError, Stage, ensure_finite};
use crate::solar::PoaIrradiance;

/// Annual totals for both orientations and the signed loss between them.
///
/// A positive `loss_pct` means the candidate collects less than the
/// reference; a negative one means it collects more.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossReport {
    /// Number of timesteps aggregated.
    pub timesteps: usize,
    /// Sum of reference POA global over the run (W/m² per step).
    pub reference_sum: f64,
    /// Sum of candidate POA global over the run (W/m² per step).
    pub candidate_sum: f64,
    /// Reference insolation (kWh/m²).
    pub reference_kwh_m2: f64,
    /// Candidate insolation (kWh/m²).
    pub candidate_kwh_m2: f64,
    /// `(1 - candidate/reference) * 100`.
    pub loss_pct: f64,
}

impl LossReport {
    /// Sums both series and computes the relative loss.
    ///
    /// # Arguments
    ///
    /// * `reference` - POA series for the reference orientation
    /// * `candidate` - POA series for the candidate orientation
    /// * `interval_hours` - Timestep duration, only used for the kWh totals
    ///
    /// # Errors
    ///
    /// * `ComputationFailure` if the series differ in length or contain a
    ///   non-finite global value.
    /// * `DegenerateResult` if the reference sum is zero.
    pub fn from_series(
        reference: &[PoaIrradiance],
        candidate: &[PoaIrradiance],
        interval_hours: f64,
    ) -> Result<Self, LossError> {
        if reference.len() != candidate.len() {
            return Err(LossError::ComputationFailure {
                stage: Stage::Aggregation,
                index: reference.len().min(candidate.len()),
                detail: format!(
                    "reference has {} values, candidate has {}",
                    reference.len(),
                    candidate.len()
                ),
            });
        }
        ensure_finite(
            Stage::Aggregation,
            "reference poa_global",
            reference.iter().map(|p| p.poa_global),
        )?;
        ensure_finite(
            Stage::Aggregation,
            "candidate poa_global",
            candidate.iter().map(|p| p.poa_global),
        )?;

        let reference_sum: f64 = reference.iter().map(|p| p.poa_global).sum();
        let candidate_sum: f64 = candidate.iter().map(|p| p.poa_global).sum();

        if reference_sum == 0.0 {
            return Err(LossError::DegenerateResult {
                timesteps: reference.len(),
            });
        }

        Ok(Self {
            timesteps: reference.len(),
            reference_sum,
            candidate_sum,
            reference_kwh_m2: reference_sum * interval_hours / 1000.0,
            candidate_kwh_m2: candidate_sum * interval_hours / 1000.0,
            loss_pct: (1.0 - candidate_sum / reference_sum) * 100.0,
        })
    }
}

impl fmt::Display for LossReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Loss Report ---")?;
        writeln!(f, "Timesteps:             {}", self.timesteps)?;
        writeln!(f, "Reference insolation:  {:.2} kWh/m²", self.reference_kwh_m2)?;
        writeln!(f, "Candidate insolation:  {:.2} kWh/m²", self.candidate_kwh_m2)?;
        write!(f, "Loss:                  {:.2}%", self.loss_pct)
    }
}
