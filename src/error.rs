//! Error kinds surfaced by the loss pipeline.

use thiserror::Error;

/// Pipeline stage that produced a [`LossError::ComputationFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Position,
    ClearSky,
    Transposition,
    Aggregation,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Position => "position",
            Stage::ClearSky => "clear-sky",
            Stage::Transposition => "transposition",
            Stage::Aggregation => "aggregation",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every way a loss calculation can fail.
///
/// The pipeline never turns one of these into a number; adapters convert
/// them into a single user-facing message at the outer boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LossError {
    /// A caller-supplied value is outside its physical or syntactic range.
    #[error("invalid input: {field} = {value} ({reason})")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The reference orientation collects no irradiance at all, so the
    /// relative loss is undefined.
    #[error("degenerate result: reference irradiance sums to zero over {timesteps} timesteps")]
    DegenerateResult { timesteps: usize },

    /// A non-finite value appeared inside one of the numeric stages.
    #[error("computation failure in {stage} stage at timestep {index}: {detail}")]
    ComputationFailure {
        stage: Stage,
        index: usize,
        detail: String,
    },
}

impl LossError {
    pub(crate) fn invalid(
        field: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        LossError::InvalidInput {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used by the HTTP adapter.
    pub fn kind(&self) -> &'static str {
        match self {
            LossError::InvalidInput { .. } => "invalid_input",
            LossError::DegenerateResult { .. } => "degenerate_result",
            LossError::ComputationFailure { .. } => "computation_failure",
        }
    }
}

/// Checks that every value yielded by `values` is finite.
///
/// Returns the first offending index as a `ComputationFailure` for `stage`.
pub(crate) fn ensure_finite<I>(stage: Stage, what: &str, values: I) -> Result<(), LossError>
where
    I: IntoIterator<Item = f64>,
{
    for (index, v) in values.into_iter().enumerate() {
        if !v.is_finite() {
            return Err(LossError::ComputationFailure {
                stage,
                index,
                detail: format!("{what} is {v}"),
            });
        }
    }
    Ok(())
}
